//! Lambda entry point for the token authorizer.
//!
//! Telemetry is initialised once per execution environment, on the first
//! invocation (cold start), using that invocation's request ID and function
//! ARN. Spans are flushed after every invocation so nothing is lost when the
//! environment freezes.
//!
//! Environment variables:
//! - `AXIOM_*` - see the `axiom-tracing` crate for the export configuration.

use aws_lambda_events::apigw::{
    ApiGatewayCustomAuthorizerRequest, ApiGatewayCustomAuthorizerResponse,
};
use axiom_tracing::{AxiomTelemetry, Telemetry, TracingConfig, traced_fn};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use opentelemetry::{Context, KeyValue};
use std::sync::Arc;
use token_authorizer::{UserInfoClient, authorize};
use tokio::sync::OnceCell;

static TELEMETRY: OnceCell<AxiomTelemetry> = OnceCell::const_new();

#[tokio::main]
async fn main() -> Result<(), Error> {
    let client = Arc::new(UserInfoClient::new()?);

    run(service_fn(move |event| {
        let client = Arc::clone(&client);
        async move { handle(&client, event).await }
    }))
    .await
}

async fn handle(
    client: &UserInfoClient,
    event: LambdaEvent<ApiGatewayCustomAuthorizerRequest>,
) -> Result<ApiGatewayCustomAuthorizerResponse, Error> {
    let telemetry = TELEMETRY
        .get_or_try_init(|| async {
            let config = TracingConfig::from_env()?;
            let telemetry = AxiomTelemetry::init(
                config,
                &event.context.request_id,
                &event.context.invoked_function_arn,
            )?;
            Ok::<_, Error>(telemetry)
        })
        .await?;

    let cx = telemetry.start_span(&Context::current(), "authorizer.invoke");

    let payload = event.payload;
    let result = traced_fn(telemetry, &cx, "validate-token", |_cx| {
        authorize(client, payload)
    })
    .await;

    if let Ok(response) = &result
        && let Some(user_id) = &response.principal_id
    {
        telemetry.add_span_event(&cx, "token validated", vec![KeyValue::new(
            "user.id",
            user_id.clone(),
        )]);
    }

    telemetry.end_span(&cx);
    telemetry.flush();

    Ok(result?)
}
