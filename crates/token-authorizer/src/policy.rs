//! Authorization decision assembly.
//!
//! Pure data construction with no failure modes: the gateway contract comes
//! in two shapes, a full IAM-style policy document (REST API custom
//! authorizers) and the simplified `isAuthorized` form (HTTP API v2
//! authorizers).

use aws_lambda_events::apigw::{
    ApiGatewayCustomAuthorizerPolicy, ApiGatewayCustomAuthorizerResponse,
    ApiGatewayV2CustomAuthorizerSimpleResponse,
};
use aws_lambda_events::iam::{IamPolicyEffect, IamPolicyStatement};
use serde_json::{Value, json};

const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Builds an `Allow` policy for the given principal, granting
/// `execute-api:Invoke` on the requested method ARN and carrying the user ID
/// in the authorizer context.
pub fn allow_policy(user_id: &str, method_arn: &str) -> ApiGatewayCustomAuthorizerResponse {
    ApiGatewayCustomAuthorizerResponse {
        principal_id: Some(user_id.to_string()),
        policy_document: ApiGatewayCustomAuthorizerPolicy {
            version: Some(POLICY_VERSION.to_string()),
            statement: vec![IamPolicyStatement {
                action: vec![INVOKE_ACTION.to_string()],
                effect: IamPolicyEffect::Allow,
                resource: vec![method_arn.to_string()],
                ..Default::default()
            }],
        },
        context: json!({ "userId": user_id }),
        usage_identifier_key: None,
    }
}

/// Builds a `Deny` policy for the requested method ARN. No identity was
/// resolved, so the response carries neither principal nor context.
pub fn deny_policy(method_arn: &str) -> ApiGatewayCustomAuthorizerResponse {
    ApiGatewayCustomAuthorizerResponse {
        principal_id: None,
        policy_document: ApiGatewayCustomAuthorizerPolicy {
            version: Some(POLICY_VERSION.to_string()),
            statement: vec![IamPolicyStatement {
                action: vec![INVOKE_ACTION.to_string()],
                effect: IamPolicyEffect::Deny,
                resource: vec![method_arn.to_string()],
                ..Default::default()
            }],
        },
        context: Value::Null,
        usage_identifier_key: None,
    }
}

/// Builds the simplified HTTP API v2 response: authorized when an identity
/// was resolved, with the user ID in the context.
pub fn simple_response(user_id: Option<&str>) -> ApiGatewayV2CustomAuthorizerSimpleResponse {
    match user_id {
        Some(id) => ApiGatewayV2CustomAuthorizerSimpleResponse {
            is_authorized: true,
            context: json!({ "userId": id }),
        },
        None => ApiGatewayV2CustomAuthorizerSimpleResponse {
            is_authorized: false,
            context: Value::Null,
        },
    }
}
