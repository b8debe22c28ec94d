use serde::Serialize;
use sts::StsResponse;

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct JsonResponse {
    pub credentials: JsonCredentials,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumed_role_user: Option<JsonAssumedRoleUser>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct JsonCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct JsonAssumedRoleUser {
    pub assumed_role_id: String,
    pub arn: String,
}

impl JsonResponse {
    pub fn convert(response: &StsResponse) -> Self {
        let credentials = &response.credentials;

        Self {
            credentials: JsonCredentials {
                access_key_id: credentials.aws_access_key_id.clone(),
                secret_access_key: credentials.aws_secret_access_key.clone(),
                session_token: credentials.aws_session_token.clone(),
                expiration: response
                    .expiration
                    .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                    .to_string(),
            },
            assumed_role_user: response
                .assumed_role_user
                .as_ref()
                .map(|user| JsonAssumedRoleUser {
                    assumed_role_id: user.assumed_role_id.clone(),
                    arn: user.arn.clone(),
                }),
        }
    }
}
