use crate::assume_role::AssumeRoleRequest;
use crate::session_token::SessionTokenRequest;
use anyhow::{anyhow, Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_smithy_types::date_time::Format;
use chrono::{DateTime, Utc};
use file_manager::aws_credentials::AwsCredentials;
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssumedRoleUser {
    pub assumed_role_id: String,
    pub arn: String,
}

/// What STS handed back for either request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StsResponse {
    pub credentials: AwsCredentials,
    pub expiration: DateTime<Utc>,
    pub assumed_role_user: Option<AssumedRoleUser>,
}

/// The two STS operations the flows depend on.
#[allow(async_fn_in_trait)]
pub trait StsApi {
    async fn get_session_token(&self, request: &SessionTokenRequest) -> Result<StsResponse>;
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<StsResponse>;
}

/// STS client signed with the caller's own credentials for `profile`.
///
/// The SDK config is only loaded on the first request.
pub struct SdkStsClient {
    profile_name: String,
    region: Option<String>,
    client: OnceCell<aws_sdk_sts::Client>,
}

impl SdkStsClient {
    pub fn new(profile_name: &str, region: Option<String>) -> Self {
        Self {
            profile_name: profile_name.to_owned(),
            region,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &aws_sdk_sts::Client {
        self.client
            .get_or_init(|| async {
                let mut loader =
                    aws_config::defaults(BehaviorVersion::latest()).profile_name(&self.profile_name);

                if let Some(region) = &self.region {
                    loader = loader.region(Region::new(region.clone()));
                }

                let config = loader.load().await;
                debug!(
                    "Loaded AWS config for profile {} in region {:?}",
                    self.profile_name,
                    config.region()
                );

                aws_sdk_sts::Client::new(&config)
            })
            .await
    }
}

impl StsApi for SdkStsClient {
    async fn get_session_token(&self, request: &SessionTokenRequest) -> Result<StsResponse> {
        info!("Calling AWS STS GetSessionToken");

        let response = self
            .client()
            .await
            .get_session_token()
            .serial_number(&request.serial_number)
            .token_code(&request.token_code)
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .context("Failed to get session token")?;

        let credentials = response
            .credentials()
            .ok_or(anyhow!("No credentials found in session token response"))?;

        Ok(StsResponse {
            credentials: convert_credentials(credentials),
            expiration: convert_expiration(credentials.expiration())?,
            assumed_role_user: None,
        })
    }

    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<StsResponse> {
        info!("Calling AWS STS AssumeRole for {}", request.role_arn);

        let response = self
            .client()
            .await
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.role_session_name)
            .serial_number(&request.serial_number)
            .token_code(&request.token_code)
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .context("Failed to assume role")?;

        let credentials = response
            .credentials()
            .ok_or(anyhow!("No credentials found in assume role response"))?;

        let assumed_role_user = response.assumed_role_user().map(|user| AssumedRoleUser {
            assumed_role_id: user.assumed_role_id().to_owned(),
            arn: user.arn().to_owned(),
        });

        Ok(StsResponse {
            credentials: convert_credentials(credentials),
            expiration: convert_expiration(credentials.expiration())?,
            assumed_role_user,
        })
    }
}

fn convert_credentials(credentials: &aws_sdk_sts::types::Credentials) -> AwsCredentials {
    AwsCredentials {
        aws_access_key_id: credentials.access_key_id().to_owned(),
        aws_secret_access_key: credentials.secret_access_key().to_owned(),
        aws_session_token: credentials.session_token().to_owned(),
    }
}

fn convert_expiration(expiration: &aws_smithy_types::DateTime) -> Result<DateTime<Utc>> {
    let expiration = expiration.fmt(Format::DateTime)?;

    DateTime::parse_from_rfc3339(&expiration)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Failed to parse datetime: {:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_smithy_expiration() {
        let expiration = aws_smithy_types::DateTime::from_secs(1_700_000_000);

        let converted = convert_expiration(&expiration).unwrap();

        assert_eq!(converted.timestamp(), 1_700_000_000);
        assert_eq!(converted.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn converts_sdk_credentials() {
        let credentials = aws_sdk_sts::types::Credentials::builder()
            .access_key_id("ASIAEXAMPLE")
            .secret_access_key("secret")
            .session_token("token")
            .expiration(aws_smithy_types::DateTime::from_secs(0))
            .build()
            .unwrap();

        assert_eq!(
            convert_credentials(&credentials),
            AwsCredentials {
                aws_access_key_id: "ASIAEXAMPLE".to_owned(),
                aws_secret_access_key: "secret".to_owned(),
                aws_session_token: "token".to_owned(),
            }
        );
    }
}
