use crate::client::{StsApi, StsResponse};
use crate::prompt::SecretPrompt;
use crate::resolve;
use anyhow::Result;
use file_manager::aws_config::AwsConfig;
use shared::args::DEFAULT_SESSION_TOKEN_DURATION;
use tracing::{debug, info};

/// What the caller supplied for `create`.
#[derive(Clone, Debug, Default)]
pub struct SessionTokenInput {
    pub profile_name: String,
    pub mfa_serial: Option<String>,
    pub token_code: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionTokenRequest {
    pub serial_number: String,
    pub token_code: String,
    pub duration_seconds: i32,
}

pub fn build_request<P: SecretPrompt + ?Sized>(
    input: SessionTokenInput,
    config: &AwsConfig,
    prompt: &P,
) -> Result<SessionTokenRequest> {
    let serial_number = resolve::mfa_serial(input.mfa_serial, &input.profile_name, config)?;
    let token_code = resolve::token_code(input.token_code, prompt)?;

    Ok(SessionTokenRequest {
        serial_number,
        token_code,
        duration_seconds: input.duration_seconds.unwrap_or(DEFAULT_SESSION_TOKEN_DURATION),
    })
}

/// Exchanges the profile's own credentials and an MFA code for a session token.
pub async fn execute<C, P>(
    client: &C,
    config: &AwsConfig,
    prompt: &P,
    input: SessionTokenInput,
) -> Result<StsResponse>
where
    C: StsApi + ?Sized,
    P: SecretPrompt + ?Sized,
{
    let profile_name = input.profile_name.clone();
    let request = build_request(input, config, prompt)?;

    debug!(
        "Session token request for {} with MFA {} for {}s",
        profile_name, request.serial_number, request.duration_seconds
    );

    let response = client.get_session_token(&request).await?;
    info!("Session token expires at {}", response.expiration);

    Ok(response)
}
