use crate::client::{StsApi, StsResponse};
use crate::error::ResolveError;
use crate::prompt::SecretPrompt;
use crate::resolve;
use crate::session_name::random_session_name;
use anyhow::Result;
use file_manager::aws_config::AwsConfig;
use rand::Rng;
use shared::args::DEFAULT_ASSUME_ROLE_DURATION;
use tracing::{debug, info};

/// What the caller supplied for `assume-role`.
#[derive(Clone, Debug, Default)]
pub struct AssumeRoleInput {
    pub profile_name: String,
    pub role_arn: Option<String>,
    pub from_profile: Option<String>,
    pub role_session_name: Option<String>,
    pub mfa_serial: Option<String>,
    pub token_code: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub serial_number: String,
    pub token_code: String,
    pub duration_seconds: i32,
    pub role_session_name: String,
}

/// Flag value first, then `role_arn` of `from_profile` in the config file.
fn resolve_role_arn(
    explicit: Option<String>,
    from_profile: Option<&str>,
    config: &AwsConfig,
) -> Result<String, ResolveError> {
    match (explicit, from_profile) {
        (Some(role_arn), _) => Ok(role_arn),
        (None, Some(from_profile)) => config
            .role_arn(from_profile)
            .map(str::to_owned)
            .ok_or_else(|| ResolveError::RoleArnNotFound(from_profile.to_owned())),
        (None, None) => Err(ResolveError::RoleArnMissing),
    }
}

pub fn build_request<P, R>(
    input: AssumeRoleInput,
    config: &AwsConfig,
    prompt: &P,
    rng: &mut R,
) -> Result<AssumeRoleRequest>
where
    P: SecretPrompt + ?Sized,
    R: Rng + ?Sized,
{
    let role_arn = resolve_role_arn(input.role_arn, input.from_profile.as_deref(), config)?;
    let serial_number = resolve::mfa_serial(input.mfa_serial, &input.profile_name, config)?;
    let token_code = resolve::token_code(input.token_code, prompt)?;

    let role_session_name = match input.role_session_name {
        Some(name) => name,
        None => random_session_name(rng),
    };

    Ok(AssumeRoleRequest {
        role_arn,
        serial_number,
        token_code,
        duration_seconds: input.duration_seconds.unwrap_or(DEFAULT_ASSUME_ROLE_DURATION),
        role_session_name,
    })
}

/// Assumes a role with MFA, signed with the credentials of `profile_name`.
pub async fn execute<C, P, R>(
    client: &C,
    config: &AwsConfig,
    prompt: &P,
    rng: &mut R,
    input: AssumeRoleInput,
) -> Result<StsResponse>
where
    C: StsApi + ?Sized,
    P: SecretPrompt + ?Sized,
    R: Rng + ?Sized,
{
    let request = build_request(input, config, prompt, rng)?;

    debug!(
        "Assume role request for {} as session {} with MFA {} for {}s",
        request.role_arn, request.role_session_name, request.serial_number, request.duration_seconds
    );

    let response = client.assume_role(&request).await?;

    if let Some(user) = &response.assumed_role_user {
        info!("Assumed {}", user.arn);
    }
    info!("Role credentials expire at {}", response.expiration);

    Ok(response)
}
