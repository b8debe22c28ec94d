use crate::error::ResolveError;
use crate::prompt::SecretPrompt;
use anyhow::Result;
use file_manager::aws_config::AwsConfig;
use tracing::debug;

/// Flag value first, then `mfa_serial` of `profile_name` in the config file.
pub fn mfa_serial(
    explicit: Option<String>,
    profile_name: &str,
    config: &AwsConfig,
) -> Result<String, ResolveError> {
    if let Some(serial) = explicit {
        return Ok(serial);
    }

    match config.mfa_serial(profile_name) {
        Some(serial) => {
            debug!("Using MFA serial {} from profile {}", serial, profile_name);
            Ok(serial.to_owned())
        }
        None => Err(ResolveError::MfaSerialNotFound(profile_name.to_owned())),
    }
}

pub fn token_code<P: SecretPrompt + ?Sized>(explicit: Option<String>, prompt: &P) -> Result<String> {
    match explicit {
        Some(code) => Ok(code),
        None => prompt.token_code(),
    }
}
