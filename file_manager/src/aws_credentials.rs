use crate::serde_support::{parse_sections, read_contents, set_value_in_place, write_atomic};
use anyhow::{anyhow, bail, Context, Result};
use directories::UserDirs;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};

pub const AWS_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const AWS_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const AWS_SESSION_TOKEN: &str = "aws_session_token";

/// Temporary credentials returned by STS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AwsCredentials {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_session_token: String,
}

impl AwsCredentials {
    fn fields(&self) -> [(&'static str, &str); 3] {
        [
            (AWS_ACCESS_KEY_ID, self.aws_access_key_id.as_str()),
            (AWS_SECRET_ACCESS_KEY, self.aws_secret_access_key.as_str()),
            (AWS_SESSION_TOKEN, self.aws_session_token.as_str()),
        ]
    }
}

/// Something that can set a single key of a credentials profile.
pub trait CredentialSink {
    fn set_field(&mut self, profile_name: &str, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, PartialEq, Eq)]
pub struct PersistOutcome {
    pub profile_name: String,
    pub failed_keys: Vec<&'static str>,
}

/// Writes each credential field as its own update. Every field is attempted,
/// so a failure part way through leaves the profile partially updated.
pub fn persist<S: CredentialSink + ?Sized>(
    sink: &mut S,
    profile_name: &str,
    credentials: &AwsCredentials,
) -> PersistOutcome {
    let mut failed_keys = Vec::new();

    for (key, value) in credentials.fields() {
        if let Err(e) = sink.set_field(profile_name, key, value) {
            warn!("Failed to set {} for profile {}: {:#}", key, profile_name, e);
            failed_keys.push(key);
        }
    }

    info!("Saved credentials profile: {}", profile_name);

    PersistOutcome {
        profile_name: profile_name.to_owned(),
        failed_keys,
    }
}

pub fn output_profile_name(source_profile: &str, save_output_profile: Option<&str>) -> String {
    match save_output_profile {
        Some(name) => name.to_owned(),
        None => format!("_{}", source_profile),
    }
}

/// Edits the shared credentials file directly, one key per call.
#[derive(Debug, Clone)]
pub struct CredentialsFile {
    path: PathBuf,
}

impl CredentialsFile {
    pub fn file_path(path: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = path {
            return Ok(path);
        }

        match UserDirs::new() {
            Some(user_dirs) => Ok(user_dirs.home_dir().join(".aws/credentials")),
            None => Err(anyhow!("Unable to get user directories")),
        }
    }

    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            path: Self::file_path(path)?,
        })
    }
}

impl CredentialSink for CredentialsFile {
    fn set_field(&mut self, profile_name: &str, key: &str, value: &str) -> Result<()> {
        let contents = read_contents(&self.path)?;
        let sections = parse_sections(&contents)
            .with_context(|| format!("Malformed INI file {}", self.path.display()))?;

        if !sections.iter().any(|s| s.name == profile_name) {
            debug!("Adding profile {} to {}", profile_name, self.path.display());
        }

        let updated = set_value_in_place(&contents, profile_name, key, value)?;
        write_atomic(&self.path, &updated)
    }
}

/// Delegates to `aws configure --profile <profile> set <key> <value>`.
#[derive(Debug, Clone, Default)]
pub struct AwsCli;

impl CredentialSink for AwsCli {
    fn set_field(&mut self, profile_name: &str, key: &str, value: &str) -> Result<()> {
        let status = Command::new("aws")
            .args(["configure", "--profile", profile_name, "set", key, value])
            .status()
            .context("Unable to run the aws cli")?;

        if !status.success() {
            bail!("aws configure set {} exited with {}", key, status);
        }

        Ok(())
    }
}
