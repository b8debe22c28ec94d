use crate::serde_support::{parse_sections, read_sections, IniSection};
use anyhow::{anyhow, Result};
use directories::UserDirs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

pub const MFA_SERIAL: &str = "mfa_serial";
pub const ROLE_ARN: &str = "role_arn";

/// Read-only view of the AWS config file (`~/.aws/config`).
///
/// Profiles are only recognised through `[profile <name>]` headers. `[default]`
/// and any other single token header is kept but never matched by [`AwsConfig::lookup`].
#[derive(Clone, Debug, Default)]
pub struct AwsConfig {
    sections: Vec<IniSection>,
}

impl AwsConfig {
    pub fn file_path(path: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = path {
            return Ok(path);
        }

        match UserDirs::new() {
            Some(user_dirs) => Ok(user_dirs.home_dir().join(".aws/config")),
            None => Err(anyhow!("Unable to get user directories")),
        }
    }

    pub fn read_file(path: Option<PathBuf>) -> Result<AwsConfig> {
        let config_path = Self::file_path(path)?;
        debug!("Reading AWS config from {}", config_path.display());

        Ok(Self {
            sections: read_sections(&config_path)?,
        })
    }

    pub fn lookup(&self, profile_name: &str, key: &str) -> Option<&str> {
        self.profile(profile_name)
            .and_then(|section| section.get(key))
    }

    pub fn mfa_serial(&self, profile_name: &str) -> Option<&str> {
        self.lookup(profile_name, MFA_SERIAL)
    }

    pub fn role_arn(&self, profile_name: &str) -> Option<&str> {
        self.lookup(profile_name, ROLE_ARN)
    }

    /// First `[profile <name>]` section for `profile_name`. Later duplicates are ignored.
    fn profile(&self, profile_name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|section| {
            let mut parts = section.name.split_whitespace();
            matches!(
                (parts.next(), parts.next()),
                (Some("profile"), Some(name)) if name == profile_name
            )
        })
    }
}

impl FromStr for AwsConfig {
    type Err = anyhow::Error;

    fn from_str(contents: &str) -> Result<Self> {
        Ok(Self {
            sections: parse_sections(contents)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const CONFIG: &str = r#"
[default]
region = ap-southeast-2
mfa_serial = arn:aws:iam::123:mfa/default

[profile dev]
region = us-east-1
mfa_serial = arn:aws:iam::123:mfa/user

[profile admin]
role_arn = arn:aws:iam::456:role/Admin
source_profile = dev

[dev]
mfa_serial = arn:aws:iam::999:mfa/bare

[sso-session dev]
mfa_serial = arn:aws:iam::999:mfa/sso

[profile dev]
mfa_serial = arn:aws:iam::999:mfa/duplicate
"#;

    fn config() -> AwsConfig {
        CONFIG.parse().unwrap()
    }

    #[test]
    fn finds_mfa_serial_for_profile() {
        assert_eq!(config().mfa_serial("dev"), Some("arn:aws:iam::123:mfa/user"));
    }

    #[test]
    fn finds_role_arn_for_profile() {
        assert_eq!(
            config().role_arn("admin"),
            Some("arn:aws:iam::456:role/Admin")
        );
    }

    #[test]
    fn missing_profile_or_key_is_none() {
        let config = config();
        assert_eq!(config.mfa_serial("absent"), None);
        assert_eq!(config.mfa_serial("admin"), None);
        assert_eq!(config.lookup("dev", "nope"), None);
    }

    #[test]
    fn single_token_header_never_matches() {
        let config = config();
        assert_eq!(config.mfa_serial("default"), None);
        assert_eq!(
            "[dev]\nmfa_serial = x\n".parse::<AwsConfig>().unwrap().mfa_serial("dev"),
            None
        );
    }

    #[test]
    fn header_must_start_with_profile() {
        let config: AwsConfig = "[sso-session dev]\nmfa_serial = x\n".parse().unwrap();
        assert_eq!(config.mfa_serial("dev"), None);
    }

    #[test]
    fn first_duplicate_section_wins() {
        assert_eq!(
            config().mfa_serial("dev"),
            Some("arn:aws:iam::123:mfa/user")
        );
    }

    #[test]
    fn extra_whitespace_in_header_is_tolerated() {
        let config: AwsConfig = "[profile    spaced  ]\nmfa_serial = s\n".parse().unwrap();
        assert_eq!(config.mfa_serial("spaced"), Some("s"));
    }

    #[test]
    fn missing_file_behaves_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = AwsConfig::read_file(Some(dir.path().join("config"))).unwrap();
        assert_eq!(config.mfa_serial("dev"), None);
    }

    #[test]
    fn reads_file_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, CONFIG).unwrap();

        let config = AwsConfig::read_file(Some(path)).unwrap();
        assert_eq!(config.mfa_serial("dev"), Some("arn:aws:iam::123:mfa/user"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "[profile dev\nmfa_serial = x\n").unwrap();

        assert!(AwsConfig::read_file(Some(path)).is_err());
    }

    #[test]
    fn colon_separated_values_are_found() {
        let config: AwsConfig =
            "[profile dev]\nregion: eu-west-1\nmfa_serial: arn:aws:iam::1:mfa/u\n".parse().unwrap();
        assert_eq!(config.mfa_serial("dev"), Some("arn:aws:iam::1:mfa/u"));
    }

    #[test]
    fn upper_case_keys_are_found() {
        let config: AwsConfig = "[profile dev]\nMFA_SERIAL = x\nRole_Arn = y\n".parse().unwrap();
        assert_eq!(config.mfa_serial("dev"), Some("x"));
        assert_eq!(config.role_arn("dev"), Some("y"));
    }

    #[test]
    fn malformed_line_error_names_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "[profile dev]\n\nregion = x\nbogus\n").unwrap();

        let err = AwsConfig::read_file(Some(path)).unwrap_err();
        assert!(format!("{:#}", err).contains("line 4"));
    }
}
