use std::path::PathBuf;

pub const DEFAULT_SESSION_TOKEN_DURATION: i32 = 86400;
pub const DEFAULT_ASSUME_ROLE_DURATION: i32 = 28800;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the AWS config file [default: ~/.aws/config]
    #[arg(long, env = "AWS_CONFIG_FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Path to the AWS shared credentials file [default: ~/.aws/credentials]
    #[arg(long, env = "AWS_SHARED_CREDENTIALS_FILE", global = true)]
    pub credentials_file: Option<PathBuf>,

    /// Save credentials through `aws configure set` instead of editing the credentials file
    #[arg(long, default_value_t = false, global = true)]
    pub aws_cli: bool,

    /// Enables verbose logging to the console
    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Gets STS session token
    Create(CreateArgs),
    /// STS assume role
    AssumeRole(AssumeRoleArgs),
}

impl Command {
    pub fn output(&self) -> &OutputArgs {
        match self {
            Command::Create(args) => &args.output,
            Command::AssumeRole(args) => &args.output,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// AWS region
    #[arg(short, long)]
    pub region: Option<String>,

    /// AWS shared credentials profile
    #[arg(short, long, env = "AWS_PROFILE", default_value = "default")]
    pub profile: String,

    /// MFA serial ARN
    #[arg(short, long)]
    pub mfa_serial: Option<String>,

    /// MFA token code, prompted for when omitted
    #[arg(short, long)]
    pub token_code: Option<String>,

    /// STS token TTL in seconds
    #[arg(short, long, default_value_t = DEFAULT_SESSION_TOKEN_DURATION)]
    pub duration: i32,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct AssumeRoleArgs {
    /// AWS region
    #[arg(short, long)]
    pub region: Option<String>,

    /// AWS shared credentials profile
    #[arg(short, long, default_value = "default")]
    pub profile: String,

    /// ARN of the role to assume
    #[arg(short = 'a', long)]
    pub role_arn: Option<String>,

    /// Name of the profile in ~/.aws/config the role ARN should be read from
    #[arg(short, long)]
    pub from_profile: Option<String>,

    /// Role session name, a random one is generated when omitted
    #[arg(long)]
    pub role_session_name: Option<String>,

    /// MFA serial ARN
    #[arg(short, long)]
    pub mfa_serial: Option<String>,

    /// MFA token code, prompted for when omitted
    #[arg(short, long)]
    pub token_code: Option<String>,

    /// STS token TTL in seconds
    #[arg(short, long, default_value_t = DEFAULT_ASSUME_ROLE_DURATION)]
    pub duration: i32,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Shared credentials profile name to be written / overwritten
    #[arg(short = 'o', long)]
    pub save_output_profile: Option<String>,

    /// Skip save to shared credentials
    #[arg(short, long, default_value_t = false)]
    pub skip_save: bool,

    /// Display JSON response from the AWS API
    #[arg(short = 'j', long, default_value_t = false)]
    pub display_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    #[test]
    fn definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn create_defaults_duration() {
        let args = Args::try_parse_from(["aws-mfa-tool", "create", "-p", "dev"]).unwrap();
        match args.command {
            Command::Create(create) => {
                assert_eq!(create.duration, 86400);
                assert_eq!(create.profile, "dev");
                assert!(!create.output.skip_save);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn assume_role_defaults_duration() {
        let args = Args::try_parse_from([
            "aws-mfa-tool",
            "assume-role",
            "-p",
            "dev",
            "--from-profile",
            "admin",
        ])
        .unwrap();
        match args.command {
            Command::AssumeRole(assume) => {
                assert_eq!(assume.duration, 28800);
                assert_eq!(assume.from_profile.as_deref(), Some("admin"));
                assert_eq!(assume.role_session_name, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn output_flags_parse() {
        let args = Args::try_parse_from([
            "aws-mfa-tool",
            "create",
            "-p",
            "dev",
            "-m",
            "arn:aws:iam::123:mfa/user",
            "-t",
            "123456",
            "-d",
            "3600",
            "-o",
            "work",
            "-s",
            "-j",
            "--debug",
        ])
        .unwrap();

        assert!(args.debug);
        let output = args.command.output();
        assert_eq!(output.save_output_profile.as_deref(), Some("work"));
        assert!(output.skip_save);
        assert!(output.display_json);
        match args.command {
            Command::Create(create) => {
                assert_eq!(create.duration, 3600);
                assert_eq!(create.mfa_serial.as_deref(), Some("arn:aws:iam::123:mfa/user"));
                assert_eq!(create.token_code.as_deref(), Some("123456"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn only_create_reads_profile_from_environment() {
        let command = Args::command();
        let profile_env = |name: &str| {
            command
                .find_subcommand(name)
                .and_then(|sub| sub.get_arguments().find(|arg| arg.get_id() == "profile"))
                .map(|arg| arg.get_env().map(|env| env.to_os_string()))
        };

        assert_eq!(profile_env("create"), Some(Some("AWS_PROFILE".into())));
        assert_eq!(profile_env("assume-role"), Some(None));
    }

    #[test]
    fn assume_role_profile_defaults_to_default() {
        let args = Args::try_parse_from(["aws-mfa-tool", "assume-role", "-a", "arn"]).unwrap();
        match args.command {
            Command::AssumeRole(assume) => assert_eq!(assume.profile, "default"),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
