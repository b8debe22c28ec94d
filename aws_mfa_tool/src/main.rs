use crate::json::JsonResponse;
use anyhow::Result;
use clap::Parser;
use file_manager::aws_config::AwsConfig;
use file_manager::aws_credentials::{
    output_profile_name, persist, AwsCli, AwsCredentials, CredentialSink, CredentialsFile,
    PersistOutcome,
};
use shared::args::{Args, Command, OutputArgs};
use sts::assume_role::{self, AssumeRoleInput};
use sts::prompt::PasswordPrompt;
use sts::session_token::{self, SessionTokenInput};
use sts::SdkStsClient;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod json;

/// Required due to using the stderr writer vs no writer specified
/// SubscriberBuilder<fn() -> Stderr> vs SubscriberBuilder
#[macro_export]
macro_rules! init_tracing {
    ($builder:expr, $debug:expr) => {
        let logging = $builder;
        let filter = if $debug {
            "debug,hyper=info,aws_smithy_runtime=info"
        } else {
            "info,aws_config=warn"
        };

        logging
            .with_target($debug)
            .with_line_number($debug)
            .with_env_filter(EnvFilter::new(filter))
            .init();
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let output = args.command.output();

    if output.display_json {
        let logging = tracing_subscriber::fmt().with_writer(std::io::stderr);
        init_tracing!(logging, args.debug);
    } else {
        let logging = tracing_subscriber::fmt();
        init_tracing!(logging, args.debug);
    }

    let config = AwsConfig::read_file(args.config_file.clone())?;

    let (profile_name, response) = match &args.command {
        Command::Create(create) => {
            let client = SdkStsClient::new(&create.profile, create.region.clone());
            let input = SessionTokenInput {
                profile_name: create.profile.clone(),
                mfa_serial: create.mfa_serial.clone(),
                token_code: create.token_code.clone(),
                duration_seconds: Some(create.duration),
            };

            let response = session_token::execute(&client, &config, &PasswordPrompt, input).await?;
            (&create.profile, response)
        }
        Command::AssumeRole(assume) => {
            let client = SdkStsClient::new(&assume.profile, assume.region.clone());
            let input = AssumeRoleInput {
                profile_name: assume.profile.clone(),
                role_arn: assume.role_arn.clone(),
                from_profile: assume.from_profile.clone(),
                role_session_name: assume.role_session_name.clone(),
                mfa_serial: assume.mfa_serial.clone(),
                token_code: assume.token_code.clone(),
                duration_seconds: Some(assume.duration),
            };

            let mut rng = rand::thread_rng();
            let response =
                assume_role::execute(&client, &config, &PasswordPrompt, &mut rng, input).await?;
            (&assume.profile, response)
        }
    };

    let _ = save(output, profile_name, &response.credentials, || open_sink(&args))?;

    if output.display_json {
        let json = serde_json::to_string_pretty(&JsonResponse::convert(&response))?;
        println!("{}", json);
    }

    Ok(())
}

fn open_sink(args: &Args) -> Result<Box<dyn CredentialSink>> {
    if args.aws_cli {
        Ok(Box::new(AwsCli))
    } else {
        Ok(Box::new(CredentialsFile::new(args.credentials_file.clone())?))
    }
}

/// Persists `credentials` unless `--skip-save` was given. The sink is only
/// opened when something is written.
fn save<F>(
    output: &OutputArgs,
    profile_name: &str,
    credentials: &AwsCredentials,
    open_sink: F,
) -> Result<Option<PersistOutcome>>
where
    F: FnOnce() -> Result<Box<dyn CredentialSink>>,
{
    if output.skip_save {
        return Ok(None);
    }

    let output_profile = output_profile_name(profile_name, output.save_output_profile.as_deref());
    let mut sink = open_sink()?;
    let outcome = persist(sink.as_mut(), &output_profile, credentials);

    if !outcome.failed_keys.is_empty() {
        warn!(
            "Profile {} may be partially updated, failed keys: {}",
            outcome.profile_name,
            outcome.failed_keys.join(", ")
        );
    }

    Ok(Some(outcome))
}
