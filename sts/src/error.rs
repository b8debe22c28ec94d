use thiserror::Error;

/// Inputs that could not be resolved from flags or the AWS config file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "Unable to find MFA for profile {0}.\n\
         Configure MFA ARN in ~/.aws/config or pass it with the --mfa-serial option."
    )]
    MfaSerialNotFound(String),

    #[error("Either -a/--role-arn or -f/--from-profile must be given.")]
    RoleArnMissing,

    #[error("Unable to find role_arn for profile {0} in ~/.aws/config.")]
    RoleArnNotFound(String),
}
