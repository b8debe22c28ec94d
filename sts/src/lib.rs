pub mod assume_role;
pub mod client;
pub mod error;
pub mod prompt;
pub mod resolve;
pub mod session_name;
pub mod session_token;

pub use client::{AssumedRoleUser, SdkStsClient, StsApi, StsResponse};
pub use error::ResolveError;
