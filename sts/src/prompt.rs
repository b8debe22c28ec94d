use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;

/// Source of the MFA one-time code when none was passed on the command line.
pub trait SecretPrompt {
    fn token_code(&self) -> Result<String>;
}

/// Asks on the terminal without echoing the input.
#[derive(Debug, Default)]
pub struct PasswordPrompt;

impl SecretPrompt for PasswordPrompt {
    fn token_code(&self) -> Result<String> {
        let code = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Input MFA code")
            .interact()?;

        Ok(code.trim().to_owned())
    }
}
