//! Subcommand implementations

pub mod config;
pub mod doctor;
pub mod preview;
pub mod run;

use anyhow::{Context, Result, bail};
use secrecy::SecretString;

/// Read a secret from the named environment variable
pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No API key env var configured for provider {}", provider);
    }

    let key = std::env::var(env_var).with_context(|| {
        format!(
            "Missing API key env var {} for provider {}",
            env_var, provider
        )
    })?;

    if key.trim().is_empty() {
        bail!(
            "API key env var {} is empty for provider {}",
            env_var,
            provider
        );
    }

    Ok(SecretString::new(key.into()))
}

/// Value of an env var when set and non-blank
pub(crate) fn env_value(env_var: &str) -> Option<String> {
    if env_var.trim().is_empty() {
        return None;
    }
    std::env::var(env_var)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
