//! Active session: access token, signed-in user, and subscription plan.
//!
//! The token is resolved from `POSTSMITH_ACCESS_TOKEN` or from a dedicated
//! file in the config directory with restrictive permissions (0o600 on Unix).

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::core::paths;

/// Credentials and identity for the current run.
///
/// `user_id` is absent for anonymous sessions: generation still works, but
/// durable history persistence does not (the local cache is used instead).
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user_id: Option<String>,
    pub plan: String,
}

/// Errors when loading or storing the access token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Failed to store access token: {0}")]
    Io(#[from] io::Error),
}

/// Resolve the session from the environment and the stored token file.
/// Returns `None` when no access token can be found anywhere.
pub fn resolve() -> Option<Session> {
    let access_token = env::var("POSTSMITH_ACCESS_TOKEN")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .or_else(load_token)?;

    let user_id = env::var("POSTSMITH_USER_ID")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string());

    let plan = env::var("POSTSMITH_PLAN")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "free".to_string());

    Some(Session {
        access_token,
        user_id,
        plan,
    })
}

/// Path to the token file in the config directory.
pub fn credentials_path() -> Option<PathBuf> {
    paths::config_dir().map(|d| d.join("access-token"))
}

/// Load the access token from the config directory.
/// Returns `None` if the file is absent, empty, or unreadable.
pub fn load_token() -> Option<String> {
    let path = credentials_path()?;
    read_token_file(&path)
}

fn read_token_file(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let token = content.trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}

/// Store the access token in the config directory.
/// Creates the config dir if needed. On Unix, sets file permissions to 0o600.
pub fn store_token(token: &str) -> Result<(), SessionError> {
    let path = credentials_path().ok_or(SessionError::NoConfigDir)?;
    write_token_file(&path, token)
}

fn write_token_file(path: &Path, token: &str) -> Result<(), SessionError> {
    let dir = path.parent().ok_or_else(|| {
        SessionError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Invalid credentials path",
        ))
    })?;
    fs::create_dir_all(dir)?;

    let mut file = fs::File::create(path)?;
    let trimmed = token.trim();
    file.write_all(trimmed.as_bytes())?;
    file.write_all(b"\n")?;

    #[cfg(unix)]
    {
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}
