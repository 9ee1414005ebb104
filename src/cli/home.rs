//! Home directory resolution
//!
//! Priority:
//! 1. --home <path> flag (must exist)
//! 2. $SQLPILOT_HOME
//! 3. Current directory "."

use crate::cli::{Error, Result};
use std::path::PathBuf;

/// Environment variable naming the home directory
pub const HOME_ENV_VAR: &str = "SQLPILOT_HOME";

/// Resolve the home directory from the flag and the environment
pub fn resolve_home(explicit: Option<String>) -> Result<PathBuf> {
    resolve_home_with(explicit, std::env::var(HOME_ENV_VAR).ok())
}

/// Resolution with the environment value passed in
pub fn resolve_home_with(explicit: Option<String>, env_home: Option<String>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let path_buf = PathBuf::from(&path);
        if !path_buf.is_dir() {
            return Err(Error::InvalidArgs(format!(
                "home '{}' does not exist",
                path
            )));
        }
        return Ok(path_buf);
    }

    // $SQLPILOT_HOME may not exist yet; files under it are created on demand
    if let Some(home) = env_home.filter(|h| !h.trim().is_empty()) {
        return Ok(PathBuf::from(home));
    }

    Ok(PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_flag_wins() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().display().to_string();
        let resolved =
            resolve_home_with(Some(explicit.clone()), Some("/ignored".to_string())).unwrap();
        assert_eq!(resolved, PathBuf::from(explicit));
    }

    #[test]
    fn test_explicit_flag_must_exist() {
        let result = resolve_home_with(Some("/definitely/not/here".to_string()), None);
        assert!(matches!(result, Err(Error::InvalidArgs(_))));
    }

    #[test]
    fn test_env_used_when_no_flag() {
        let resolved = resolve_home_with(None, Some("/srv/sqlpilot".to_string())).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/sqlpilot"));
    }

    #[test]
    fn test_blank_env_falls_back_to_cwd() {
        assert_eq!(
            resolve_home_with(None, Some("  ".to_string())).unwrap(),
            PathBuf::from(".")
        );
        assert_eq!(resolve_home_with(None, None).unwrap(), PathBuf::from("."));
    }
}
