//! omrtrack configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::CapturePolicy;
use crate::timer::DEFAULT_STUDY_MINUTES;

/// Top-level omrtrack configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmrtrackConfig {
    /// JSON file holding test history, mistakes, and the profile.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    /// Reject marks other than A-D at capture time.
    #[serde(default)]
    pub strict_options: bool,
    /// Default study timer length in minutes.
    #[serde(default = "default_study_minutes")]
    pub study_minutes: u32,
    /// Output directory for exported reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_history_path() -> PathBuf {
    PathBuf::from("./omrtrack-history.json")
}
fn default_study_minutes() -> u32 {
    DEFAULT_STUDY_MINUTES
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./omrtrack-reports")
}

impl Default for OmrtrackConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            strict_options: false,
            study_minutes: default_study_minutes(),
            output_dir: default_output_dir(),
        }
    }
}

impl OmrtrackConfig {
    pub fn capture_policy(&self) -> CapturePolicy {
        CapturePolicy::from_strict(self.strict_options)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never re-scanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without an explicit path:
/// 1. `omrtrack.toml` in the current directory
/// 2. `~/.config/omrtrack/config.toml`
///
/// `OMRTRACK_HISTORY` overrides the history path.
pub fn load_config_from(path: Option<&Path>) -> Result<OmrtrackConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("omrtrack.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let parsed = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            parsed
        }
        None => OmrtrackConfig::default(),
    };

    if let Ok(history) = std::env::var("OMRTRACK_HISTORY") {
        if !history.trim().is_empty() {
            config.history_path = PathBuf::from(history);
        }
    }

    config.history_path = resolve_path(&config.history_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

/// Parse a config file body.
pub fn parse_config_str(content: &str) -> Result<OmrtrackConfig> {
    Ok(toml::from_str::<OmrtrackConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("omrtrack"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_OMRTRACK_TEST_VAR", "data");
        assert_eq!(resolve_env_vars("${_OMRTRACK_TEST_VAR}"), "data");
        assert_eq!(
            resolve_env_vars("/home/${_OMRTRACK_TEST_VAR}/history.json"),
            "/home/data/history.json"
        );
        std::env::remove_var("_OMRTRACK_TEST_VAR");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        std::env::set_var("_OMRTRACK_SELF_REF", "${_OMRTRACK_SELF_REF}");
        assert_eq!(
            resolve_env_vars("/data/${_OMRTRACK_SELF_REF}/x"),
            "/data/${_OMRTRACK_SELF_REF}/x"
        );
        std::env::remove_var("_OMRTRACK_SELF_REF");
    }

    #[test]
    fn unset_variable_resolves_empty() {
        assert_eq!(resolve_env_vars("a${_OMRTRACK_UNSET_VAR}b"), "ab");
    }

    #[test]
    fn unterminated_reference_left_alone() {
        assert_eq!(resolve_env_vars("${OOPS"), "${OOPS");
    }

    #[test]
    fn default_config() {
        let config = OmrtrackConfig::default();
        assert_eq!(config.study_minutes, 25);
        assert!(!config.strict_options);
        assert_eq!(config.capture_policy(), CapturePolicy::Permissive);
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config_str(
            r#"
history_path = "/tmp/history.json"
strict_options = true
"#,
        )
        .unwrap();
        assert_eq!(config.history_path, PathBuf::from("/tmp/history.json"));
        assert_eq!(config.capture_policy(), CapturePolicy::Strict);
        assert_eq!(config.study_minutes, 25);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("omrtrack.toml");
        std::fs::write(&path, "study_minutes = 50\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.study_minutes, 50);
    }
}
