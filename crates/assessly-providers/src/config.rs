//! Configuration loading and provider factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use assessly_core::session::SessionConfig;
use assessly_core::time::DEFAULT_DURATION_SECS;
use assessly_core::traits::QuestionBankProvider;

use crate::directory::DirectoryProvider;
use crate::sample::BuiltinProvider;

/// Where question banks come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BankSource {
    /// The compiled-in sample bank.
    #[default]
    Builtin,
    /// TOML bank files under a directory.
    Directory { path: PathBuf },
}

/// Top-level assessly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssesslyConfig {
    /// Countdown length for each attempt, in seconds.
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
    #[serde(default)]
    pub bank_source: BankSource,
    /// Where reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub default_subject: Option<String>,
    #[serde(default)]
    pub default_difficulty: Option<String>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./assessly-results")
}

impl Default for AssesslyConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
            bank_source: BankSource::default(),
            output_dir: default_output_dir(),
            default_subject: None,
            default_difficulty: None,
        }
    }
}

impl AssesslyConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            duration_secs: self.duration_secs,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
        // substituted text is not expanded again
        from = start + value.len();
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `assessly.toml` in the current directory
/// 2. `~/.config/assessly/config.toml`
///
/// Environment variable overrides: `ASSESSLY_DURATION_SECS`, `ASSESSLY_BANK_DIR`.
pub fn load_config() -> Result<AssesslyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AssesslyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("assessly.toml");
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
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AssesslyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AssesslyConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    config.output_dir = resolve_path(&config.output_dir);
    if let BankSource::Directory { path } = &mut config.bank_source {
        *path = resolve_path(path);
    }

    Ok(config)
}

fn apply_env_overrides(config: &mut AssesslyConfig) -> Result<()> {
    if let Ok(secs) = std::env::var("ASSESSLY_DURATION_SECS") {
        config.duration_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("ASSESSLY_DURATION_SECS is not a number: {secs:?}"))?;
    }
    if let Ok(dir) = std::env::var("ASSESSLY_BANK_DIR") {
        if !dir.is_empty() {
            config.bank_source = BankSource::Directory {
                path: PathBuf::from(dir),
            };
        }
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("assessly"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(source: &BankSource) -> Result<Arc<dyn QuestionBankProvider>> {
    match source {
        BankSource::Builtin => Ok(Arc::new(BuiltinProvider)),
        BankSource::Directory { path } => {
            let provider = DirectoryProvider::open(path)
                .with_context(|| format!("failed to open bank directory {}", path.display()))?;
            if provider.is_empty() {
                tracing::warn!("no banks found under {}", path.display());
            }
            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ASSESSLY_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_ASSESSLY_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_ASSESSLY_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("unterminated ${"), "unterminated ${");
        std::env::remove_var("_ASSESSLY_TEST_VAR");
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        std::env::set_var("_ASSESSLY_TEST_SELF", "${_ASSESSLY_TEST_SELF}");
        std::env::set_var("_ASSESSLY_TEST_OTHER", "x");
        assert_eq!(
            resolve_env_vars("${_ASSESSLY_TEST_SELF}/${_ASSESSLY_TEST_OTHER}"),
            "${_ASSESSLY_TEST_SELF}/x"
        );
        std::env::remove_var("_ASSESSLY_TEST_SELF");
        std::env::remove_var("_ASSESSLY_TEST_OTHER");
    }

    #[test]
    fn default_config() {
        let config = AssesslyConfig::default();
        assert_eq!(config.duration_secs, 600);
        assert_eq!(config.bank_source, BankSource::Builtin);
        assert_eq!(config.output_dir, PathBuf::from("./assessly-results"));
        assert_eq!(config.session_config().duration_secs, 600);
    }

    #[test]
    fn parse_directory_source() {
        let toml_str = r#"
duration_secs = 300
default_subject = "physics"

[bank_source]
type = "directory"
path = "banks"
"#;
        let config: AssesslyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.duration_secs, 300);
        assert_eq!(config.default_subject.as_deref(), Some("physics"));
        assert_eq!(
            config.bank_source,
            BankSource::Directory {
                path: PathBuf::from("banks")
            }
        );
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("definitely/missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_expands_paths() {
        std::env::set_var("_ASSESSLY_TEST_ROOT", "/srv/assessly");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assessly.toml");
        std::fs::write(
            &path,
            r#"
output_dir = "${_ASSESSLY_TEST_ROOT}/results"

[bank_source]
type = "directory"
path = "${_ASSESSLY_TEST_ROOT}/banks"
"#,
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/assessly/results"));
        assert_eq!(
            config.bank_source,
            BankSource::Directory {
                path: PathBuf::from("/srv/assessly/banks")
            }
        );
        std::env::remove_var("_ASSESSLY_TEST_ROOT");
    }

    #[test]
    fn create_builtin_provider() {
        let provider = create_provider(&BankSource::Builtin).unwrap();
        assert_eq!(provider.name(), "builtin");
    }

    #[test]
    fn create_directory_provider_requires_directory() {
        let source = BankSource::Directory {
            path: PathBuf::from("no/such/banks"),
        };
        assert!(create_provider(&source).is_err());
    }
}
