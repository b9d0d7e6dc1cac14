//! Configuration loading from and saving to disk.
//!
//! # Design Decisions
//! - A missing or empty file is an empty configuration, not an error
//! - Malformed content is an error; callers keep their previous rules
//! - JSON by default, TOML when the path ends in `.toml`

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::schema::RoutingConfig;
use crate::routing::RuleSet;

/// Environment variable overriding the default config location.
pub const CONFIG_PATH_ENV: &str = "LINK_ROUTER_CONFIG";

/// Error type for configuration loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid {format} in {origin}: {source}")]
    Parse {
        origin: String,
        format: ConfigFormat,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("cannot determine home directory; set LINK_ROUTER_CONFIG")]
    NoHomeDir,
}

/// On-disk encoding of the rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Json => f.write_str("JSON"),
            ConfigFormat::Toml => f.write_str("TOML"),
        }
    }
}

/// `$LINK_ROUTER_CONFIG`, else `~/.link-router/config.json`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    home_dir()
        .map(|home| home.join(".link-router").join("config.json"))
        .ok_or(ConfigError::NoHomeDir)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

/// Parse rule file text. Blank text is an empty configuration.
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<RoutingConfig, ConfigError> {
    parse_with_origin(text, format, "<inline>")
}

fn parse_with_origin(
    text: &str,
    format: ConfigFormat,
    origin: &str,
) -> Result<RoutingConfig, ConfigError> {
    if text.trim().is_empty() {
        return Ok(RoutingConfig::default());
    }

    let parsed: Result<RoutingConfig, Box<dyn std::error::Error + Send + Sync>> = match format {
        ConfigFormat::Json => serde_json::from_str(text).map_err(Into::into),
        ConfigFormat::Toml => toml::from_str(text).map_err(Into::into),
    };

    parsed.map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        format,
        source,
    })
}

/// Parse raw persisted text straight into a rule set.
///
/// Fails only when the text itself is malformed. Invalid regex sources are
/// accepted and left to never match.
pub fn build_rule_set(raw: &str, format: ConfigFormat) -> Result<RuleSet, ConfigError> {
    let config = parse_config(raw, format)?;
    Ok(RuleSet::from_config(&config))
}

/// Load configuration from `path`.
///
/// A missing file yields an empty configuration.
pub fn load_config(path: &Path) -> Result<RoutingConfig, ConfigError> {
    match read_config_text(path)? {
        Some(content) => parse_file(path, &content),
        None => {
            tracing::debug!(path = %path.display(), "Config file not found, using empty config");
            Ok(RoutingConfig::default())
        }
    }
}

/// Load configuration from `path` only if it currently has content.
///
/// Returns `None` for a missing or blank file. A save that truncates before
/// writing leaves the file blank for a moment; watchers use this so that
/// state is never mistaken for an empty rule file.
pub fn load_settled_config(path: &Path) -> Result<Option<RoutingConfig>, ConfigError> {
    match read_config_text(path)? {
        Some(content) if !content.trim().is_empty() => parse_file(path, &content).map(Some),
        _ => {
            tracing::debug!(path = %path.display(), "Config file missing or blank, skipping");
            Ok(None)
        }
    }
}

fn read_config_text(path: &Path) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_file(path: &Path, content: &str) -> Result<RoutingConfig, ConfigError> {
    let config = parse_with_origin(content, ConfigFormat::from_path(path), &path.display().to_string())?;
    tracing::debug!(path = %path.display(), rules = config.rules.len(), "Config loaded");
    Ok(config)
}

/// Write `config` to `path`, creating parent directories as needed.
pub fn save_config(path: &Path, config: &RoutingConfig) -> Result<(), ConfigError> {
    let text = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => {
            serde_json::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?
        }
        ConfigFormat::Toml => {
            toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?
        }
    };

    create_parent_dir(path)?;
    fs::write(path, text).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), rules = config.rules.len(), "Config saved");
    Ok(())
}

/// Create an empty rule file at `path` unless one already exists.
///
/// Returns `true` when a file was created.
pub fn ensure_config_file(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    save_config(path, &RoutingConfig::default())?;
    Ok(true)
}

/// Persist a new default handler without losing existing rules.
///
/// The file is re-read first; if it cannot be loaded nothing is written.
pub fn set_default_handler(path: &Path, handler: &str) -> Result<RoutingConfig, ConfigError> {
    let mut config = load_config(path)?;
    config.default_handler_target = handler.to_string();
    save_config(path, &config)?;
    Ok(config)
}

fn create_parent_dir(path: &Path) -> Result<(), ConfigError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RuleConfig;
    use tempfile::TempDir;

    fn sample() -> RoutingConfig {
        RoutingConfig {
            default_handler_target: "/Applications/Safari.app".into(),
            rules: vec![RuleConfig::new(
                &["github.com"],
                &[r"^https://.*\.internal\..*"],
                "/Applications/Chrome.app",
            )],
        }
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, RoutingConfig::default());
    }

    #[test]
    fn test_empty_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "  \n").unwrap();

        assert_eq!(load_config(&path).unwrap(), RoutingConfig::default());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ \"rules\": [").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: ConfigFormat::Json, .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_parse_error_keeps_parser_source() {
        use std::error::Error;

        let err = parse_config("{ \"rules\": 3 }", ConfigFormat::Json).unwrap_err();
        let source = err.source().expect("parser error should be chained");
        assert!(source.downcast_ref::<serde_json::Error>().is_some());

        let err = parse_config("rules = [", ConfigFormat::Toml).unwrap_err();
        assert!(err.source().unwrap().downcast_ref::<toml::de::Error>().is_some());
    }

    #[test]
    fn test_settled_load_skips_missing_and_blank_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        assert!(load_settled_config(&path).unwrap().is_none());

        fs::write(&path, "").unwrap();
        assert!(load_settled_config(&path).unwrap().is_none());
        fs::write(&path, " \n\t").unwrap();
        assert!(load_settled_config(&path).unwrap().is_none());

        fs::write(&path, serde_json::to_string(&sample()).unwrap()).unwrap();
        assert_eq!(load_settled_config(&path).unwrap(), Some(sample()));

        fs::write(&path, "{").unwrap();
        assert!(load_settled_config(&path).is_err());
    }

    #[test]
    fn test_save_then_load_json_and_toml() {
        let dir = TempDir::new().unwrap();
        for name in ["nested/config.json", "config.toml"] {
            let path = dir.path().join(name);
            save_config(&path, &sample()).unwrap();
            assert_eq!(load_config(&path).unwrap(), sample(), "{name}");
        }
    }

    #[test]
    fn test_saved_json_uses_canonical_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        save_config(&path, &sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"defaultHandlerTarget\""));
        assert!(text.contains("\"regexPatterns\""));
        assert!(!text.contains("browserURL"));
    }

    #[test]
    fn test_ensure_config_file_creates_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".link-router").join("config.json");

        assert!(ensure_config_file(&path).unwrap());
        fs::write(&path, serde_json::to_string(&sample()).unwrap()).unwrap();
        assert!(!ensure_config_file(&path).unwrap());
        assert_eq!(load_config(&path).unwrap(), sample());
    }

    #[test]
    fn test_set_default_handler_keeps_rules() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        save_config(&path, &sample()).unwrap();

        set_default_handler(&path, "/Applications/Firefox.app").unwrap();

        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.default_handler_target, "/Applications/Firefox.app");
        assert_eq!(reloaded.rules, sample().rules);
    }

    #[test]
    fn test_set_default_handler_refuses_to_overwrite_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(set_default_handler(&path, "X").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn test_build_rule_set_accepts_invalid_regex() {
        let raw = r#"{"rules": [{"regexPatterns": ["[invalid"], "handlerTarget": "X"}], "defaultHandlerTarget": "S"}"#;
        let set = build_rule_set(raw, ConfigFormat::Json).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.rules()[0].regexes(), &["[invalid".to_string()]);
        assert!(build_rule_set("{", ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/config.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a/config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }
}
