pub mod model;
pub mod nickname;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub use model::AppConfig;

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crabirc")
        .join("config.toml")
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.ui.scroll_page, 15);
        assert_eq!(cfg.ui.indent, 23);
        assert_eq!(cfg.reconnect.max_retries, 10);
        assert_eq!(cfg.format.nick_width, 12);
        assert!(cfg.format.timestamp_format.is_none());
    }

    #[test]
    fn test_partial_sections_override() {
        let cfg = parse_config(
            r#"
            version = "test 1.0"

            [format]
            timestamp_format = "%H:%M"

            [server]
            host = "irc.example.net"
            port = 6697
            tls = true

            [reconnect]
            max_retries = -1
            "#,
        )
        .unwrap();
        assert_eq!(cfg.version, "test 1.0");
        assert_eq!(cfg.format.timestamp_format.as_deref(), Some("%H:%M"));
        assert_eq!(cfg.format.normal, "{nick}   {text}");
        assert_eq!(cfg.server.host, "irc.example.net");
        assert_eq!(cfg.server.port, 6697);
        assert!(cfg.server.tls);
        assert_eq!(cfg.reconnect.max_retries, -1);
        assert_eq!(cfg.reconnect.wait_secs, 5);
    }

    #[test]
    fn test_unknown_types_are_errors() {
        assert!(parse_config("[ui]\nindent = \"wide\"").is_err());
    }
}
