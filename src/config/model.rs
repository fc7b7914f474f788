//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a default so the client runs without a config file.

use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Reply to CTCP VERSION.
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            format: FormatConfig::default(),
            ui: UiConfig::default(),
            server: ServerConfig::default(),
            reconnect: ReconnectConfig::default(),
            version: default_version(),
        }
    }
}

/// Display templates for chat lines. `{nick}` is padded to `nick_width`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_normal")]
    pub normal: String,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default = "default_highlight")]
    pub highlight: String,
    #[serde(default = "default_nick_width")]
    pub nick_width: usize,
    /// chrono format prepended to every stored line; none by default.
    #[serde(default)]
    pub timestamp_format: Option<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            normal: default_normal(),
            action: default_action(),
            highlight: default_highlight(),
            nick_width: default_nick_width(),
            timestamp_format: None,
        }
    }
}

impl FormatConfig {
    pub fn normal(&self, nick: &str, text: &str) -> String {
        fill(&self.normal, nick, self.nick_width, text)
    }

    pub fn action(&self, nick: &str, text: &str) -> String {
        fill(&self.action, nick, self.nick_width, text)
    }

    pub fn highlight(&self, nick: &str, text: &str) -> String {
        fill(&self.highlight, nick, self.nick_width, text)
    }
}

/// Substitute `{nick}` and `{text}` in one pass, so placeholders inside the
/// message itself are left alone.
fn fill(template: &str, nick: &str, width: usize, text: &str) -> String {
    let mut out = String::with_capacity(template.len() + width + text.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{nick}") {
            out.push_str(&format!("{:<width$}", nick, width = width));
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{text}") {
            out.push_str(text);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Message pane behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Lines moved by PageUp/PageDown.
    #[serde(default = "default_scroll_page")]
    pub scroll_page: usize,
    /// Columns of padding on wrapped continuation rows.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            scroll_page: default_scroll_page(),
            indent: default_indent(),
        }
    }
}

/// Server used when none is given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: false,
        }
    }
}

/// Reconnect policy after the link drops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Attempts before giving up; -1 retries forever.
    #[serde(default = "default_max_retries")]
    pub max_retries: i64,
    /// Longest readiness wait, which paces reconnect attempts.
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            wait_secs: default_wait_secs(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_normal() -> String {
    "{nick}   {text}".to_string()
}
fn default_action() -> String {
    "* {nick} {text}".to_string()
}
fn default_highlight() -> String {
    "{nick}]  {text}".to_string()
}
fn default_nick_width() -> usize {
    12
}
fn default_scroll_page() -> usize {
    15
}
fn default_indent() -> usize {
    23
}
fn default_host() -> String {
    "irc.libera.chat".to_string()
}
fn default_port() -> u16 {
    6667
}
fn default_max_retries() -> i64 {
    10
}
fn default_wait_secs() -> u64 {
    5
}
fn default_connect_timeout() -> u64 {
    30
}
fn default_version() -> String {
    concat!("crabirc ", env!("CARGO_PKG_VERSION")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_pad_nick() {
        let f = FormatConfig::default();
        assert_eq!(f.normal("alice", "hi"), "alice          hi");
        assert_eq!(f.action("bob", "waves"), "* bob          waves");
        assert_eq!(f.highlight("carol", "crab?"), "carol       ]  crab?");
    }

    #[test]
    fn test_placeholders_in_text_are_literal() {
        let f = FormatConfig::default();
        assert_eq!(f.normal("a", "{nick} {x"), format!("{:<12}   {{nick}} {{x", "a"));
    }

    #[test]
    fn test_long_nick_is_not_truncated() {
        let f = FormatConfig::default();
        assert!(f.normal("averyveryverylongnick", "x").starts_with("averyveryverylongnick   x"));
    }
}
