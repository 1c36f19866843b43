use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SamboError;

/// Top-level tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    /// Telegram user ids allowed to talk to the bot. Empty = allow all.
    #[serde(default)]
    pub allowed_users: Vec<i64>,
}

/// Remote spreadsheet store config.
///
/// When disabled or missing credentials, recording is switched off
/// gracefully: the bot still answers but tells the user tracking is
/// not configured.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SheetsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub spreadsheet_id: String,
    /// OAuth bearer token with spreadsheet scope.
    #[serde(default)]
    pub api_token: String,
}

impl SheetsConfig {
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.spreadsheet_id.is_empty() && !self.api_token.is_empty()
    }
}

/// Text-generation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub deepseek: Option<DeepSeekConfig>,
}

/// DeepSeek (OpenAI-compatible) chat completion config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_deepseek_base_url")]
    pub base_url: String,
    #[serde(default = "default_deepseek_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds; on expiry the deterministic template
    /// is used instead.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: default_deepseek_base_url(),
            model: default_deepseek_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Weekly report schedule and fan-out config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Channel that delivers reports.
    #[serde(default = "default_report_channel")]
    pub channel: String,
    /// Day of week to send, 0 = Monday .. 6 = Sunday.
    #[serde(default = "default_report_weekday")]
    pub weekday: u8,
    /// Hour of day (Moscow time) to send.
    #[serde(default = "default_report_hour")]
    pub hour: u32,
    /// How many earlier weeks to include for comparison.
    #[serde(default = "default_trailing_weeks")]
    pub trailing_weeks: u32,
    /// Pause between per-user deliveries, milliseconds.
    #[serde(default = "default_send_pause_ms")]
    pub send_pause_ms: u64,
    /// Upper bound on concurrent per-user report tasks.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel: default_report_channel(),
            weekday: default_report_weekday(),
            hour: default_report_hour(),
            trailing_weeks: default_trailing_weeks(),
            send_pause_ms: default_send_pause_ms(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

// --- Default value functions ---

fn default_name() -> String {
    "Sambo Habits Tracker".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_deepseek_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}
fn default_deepseek_model() -> String {
    "deepseek-chat".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    600
}
fn default_provider_timeout_secs() -> u64 {
    30
}
fn default_report_channel() -> String {
    "telegram".to_string()
}
fn default_report_weekday() -> u8 {
    6
}
fn default_report_hour() -> u32 {
    21
}
fn default_trailing_weeks() -> u32 {
    3
}
fn default_send_pause_ms() -> u64 {
    250
}
fn default_max_concurrent() -> usize {
    4
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, SamboError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| SamboError::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| SamboError::Config(format!("failed to parse config: {e}")))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.bot.log_level, "info");
        assert!(cfg.channel.telegram.is_none());
        assert!(!cfg.sheets.is_configured());
        assert!(cfg.report.enabled);
        assert_eq!(cfg.report.weekday, 6);
        assert_eq!(cfg.report.hour, 21);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [bot]
            name = "Test Bot"

            [channel.telegram]
            enabled = true
            bot_token = "123:abc"
            allowed_users = [42]

            [sheets]
            enabled = true
            spreadsheet_id = "sheet-1"
            api_token = "ya29.token"

            [provider.deepseek]
            enabled = true
            api_key = "sk-test"

            [report]
            weekday = 0
            hour = 8
            trailing_weeks = 2
        "#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.bot.name, "Test Bot");
        let tg = cfg.channel.telegram.unwrap();
        assert!(tg.enabled);
        assert_eq!(tg.allowed_users, vec![42]);
        assert!(cfg.sheets.is_configured());
        let ds = cfg.provider.deepseek.unwrap();
        assert!(ds.enabled);
        assert_eq!(ds.model, "deepseek-chat");
        assert_eq!(ds.timeout_secs, 30);
        assert_eq!(cfg.report.weekday, 0);
        assert_eq!(cfg.report.hour, 8);
        assert_eq!(cfg.report.trailing_weeks, 2);
    }

    #[test]
    fn test_sheets_requires_all_values() {
        let cfg: SheetsConfig = toml::from_str(r#"enabled = true"#).unwrap();
        assert!(!cfg.is_configured());

        let cfg: SheetsConfig = toml::from_str(
            r#"
                enabled = true
                spreadsheet_id = "s"
                api_token = "t"
            "#,
        )
        .unwrap();
        assert!(cfg.is_configured());
    }
}
