use std::path::PathBuf;

use clap::{ArgAction, Parser};
use herald_delivery::DEFAULT_TELEGRAM_API_BASE;

fn parse_existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value.trim());
    if !path.is_dir() {
        return Err(format!("directory '{}' does not exist", path.display()));
    }
    Ok(path)
}

fn parse_chat_id(value: &str) -> Result<i64, String> {
    let parsed = value
        .trim()
        .parse::<i64>()
        .map_err(|error| format!("failed to parse chat id: {error}"))?;
    if parsed == 0 {
        return Err("chat id must not be 0".to_string());
    }
    Ok(parsed)
}

fn parse_non_empty(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Parser)]
#[command(
    name = "herald",
    about = "Relays Jira webhooks and Alertmanager alerts into a Telegram chat",
    version
)]
pub struct Cli {
    #[arg(
        short = 'H',
        long,
        env = "HERALD_HOST",
        default_value = "0.0.0.0",
        help = "Address the HTTP ingress listens on"
    )]
    pub host: String,

    #[arg(
        short = 'p',
        long,
        env = "HERALD_PORT",
        default_value_t = 8080,
        help = "Port the HTTP ingress listens on"
    )]
    pub port: u16,

    #[arg(
        long,
        env = "HERALD_CHAT_ID",
        allow_hyphen_values = true,
        value_parser = parse_chat_id,
        help = "Telegram chat that receives notifications"
    )]
    pub chat: i64,

    #[arg(
        long,
        env = "HERALD_TELEGRAM_TOKEN",
        hide_env_values = true,
        value_parser = parse_non_empty,
        help = "Telegram bot token"
    )]
    pub token: String,

    #[arg(
        long,
        env = "HERALD_POLL",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Poll Telegram for operator commands (/mute, /unmute, /alerts, /uid, /start)"
    )]
    pub poll: bool,

    #[arg(
        long = "alert-manager",
        env = "HERALD_ALERT_MANAGER",
        value_parser = parse_non_empty,
        help = "Alertmanager base URL used by the /alerts command"
    )]
    pub alert_manager: Option<String>,

    #[arg(
        long = "templates-path",
        env = "HERALD_TEMPLATES_PATH",
        default_value = "/opt/herald/templates",
        value_parser = parse_existing_dir,
        help = "Directory holding alert templates"
    )]
    pub templates_path: PathBuf,

    #[arg(
        long = "telegram-api-base",
        env = "HERALD_TELEGRAM_API_BASE",
        default_value = DEFAULT_TELEGRAM_API_BASE,
        value_parser = parse_non_empty,
        help = "Telegram Bot API base URL"
    )]
    pub telegram_api_base: String,
}
