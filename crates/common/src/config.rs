use crate::{Error, Result};

/// Process-level configuration loaded from environment variables at startup.
///
/// Indicator periods and signal thresholds live in the TOML signal file
/// (see `strategy::SignalFileConfig`); this struct only carries secrets,
/// ports and paths.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    pub telegram_chat_id: i64,
    pub telegram_allowed_user_ids: Vec<i64>,

    // Health endpoint
    pub port: u16,

    // Signal config file path
    pub signal_config_path: String,
}

impl Config {
    /// Load configuration from the process environment.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_token = first_of(&lookup, &["TELEGRAM_TOKEN", "BOT_TOKEN"])
            .ok_or_else(|| missing("TELEGRAM_TOKEN (or BOT_TOKEN)"))?;

        let chat_id_raw = first_of(&lookup, &["TELEGRAM_CHAT_ID", "CHAT_ID"])
            .ok_or_else(|| missing("TELEGRAM_CHAT_ID (or CHAT_ID)"))?;
        let telegram_chat_id = parse_id("TELEGRAM_CHAT_ID", &chat_id_raw)?;

        let telegram_allowed_user_ids = match lookup("TELEGRAM_ALLOWED_USER_IDS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(|s| parse_id("TELEGRAM_ALLOWED_USER_IDS", s))
                .collect::<Result<Vec<_>>>()?,
            _ => vec![telegram_chat_id],
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{raw}'")))?,
            None => 3000,
        };

        Ok(Config {
            telegram_token,
            telegram_chat_id,
            telegram_allowed_user_ids,
            port,
            signal_config_path: lookup("SIGNAL_CONFIG_PATH")
                .unwrap_or_else(|| "config/signals.toml".to_string()),
        })
    }
}

fn first_of<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|k| lookup(*k))
        .find(|v| !v.trim().is_empty())
}

fn parse_id(key: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{key} contains non-numeric ID: '{}'", raw.trim())))
}

fn missing(key: &str) -> Error {
    Error::Config(format!(
        "Required environment variable {key} is not set. Check your .env file."
    ))
}
