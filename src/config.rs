//! Settings read from the environment (and `.env`) at startup.

use humantime_serde::re::humantime;
use serenity::model::id::GuildId;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::commands::music::utils::music_manager::SessionSettings;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// Register commands in this guild only, instead of globally
    pub guild_id: Option<GuildId>,
    pub session: SessionSettings,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("session", &self.session)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = SessionSettings::default();

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let guild_id = get("GUILD_ID")
            .map(|raw| match raw.parse::<u64>() {
                Ok(id) if id != 0 => Ok(GuildId::new(id)),
                _ => Err(ConfigError::Invalid {
                    key: "GUILD_ID",
                    reason: format!("'{}' is not a guild id", raw),
                }),
            })
            .transpose()?;

        let session = SessionSettings {
            idle_timeout: duration(&get, "IDLE_TIMEOUT", defaults.idle_timeout)?,
            command_timeout: duration(&get, "COMMAND_TIMEOUT", defaults.command_timeout)?,
            self_mute: flag(&get, "SELF_MUTE", defaults.self_mute)?,
            self_deaf: flag(&get, "SELF_DEAF", defaults.self_deaf)?,
            ..defaults
        };

        Ok(Self {
            discord_token,
            guild_id,
            session,
        })
    }
}

fn duration(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    let parsed = humantime::parse_duration(&raw).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;
    if parsed.is_zero() {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be longer than zero".to_string(),
        });
    }
    Ok(parsed)
}

fn flag(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("'{}' is not a boolean", raw),
        }),
    }
}
