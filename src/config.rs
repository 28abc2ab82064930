use anyhow::Context;
use serde::{Deserialize, Serialize};
use serenity::model::prelude::ChannelId;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Configuration {
    pub authentication: Authentication,
    pub command: Command,
    pub posting: Posting,
    pub discord: Discord,
}
impl Default for Configuration {
    fn default() -> Self {
        Self {
            authentication: Authentication {
                discord_token: None,
                application_id: None,
            },
            command: Command {
                name: "image".into(),
                description: "Posts a random image.".into(),
            },
            posting: Posting::default(),
            discord: Discord::default(),
        }
    }
}
impl Configuration {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config = if let Ok(file) = std::fs::read_to_string(path) {
            toml::from_str(&file).context("failed to load config")?
        } else {
            Self::default()
        };
        config.save(path)?;

        Ok(config)
    }

    fn save(&self, path: &Path) -> anyhow::Result<()> {
        Ok(std::fs::write(path, toml::to_string_pretty(self)?)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Authentication {
    pub discord_token: Option<String>,
    pub application_id: Option<u64>,
}

/// The single slash command the bot registers at startup.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Command {
    pub name: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Posting {
    /// Directories scanned (non-recursively) for candidate images. Readability
    /// is checked at pick time, not at startup.
    pub image_dirs: Vec<PathBuf>,
    /// Channels the picked image is posted to, in order.
    pub channels: Vec<ChannelId>,
    /// Caption template; `%filename%` is replaced with the picked filename.
    /// Empty means the image is posted without caption text.
    pub content: String,
    /// Posting interval, e.g. "1h" or "24h". Posts align to multiples of this
    /// duration from the Unix epoch, not to process start.
    pub interval: String,
}
impl Default for Posting {
    fn default() -> Self {
        Self {
            image_dirs: vec![],
            channels: vec![],
            content: String::new(),
            interval: "1h".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Discord {
    /// Shown as the bot's activity ("Playing ...").
    pub activity: String,
}
impl Default for Discord {
    fn default() -> Self {
        Self {
            activity: String::new(),
        }
    }
}
