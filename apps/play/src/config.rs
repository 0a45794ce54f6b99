use std::{fs, path::Path};

use serde::Deserialize;
use shared::domain::GameKind;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub game: GameKind,
    /// Wire name of the human's side; `None` keeps the game's default.
    pub human_side: Option<String>,
    pub two_player: bool,
    pub request_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            game: GameKind::Chess,
            human_side: None,
            two_player: false,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    game: Option<String>,
    human_side: Option<String>,
    two_player: Option<bool>,
    request_timeout_ms: Option<u64>,
}

pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.game {
        set_game(settings, &v);
    }
    if let Some(v) = file_cfg.human_side {
        settings.human_side = Some(v);
    }
    if let Some(v) = file_cfg.two_player {
        settings.two_player = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms {
        settings.request_timeout_ms = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("PLAY_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__GAME") {
        set_game(settings, &v);
    }

    if let Some(v) = var("APP__HUMAN_SIDE") {
        settings.human_side = Some(v);
    }

    if let Some(v) = var("APP__TWO_PLAYER") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => settings.two_player = true,
            "0" | "false" | "no" | "off" => settings.two_player = false,
            other => warn!(value = other, "ignoring APP__TWO_PLAYER"),
        }
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_ms = parsed;
        }
    }
}

fn set_game(settings: &mut Settings, raw: &str) {
    match raw.parse::<GameKind>() {
        Ok(game) => settings.game = game,
        Err(err) => warn!(error = %err, "keeping configured game"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
