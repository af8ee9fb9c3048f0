//! Settings for the catalog viewer: defaults, optional `viewer.toml`, env.

use std::{collections::HashMap, fs};

pub const DEFAULT_API_BASE_URL: &str = "https://api.pokemontcg.io/v2";

const SETTINGS_FILE: &str = "viewer.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    /// Static API key sent as a request header. Absent keys degrade to the
    /// provider's unauthenticated rate limits, which is not this system's
    /// concern.
    pub api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            api_key: None,
        }
    }
}

/// Layered settings load: built-in defaults, then `viewer.toml` from the
/// working directory, then environment variables. Later sources win.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_settings(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("CARD_VIEWER_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("CARD_VIEWER_API_KEY") {
        if !v.trim().is_empty() {
            settings.api_key = Some(v);
        }
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("api_base_url") {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("api_key") {
            if !v.trim().is_empty() {
                settings.api_key = Some(v.clone());
            }
        }
    }
}
