use std::path::PathBuf;
use std::{env, fs, io};
use iced::Theme;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.json";
pub const CONFIG_ENV: &str = "TUTOR_PROFILE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] io::Error),
    #[error("config json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme_name: String,
    pub api_base_url: String,
    pub provinces_base_url: String,
    pub token_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme_name: "Light".to_string(),
            api_base_url: "http://localhost:8081/educonnect".to_string(),
            provinces_base_url: "https://provinces.open-api.vn/api".to_string(),
            token_file: PathBuf::from("token"),
        }
    }
}

impl Config {
    pub fn theme(&self) -> Theme {
        theme_from_str(&self.theme_name).unwrap_or(Theme::Light)
    }
}

pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// A missing file yields the defaults; a broken one is an error.
pub fn load_config() -> Result<Config, ConfigError> {
    let contents = match fs::read_to_string(config_path()) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&contents)?)
}

pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(config_path(), json)?;
    Ok(())
}

pub fn theme_from_str(name: &str) -> Option<Theme> {
    Theme::ALL
        .iter()
        .find(|t| theme_to_str(t).eq_ignore_ascii_case(name))
        .cloned()
}

pub fn theme_to_str(theme: &Theme) -> &'static str {
    match theme {
        Theme::Light => "Light",
        Theme::Dark => "Dark",
        Theme::Dracula => "Dracula",
        Theme::Nord => "Nord",
        Theme::SolarizedLight => "SolarizedLight",
        Theme::SolarizedDark => "SolarizedDark",
        Theme::GruvboxLight => "GruvboxLight",
        Theme::GruvboxDark => "GruvboxDark",
        Theme::CatppuccinLatte => "CatppuccinLatte",
        Theme::CatppuccinFrappe => "CatppuccinFrappe",
        Theme::CatppuccinMacchiato => "CatppuccinMacchiato",
        Theme::CatppuccinMocha => "CatppuccinMocha",
        Theme::TokyoNight => "TokyoNight",
        Theme::TokyoNightStorm => "TokyoNightStorm",
        Theme::TokyoNightLight => "TokyoNightLight",
        Theme::KanagawaWave => "KanagawaWave",
        Theme::KanagawaDragon => "KanagawaDragon",
        Theme::KanagawaLotus => "KanagawaLotus",
        Theme::Moonfly => "Moonfly",
        Theme::Nightfly => "Nightfly",
        Theme::Oxocarbon => "Oxocarbon",
        Theme::Ferra => "Ferra",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"theme_name":"Dark"}"#).unwrap();
        assert_eq!(config.theme(), Theme::Dark);
        assert_eq!(config.api_base_url, Config::default().api_base_url);
    }

    #[test]
    fn theme_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(theme_from_str(theme_to_str(theme)).as_ref(), Some(theme));
        }
        assert_eq!(theme_from_str("nord"), Some(Theme::Nord));
        assert_eq!(theme_from_str("nope"), None);
    }

    #[test]
    fn unknown_theme_falls_back_to_light() {
        let config = Config { theme_name: "Sepia".into(), ..Config::default() };
        assert_eq!(config.theme(), Theme::Light);
    }
}
