//! Start-up configuration: compiled-in defaults, an optional TOML file and
//! command-line options. Nothing here is reloaded once the game is running.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::*;
use crate::types::Rgb;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),

    #[error("Missing or malformed value for {0}")]
    BadArgumentValue(&'static str),
}

/// Tunables for a game session. Every field falls back to the matching
/// constant, so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub screen_width: f64,
    pub screen_height: f64,

    pub asteroid_min_radius: f64,
    pub asteroid_kinds: u32,
    pub asteroid_spawn_interval: f64,

    pub player_radius: f64,
    pub player_turn_speed: f64,
    pub player_speed: f64,

    pub shot_radius: f64,
    pub shot_speed: f64,
    pub shot_cooldown: f64,

    pub frame_rate: u32,
    /// How long a key pressed once stays held while waiting for auto-repeat to start.
    pub key_repeat_delay_ms: u64,
    /// How long an auto-repeating key stays held after its last repeat.
    pub key_hold_timeout_ms: u64,

    pub background_color: Rgb,
    pub foreground_color: Rgb,
    pub line_width: u16,

    /// Fixed RNG seed; a fresh entropy seed is drawn when absent.
    pub seed: Option<u64>,
    /// Let the player fire on the very first frame instead of waiting out one cooldown.
    pub shot_ready_at_start: bool,
    /// Remove shots and asteroids once they have drifted fully past the spawn margin.
    pub despawn_offscreen: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            asteroid_min_radius: ASTEROID_MIN_RADIUS,
            asteroid_kinds: ASTEROID_KINDS,
            asteroid_spawn_interval: ASTEROID_SPAWN_RATE,
            player_radius: PLAYER_RADIUS,
            player_turn_speed: PLAYER_TURN_SPEED,
            player_speed: PLAYER_SPEED,
            shot_radius: SHOT_RADIUS,
            shot_speed: PLAYER_SHOOT_SPEED,
            shot_cooldown: PLAYER_SHOOT_COOLDOWN,
            frame_rate: FRAME_RATE,
            key_repeat_delay_ms: KEY_REPEAT_DELAY_MS,
            key_hold_timeout_ms: KEY_HOLD_TIMEOUT_MS,
            background_color: BACKGROUND_COLOR,
            foreground_color: ASSET_COLOR,
            line_width: LINE_WIDTH,
            seed: None,
            shot_ready_at_start: false,
            despawn_offscreen: false,
        }
    }
}

impl GameConfig {
    /// Reads and parses a TOML file. Values are checked by `validate`,
    /// which the caller runs once on whichever config it ends up with.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn asteroid_max_radius(&self) -> f64 {
        self.asteroid_min_radius * self.asteroid_kinds as f64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                let reason = format!("expected a positive number, got {}", value);
                Err(ConfigError::Invalid { field, reason })
            }
        }

        positive("screen_width", self.screen_width)?;
        positive("screen_height", self.screen_height)?;
        positive("asteroid_min_radius", self.asteroid_min_radius)?;
        positive("asteroid_spawn_interval", self.asteroid_spawn_interval)?;
        positive("player_radius", self.player_radius)?;
        positive("shot_radius", self.shot_radius)?;
        positive("shot_cooldown", self.shot_cooldown)?;

        if self.key_hold_timeout_ms == 0 || self.key_repeat_delay_ms < self.key_hold_timeout_ms {
            let reason = "must be at least `key_hold_timeout_ms`, which must be non-zero".into();
            return Err(ConfigError::Invalid { field: "key_repeat_delay_ms", reason });
        }

        if self.asteroid_kinds == 0 {
            let reason = "need at least one size tier".into();
            return Err(ConfigError::Invalid { field: "asteroid_kinds", reason });
        }
        if self.frame_rate == 0 {
            let reason = "must be at least 1".into();
            return Err(ConfigError::Invalid { field: "frame_rate", reason });
        }
        Ok(())
    }
}

/// Options taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchOptions {
    /// Headless run into a screen buffer with scripted input.
    pub debug: bool,
    pub debug_columns: Option<u16>,
    pub debug_rows: Option<u16>,
    pub max_frames: Option<u64>,
    pub seed: Option<u64>,
    pub config_path: Option<PathBuf>,
}

impl LaunchOptions {
    /// Parses `--debug [COLUMNS ROWS]`, `--frames N`, `--seed N` and
    /// `--config PATH`. Expects the arguments without the program name.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = LaunchOptions::default();
        let mut args = args.into_iter().peekable();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" => {
                    options.debug = true;
                    // Dimensions are optional but come as a pair.
                    if let Some(columns) = args.peek().and_then(|a| a.parse::<u16>().ok()) {
                        args.next();
                        let rows = args
                            .next()
                            .and_then(|a| a.parse::<u16>().ok())
                            .ok_or(ConfigError::BadArgumentValue("--debug ROWS"))?;
                        options.debug_columns = Some(columns);
                        options.debug_rows = Some(rows);
                    }
                }
                "--frames" => {
                    let frames = args.next().and_then(|a| a.parse().ok());
                    let frames = frames.ok_or(ConfigError::BadArgumentValue("--frames"))?;
                    options.max_frames = Some(frames);
                }
                "--seed" => {
                    let seed = args.next().and_then(|a| a.parse().ok());
                    options.seed = Some(seed.ok_or(ConfigError::BadArgumentValue("--seed"))?);
                }
                "--config" => {
                    let path = args.next().ok_or(ConfigError::BadArgumentValue("--config"))?;
                    options.config_path = Some(PathBuf::from(path));
                }
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_match_constants() {
        let config = GameConfig::default();
        assert_eq!(config.asteroid_kinds, 3);
        assert_eq!(config.asteroid_max_radius(), 60.0);
        assert!(!config.shot_ready_at_start);
        assert!(!config.despawn_offscreen);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            asteroid_kinds = 4
            seed = 7
            foreground_color = [0, 255, 0]
            "#,
        )
        .unwrap();
        assert_eq!(config.asteroid_kinds, 4);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.foreground_color, Rgb(0, 255, 0));
        assert_eq!(config.screen_width, SCREEN_WIDTH);
        assert_eq!(config.shot_cooldown, PLAYER_SHOOT_COOLDOWN);
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        assert!(toml::from_str::<GameConfig>("asteroid_colour = 3").is_err());
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let config = GameConfig { asteroid_kinds: 0, ..GameConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "asteroid_kinds", .. })
        ));

        let config = GameConfig { asteroid_min_radius: -1.0, ..GameConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "asteroid_min_radius", .. })
        ));

        let config = GameConfig { frame_rate: 0, ..GameConfig::default() };
        assert!(config.validate().is_err());

        let config = GameConfig {
            key_repeat_delay_ms: 100,
            key_hold_timeout_ms: 150,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "key_repeat_delay_ms", .. })
        ));
    }

    #[test]
    fn loading_a_file_parses_without_validating() {
        let path = std::env::temp_dir().join(format!("asteroid-field-{}.toml", std::process::id()));
        std::fs::write(&path, "asteroid_kinds = 0\n").unwrap();

        let loaded = GameConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();

        let config = loaded.unwrap();
        assert_eq!(config.asteroid_kinds, 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "asteroid_kinds", .. })
        ));
    }

    #[test]
    fn loading_a_missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("asteroid-field-does-not-exist.toml");
        assert!(matches!(GameConfig::load_from_file(path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn parses_debug_with_dimensions_and_frames() {
        let list = ["--debug", "100", "30", "--frames", "50", "--seed", "9"];
        let options = LaunchOptions::from_args(args(&list)).unwrap();
        assert!(options.debug);
        assert_eq!(options.debug_columns, Some(100));
        assert_eq!(options.debug_rows, Some(30));
        assert_eq!(options.max_frames, Some(50));
        assert_eq!(options.seed, Some(9));
    }

    #[test]
    fn debug_dimensions_are_optional() {
        let list = ["--debug", "--config", "game.toml"];
        let options = LaunchOptions::from_args(args(&list)).unwrap();
        assert!(options.debug);
        assert_eq!(options.debug_columns, None);
        assert_eq!(options.config_path, Some(PathBuf::from("game.toml")));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            LaunchOptions::from_args(args(&["--fullscreen"])),
            Err(ConfigError::UnknownArgument(_))
        ));
        assert!(matches!(
            LaunchOptions::from_args(args(&["--frames", "many"])),
            Err(ConfigError::BadArgumentValue("--frames"))
        ));
        assert!(matches!(
            LaunchOptions::from_args(args(&["--debug", "80"])),
            Err(ConfigError::BadArgumentValue("--debug ROWS"))
        ));
    }
}
