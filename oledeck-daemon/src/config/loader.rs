//! Configuration file resolution
//!
//! The file is taken from the first command line argument, else
//! `$OLEDECK_CONFIG`, else [`DEFAULT_CONFIG_PATH`]. A missing, unreadable
//! or invalid file never stops the daemon: the embedded defaults are used
//! instead.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use thiserror::Error;

use super::types::{Config, ConfigFile};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/oledeck/oledeck.toml";

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "OLEDECK_CONFIG";

/// Embedded default configuration (compiled into the daemon)
const EMBEDDED_CONFIG: &str = include_str!("../../oledeck.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("button {button}: unknown action {name:?}")]
    UnknownAction { button: usize, name: String },

    #[error("{0} button actions listed, the panel has 8 buttons")]
    TooManyButtons(usize),

    #[error("{0}")]
    Invalid(&'static str),
}

/// Where to read the configuration from
pub fn config_path() -> PathBuf {
    resolve_path(std::env::args_os().nth(1), std::env::var_os(CONFIG_ENV))
}

fn resolve_path(arg: Option<OsString>, env: Option<OsString>) -> PathBuf {
    arg.or(env)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Parse and validate configuration text
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text)?;
    Config::try_from(file)
}

/// Read and validate the file at `path`
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} bytes from {}", text.len(), path.display());
    parse_config(&text)
}

/// Load `path`, falling back to the embedded defaults
pub fn load_or_default(path: &Path) -> Config {
    let config = match load(path) {
        Ok(config) => {
            info!("configuration loaded from {}", path.display());
            config
        }
        Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            info!("{} not found, using defaults", path.display());
            embedded_default()
        }
        Err(e) => {
            warn!("{}, using defaults", e);
            embedded_default()
        }
    };
    log_config_summary(&config);
    config
}

/// The configuration compiled into the binary
pub fn embedded_default() -> Config {
    parse_config(EMBEDDED_CONFIG).unwrap_or_else(|e| {
        error!("embedded configuration invalid: {}", e);
        Config::default()
    })
}

/// Log a summary of the effective configuration
fn log_config_summary(config: &Config) {
    let t = &config.core.timings;
    info!(
        "idle ladder: clock {} ms, screensaver {} ms, deep sleep {} ms, grace {} ms",
        t.to_clock_ms, t.to_screensaver_ms, t.to_deep_sleep_ms, t.grace_ms
    );
    info!(
        "player {} (poll {} ms, timeout {} ms)",
        config.player.base_url, config.core.poll.state_poll_ms, config.core.poll.request_timeout_ms
    );
    debug!(
        "  panel {} @ {} Hz, DC {} RST {}, contrast {}",
        config.display.spi_device,
        config.display.spi_hz,
        config.display.dc_line,
        config.display.reset_line,
        config.display.contrast
    );
    debug!(
        "  expander {} @ {:#04x}, encoder CLK {} DT {} SW {}",
        config.input.i2c_device,
        config.input.expander_address,
        config.input.clk_line,
        config.input.dt_line,
        config.input.sw_line
    );
    debug!("  frames {:?}", config.core.cadence);
    debug!("  buttons {:?}", config.core.buttons);
}

#[cfg(test)]
mod tests {
    use super::*;
    use oledeck_core::dispatch::ButtonAction;
    use oledeck_core::input::ButtonId;
    use oledeck_protocol::PlayerCommand;

    #[test]
    fn test_embedded_config_matches_defaults() {
        assert_eq!(parse_config(EMBEDDED_CONFIG).unwrap(), Config::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config("[timings]\nto_clock_ms = 2000\n").unwrap();
        assert_eq!(config.core.timings.to_clock_ms, 2000);
        assert_eq!(config.core.timings.grace_ms, 60_000);
        assert_eq!(config.display, Config::default().display);
    }

    #[test]
    fn test_hex_expander_address() {
        let config = parse_config("[input]\nexpander_address = 0x27\n").unwrap();
        assert_eq!(config.input.expander_address, 0x27);
    }

    #[test]
    fn test_cadence_maps_to_core() {
        let text = "[cadence]\nplayback_frame_ms = 50\nstate_poll_ms = 500\n";
        let config = parse_config(text).unwrap();
        assert_eq!(config.core.cadence.playback_ms, 50);
        assert_eq!(config.core.poll.state_poll_ms, 500);
        assert_eq!(config.cadence.playback_frame_ms, 50);
    }

    #[test]
    fn test_button_actions_remapped() {
        let text = "[buttons]\nactions = [\"next\", \"volume_up\"]\n";
        let config = parse_config(text).unwrap();
        let buttons = &config.core.buttons;
        let id = |n| ButtonId::new(n).unwrap();
        assert_eq!(
            buttons.action(id(1)),
            &ButtonAction::Command(PlayerCommand::Next)
        );
        assert_eq!(
            buttons.action(id(2)),
            &ButtonAction::Command(PlayerCommand::VolumeUp)
        );
        assert_eq!(buttons.action(id(3)), &ButtonAction::Unassigned);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = parse_config("[buttons]\nactions = [\"play\", \"dance\"]\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownAction { button: 2, ref name } if name == "dance"
        ));
    }

    #[test]
    fn test_too_many_buttons() {
        let text = "[buttons]\nactions = [\"none\", \"none\", \"none\", \"none\", \"none\", \"none\", \"none\", \"none\", \"none\"]\n";
        assert!(matches!(
            parse_config(text),
            Err(ConfigError::TooManyButtons(9))
        ));
    }

    #[test]
    fn test_zero_attempts_invalid() {
        assert!(matches!(
            parse_config("[player]\nbrowse_attempts = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            parse_config("[timings\nto_clock_ms = "),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            parse_config("[timings]\nto_clock_ms = \"soon\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_fallback_on_malformed_file() {
        let path = std::env::temp_dir().join(format!("oledeck-test-{}.toml", std::process::id()));
        std::fs::write(&path, "[display]\ncontrast = \"bright\"\n").unwrap();
        let config = load_or_default(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_fallback_on_missing_file() {
        let config = load_or_default(Path::new("/nonexistent/oledeck.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_path_resolution_order() {
        let arg = Some(OsString::from("/tmp/a.toml"));
        let env = Some(OsString::from("/tmp/b.toml"));
        assert_eq!(resolve_path(arg, env.clone()), PathBuf::from("/tmp/a.toml"));
        assert_eq!(resolve_path(None, env), PathBuf::from("/tmp/b.toml"));
        assert_eq!(resolve_path(None, None), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(
            resolve_path(Some(OsString::new()), None),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
    }
}
