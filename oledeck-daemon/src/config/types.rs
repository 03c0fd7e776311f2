//! Configuration file layout
//!
//! [`ConfigFile`] mirrors the TOML sections one to one. It is converted
//! into the validated [`Config`] the daemon runs with; button action
//! names are resolved at that point so a typo is caught at startup.

use oledeck_core::config::{BrowseConfig, FrameCadence, PollConfig, Timings};
use oledeck_core::dispatch::{ButtonAction, ButtonMap};
use oledeck_core::input::matrix::BUTTON_COUNT;
use oledeck_core::input::ButtonId;
use oledeck_core::CoreConfig;
use serde::Deserialize;

use super::ConfigError;

/// Raw file contents, every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub timings: Timings,
    pub cadence: CadenceSection,
    pub display: DisplaySection,
    pub input: InputSection,
    pub player: PlayerSection,
    pub buttons: ButtonSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CadenceSection {
    pub button_poll_ms: u64,
    pub encoder_poll_ms: u64,
    pub state_poll_ms: u64,
    pub clock_frame_ms: u64,
    pub playback_frame_ms: u64,
    pub screensaver_frame_ms: u64,
    pub browse_frame_ms: u64,
}

impl Default for CadenceSection {
    fn default() -> Self {
        let frames = FrameCadence::default();
        Self {
            button_poll_ms: 100,
            encoder_poll_ms: 2,
            state_poll_ms: PollConfig::default().state_poll_ms,
            clock_frame_ms: frames.clock_ms,
            playback_frame_ms: frames.playback_ms,
            screensaver_frame_ms: frames.screensaver_ms,
            browse_frame_ms: frames.browse_ms,
        }
    }
}

/// SSD1322 wiring
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub contrast: u8,
    pub spi_device: String,
    pub spi_hz: u32,
    pub gpio_chip: String,
    pub dc_line: u32,
    pub reset_line: u32,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            contrast: 254,
            spi_device: "/dev/spidev0.0".into(),
            spi_hz: 1_200_000,
            gpio_chip: "/dev/gpiochip0".into(),
            dc_line: 27,
            reset_line: 24,
        }
    }
}

/// Expander and encoder wiring
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputSection {
    pub i2c_device: String,
    pub expander_address: u8,
    pub clk_line: u32,
    pub dt_line: u32,
    pub sw_line: u32,
    pub press_debounce_ms: u64,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            i2c_device: "/dev/i2c-1".into(),
            expander_address: 0x20,
            clk_line: 13,
            dt_line: 5,
            sw_line: 6,
            press_debounce_ms: 100,
        }
    }
}

/// Volumio endpoint and request budget
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub browse_attempts: u8,
    pub browse_timeout_ms: u64,
}

impl Default for PlayerSection {
    fn default() -> Self {
        let browse = BrowseConfig::default();
        Self {
            base_url: "http://localhost:3000".into(),
            request_timeout_ms: PollConfig::default().request_timeout_ms,
            browse_attempts: browse.attempts,
            browse_timeout_ms: browse.timeout_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ButtonSection {
    /// Action names, button 1 first; missing buttons are unassigned
    pub actions: Vec<String>,
    pub service_unit: String,
}

impl Default for ButtonSection {
    fn default() -> Self {
        let actions = [
            "play",
            "pause",
            "previous",
            "next",
            "random",
            "restart_service",
            "repeat",
            "none",
        ];
        Self {
            actions: actions.iter().map(|a| a.to_string()).collect(),
            service_unit: "oled.service".into(),
        }
    }
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub core: CoreConfig,
    pub cadence: CadenceSection,
    pub display: DisplaySection,
    pub input: InputSection,
    pub player: PlayerSection,
    pub service_unit: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            cadence: CadenceSection::default(),
            display: DisplaySection::default(),
            input: InputSection::default(),
            player: PlayerSection::default(),
            service_unit: ButtonSection::default().service_unit,
        }
    }
}

impl TryFrom<ConfigFile> for Config {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, ConfigError> {
        if file.player.browse_attempts == 0 {
            return Err(ConfigError::Invalid("player.browse_attempts must be at least 1"));
        }
        if file.player.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("player.request_timeout_ms must not be 0"));
        }

        let core = CoreConfig {
            timings: file.timings,
            cadence: FrameCadence {
                clock_ms: file.cadence.clock_frame_ms,
                playback_ms: file.cadence.playback_frame_ms,
                screensaver_ms: file.cadence.screensaver_frame_ms,
                browse_ms: file.cadence.browse_frame_ms,
            },
            poll: PollConfig {
                state_poll_ms: file.cadence.state_poll_ms,
                request_timeout_ms: file.player.request_timeout_ms,
            },
            browse: BrowseConfig {
                attempts: file.player.browse_attempts,
                timeout_ms: file.player.browse_timeout_ms,
            },
            buttons: button_map(&file.buttons.actions)?,
        };

        Ok(Self {
            core,
            cadence: file.cadence,
            display: file.display,
            input: file.input,
            player: file.player,
            service_unit: file.buttons.service_unit,
        })
    }
}

fn button_map(names: &[String]) -> Result<ButtonMap, ConfigError> {
    if names.len() > BUTTON_COUNT {
        return Err(ConfigError::TooManyButtons(names.len()));
    }
    let mut map = ButtonMap::default();
    for index in 0..BUTTON_COUNT {
        let action = match names.get(index) {
            Some(name) => {
                ButtonAction::from_name(name).ok_or_else(|| ConfigError::UnknownAction {
                    button: index + 1,
                    name: name.clone(),
                })?
            }
            None => ButtonAction::Unassigned,
        };
        if let Some(id) = ButtonId::new(index as u8 + 1) {
            map.set(id, action);
        }
    }
    Ok(map)
}
