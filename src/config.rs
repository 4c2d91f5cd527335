//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::controller::joystick::JoystickSettings;
use crate::controller::layout::Rect;
use crate::error::{ConsoleError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub joystick: JoystickConfig,

    #[serde(default)]
    pub sample: SampleConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Vehicle channel configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// Joystick behavior configuration
#[derive(Debug, Deserialize, Clone)]
pub struct JoystickConfig {
    #[serde(default = "default_return_animation_ms")]
    pub return_animation_ms: u64,

    #[serde(default = "default_fallback_radius")]
    pub fallback_radius: f64,
}

/// Sample loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SampleConfig {
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    #[serde(default = "default_log_interval_ticks")]
    pub log_interval_ticks: u64,
}

/// Initial on-screen layout of the two sticks
#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    #[serde(default = "default_left_rect")]
    pub left: Rect,

    #[serde(default = "default_right_rect")]
    pub right: Rect,

    #[serde(default = "default_knob_size")]
    pub knob_size: f64,
}

/// Operator session defaults
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_speed")]
    pub default_speed: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; empty logs to the console only
    #[serde(default)]
    pub dir: String,
}

// Default value functions
fn default_address() -> String { "127.0.0.1:5000".to_string() }
fn default_connect_timeout_ms() -> u64 { 3000 }

fn default_return_animation_ms() -> u64 { 200 }
fn default_fallback_radius() -> f64 { 50.0 }

fn default_period_ms() -> u64 { 100 }
fn default_log_interval_ticks() -> u64 { 600 }

fn default_left_rect() -> Rect { Rect::new(40.0, 400.0, 160.0, 160.0) }
fn default_right_rect() -> Rect { Rect::new(600.0, 400.0, 160.0, 160.0) }
fn default_knob_size() -> f64 { 60.0 }

fn default_speed() -> u8 { 50 }

fn default_log_level() -> String { "info".to_string() }

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            return_animation_ms: default_return_animation_ms(),
            fallback_radius: default_fallback_radius(),
        }
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            log_interval_ticks: default_log_interval_ticks(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            left: default_left_rect(),
            right: default_right_rect(),
            knob_size: default_knob_size(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { default_speed: default_speed() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: String::new(),
        }
    }
}

impl JoystickConfig {
    /// Settings handed to each joystick controller
    pub fn settings(&self) -> JoystickSettings {
        JoystickSettings {
            return_duration: Duration::from_millis(self.return_animation_ms),
            fallback_radius: self.fallback_radius,
        }
    }
}

impl SampleConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rover_console::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate channel configuration
        if self.channel.address.trim().is_empty() {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("channel address cannot be empty")
            ));
        }

        if self.channel.connect_timeout_ms == 0 || self.channel.connect_timeout_ms > 60000 {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("connect_timeout_ms must be between 1 and 60000")
            ));
        }

        // Validate joystick behavior
        if self.joystick.return_animation_ms > 2000 {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("return_animation_ms must be between 0 and 2000")
            ));
        }

        if !self.joystick.fallback_radius.is_finite() || self.joystick.fallback_radius <= 0.0 {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("fallback_radius must be a positive number")
            ));
        }

        // Validate sample loop timing
        if self.sample.period_ms < 10 || self.sample.period_ms > 1000 {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("period_ms must be between 10 and 1000")
            ));
        }

        if self.sample.log_interval_ticks == 0 {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("log_interval_ticks must be greater than 0")
            ));
        }

        // Validate layout boxes
        for (name, rect) in [("left", &self.layout.left), ("right", &self.layout.right)] {
            let sizes = [rect.left, rect.top, rect.width, rect.height];
            if sizes.iter().any(|v| !v.is_finite()) || rect.width <= 0.0 || rect.height <= 0.0 {
                return Err(ConsoleError::Config(
                    toml::de::Error::custom(format!("layout.{} must have a positive finite size", name))
                ));
            }
        }

        if !self.layout.knob_size.is_finite() || self.layout.knob_size <= 0.0 {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("knob_size must be a positive number")
            ));
        }

        if self.layout.knob_size >= self.layout.left.width
            || self.layout.knob_size >= self.layout.right.width {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("knob_size must be smaller than both control widths")
            ));
        }

        // Validate session defaults
        if self.session.default_speed > 100 {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("default_speed must be between 0 and 100")
            ));
        }

        // Validate log level
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(ConsoleError::Config(
                toml::de::Error::custom("logging level must be one of: trace, debug, info, warn, error")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config {
            channel: ChannelConfig {
                address: default_address(),
                connect_timeout_ms: default_connect_timeout_ms(),
            },
            joystick: JoystickConfig {
                return_animation_ms: default_return_animation_ms(),
                fallback_radius: default_fallback_radius(),
            },
            sample: SampleConfig {
                period_ms: default_period_ms(),
                log_interval_ticks: default_log_interval_ticks(),
            },
            layout: LayoutConfig {
                left: default_left_rect(),
                right: default_right_rect(),
                knob_size: default_knob_size(),
            },
            session: SessionConfig {
                default_speed: default_speed(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                dir: String::new(),
            },
        }
    }

    #[test]
    fn test_default_config() {
        assert!(create_valid_config().validate().is_ok());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[channel]
address = "192.168.4.1:5000"

[sample]
period_ms = 50

[layout]
left = { left = 0.0, top = 0.0, width = 200.0, height = 200.0 }

[logging]
level = "debug"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.channel.address, "192.168.4.1:5000");
        assert_eq!(config.channel.connect_timeout_ms, 3000);
        assert_eq!(config.sample.period(), Duration::from_millis(50));
        assert_eq!(config.layout.left, Rect::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(config.layout.right, default_right_rect());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"").unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.session.default_speed, 50);
        assert_eq!(config.joystick.return_animation_ms, 200);
    }

    #[test]
    fn test_load_invalid_value_fails() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[sample]\nperiod_ms = 5\n").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(Config::load(temp_file.path()), Err(ConsoleError::Config(_))));
    }

    #[test]
    fn test_load_malformed_toml_fails() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[channel\naddress = ").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(Config::load(temp_file.path()), Err(ConsoleError::Config(_))));
    }

    #[test]
    fn test_shipped_default_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.channel.address, default_address());
        assert_eq!(config.layout.left, default_left_rect());
        assert_eq!(config.layout.right, default_right_rect());
        assert_eq!(config.sample.log_interval_ticks, default_log_interval_ticks());
        assert!(config.logging.dir.is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load("/nonexistent/rover-console.toml");
        assert!(matches!(result, Err(ConsoleError::Io(_))));
    }

    #[test]
    fn test_empty_address() {
        let mut config = create_valid_config();
        config.channel.address = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connect_timeout_zero() {
        let mut config = create_valid_config();
        config.channel.connect_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connect_timeout_too_high() {
        let mut config = create_valid_config();
        config.channel.connect_timeout_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_return_animation_zero_is_valid() {
        let mut config = create_valid_config();
        config.joystick.return_animation_ms = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_return_animation_too_high() {
        let mut config = create_valid_config();
        config.joystick.return_animation_ms = 2001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fallback_radius_zero() {
        let mut config = create_valid_config();
        config.joystick.fallback_radius = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fallback_radius_nan() {
        let mut config = create_valid_config();
        config.joystick.fallback_radius = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_period_too_low() {
        let mut config = create_valid_config();
        config.sample.period_ms = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_period_too_high() {
        let mut config = create_valid_config();
        config.sample.period_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_period_bounds_are_valid() {
        for &period in &[10, 1000] {
            let mut config = create_valid_config();
            config.sample.period_ms = period;
            assert!(config.validate().is_ok(), "Period {} should be valid", period);
        }
    }

    #[test]
    fn test_log_interval_ticks_zero() {
        let mut config = create_valid_config();
        config.sample.log_interval_ticks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_zero_width() {
        let mut config = create_valid_config();
        config.layout.left.width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_negative_height() {
        let mut config = create_valid_config();
        config.layout.right.height = -10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_infinite_position() {
        let mut config = create_valid_config();
        config.layout.right.left = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_knob_size_zero() {
        let mut config = create_valid_config();
        config.layout.knob_size = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_knob_wider_than_control() {
        let mut config = create_valid_config();
        config.layout.right.width = 60.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_speed_too_high() {
        let mut config = create_valid_config();
        config.session.default_speed = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = create_valid_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let mut config = create_valid_config();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Log level {} should be valid", level);
        }
    }

    #[test]
    fn test_joystick_settings_conversion() {
        let settings = create_valid_config().joystick.settings();
        assert_eq!(settings.return_duration, Duration::from_millis(200));
        assert_eq!(settings.fallback_radius, 50.0);
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_address(), "127.0.0.1:5000");
        assert_eq!(default_connect_timeout_ms(), 3000);
        assert_eq!(default_return_animation_ms(), 200);
        assert_eq!(default_fallback_radius(), 50.0);
        assert_eq!(default_period_ms(), 100);
        assert_eq!(default_log_interval_ticks(), 600);
        assert_eq!(default_left_rect(), Rect::new(40.0, 400.0, 160.0, 160.0));
        assert_eq!(default_right_rect(), Rect::new(600.0, 400.0, 160.0, 160.0));
        assert_eq!(default_knob_size(), 60.0);
        assert_eq!(default_speed(), 50);
        assert_eq!(default_log_level(), "info");
    }
}
