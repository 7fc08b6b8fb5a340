use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use planet_common::{default_locations, ObserverLocation};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "PLANET_DASHBOARD_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemerisConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// No timeout unless set; a hung fetch only delays its own cycle
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_observer_interval")]
    pub observer_interval_secs: u64,

    #[serde(default = "default_solar_system_interval")]
    pub solar_system_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Outermost orbit radius of the schematic, must stay below canvas_size_px / 2
    #[serde(default = "default_max_screen_radius")]
    pub max_screen_radius_px: f64,

    #[serde(default = "default_canvas_size")]
    pub canvas_size_px: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Text-to-speech program, e.g. "espeak". Announcements are only logged when unset.
    #[serde(default)]
    pub command: Option<String>,

    /// Extra arguments placed before the utterance
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_ephemeris")]
    pub ephemeris: EphemerisConfig,

    #[serde(default = "default_polling")]
    pub polling: PollingConfig,

    #[serde(default = "default_display")]
    pub display: DisplayConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    /// Name of the location selected at startup
    #[serde(default = "default_location_name")]
    pub default_location: String,

    #[serde(default = "default_locations")]
    pub locations: Vec<ObserverLocation>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_observer_interval() -> u64 {
    60
}

fn default_solar_system_interval() -> u64 {
    5 * 60
}

fn default_max_screen_radius() -> f64 {
    140.0
}

fn default_canvas_size() -> f64 {
    320.0
}

fn default_location_name() -> String {
    "Paris".to_string()
}

fn default_ephemeris() -> EphemerisConfig {
    EphemerisConfig {
        base_url: default_base_url(),
        request_timeout_secs: None,
    }
}

fn default_polling() -> PollingConfig {
    PollingConfig {
        observer_interval_secs: default_observer_interval(),
        solar_system_interval_secs: default_solar_system_interval(),
    }
}

fn default_display() -> DisplayConfig {
    DisplayConfig {
        max_screen_radius_px: default_max_screen_radius(),
        canvas_size_px: default_canvas_size(),
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            ephemeris: default_ephemeris(),
            polling: default_polling(),
            display: default_display(),
            speech: SpeechConfig::default(),
            default_location: default_location_name(),
            locations: default_locations(),
        }
    }
}

impl PollingConfig {
    pub fn observer_interval(&self) -> Duration {
        Duration::from_secs(self.observer_interval_secs)
    }

    pub fn solar_system_interval(&self) -> Duration {
        Duration::from_secs(self.solar_system_interval_secs)
    }
}

impl DashboardConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.polling.observer_interval_secs == 0 || self.polling.solar_system_interval_secs == 0 {
            anyhow::bail!("Polling intervals must be at least one second");
        }
        if self.display.max_screen_radius_px <= 0.0
            || self.display.max_screen_radius_px * 2.0 > self.display.canvas_size_px
        {
            anyhow::bail!(
                "max_screen_radius_px ({}) must be positive and fit inside the {}px canvas",
                self.display.max_screen_radius_px,
                self.display.canvas_size_px
            );
        }
        for location in &self.locations {
            location
                .validate()
                .with_context(|| format!("Invalid location '{}'", location.name))?;
        }
        self.initial_location()?;
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn find_location(&self, name: &str) -> Option<&ObserverLocation> {
        self.locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    pub fn initial_location(&self) -> anyhow::Result<ObserverLocation> {
        self.find_location(&self.default_location)
            .cloned()
            .with_context(|| {
                format!(
                    "Default location '{}' is not in the location list",
                    self.default_location
                )
            })
    }
}

pub static CONFIG: OnceLock<DashboardConfig> = OnceLock::new();

/// Load the configuration into [`CONFIG`]. A missing file means defaults.
pub fn read_config() -> anyhow::Result<&'static DashboardConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = if Path::new(&path).exists() {
        DashboardConfig::from_file(&path)?
    } else {
        eprintln!("Config file {} not found, using defaults", path);
        DashboardConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config))
}
