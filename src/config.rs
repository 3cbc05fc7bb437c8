//! Theme and runtime configuration.
//!
//! [`ReportTheme`] is an immutable value injected into both the layout engine and the renderer so
//! page geometry and colours are never read from ambient globals. [`RuntimeConfig`] collects the
//! environment-driven settings used by the command line frontend.

use std::env::VarError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid colour '{0}', expected #rrggbb")]
    InvalidColor(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read theme file {path}: {source}")]
    ThemeIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse theme file {path}: {source}")]
    ThemeParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An sRGB colour, written as `#rrggbb` in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    /// Pure black.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Creates a colour from its 8-bit channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `0.0..=1.0`.
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(raw.to_owned());
        let hex = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Physical page geometry in millimetres. All pages of a document share it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub header_height: f64,
    pub footer_height: f64,
    /// Space between the header bar and the first body element, and above the footer.
    pub body_gap: f64,
    /// Band kept free above the footer for screenshot captions.
    pub caption_height: f64,
}

impl Default for PageGeometry {
    /// A4 landscape.
    fn default() -> Self {
        Self {
            width: 297.0,
            height: 210.0,
            margin: 15.0,
            header_height: 25.0,
            footer_height: 15.0,
            body_gap: 10.0,
            caption_height: 20.0,
        }
    }
}

/// Colours used by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub positive: Rgb,
    pub negative: Rgb,
    pub neutral: Rgb,
    pub background: Rgb,
    pub text: Rgb,
    pub text_light: Rgb,
    pub panel: Rgb,
    pub placeholder: Rgb,
    pub cover: Rgb,
    pub highlight: Rgb,
    pub link: Rgb,
    pub news_table: Rgb,
    pub social_table: Rgb,
    pub grid_line: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb::new(0x1a, 0x36, 0x5d),
            secondary: Rgb::new(0x2d, 0x37, 0x48),
            accent: Rgb::new(0x31, 0x82, 0xce),
            positive: Rgb::new(0x38, 0xa1, 0x69),
            negative: Rgb::new(0xe5, 0x3e, 0x3e),
            neutral: Rgb::new(0x71, 0x80, 0x96),
            background: Rgb::WHITE,
            text: Rgb::new(0x1a, 0x20, 0x2c),
            text_light: Rgb::new(0x71, 0x80, 0x96),
            panel: Rgb::new(0xf7, 0xfa, 0xfc),
            placeholder: Rgb::new(0xf0, 0xf0, 0xf0),
            cover: Rgb::new(0x0f, 0x17, 0x2a),
            highlight: Rgb::new(0x22, 0xd3, 0xee),
            link: Rgb::new(0x1d, 0x4e, 0xd8),
            news_table: Rgb::new(0x4f, 0x46, 0xe5),
            social_table: Rgb::new(0x14, 0x53, 0x2d),
            grid_line: Rgb::new(0xe2, 0xe8, 0xf0),
        }
    }
}

/// Immutable look-and-feel shared by the layout engine and the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportTheme {
    pub geometry: PageGeometry,
    pub palette: Palette,
    /// Year printed in the footer notice.
    pub copyright_year: i32,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            palette: Palette::default(),
            copyright_year: chrono::Utc::now().year(),
        }
    }
}

impl ReportTheme {
    /// Sets the footer year and returns the updated theme.
    pub fn with_copyright_year(mut self, year: i32) -> Self {
        self.copyright_year = year;
        self
    }

    /// Loads a theme from a JSON file. Missing fields fall back to the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ThemeIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::ThemeParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Settings read from the process environment.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Directory used by [`crate::store::FsReportStore`] (`REPORT_STORE_DIR`).
    pub store_dir: PathBuf,
    /// Directory generated documents are written to (`REPORT_OUTPUT_DIR`).
    pub output_dir: PathBuf,
    /// Optional theme override file (`REPORT_THEME_PATH`).
    pub theme_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Reads the configuration from the current process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Builds the configuration using the provided env-var lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let path_var = |var: &str| -> Result<Option<PathBuf>, ConfigError> {
            match lookup(var) {
                Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidEnvVar {
                    var: var.to_owned(),
                    reason: "value is empty".to_owned(),
                }),
                Ok(value) => Ok(Some(PathBuf::from(value))),
                Err(VarError::NotPresent) => Ok(None),
                Err(err) => Err(ConfigError::InvalidEnvVar {
                    var: var.to_owned(),
                    reason: err.to_string(),
                }),
            }
        };

        Ok(Self {
            store_dir: path_var("REPORT_STORE_DIR")?.unwrap_or_else(|| PathBuf::from("reports")),
            output_dir: path_var("REPORT_OUTPUT_DIR")?.unwrap_or_else(|| PathBuf::from(".")),
            theme_path: path_var("REPORT_THEME_PATH")?,
        })
    }

    /// Loads the configured theme, or the default one when no override is set.
    pub fn load_theme(&self) -> Result<ReportTheme, ConfigError> {
        match &self.theme_path {
            Some(path) => ReportTheme::from_json_file(path),
            None => Ok(ReportTheme::default()),
        }
    }
}
