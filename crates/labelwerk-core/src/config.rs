// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service configuration.
//
// Built once at startup from defaults, an optional TOML file and
// `LABELWERK__`-prefixed environment variables, then shared read-only.
// The API token is read separately from `PRINT_API_TOKEN`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{LabelwerkError, Result};
use crate::types::{ColorMode, DeviceMetrics, Route};

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "PRINT_API_TOKEN";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "LABELWERK_CONFIG";

/// Prefix for per-key environment overrides (`LABELWERK__TARGET__DEVICE_NAME`).
pub const ENV_PREFIX: &str = "LABELWERK";

/// Config file picked up from the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "labelwerk.toml";

/// Complete service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub target: PrintTarget,
    pub raster: RasterSettings,
    pub fallback: FallbackSettings,
    /// Carrier tag -> route. Exact, case-sensitive match.
    pub carriers: BTreeMap<String, Route>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let carriers = [
            ("tnt".to_string(), Route::Raw),
            ("poste".to_string(), Route::Raw),
            ("chronopost".to_string(), Route::Pdf),
        ]
        .into_iter()
        .collect();

        Self {
            server: ServerSettings::default(),
            target: PrintTarget::default(),
            raster: RasterSettings::default(),
            fallback: FallbackSettings::default(),
            carriers,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, multipart framing included.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The single physical printer every label goes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintTarget {
    /// OS printer name (spooler queue / CUPS destination).
    pub device_name: String,
    /// Whether the device accepts device-native markup on a raw channel.
    pub raw_channel_capable: bool,
    pub raw_channel: RawChannel,
    /// Page geometry reported by backends that cannot query the driver.
    pub media: MediaSettings,
}

impl Default for PrintTarget {
    fn default() -> Self {
        Self {
            device_name: "ZDesigner TLP 2844".into(),
            raw_channel_capable: true,
            raw_channel: RawChannel::Spooler,
            media: MediaSettings::default(),
        }
    }
}

/// Transport used for raw markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawChannel {
    /// The OS spooler in RAW datatype mode.
    Spooler,
    /// JetDirect-style socket on the printer itself.
    Tcp {
        host: String,
        #[serde(default = "default_raw_port")]
        port: u16,
    },
}

fn default_raw_port() -> u16 {
    9100
}

/// Label geometry in device pixels. Defaults to a 4x6in label at 203 dpi.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    pub printable_width_px: u32,
    pub printable_height_px: u32,
    pub physical_width_px: u32,
    pub physical_height_px: u32,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            printable_width_px: 812,
            printable_height_px: 1218,
            physical_width_px: 812,
            physical_height_px: 1218,
        }
    }
}

impl MediaSettings {
    pub fn to_metrics(&self) -> DeviceMetrics {
        DeviceMetrics {
            printable_width: self.printable_width_px,
            printable_height: self.printable_height_px,
            physical_width: self.physical_width_px,
            physical_height: self.physical_height_px,
        }
    }
}

/// PDF rasterisation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Resolution of the final bitmap.
    pub dpi: u32,
    /// Render at `dpi * oversample`, then downscale to `dpi`.
    pub oversample: u32,
    pub color_mode: ColorMode,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            dpi: 300,
            oversample: 2,
            color_mode: ColorMode::Rgb,
        }
    }
}

impl RasterSettings {
    /// Resolution handed to the page renderer.
    pub fn render_dpi(&self) -> u32 {
        self.dpi.saturating_mul(self.oversample)
    }
}

/// Settings for the shell-level fallback strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    /// Wait after a fire-and-forget `printto` before the file may be removed.
    pub settle_delay_ms: u64,
    /// PDF reader used for silent printing.
    pub reader_path: PathBuf,
    /// Reader arguments; `{file}` and `{device}` are substituted.
    pub reader_args: Vec<String>,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 5_000,
            reader_path: PathBuf::from(
                r"C:\Program Files\Adobe\Acrobat Reader DC\Reader\AcroRd32.exe",
            ),
            reader_args: vec!["/t".into(), "{file}".into(), "{device}".into()],
        }
    }
}

impl ServiceConfig {
    /// Load defaults, then the config file, then environment overrides.
    ///
    /// `path` wins over `LABELWERK_CONFIG`, which wins over `labelwerk.toml`
    /// in the working directory. A named file must exist; the implicit one
    /// is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        let named = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let file = match named {
            Some(file) => {
                if !file.exists() {
                    return Err(LabelwerkError::Config(format!(
                        "config file {} not found",
                        file.display()
                    )));
                }
                builder = builder.add_source(config::File::from(file.clone()));
                Some(file)
            }
            None => {
                builder = builder.add_source(
                    config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
                );
                Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|f| f.exists())
            }
        };

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let mut loaded: Self = builder.build()?.try_deserialize()?;
        if let Some(file) = file {
            loaded.carriers = restore_carrier_case(loaded.carriers, carrier_table(&file)?);
        }
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.target.device_name.trim().is_empty() {
            return Err(LabelwerkError::Config("target.device_name is empty".into()));
        }
        if self.raster.dpi == 0 {
            return Err(LabelwerkError::Config("raster.dpi must be at least 1".into()));
        }
        if self.raster.oversample == 0 {
            return Err(LabelwerkError::Config(
                "raster.oversample must be at least 1".into(),
            ));
        }
        let media = &self.target.media;
        if media.printable_width_px == 0 || media.printable_height_px == 0 {
            return Err(LabelwerkError::Config(
                "target.media printable area must be non-zero".into(),
            ));
        }
        if !self.target.raw_channel_capable {
            if let Some((carrier, _)) = self.carriers.iter().find(|(_, r)| **r == Route::Raw) {
                return Err(LabelwerkError::Config(format!(
                    "carrier '{carrier}' routes raw markup but target '{}' has no raw channel",
                    self.target.device_name
                )));
            }
        }
        Ok(())
    }

    /// Route for a carrier tag, if known.
    pub fn route_for(&self, carrier: &str) -> Option<Route> {
        self.carriers.get(carrier).copied()
    }
}

/// The `[carriers]` table of a TOML file, keys exactly as written.
fn carrier_table(file: &Path) -> Result<BTreeMap<String, Route>> {
    #[derive(Deserialize)]
    struct CarrierSection {
        #[serde(default)]
        carriers: BTreeMap<String, Route>,
    }

    let text = std::fs::read_to_string(file)?;
    let section: CarrierSection = toml::from_str(&text)
        .map_err(|e| LabelwerkError::Config(format!("{}: {e}", file.display())))?;
    Ok(section.carriers)
}

/// The layered loader folds map keys to lowercase. Put back the spelling
/// the file used; keys it never named (defaults, env) stay as loaded.
fn restore_carrier_case(
    loaded: BTreeMap<String, Route>,
    written: BTreeMap<String, Route>,
) -> BTreeMap<String, Route> {
    let mut carriers = BTreeMap::new();
    for (key, route) in loaded {
        let spelled: Vec<&String> = written
            .keys()
            .filter(|w| w.to_lowercase() == key)
            .collect();
        match spelled.as_slice() {
            [] => {
                carriers.insert(key, route);
            }
            [original] => {
                carriers.insert((*original).clone(), route);
            }
            several => {
                for original in several {
                    carriers.insert((*original).clone(), written[*original]);
                }
            }
        }
    }
    carriers
}

/// Shared secret expected in `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(LabelwerkError::Config("API token is empty".into()));
        }
        Ok(Self(value))
    }

    /// Read the token from `PRINT_API_TOKEN`. Absence is fatal for startup.
    pub fn from_env() -> Result<Self> {
        let value = std::env::var(TOKEN_ENV)
            .map_err(|_| LabelwerkError::Config(format!("{TOKEN_ENV} is not set")))?;
        Self::new(value)
    }

    /// Compare digests of both sides with a full XOR fold, so the time taken
    /// does not depend on where the candidate first differs or its length.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = Sha256::digest(self.0.as_bytes());
        let given = Sha256::digest(candidate.as_bytes());
        expected
            .iter()
            .zip(given.iter())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_observed_deployment() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.target.device_name, "ZDesigner TLP 2844");
        assert_eq!(cfg.route_for("tnt"), Some(Route::Raw));
        assert_eq!(cfg.route_for("poste"), Some(Route::Raw));
        assert_eq!(cfg.route_for("chronopost"), Some(Route::Pdf));
        assert_eq!(cfg.route_for("fedex"), None);
        assert_eq!(cfg.route_for("TNT"), None);
        assert_eq!(cfg.raster.render_dpi(), 600);
        assert_eq!(cfg.fallback.settle_delay_ms, 5_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_oversample_is_rejected() {
        let mut cfg = ServiceConfig::default();
        cfg.raster.oversample = 0;
        assert!(matches!(cfg.validate(), Err(LabelwerkError::Config(_))));
    }

    #[test]
    fn raw_route_requires_raw_capable_target() {
        let mut cfg = ServiceConfig::default();
        cfg.target.raw_channel_capable = false;
        assert!(matches!(cfg.validate(), Err(LabelwerkError::Config(_))));

        cfg.carriers.retain(|_, route| *route == Route::Pdf);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[target]
device_name = "Zebra ZD420"

[target.raw_channel]
kind = "tcp"
host = "10.0.0.40"

[raster]
dpi = 203
oversample = 3
color_mode = "luma"

[carriers]
dhl = "pdf"
"#
        )
        .unwrap();

        let cfg = ServiceConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.target.device_name, "Zebra ZD420");
        assert_eq!(
            cfg.target.raw_channel,
            RawChannel::Tcp {
                host: "10.0.0.40".into(),
                port: 9100
            }
        );
        assert_eq!(cfg.raster.dpi, 203);
        assert_eq!(cfg.raster.color_mode, ColorMode::Luma);
        assert_eq!(cfg.route_for("dhl"), Some(Route::Pdf));
        // Unset sections keep their defaults.
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn load_keeps_carrier_tag_case() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[carriers]
DHL = "pdf"
UPS = "raw"
ups = "pdf"
"#
        )
        .unwrap();

        let cfg = ServiceConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.route_for("DHL"), Some(Route::Pdf));
        assert_eq!(cfg.route_for("dhl"), None);
        assert_eq!(cfg.route_for("UPS"), Some(Route::Raw));
        assert_eq!(cfg.route_for("ups"), Some(Route::Pdf));
        assert_eq!(cfg.route_for("tnt"), Some(Route::Raw));
    }

    #[test]
    fn load_fails_for_missing_named_file() {
        let err = ServiceConfig::load(Some(Path::new("/nonexistent/labelwerk.toml")));
        assert!(matches!(err, Err(LabelwerkError::Config(_))));
    }

    #[test]
    fn token_rejects_empty_and_redacts_debug() {
        assert!(ApiToken::new("").is_err());
        let token = ApiToken::new("s3cret").unwrap();
        assert!(token.matches("s3cret"));
        assert!(!token.matches("s3cre"));
        assert!(!token.matches("s3creT"));
        assert!(!token.matches("s3cret "));
        assert!(!token.matches(""));
        assert_eq!(format!("{token:?}"), "ApiToken(***)");
    }
}
