//! TOML configuration for the `acquisitions` binary.
//!
//! Every section is optional; anything left out falls back to the layout
//! of the appraisal district's bulk exports under `data/`.

use std::path::{Path, PathBuf};

use acquisitions_analytics_models::{DistressCriteria, LargeLandCriteria, UndervaluationCriteria};
use acquisitions_geography_models::LambertParams;
use acquisitions_source::flat_file::DEFAULT_DELIMITER;
use serde::Deserialize;

/// Config file read when neither `--config` nor `ACQUISITIONS_CONFIG` is
/// given. Missing is fine; defaults apply.
pub const DEFAULT_CONFIG_PATH: &str = "acquisitions.toml";

/// Errors that can occur while loading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field was present but unusable.
    #[error("Invalid config value for {field}: {message}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub zoning: ZoningConfig,
    /// Overrides the Texas North Central projection.
    pub projection: Option<LambertParams>,
    pub undervaluation: UndervaluationCriteria,
    pub distress: DistressCriteria,
    pub large_land: LargeLandCriteria,
}

/// Locations of the delimited parcel exports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Current-period primary export.
    pub primary: PathBuf,
    /// Current-period supplemental export (coordinates, condition).
    pub supplemental: Option<PathBuf>,
    /// Prior-period primary export, used for tax-shock and lookups.
    pub prior: Option<PathBuf>,
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("data/PropertyData_R_2025.txt"),
            supplemental: Some(PathBuf::from("data/PropertyDataSupplemental_R_2025.txt")),
            prior: Some(PathBuf::from("data/PropertyData_2024.txt")),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Zoning layers in priority order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoningConfig {
    pub layers: Vec<LayerConfig>,
}

impl Default for ZoningConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                LayerConfig::new("data/ADM_ZONING", "ADM_ZONING.shp"),
                LayerConfig::new(
                    "data/ADM_ZONING_OVERLAY_DISTRICTS",
                    "ADM_ZONING_OVERLAY_DISTRICTS.shp",
                ),
            ],
        }
    }
}

impl ZoningConfig {
    /// Full layer paths in priority order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.layers.iter().map(LayerConfig::path).collect()
    }
}

/// One zoning layer file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerConfig {
    pub dir: PathBuf,
    pub file: String,
}

impl LayerConfig {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file: file.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }
}

impl AppConfig {
    /// Loads `path`, or [`DEFAULT_CONFIG_PATH`] if it exists, or the
    /// built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly given file cannot be read,
    /// or any config file fails to parse or validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    log::debug!("No {DEFAULT_CONFIG_PATH}; using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates TOML config text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or out-of-range values.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.undervaluation.radius_miles.is_nan() || self.undervaluation.radius_miles < 0.0 {
            return Err(ConfigError::Invalid {
                field: "undervaluation.radius_miles",
                message: format!("{} is not a non-negative distance", self.undervaluation.radius_miles),
            });
        }
        if self.large_land.min_acres > self.large_land.max_acres {
            return Err(ConfigError::Invalid {
                field: "large_land.min_acres",
                message: format!(
                    "{} exceeds max_acres {}",
                    self.large_land.min_acres, self.large_land.max_acres
                ),
            });
        }
        if self.data.delimiter == '\n' || self.data.delimiter == '\r' {
            return Err(ConfigError::Invalid {
                field: "data.delimiter",
                message: "line terminators cannot delimit fields".to_string(),
            });
        }
        Ok(())
    }

    /// The configured projection, defaulting to Texas North Central.
    #[must_use]
    pub fn projection_params(&self) -> LambertParams {
        self.projection.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.data.delimiter, '|');
        assert_eq!(
            config.zoning.paths(),
            vec![
                PathBuf::from("data/ADM_ZONING/ADM_ZONING.shp"),
                PathBuf::from(
                    "data/ADM_ZONING_OVERLAY_DISTRICTS/ADM_ZONING_OVERLAY_DISTRICTS.shp"
                ),
            ]
        );
        assert_eq!(config.projection_params(), LambertParams::TEXAS_NORTH_CENTRAL);
        assert_eq!(config.distress, DistressCriteria::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::parse(
            r#"
            [data]
            primary = "exports/current.txt"
            delimiter = ","

            [[zoning.layers]]
            dir = "layers/overlay"
            file = "overlay.geojson"

            [[zoning.layers]]
            dir = "layers/base"
            file = "base.shp"

            [distress]
            max_price_ratio = 0.6

            [large_land]
            min_acres = 50.0
            reference = { lat = 33.0, lon = -97.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.data.primary, PathBuf::from("exports/current.txt"));
        assert_eq!(config.data.delimiter, ',');
        // Unspecified files in a present section still default.
        assert!(config.data.supplemental.is_some());
        assert_eq!(
            config.zoning.paths(),
            vec![
                PathBuf::from("layers/overlay/overlay.geojson"),
                PathBuf::from("layers/base/base.shp"),
            ]
        );
        assert!((config.distress.max_price_ratio - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.distress.min_group_size, 10);
        assert!((config.large_land.min_acres - 50.0).abs() < f64::EPSILON);
        assert!((config.large_land.max_acres - 200.0).abs() < f64::EPSILON);
        assert!((config.large_land.reference.lat - 33.0).abs() < f64::EPSILON);
    }

    #[test]
    fn projection_section_replaces_preset() {
        let config = AppConfig::parse(
            r"
            [projection]
            origin_latitude = 29.666666666666668
            standard_parallel_1 = 30.116666666666667
            standard_parallel_2 = 31.883333333333333
            central_meridian = -100.33333333333333
            false_easting = 2296583.333333333
            false_northing = 9842500.0
            semi_major_axis_m = 6378137.0
            eccentricity_squared = 0.00669438002290
            units_per_meter = 3.2808333333333334
            ",
        )
        .unwrap();
        assert!((config.projection_params().central_meridian + 100.333_333).abs() < 1e-5);
    }

    #[test]
    fn rejects_inverted_acreage_bounds() {
        let err = AppConfig::parse("[large_land]\nmin_acres = 300.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "large_land.min_acres",
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            AppConfig::parse("[data\nprimary = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_explicit_file_and_reports_missing_one() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[undervaluation]\nradius_miles = 0.25").unwrap();
        let config = AppConfig::load(Some(file.path())).unwrap();
        assert!((config.undervaluation.radius_miles - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.undervaluation.min_neighbors, 3);

        let missing = Path::new("/nonexistent/acquisitions.toml");
        let err = AppConfig::load(Some(missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/acquisitions.toml"));
    }
}
