use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::geometry::{DmsFormat, EARTH_RADIUS_KM, SphericalPoint, to_bearing, to_lat, to_lon};
use crate::transform::DEFAULT_KINK_M;

/// How points are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Signed decimal degrees
    #[default]
    Decimal,
    /// Decimal degrees with hemisphere letters
    D,
    /// Degrees and decimal minutes
    Dm,
    /// Degrees, minutes and seconds
    Dms,
}

impl OutputFormat {
    fn dms(self) -> Option<DmsFormat> {
        match self {
            OutputFormat::Decimal => None,
            OutputFormat::D => Some(DmsFormat::D),
            OutputFormat::Dm => Some(DmsFormat::Dm),
            OutputFormat::Dms => Some(DmsFormat::Dms),
        }
    }

    /// Render a point as `lat, lon`
    ///
    /// `precision` is the decimal count for decimal output; DMS layouts use
    /// their own defaults.
    pub fn point(self, point: &SphericalPoint, precision: usize) -> String {
        match self.dms() {
            None => format!(
                "{:.*}, {:.*}",
                precision,
                point.lat(),
                precision,
                point.lon()
            ),
            Some(format) => format!(
                "{}, {}",
                to_lat(point.lat(), format, None),
                to_lon(point.lon(), format, None)
            ),
        }
    }

    /// Render a compass bearing
    pub fn bearing(self, degrees: f64, precision: usize) -> String {
        match self.dms() {
            None => format!("{:.*}", precision, degrees),
            Some(format) => to_bearing(degrees, format, None),
        }
    }
}

fn default_radius_km() -> f64 {
    EARTH_RADIUS_KM
}
fn default_kink_m() -> f64 {
    DEFAULT_KINK_M
}
fn default_steps() -> usize {
    1
}
fn default_verbose() -> bool {
    false
}
fn default_correspondence() -> [usize; 2] {
    [0, 3]
}
fn default_precision() -> usize {
    6
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct FileConfig {
    /// Sphere radius in km for translations
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// Simplification threshold in meters
    #[serde(default = "default_kink_m")]
    pub kink_m: f64,
    /// Interpolation steps for rotate and translate
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    /// Vertex indices used as correspondences by `euler`
    #[serde(default = "default_correspondence")]
    pub correspondence: [usize; 2],
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            kink_m: default_kink_m(),
            steps: default_steps(),
            verbose: default_verbose(),
            correspondence: default_correspondence(),
            format: OutputFormat::default(),
            precision: default_precision(),
        }
    }
}

impl FileConfig {
    /// First parseable config file from the search paths
    pub fn load() -> Option<Self> {
        Self::load_from(&get_config_paths())
    }

    fn load_from(paths: &[PathBuf]) -> Option<Self> {
        for path in paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Read one config file, failing on a missing or malformed file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("geoshift.toml"));
    paths.push(PathBuf::from(".geoshift.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("geoshift").join("config.toml"));
        paths.push(config_dir.join("geoshift.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".geoshift.toml"));
        paths.push(home.join(".config").join("geoshift").join("config.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: FileConfig = toml::from_str("kink_m = 250.0").unwrap();
        assert_eq!(config.kink_m, 250.0);
        assert_eq!(config.radius_km, 6371.0);
        assert_eq!(config.steps, 1);
        assert_eq!(config.correspondence, [0, 3]);
        assert_eq!(config.format, OutputFormat::Decimal);
        assert_eq!(config.precision, 6);
        assert!(!config.verbose);

        let empty: FileConfig = toml::from_str("").unwrap();
        assert_eq!(empty, FileConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config: FileConfig = toml::from_str(
            r#"
            radius_km = 6378.137
            steps = 10
            verbose = true
            correspondence = [1, 2]
            format = "dms"
            "#,
        )
        .unwrap();
        assert_eq!(config.radius_km, 6378.137);
        assert_eq!(config.steps, 10);
        assert!(config.verbose);
        assert_eq!(config.correspondence, [1, 2]);
        assert_eq!(config.format, OutputFormat::Dms);
    }

    #[test]
    fn test_load_skips_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        fs::write(&broken, "steps = \"many\"").unwrap();
        fs::write(&good, "steps = 4").unwrap();

        let config = FileConfig::load_from(&[missing.clone(), broken.clone(), good]).unwrap();
        assert_eq!(config.steps, 4);

        assert!(FileConfig::load_from(&[missing.clone(), broken.clone()]).is_none());
        assert!(FileConfig::from_path(&missing).is_err());
        assert!(FileConfig::from_path(&broken).is_err());
    }

    #[test]
    fn test_format_point() {
        let point = SphericalPoint::new(50.5363269, 1.2746141).unwrap();
        assert_eq!(OutputFormat::Decimal.point(&point, 4), "50.5363, 1.2746");
        assert_eq!(
            OutputFormat::D.point(&point, 4),
            "50.5363\u{00B0}N, 001.2746\u{00B0}E"
        );
        assert_eq!(
            OutputFormat::Dms.point(&point, 0),
            "50\u{00B0}32\u{2032}11\u{2033}N, 001\u{00B0}16\u{2032}29\u{2033}E"
        );
    }

    #[test]
    fn test_format_bearing() {
        assert_eq!(OutputFormat::Decimal.bearing(156.1678, 2), "156.17");
        assert_eq!(OutputFormat::Dm.bearing(-90.0, 0), "270\u{00B0}00.00\u{2032}");
    }
}
