//! Typed M3C2 parameters and their `[General]` parameter file
//!
//! The external engine reads its settings from an INI-style file with a
//! single `[General]` section of `Key=value` lines. [`M3C2Params`] names each
//! key as a field so that callers get compile-time checking, and converts
//! to and from that file format.

use epochcrate_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Section header of the parameter file
pub const GENERAL_SECTION: &str = "General";

/// Index of the `+Z` entry in the engine's preferred-orientation list
pub const ORIENTATION_PLUS_Z: u32 = 4;

/// How the engine estimates normals at core points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalMode {
    /// Single scale given by `normal_scale`
    Default,
    /// Reuse the normals already carried by the first cloud
    UseCloud1Normals,
    /// Pick the best scale between `normal_min_scale` and `normal_max_scale`
    MultiScale,
    Vertical,
    Horizontal,
}

impl NormalMode {
    pub fn code(&self) -> u32 {
        match self {
            NormalMode::Default => 0,
            NormalMode::UseCloud1Normals => 1,
            NormalMode::MultiScale => 2,
            NormalMode::Vertical => 3,
            NormalMode::Horizontal => 4,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(NormalMode::Default),
            1 => Some(NormalMode::UseCloud1Normals),
            2 => Some(NormalMode::MultiScale),
            3 => Some(NormalMode::Vertical),
            4 => Some(NormalMode::Horizontal),
            _ => None,
        }
    }
}

/// Settings passed to an M3C2 computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct M3C2Params {
    pub export_density_at_proj_scale: bool,
    pub export_std_dev_info: bool,
    /// Parameter file format version
    pub version: u32,
    pub max_thread_count: usize,
    /// Minimum neighbours for statistics, see `use_min_points_for_stat`
    pub min_points_for_stat: usize,
    pub normal_max_scale: f64,
    pub normal_min_scale: f64,
    pub normal_mode: NormalMode,
    pub normal_preferred_orientation: u32,
    /// Diameter of the neighbourhood used for normal estimation
    pub normal_scale: f64,
    pub normal_step: f64,
    pub normal_use_core_points: bool,
    /// Precision map scale of the first cloud
    pub pm1_scale: f64,
    /// Precision map scale of the second cloud
    pub pm2_scale: f64,
    pub positive_search_only: bool,
    /// Cloud the core points are projected onto (1 or 2)
    pub projection_destination: u32,
    pub registration_error: f64,
    pub registration_error_enabled: bool,
    /// Maximum cylinder length along the normal
    pub search_depth: f64,
    /// Diameter of the projection cylinder
    pub search_scale: f64,
    pub subsample_enabled: bool,
    pub subsample_radius: f64,
    pub use_median: bool,
    pub use_min_points_for_stat: bool,
    pub use_original_cloud: bool,
    pub use_precision_maps: bool,
    pub use_single_pass_for_depth: bool,
}

impl Default for M3C2Params {
    fn default() -> Self {
        Self {
            export_density_at_proj_scale: false,
            export_std_dev_info: false,
            version: 1,
            max_thread_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            min_points_for_stat: 5,
            normal_max_scale: 0.283607,
            normal_min_scale: 0.070902,
            normal_mode: NormalMode::Default,
            normal_preferred_orientation: ORIENTATION_PLUS_Z,
            normal_scale: 0.141803,
            normal_step: 0.070902,
            normal_use_core_points: false,
            pm1_scale: 1.0,
            pm2_scale: 1.0,
            positive_search_only: false,
            projection_destination: 1,
            registration_error: 0.0,
            registration_error_enabled: false,
            search_depth: 0.709017,
            search_scale: 0.141803,
            subsample_enabled: true,
            subsample_radius: 0.070902,
            use_median: false,
            use_min_points_for_stat: false,
            use_original_cloud: false,
            use_precision_maps: false,
            use_single_pass_for_depth: false,
        }
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::InvalidData(format!("invalid value '{}' for {}: {}", value, key, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::InvalidData(format!(
            "invalid value '{}' for {}: expected true or false",
            other, key
        ))),
    }
}

impl M3C2Params {
    /// Parameter file keys in the order they are written
    pub const KEYS: [&'static str; 27] = [
        "ExportDensityAtProjScale",
        "ExportStdDevInfo",
        "M3C2VER",
        "MaxThreadCount",
        "MinPoints4Stat",
        "NormalMaxScale",
        "NormalMinScale",
        "NormalMode",
        "NormalPreferedOri",
        "NormalScale",
        "NormalStep",
        "NormalUseCorePoints",
        "PM1Scale",
        "PM2Scale",
        "PositiveSearchOnly",
        "ProjDestIndex",
        "RegistrationError",
        "RegistrationErrorEnabled",
        "SearchDepth",
        "SearchScale",
        "SubsampleEnabled",
        "SubsampleRadius",
        "UseMedian",
        "UseMinPoints4Stat",
        "UseOriginalCloud",
        "UsePrecisionMaps",
        "UseSinglePass4Depth",
    ];

    /// `(key, value)` pairs in [`M3C2Params::KEYS`] order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let values = [
            self.export_density_at_proj_scale.to_string(),
            self.export_std_dev_info.to_string(),
            self.version.to_string(),
            self.max_thread_count.to_string(),
            self.min_points_for_stat.to_string(),
            self.normal_max_scale.to_string(),
            self.normal_min_scale.to_string(),
            self.normal_mode.code().to_string(),
            self.normal_preferred_orientation.to_string(),
            self.normal_scale.to_string(),
            self.normal_step.to_string(),
            self.normal_use_core_points.to_string(),
            self.pm1_scale.to_string(),
            self.pm2_scale.to_string(),
            self.positive_search_only.to_string(),
            self.projection_destination.to_string(),
            self.registration_error.to_string(),
            self.registration_error_enabled.to_string(),
            self.search_depth.to_string(),
            self.search_scale.to_string(),
            self.subsample_enabled.to_string(),
            self.subsample_radius.to_string(),
            self.use_median.to_string(),
            self.use_min_points_for_stat.to_string(),
            self.use_original_cloud.to_string(),
            self.use_precision_maps.to_string(),
            self.use_single_pass_for_depth.to_string(),
        ];
        Self::KEYS.into_iter().zip(values).collect()
    }

    /// Set one parameter from its file representation.
    ///
    /// Returns `Ok(false)` for keys this type does not know.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "ExportDensityAtProjScale" => {
                self.export_density_at_proj_scale = parse_bool(key, value)?
            }
            "ExportStdDevInfo" => self.export_std_dev_info = parse_bool(key, value)?,
            "M3C2VER" => self.version = parse_value(key, value)?,
            "MaxThreadCount" => self.max_thread_count = parse_value(key, value)?,
            "MinPoints4Stat" => self.min_points_for_stat = parse_value(key, value)?,
            "NormalMaxScale" => self.normal_max_scale = parse_value(key, value)?,
            "NormalMinScale" => self.normal_min_scale = parse_value(key, value)?,
            "NormalMode" => {
                let code: u32 = parse_value(key, value)?;
                self.normal_mode = NormalMode::from_code(code).ok_or_else(|| {
                    Error::InvalidData(format!("unknown normal mode {}", code))
                })?;
            }
            "NormalPreferedOri" => self.normal_preferred_orientation = parse_value(key, value)?,
            "NormalScale" => self.normal_scale = parse_value(key, value)?,
            "NormalStep" => self.normal_step = parse_value(key, value)?,
            "NormalUseCorePoints" => self.normal_use_core_points = parse_bool(key, value)?,
            "PM1Scale" => self.pm1_scale = parse_value(key, value)?,
            "PM2Scale" => self.pm2_scale = parse_value(key, value)?,
            "PositiveSearchOnly" => self.positive_search_only = parse_bool(key, value)?,
            "ProjDestIndex" => self.projection_destination = parse_value(key, value)?,
            "RegistrationError" => self.registration_error = parse_value(key, value)?,
            "RegistrationErrorEnabled" => self.registration_error_enabled = parse_bool(key, value)?,
            "SearchDepth" => self.search_depth = parse_value(key, value)?,
            "SearchScale" => self.search_scale = parse_value(key, value)?,
            "SubsampleEnabled" => self.subsample_enabled = parse_bool(key, value)?,
            "SubsampleRadius" => self.subsample_radius = parse_value(key, value)?,
            "UseMedian" => self.use_median = parse_bool(key, value)?,
            "UseMinPoints4Stat" => self.use_min_points_for_stat = parse_bool(key, value)?,
            "UseOriginalCloud" => self.use_original_cloud = parse_bool(key, value)?,
            "UsePrecisionMaps" => self.use_precision_maps = parse_bool(key, value)?,
            "UseSinglePass4Depth" => self.use_single_pass_for_depth = parse_bool(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Render the parameter file
    pub fn to_ini_string(&self) -> String {
        let mut out = format!("[{}]\n", GENERAL_SECTION);
        for (key, value) in self.entries() {
            out.push_str(key);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        out
    }

    /// Parse a parameter file.
    ///
    /// Keys missing from the file keep their default. Only the `[General]`
    /// section is read; unknown keys are skipped with a warning.
    pub fn from_ini_str(text: &str) -> Result<Self> {
        let mut params = Self::default();
        let mut in_general = false;

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                in_general = section.trim() == GENERAL_SECTION;
                continue;
            }
            if !in_general {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                Error::InvalidData(format!(
                    "line {}: expected key=value, got '{}'",
                    line_no + 1,
                    line
                ))
            })?;
            let key = key.trim();
            if !params.set(key, value)? {
                warn!(key, line = line_no + 1, "ignoring unknown M3C2 parameter");
            }
        }

        Ok(params)
    }

    /// Write the parameter file to `path`
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_ini_string())?;
        debug!(path = %path.display(), "wrote M3C2 parameter file");
        Ok(())
    }

    /// Read a parameter file from `path`
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_ini_str(&text)
    }

    /// Check that the scales describe a usable computation
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("NormalScale", self.normal_scale),
            ("SearchScale", self.search_scale),
            ("SearchDepth", self.search_depth),
            ("NormalMinScale", self.normal_min_scale),
            ("NormalMaxScale", self.normal_max_scale),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be finite and positive, got {}",
                    key, value
                )));
            }
        }
        if self.normal_min_scale > self.normal_max_scale {
            return Err(Error::InvalidConfig(format!(
                "NormalMinScale {} exceeds NormalMaxScale {}",
                self.normal_min_scale, self.normal_max_scale
            )));
        }
        if self.min_points_for_stat == 0 {
            return Err(Error::InvalidConfig("MinPoints4Stat must be at least 1".to_string()));
        }
        if self.max_thread_count == 0 {
            return Err(Error::InvalidConfig("MaxThreadCount must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_layout() {
        let params = M3C2Params {
            max_thread_count: 8,
            ..Default::default()
        };
        let text = params.to_ini_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "[General]");
        assert_eq!(lines.len(), 28);
        assert_eq!(lines[1], "ExportDensityAtProjScale=false");
        assert!(lines.contains(&"M3C2VER=1"));
        assert!(lines.contains(&"MaxThreadCount=8"));
        assert!(lines.contains(&"NormalMaxScale=0.283607"));
        assert!(lines.contains(&"NormalPreferedOri=4"));
        assert!(lines.contains(&"PM1Scale=1"));
        assert!(lines.contains(&"SearchDepth=0.709017"));
        assert!(lines.contains(&"SubsampleEnabled=true"));
        assert_eq!(lines[27], "UseSinglePass4Depth=false");
    }

    #[test]
    fn test_parse_reads_back_written_file() {
        let params = M3C2Params {
            normal_mode: NormalMode::MultiScale,
            use_precision_maps: true,
            search_scale: 0.25,
            ..Default::default()
        };
        assert_eq!(M3C2Params::from_ini_str(&params.to_ini_string()).unwrap(), params);
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let text = "; written by hand\n\
                    [General]\nUseMedian = TRUE\nSearchDepth=1.5\n\n\
                    [Other]\nUseMedian=false\n";
        let params = M3C2Params::from_ini_str(text).unwrap();
        assert!(params.use_median);
        assert_eq!(params.search_depth, 1.5);
        assert_eq!(params.search_scale, M3C2Params::default().search_scale);
    }

    #[test]
    fn test_parse_skips_unknown_keys() {
        let text = "[General]\nSomethingNew=3\nNormalStep=0.1\n";
        let params = M3C2Params::from_ini_str(text).unwrap();
        assert_eq!(params.normal_step, 0.1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            M3C2Params::from_ini_str("[General]\nUseMedian=maybe\n"),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            M3C2Params::from_ini_str("[General]\nSearchDepth=deep\n"),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            M3C2Params::from_ini_str("[General]\nNormalMode=9\n"),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            M3C2Params::from_ini_str("[General]\nno separator\n"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(M3C2Params::default().validate().is_ok());

        let bad = [
            M3C2Params { search_scale: 0.0, ..Default::default() },
            M3C2Params { normal_scale: f64::NAN, ..Default::default() },
            M3C2Params { normal_min_scale: 1.0, normal_max_scale: 0.5, ..Default::default() },
            M3C2Params { normal_min_scale: f64::NAN, ..Default::default() },
            M3C2Params { normal_max_scale: f64::NAN, ..Default::default() },
            M3C2Params { normal_max_scale: f64::INFINITY, ..Default::default() },
            M3C2Params { min_points_for_stat: 0, ..Default::default() },
            M3C2Params { max_thread_count: 0, ..Default::default() },
        ];
        for params in bad {
            assert!(matches!(params.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_normal_mode_codes() {
        for code in 0..5 {
            assert_eq!(NormalMode::from_code(code).unwrap().code(), code);
        }
        assert!(NormalMode::from_code(5).is_none());
    }
}
