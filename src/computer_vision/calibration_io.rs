//! Calibration scale as JSON
//!
//! ```json
//! { "map_param": 0.0473 }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::coordinate_transform::CalibrationScale;

#[derive(Serialize, Deserialize)]
struct CalibrationJson {
    map_param: f64,
}

pub fn scale_to_json(scale: &CalibrationScale) -> Result<String> {
    let json_data = CalibrationJson { map_param: scale.value() };
    Ok(serde_json::to_string_pretty(&json_data)?)
}

pub fn json_to_scale(json_str: &str) -> Result<CalibrationScale> {
    let json_data: CalibrationJson =
        serde_json::from_str(json_str).context("Calibration JSON is not readable")?;
    Ok(CalibrationScale::new(json_data.map_param)?)
}

pub fn load_calibration<P: AsRef<Path>>(path: P) -> Result<CalibrationScale> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read calibration from {}", path.display()))?;
    json_to_scale(&contents).with_context(|| format!("Invalid calibration in {}", path.display()))
}

pub fn save_calibration<P: AsRef<Path>>(path: P, scale: &CalibrationScale) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, scale_to_json(scale)?)
        .with_context(|| format!("Failed to write calibration to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_serialization() {
        let scale = CalibrationScale::new(0.0473).unwrap();
        let json = scale_to_json(&scale).unwrap();
        assert!(json.contains("map_param"));
        assert_eq!(json_to_scale(&json).unwrap(), scale);
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(json_to_scale("{ \"map_param\": -1.0 }").is_err());
        assert!(json_to_scale("{ \"scale\": 0.05 }").is_err());
        assert!(json_to_scale("not json").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_calibration("src/tests/data/no_such_calibration.json").unwrap_err();
        assert!(format!("{:#}", err).contains("no_such_calibration.json"));
    }
}
