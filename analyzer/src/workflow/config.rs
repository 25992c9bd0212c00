use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use walkcore::model::CellIdentifier;
use walkcore::processing::{DirectoryPolicy, ModelParameters, DEFAULT_CORRECTION_FACTOR};

/// Unit of the `direction` column in trace CSVs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingUnit {
    #[default]
    Degrees,
    Radians,
}

impl HeadingUnit {
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            HeadingUnit::Degrees => value.to_radians(),
            HeadingUnit::Radians => value,
        }
    }
}

/// Distances the propagation curves are evaluated at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 350.0,
            points: 250,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub curves: Vec<ModelParameters>,
    pub grid: GridConfig,
    pub correction_factor: f64,
    pub directory: DirectoryPolicy,
    pub heading_unit: HeadingUnit,
    /// Restricts the tower section of the report to one cell.
    pub tower: Option<CellIdentifier>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            curves: ModelParameters::standard_overlays(),
            grid: GridConfig::default(),
            correction_factor: DEFAULT_CORRECTION_FACTOR,
            directory: DirectoryPolicy::default(),
            heading_unit: HeadingUnit::default(),
            tower: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(correction_factor: f64, tower: Option<CellIdentifier>) -> Self {
        Self {
            correction_factor,
            tower,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use walkcore::processing::{Dimension, DuplicateReferencePolicy};

    #[test]
    fn config_from_args_keeps_standard_overlays() {
        let cfg = WorkflowConfig::from_args(1.05, None);
        assert_eq!(cfg.correction_factor, 1.05);
        assert_eq!(cfg.curves.len(), 8);
        assert_eq!(cfg.grid.points, 250);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"correction_factor: 1.02\n\
              heading_unit: radians\n\
              grid: {start: 5.0, end: 100.0, points: 20}\n\
              curves:\n  - {obstacle_density: 0.3, absorption: 0.4, dimension: 3d}\n\
              directory: {duplicates: last_wins}\n\
              tower: {mcc: 302, mnc: 720, lac: 1001, cellid: 55}\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();

        assert_eq!(cfg.correction_factor, 1.02);
        assert_eq!(cfg.heading_unit, HeadingUnit::Radians);
        assert_eq!(cfg.grid.points, 20);
        assert_eq!(cfg.curves.len(), 1);
        assert_eq!(cfg.curves[0].dimension, Dimension::Spatial);
        assert_eq!(cfg.directory.duplicates, DuplicateReferencePolicy::LastWins);
        assert_eq!(cfg.tower, Some(CellIdentifier::new(302, 720, 1001, 55)));
    }

    #[test]
    fn heading_unit_converts_degrees() {
        assert!((HeadingUnit::Degrees.to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(HeadingUnit::Radians.to_radians(1.5), 1.5);
    }
}
