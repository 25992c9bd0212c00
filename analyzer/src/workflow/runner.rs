use crate::workflow::config::WorkflowConfig;
use anyhow::{anyhow, Context};
use serde::Serialize;
use std::sync::Arc;
use walkcore::math::StatsHelper;
use walkcore::model::{CellIdentifier, ReferenceCell, Sample, Tower, TowerSite};
use walkcore::processing::{
    distance_grid, evaluate_overlays, CorrectedPosition, PositionCorrector, PropagationCurve,
    SampleAssociator, TowerDirectoryBuilder,
};
use walkcore::telemetry::{MetricsRecorder, MetricsSnapshot};

#[derive(Debug, Clone, Serialize)]
pub struct TowerSummary {
    pub site: TowerSite,
    pub sample_count: usize,
    pub mean_power: Option<f64>,
    /// (distance m, power dBm) in trace order.
    pub power_vs_distance: Vec<(f64, f64)>,
}

impl From<&Tower> for TowerSummary {
    fn from(tower: &Tower) -> Self {
        Self {
            site: tower.site().clone(),
            sample_count: tower.len(),
            mean_power: tower.mean_power(),
            power_vs_distance: tower.power_vs_distance().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub samples: usize,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub mean_lat_step: Option<f64>,
    pub mean_lon_step: Option<f64>,
}

impl TrackSummary {
    fn from_samples(samples: &[Sample]) -> Self {
        let lats: Vec<f64> = samples.iter().map(|s| s.latitude).collect();
        let lons: Vec<f64> = samples.iter().map(|s| s.longitude).collect();
        Self {
            samples: samples.len(),
            start_ms: samples.first().map(|s| s.measured_at),
            end_ms: samples.last().map(|s| s.measured_at),
            mean_lat_step: StatsHelper::mean_step(&lats),
            mean_lon_step: StatsHelper::mean_step(&lons),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub towers: Vec<TowerSummary>,
    pub unresolved_cells: Vec<CellIdentifier>,
    pub excluded_samples: usize,
    pub curves: Vec<PropagationCurve>,
    pub corrected_track: Vec<CorrectedPosition>,
    pub track: TrackSummary,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(
        &self,
        samples: &[Sample],
        reference: &[ReferenceCell],
    ) -> anyhow::Result<WorkflowResult> {
        let metrics = Arc::new(MetricsRecorder::new());

        let directory = TowerDirectoryBuilder::new(self.config.directory)
            .with_metrics(metrics.clone())
            .build(samples, reference)
            .context("building tower directory")?;

        let association = SampleAssociator::new()
            .with_metrics(metrics.clone())
            .associate(&directory, samples)
            .context("associating samples with towers")?;

        let towers = match &self.config.tower {
            Some(identifier) => {
                let tower = association
                    .tower(identifier)
                    .ok_or_else(|| anyhow!("tower {} not found in trace", identifier))?;
                vec![TowerSummary::from(tower)]
            }
            None => association.towers().iter().map(TowerSummary::from).collect(),
        };

        let grid_config = self.config.grid;
        let grid = distance_grid(grid_config.start, grid_config.end, grid_config.points)
            .context("building distance grid")?;
        let curves = evaluate_overlays(&self.config.curves, &grid)
            .context("evaluating propagation curves")?;

        let corrected_track = PositionCorrector::new(self.config.correction_factor)
            .context("configuring position corrector")?
            .with_metrics(metrics.clone())
            .correct(samples)
            .context("correcting track positions")?;

        Ok(WorkflowResult {
            towers,
            unresolved_cells: directory.unresolved().to_vec(),
            excluded_samples: association.excluded().len(),
            curves,
            corrected_track,
            track: TrackSummary::from_samples(samples),
            metrics: metrics.snapshot(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_trace, near_cell, unlisted_cell};

    #[test]
    fn runner_executes_workflow() {
        let cfg = WorkflowConfig::default();
        let runner = Runner::new(cfg.clone());
        let trace = build_trace(60, 3).unwrap();
        let result = runner.execute(&trace.samples, &trace.reference).unwrap();

        assert_eq!(result.unresolved_cells, vec![unlisted_cell()]);
        assert_eq!(result.excluded_samples, 6);
        let associated: usize = result.towers.iter().map(|t| t.sample_count).sum();
        assert_eq!(associated, 54);
        assert_eq!(result.metrics.samples_associated, 54);
        assert_eq!(result.curves.len(), cfg.curves.len());
        assert_eq!(result.corrected_track.len(), 59);
        assert_eq!(result.track.samples, 60);
    }

    #[test]
    fn first_reference_row_wins_for_duplicates() {
        let trace = build_trace(20, 1).unwrap();
        let result = Runner::new(WorkflowConfig::default())
            .execute(&trace.samples, &trace.reference)
            .unwrap();
        let near = result
            .towers
            .iter()
            .find(|t| t.site.identifier == near_cell())
            .unwrap();
        assert_eq!(near.site.declared_samples, 35);
    }

    #[test]
    fn selected_tower_limits_the_report() {
        let trace = build_trace(60, 3).unwrap();
        let cfg = WorkflowConfig::from_args(1.01, Some(near_cell()));
        let result = Runner::new(cfg).execute(&trace.samples, &trace.reference).unwrap();
        assert_eq!(result.towers.len(), 1);
        assert_eq!(result.towers[0].site.identifier, near_cell());
        assert_eq!(
            result.towers[0].power_vs_distance.len(),
            result.towers[0].sample_count
        );

        let missing = WorkflowConfig::from_args(1.01, Some(CellIdentifier::new(1, 1, 1, 1)));
        assert!(Runner::new(missing).execute(&trace.samples, &trace.reference).is_err());
    }

    #[test]
    fn invalid_curve_parameters_fail_the_run() {
        let trace = build_trace(10, 0).unwrap();
        let mut cfg = WorkflowConfig::default();
        cfg.curves[0].absorption = 1.5;
        let err = Runner::new(cfg).execute(&trace.samples, &trace.reference).unwrap_err();
        assert!(format!("{:#}", err).contains("propagation"));
    }
}
