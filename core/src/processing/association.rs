use std::collections::HashMap;
use std::sync::Arc;

use crate::math::geodesy::geodesic_distance;
use crate::model::{CellIdentifier, Sample, Tower};
use crate::prelude::CoreResult;
use crate::processing::directory::TowerDirectory;
use crate::telemetry::{LogManager, MetricsRecorder};

/// Towers with their bound samples, plus the trace indices left unbound.
#[derive(Debug, Clone, Default)]
pub struct Association {
    towers: Vec<Tower>,
    index: HashMap<CellIdentifier, usize>,
    excluded: Vec<usize>,
}

impl Association {
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn tower(&self, identifier: &CellIdentifier) -> Option<&Tower> {
        self.index.get(identifier).map(|&slot| &self.towers[slot])
    }

    /// Trace positions of samples whose cell did not resolve to a tower.
    pub fn excluded(&self) -> &[usize] {
        &self.excluded
    }

    pub fn associated_count(&self) -> usize {
        self.towers.iter().map(Tower::len).sum()
    }
}

/// Partitions a trace across the towers of a directory.
pub struct SampleAssociator {
    metrics: Option<Arc<MetricsRecorder>>,
    logger: LogManager,
}

impl SampleAssociator {
    pub fn new() -> Self {
        Self {
            metrics: None,
            logger: LogManager::new("association"),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn associate(
        &self,
        directory: &TowerDirectory,
        samples: &[Sample],
    ) -> CoreResult<Association> {
        let mut buckets: Vec<Vec<Sample>> = vec![Vec::new(); directory.len()];
        let mut excluded = Vec::new();

        for (position, sample) in samples.iter().enumerate() {
            sample.validate()?;
            match directory.slot(&sample.identifier) {
                Some(slot) => buckets[slot].push(sample.clone()),
                None => excluded.push(position),
            }
        }

        let mut association = Association {
            towers: Vec::with_capacity(directory.len()),
            index: HashMap::with_capacity(directory.len()),
            excluded,
        };

        for (site, bound) in directory.sites().iter().zip(buckets) {
            let origin = (site.latitude, site.longitude);
            let distances = bound
                .iter()
                .map(|sample| geodesic_distance(origin, sample.position()))
                .collect();
            let powers = bound.iter().map(|sample| sample.signal).collect();

            self.logger
                .detail(&format!("tower {} bound {} samples", site.identifier, bound.len()));
            association
                .index
                .insert(site.identifier, association.towers.len());
            association
                .towers
                .push(Tower::assemble(site.clone(), bound, distances, powers)?);
        }

        let associated = association.associated_count();
        self.logger.record(&format!(
            "associated {} samples across {} towers, {} excluded",
            associated,
            association.towers.len(),
            association.excluded.len()
        ));
        if let Some(metrics) = &self.metrics {
            metrics.record_associated(associated);
            metrics.record_excluded(association.excluded.len());
        }

        Ok(association)
    }
}

impl Default for SampleAssociator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample::sample_at;
    use crate::processing::directory::{reference_row, TowerDirectoryBuilder};
    use crate::prelude::CoreError;

    fn build(samples: &[Sample], reference: &[crate::model::ReferenceCell]) -> Association {
        let directory = TowerDirectoryBuilder::default().build(samples, reference).unwrap();
        SampleAssociator::new().associate(&directory, samples).unwrap()
    }

    #[test]
    fn three_samples_bind_to_one_tower_in_trace_order() {
        let id = CellIdentifier::new(302, 720, 1001, 55);
        let mut samples = vec![
            sample_at(id, 45.4140, -75.7000),
            sample_at(id, 45.4150, -75.7010),
            sample_at(id, 45.4160, -75.7020),
        ];
        for (i, sample) in samples.iter_mut().enumerate() {
            sample.signal = -70.0 - i as f64;
        }
        let reference = vec![reference_row(id, 45.4140, -75.7000)];

        let association = build(&samples, &reference);
        assert_eq!(association.towers().len(), 1);

        let tower = association.tower(&id).unwrap();
        assert_eq!(tower.samples(), samples.as_slice());
        assert_eq!(tower.distances().len(), 3);
        assert_eq!(tower.powers(), &[-70.0, -71.0, -72.0]);
        assert_eq!(tower.distances()[0], 0.0);
        assert!(tower.distances()[1] < tower.distances()[2]);
    }

    #[test]
    fn association_partitions_the_resolved_samples() {
        let a = CellIdentifier::new(302, 720, 1001, 55);
        let b = CellIdentifier::new(302, 720, 1001, 56);
        let orphan = CellIdentifier::new(302, 720, 9999, 1);
        let samples = vec![
            sample_at(a, 45.41, -75.70),
            sample_at(orphan, 45.41, -75.70),
            sample_at(b, 45.42, -75.70),
            sample_at(a, 45.43, -75.70),
            sample_at(orphan, 45.44, -75.70),
        ];
        let reference = vec![reference_row(b, 45.40, -75.69), reference_row(a, 45.41, -75.70)];

        let association = build(&samples, &reference);
        assert_eq!(association.excluded(), &[1, 4]);
        assert_eq!(association.associated_count(), 3);
        assert_eq!(association.tower(&a).unwrap().len(), 2);
        assert_eq!(association.tower(&b).unwrap().len(), 1);
        assert!(association.tower(&orphan).is_none());
        for tower in association.towers() {
            assert!(tower.samples().iter().all(|s| s.identifier == tower.identifier()));
        }
    }

    #[test]
    fn association_is_idempotent() {
        let a = CellIdentifier::new(302, 720, 1001, 55);
        let samples = vec![sample_at(a, 45.41, -75.70), sample_at(a, 45.42, -75.71)];
        let reference = vec![reference_row(a, 45.40, -75.69)];
        let directory = TowerDirectoryBuilder::default().build(&samples, &reference).unwrap();

        let associator = SampleAssociator::new();
        let first = associator.associate(&directory, &samples).unwrap();
        let second = associator.associate(&directory, &samples).unwrap();
        assert_eq!(first.towers(), second.towers());
    }

    #[test]
    fn malformed_sample_stops_association() {
        let a = CellIdentifier::new(302, 720, 1001, 55);
        let good = vec![sample_at(a, 45.41, -75.70)];
        let reference = vec![reference_row(a, 45.40, -75.69)];
        let directory = TowerDirectoryBuilder::default().build(&good, &reference).unwrap();

        let bad = vec![sample_at(a, 45.41, f64::INFINITY)];
        let result = SampleAssociator::new().associate(&directory, &bad);
        assert!(matches!(result, Err(CoreError::MalformedInput(_))));
    }
}
