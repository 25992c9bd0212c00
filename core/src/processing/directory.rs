use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::model::{CellIdentifier, ReferenceCell, Sample, TowerSite};
use crate::prelude::{CoreError, CoreResult};
use crate::telemetry::{LogManager, MetricsRecorder};

/// Which reference row wins when the table lists a cell more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReferencePolicy {
    #[default]
    FirstWins,
    LastWins,
    Reject,
}

/// What happens to trace cells missing from the reference table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedCellPolicy {
    #[default]
    Drop,
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryPolicy {
    pub duplicates: DuplicateReferencePolicy,
    pub unmatched: UnmatchedCellPolicy,
}

/// Resolved towers keyed by identifier, in order of first appearance in the trace.
#[derive(Debug, Clone, Default)]
pub struct TowerDirectory {
    sites: Vec<TowerSite>,
    index: HashMap<CellIdentifier, usize>,
    unresolved: Vec<CellIdentifier>,
}

impl TowerDirectory {
    pub fn get(&self, identifier: &CellIdentifier) -> Option<&TowerSite> {
        self.index.get(identifier).map(|&slot| &self.sites[slot])
    }

    pub fn contains(&self, identifier: &CellIdentifier) -> bool {
        self.index.contains_key(identifier)
    }

    pub(crate) fn slot(&self, identifier: &CellIdentifier) -> Option<usize> {
        self.index.get(identifier).copied()
    }

    pub fn sites(&self) -> &[TowerSite] {
        &self.sites
    }

    /// Trace cells that had no reference row.
    pub fn unresolved(&self) -> &[CellIdentifier] {
        &self.unresolved
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Distinct cell identifiers in order of first appearance.
pub fn distinct_identifiers(samples: &[Sample]) -> Vec<CellIdentifier> {
    let mut seen = HashSet::new();
    samples
        .iter()
        .map(|sample| sample.identifier)
        .filter(|identifier| seen.insert(*identifier))
        .collect()
}

/// Scans a trace for serving cells and resolves them against the reference table.
pub struct TowerDirectoryBuilder {
    policy: DirectoryPolicy,
    metrics: Option<Arc<MetricsRecorder>>,
    logger: LogManager,
}

impl TowerDirectoryBuilder {
    pub fn new(policy: DirectoryPolicy) -> Self {
        Self {
            policy,
            metrics: None,
            logger: LogManager::new("directory"),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(
        &self,
        samples: &[Sample],
        reference: &[ReferenceCell],
    ) -> CoreResult<TowerDirectory> {
        let mut rows_by_cell: HashMap<CellIdentifier, Vec<usize>> = HashMap::new();
        for (row, cell) in reference.iter().enumerate() {
            rows_by_cell.entry(cell.identifier).or_default().push(row);
        }

        let mut directory = TowerDirectory::default();
        for identifier in distinct_identifiers(samples) {
            let Some(rows) = rows_by_cell.get(&identifier) else {
                self.handle_unmatched(identifier)?;
                directory.unresolved.push(identifier);
                continue;
            };

            let row = match self.policy.duplicates {
                DuplicateReferencePolicy::FirstWins => rows[0],
                DuplicateReferencePolicy::LastWins => rows[rows.len() - 1],
                DuplicateReferencePolicy::Reject if rows.len() > 1 => {
                    return Err(CoreError::DuplicateReference(identifier));
                }
                DuplicateReferencePolicy::Reject => rows[0],
            };
            if rows.len() > 1 {
                self.logger.detail(&format!(
                    "cell {} listed {} times in reference table, using row {}",
                    identifier,
                    rows.len(),
                    row
                ));
            }

            let cell = &reference[row];
            cell.validate()?;
            directory.index.insert(identifier, directory.sites.len());
            directory.sites.push(TowerSite::from(cell));
            if let Some(metrics) = &self.metrics {
                metrics.record_resolved();
            }
        }

        self.logger.record(&format!(
            "resolved {} towers, {} cells without reference",
            directory.sites.len(),
            directory.unresolved.len()
        ));
        Ok(directory)
    }

    fn handle_unmatched(&self, identifier: CellIdentifier) -> CoreResult<()> {
        match self.policy.unmatched {
            UnmatchedCellPolicy::Drop => {
                self.logger
                    .warn(&format!("cell {} has no reference row, dropping", identifier));
                if let Some(metrics) = &self.metrics {
                    metrics.record_unresolved();
                }
                Ok(())
            }
            UnmatchedCellPolicy::Reject => Err(CoreError::UnresolvedCell(identifier)),
        }
    }
}

impl Default for TowerDirectoryBuilder {
    fn default() -> Self {
        Self::new(DirectoryPolicy::default())
    }
}

#[cfg(test)]
pub(crate) fn reference_row(
    identifier: CellIdentifier,
    latitude: f64,
    longitude: f64,
) -> ReferenceCell {
    ReferenceCell {
        radio: crate::model::RadioType::Lte,
        identifier,
        longitude,
        latitude,
        range: 1500.0,
        samples: 40,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample::sample_at;

    fn ids() -> (CellIdentifier, CellIdentifier, CellIdentifier) {
        (
            CellIdentifier::new(302, 720, 1001, 55),
            CellIdentifier::new(302, 720, 1001, 56),
            CellIdentifier::new(302, 610, 2002, 7),
        )
    }

    #[test]
    fn distinct_identifiers_keep_first_appearance_order() {
        let (a, b, c) = ids();
        let samples = vec![
            sample_at(b, 45.0, -75.0),
            sample_at(a, 45.0, -75.0),
            sample_at(b, 45.0, -75.0),
            sample_at(c, 45.0, -75.0),
        ];
        assert_eq!(distinct_identifiers(&samples), vec![b, a, c]);
    }

    #[test]
    fn directory_holds_one_tower_per_matched_cell() {
        let (a, b, c) = ids();
        let samples = vec![
            sample_at(a, 45.0, -75.0),
            sample_at(b, 45.0, -75.0),
            sample_at(a, 45.0, -75.0),
            sample_at(c, 45.0, -75.0),
        ];
        let reference = vec![reference_row(a, 45.41, -75.70), reference_row(c, 45.42, -75.69)];

        let metrics = Arc::new(MetricsRecorder::new());
        let directory = TowerDirectoryBuilder::default()
            .with_metrics(metrics.clone())
            .build(&samples, &reference)
            .unwrap();

        assert_eq!(directory.len(), 2);
        assert!(directory.contains(&a));
        assert!(directory.contains(&c));
        assert!(!directory.contains(&b));
        assert_eq!(directory.unresolved(), &[b]);
        assert_eq!(metrics.snapshot().towers_resolved, 2);
        assert_eq!(metrics.snapshot().cells_unresolved, 1);
    }

    #[test]
    fn duplicate_reference_rows_follow_policy() {
        let (a, _, _) = ids();
        let samples = vec![sample_at(a, 45.0, -75.0)];
        let reference = vec![reference_row(a, 45.41, -75.70), reference_row(a, 46.0, -76.0)];

        let first = TowerDirectoryBuilder::default().build(&samples, &reference).unwrap();
        assert_eq!(first.get(&a).unwrap().latitude, 45.41);

        let last = TowerDirectoryBuilder::new(DirectoryPolicy {
            duplicates: DuplicateReferencePolicy::LastWins,
            ..Default::default()
        })
        .build(&samples, &reference)
        .unwrap();
        assert_eq!(last.get(&a).unwrap().latitude, 46.0);

        let strict = TowerDirectoryBuilder::new(DirectoryPolicy {
            duplicates: DuplicateReferencePolicy::Reject,
            ..Default::default()
        })
        .build(&samples, &reference);
        assert_eq!(strict.unwrap_err(), CoreError::DuplicateReference(a));
    }

    #[test]
    fn unmatched_cells_can_be_rejected() {
        let (a, b, _) = ids();
        let samples = vec![sample_at(a, 45.0, -75.0), sample_at(b, 45.0, -75.0)];
        let reference = vec![reference_row(a, 45.41, -75.70)];

        let result = TowerDirectoryBuilder::new(DirectoryPolicy {
            unmatched: UnmatchedCellPolicy::Reject,
            ..Default::default()
        })
        .build(&samples, &reference);
        assert_eq!(result.unwrap_err(), CoreError::UnresolvedCell(b));
    }

    #[test]
    fn malformed_matched_row_is_surfaced() {
        let (a, _, _) = ids();
        let samples = vec![sample_at(a, 45.0, -75.0)];
        let reference = vec![reference_row(a, f64::NAN, -75.70)];
        let result = TowerDirectoryBuilder::default().build(&samples, &reference);
        assert!(matches!(result, Err(CoreError::MalformedInput(_))));
    }

    #[test]
    fn policy_reads_from_config_labels() {
        let policy: DirectoryPolicy =
            serde_json::from_str(r#"{"duplicates": "last_wins"}"#).unwrap();
        assert_eq!(policy.duplicates, DuplicateReferencePolicy::LastWins);
        assert_eq!(policy.unmatched, UnmatchedCellPolicy::Drop);
    }
}
