pub mod association;
pub mod directory;
pub mod positioning;
pub mod propagation;

pub use association::{Association, SampleAssociator};
pub use directory::{
    distinct_identifiers, DirectoryPolicy, DuplicateReferencePolicy, TowerDirectory,
    TowerDirectoryBuilder, UnmatchedCellPolicy,
};
pub use positioning::{CorrectedPosition, Correction, PositionCorrector, DEFAULT_CORRECTION_FACTOR};
pub use propagation::{
    distance_grid, evaluate_overlays, CurvePoint, Dimension, ModelParameters, PropagationCurve,
    RandomWalkModel,
};
