pub mod identifier;
pub mod sample;
pub mod tower;

pub use identifier::CellIdentifier;
pub use sample::{AccessTechnology, Sample};
pub use tower::{RadioType, ReferenceCell, Tower, TowerSite};
