use anyhow::{ensure, Context};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use walkcore::model::{AccessTechnology, CellIdentifier, Sample};

use crate::workflow::config::HeadingUnit;

/// One line of a measurement trace export.
#[derive(Debug, Deserialize)]
struct TraceRow {
    mcc: u16,
    mnc: u16,
    lac: u32,
    cellid: u64,
    lat: f64,
    lon: f64,
    signal: f64,
    measured_at: i64,
    rating: f64,
    speed: f64,
    direction: f64,
    act: AccessTechnology,
    ta: Option<u32>,
    tac: Option<u32>,
    pci: Option<u16>,
}

impl TraceRow {
    fn into_sample(self, heading_unit: HeadingUnit) -> Sample {
        Sample {
            identifier: CellIdentifier::new(self.mcc, self.mnc, self.lac, self.cellid),
            latitude: self.lat,
            longitude: self.lon,
            signal: self.signal,
            measured_at: self.measured_at,
            rating: self.rating,
            speed: self.speed,
            direction: heading_unit.to_radians(self.direction),
            access_type: self.act,
            timing_advance: self.ta,
            tac: self.tac,
            pci: self.pci,
        }
    }
}

pub fn read_trace<R: Read>(reader: R, heading_unit: HeadingUnit) -> anyhow::Result<Vec<Sample>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (index, row) in csv_reader.deserialize::<TraceRow>().enumerate() {
        // Line 1 is the header.
        let row = row.with_context(|| format!("parsing trace line {}", index + 2))?;
        let sample = row.into_sample(heading_unit);
        sample
            .validate()
            .with_context(|| format!("validating trace line {}", index + 2))?;
        samples.push(sample);
    }
    Ok(samples)
}

pub fn load_trace<P: AsRef<Path>>(
    path: P,
    heading_unit: HeadingUnit,
) -> anyhow::Result<Vec<Sample>> {
    let path_ref = path.as_ref();
    let file = std::fs::File::open(path_ref)
        .with_context(|| format!("opening trace {}", path_ref.display()))?;
    let samples = read_trace(file, heading_unit)
        .with_context(|| format!("reading trace {}", path_ref.display()))?;
    ensure!(!samples.is_empty(), "trace {} has no samples", path_ref.display());
    Ok(samples)
}
