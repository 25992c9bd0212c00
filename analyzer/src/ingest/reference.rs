use anyhow::Context;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use walkcore::model::{CellIdentifier, RadioType, ReferenceCell};

/// Reference table row in the OpenCellID export layout. Columns not listed
/// here (unit, changeable, created, updated, averageSignal) are ignored.
#[derive(Debug, Deserialize)]
struct ReferenceRow {
    radio: RadioType,
    mcc: u16,
    net: u16,
    area: u32,
    cell: u64,
    lon: f64,
    lat: f64,
    range: f64,
    samples: u64,
}

impl From<ReferenceRow> for ReferenceCell {
    fn from(row: ReferenceRow) -> Self {
        ReferenceCell {
            radio: row.radio,
            identifier: CellIdentifier::new(row.mcc, row.net, row.area, row.cell),
            longitude: row.lon,
            latitude: row.lat,
            range: row.range,
            samples: row.samples,
        }
    }
}

/// Rows are kept in file order; duplicate handling belongs to the directory policy.
pub fn read_reference<R: Read>(reader: R) -> anyhow::Result<Vec<ReferenceCell>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<ReferenceRow>()
        .enumerate()
        .map(|(index, row)| {
            row.map(ReferenceCell::from)
                .with_context(|| format!("parsing reference line {}", index + 2))
        })
        .collect()
}

pub fn load_reference<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ReferenceCell>> {
    let path_ref = path.as_ref();
    let file = std::fs::File::open(path_ref)
        .with_context(|| format!("opening reference table {}", path_ref.display()))?;
    read_reference(file).with_context(|| format!("reading reference table {}", path_ref.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "radio,mcc,net,area,cell,unit,lon,lat,range,samples,changeable,created,updated,averageSignal\n";

    #[test]
    fn reference_rows_keep_file_order_and_duplicates() {
        let csv = format!(
            "{}LTE,302,720,1001,55,0,-75.6992,45.4165,1200,35,1,1459690000,1589000000,0\n\
             UMTS,302,720,1001,56,0,-75.7050,45.4190,800,12,1,1459690000,1589000000,0\n\
             LTE,302,720,1001,55,0,-75.6000,45.5000,900,3,1,1459690000,1589000000,0\n",
            HEADER
        );
        let rows = read_reference(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].identifier, CellIdentifier::new(302, 720, 1001, 55));
        assert_eq!(rows[0].radio, RadioType::Lte);
        assert_eq!(rows[0].latitude, 45.4165);
        assert_eq!(rows[1].radio, RadioType::Umts);
        assert_eq!(rows[2].identifier, rows[0].identifier);
    }

    #[test]
    fn malformed_reference_row_reports_its_line() {
        let csv = format!(
            "{}LTE,302,720,1001,55,0,-75.6992,north,1200,35,1,1459690000,1589000000,0\n",
            HEADER
        );
        let err = read_reference(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("reference line 2"));
    }
}
