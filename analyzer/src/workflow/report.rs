use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::workflow::runner::WorkflowResult;

/// Writes the run result as pretty JSON for the plotting front end.
pub fn write_report<P: AsRef<Path>>(path: P, result: &WorkflowResult) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    if let Some(parent) = path_ref.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
    }
    let file = File::create(path_ref)
        .with_context(|| format!("creating report {}", path_ref.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)
        .with_context(|| format!("writing report {}", path_ref.display()))?;
    writer
        .flush()
        .with_context(|| format!("flushing report {}", path_ref.display()))?;
    Ok(())
}
