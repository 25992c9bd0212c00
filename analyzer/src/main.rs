use anyhow::bail;
use clap::Parser;
use generator::profile::build_trace;
use ingest::{load_reference, load_trace};
use log::info;
use std::path::PathBuf;
use walkcore::model::CellIdentifier;
use walkcore::processing::DEFAULT_CORRECTION_FACTOR;
use workflow::config::WorkflowConfig;
use workflow::report::write_report;
use workflow::runner::Runner;

mod generator;
mod ingest;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Correlate cellular walk traces with reference towers")]
struct Args {
    /// Measurement trace CSV
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Reference tower table CSV (OpenCellID layout)
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Generate a seeded synthetic walk instead of reading CSV files
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long, default_value_t = 120)]
    samples: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Only report this tower, as mcc,mnc,lac,cellid
    #[arg(long)]
    tower: Option<CellIdentifier>,
    #[arg(long, default_value_t = DEFAULT_CORRECTION_FACTOR)]
    correction_factor: f64,
    #[arg(long, default_value = "report.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.correction_factor, None)
    };
    if args.tower.is_some() {
        workflow_config.tower = args.tower;
    }

    let (samples, reference) = if args.synthetic {
        let trace = build_trace(args.samples, args.seed)?;
        info!("generated synthetic walk of {} samples", trace.samples.len());
        (trace.samples, trace.reference)
    } else {
        match (args.trace, args.reference) {
            (Some(trace), Some(reference)) => (
                load_trace(&trace, workflow_config.heading_unit)?,
                load_reference(&reference)?,
            ),
            _ => bail!("--trace and --reference are required unless --synthetic is given"),
        }
    };

    let runner = Runner::new(workflow_config);
    let result = runner.execute(&samples, &reference)?;

    println!(
        "Run -> towers {}, unresolved cells {}, excluded samples {}, curves {}, corrections {}/{}",
        result.towers.len(),
        result.unresolved_cells.len(),
        result.excluded_samples,
        result.curves.len(),
        result.metrics.latitude_corrections,
        result.metrics.longitude_corrections
    );
    for tower in &result.towers {
        println!(
            "  {} -> {} samples, mean power {}",
            tower.site.identifier,
            tower.sample_count,
            tower
                .mean_power
                .map(|p| format!("{:.1} dBm", p))
                .unwrap_or_else(|| "n/a".into())
        );
    }

    write_report(&args.output, &result)?;
    info!("report written to {}", args.output.display());

    Ok(())
}
