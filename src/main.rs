use env_logger::{Builder, Env};
use log::{debug, error, info, LevelFilter};
use polars::frame::DataFrame;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;
use sysinfo::{ProcessExt, System, SystemExt};

use noshow_analysis::binning::BinLabel;
use noshow_analysis::config::{AnalysisConfig, OutputFormat};
use noshow_analysis::dataset::Dataset;
use noshow_analysis::describe::{correlation, describe};
use noshow_analysis::error::Result;
use noshow_analysis::loader::load_dataset;
use noshow_analysis::report::{AnalysisReport, Inspection};

fn monitor_memory() -> u64 {
    // Resident memory of this process in bytes, 0 when it cannot be read
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };
    let mut system = System::new();
    system.refresh_process(pid);
    system.process(pid).map(|p| p.memory()).unwrap_or(0)
}

async fn process_raw(config: &AnalysisConfig) -> Result<(DataFrame, Dataset)> {
    let (df, dataset) = load_dataset(&config.input).await?;
    debug!("{}", df.head(Some(5)));

    // Machine-readable formats keep stdout for the report alone.
    if config.format == OutputFormat::Text {
        println!("{}", describe(&df)?);
        println!("{}", correlation(&df)?);
    }
    Ok((df, dataset))
}

async fn process_clean(raw: &Dataset) -> Result<Dataset> {
    let cleaned = raw.clone().drop_invalid_age();
    info!(
        "cleaned dataset: {} of {} records kept, min age {:?}",
        cleaned.len(),
        raw.len(),
        cleaned.min_age()
    );
    Ok(cleaned)
}

async fn process_bins(config: &AnalysisConfig, cleaned: &Dataset) -> Result<Vec<BinLabel>> {
    let bins = cleaned.bin_ages(&config.age_cut_points, &config.age_labels)?;
    debug!("binned {} ages into {} groups", bins.len(), config.age_labels.len());
    Ok(bins)
}

async fn process_report(
    config: &AnalysisConfig,
    df: &DataFrame,
    raw: &Dataset,
    cleaned: &Dataset,
    bins: &[BinLabel],
) -> Result<()> {
    let inspection = Inspection::new(df, raw, cleaned);
    let report = AnalysisReport::build(cleaned, bins, inspection)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.format {
        OutputFormat::Text => write!(out, "{}", report)?,
        OutputFormat::Csv => report.write_csv(&mut out)?,
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }
    out.flush()?;
    Ok(())
}

async fn run(config: AnalysisConfig) -> Result<()> {
    let (df, raw) = process_raw(&config).await?;
    let cleaned = process_clean(&raw).await?;
    let bins = process_bins(&config, &cleaned).await?;
    process_report(&config, &df, &raw, &cleaned, &bins).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env = Env::new().filter("NOSHOW_LOG");
    Builder::new()
        .filter(Some("noshow_analysis"), LevelFilter::Info)
        .parse_env(env)
        .init();

    let start_time = Instant::now();
    let start_memory = monitor_memory();

    let result = match AnalysisConfig::from_env() {
        Ok(config) => {
            debug!("Configuration {:#?}", config);
            run(config).await
        }
        Err(e) => Err(e),
    };

    let end_memory = monitor_memory();
    info!("Time elapsed: {:?}", start_time.elapsed());
    info!("Memory used: {} bytes", end_memory.saturating_sub(start_memory));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("analysis failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
