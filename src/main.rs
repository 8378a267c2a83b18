use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use ventas_etl::{
    process::schema::SchemaPolicy,
    run::{run, RunReport},
    Config,
};

/// Consolidate the ITEM_O sheet of sales workbooks into Out.xlsx plus two charts.
#[derive(Parser, Debug)]
#[command(name = "ventas-etl", version)]
struct Cli {
    /// Workbooks to merge, in order
    files: Vec<PathBuf>,

    /// Also merge every *.xlsx in this folder (sorted by name)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Column range, e.g. A:M
    #[arg(short, long)]
    range: Option<String>,

    /// First row to read (1-based)
    #[arg(short = 's', long)]
    start_row: Option<u32>,

    /// The first row read is data, not a header
    #[arg(long)]
    no_header: bool,

    /// Worksheet to read from every workbook
    #[arg(long)]
    sheet: Option<String>,

    /// Where Out.xlsx and the charts are written
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Name columns by position instead of requiring the 13-column layout
    #[arg(long)]
    positional: bool,

    /// Skip chart generation
    #[arg(long)]
    no_charts: bool,

    /// YAML file with defaults for any of the above
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };
        config.inputs.extend(self.files);
        if self.dir.is_some() {
            config.input_dir = self.dir;
        }
        if let Some(range) = self.range {
            config.range = range;
        }
        if let Some(row) = self.start_row {
            config.start_row = row;
        }
        if self.no_header {
            config.has_header = false;
        }
        if let Some(sheet) = self.sheet {
            config.sheet = sheet;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.positional {
            config.schema = SchemaPolicy::Positional;
        }
        if self.no_charts {
            config.charts = false;
        }
        Ok((config, self.json))
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) settings + inputs ────────────────────────────────────────
    let (config, json) = Cli::parse().into_config()?;
    // fail on a bad range before listing any folder
    config.consolidate_options().context("invalid options")?;
    let files = config.source_files().context("collecting input files")?;
    if files.is_empty() {
        anyhow::bail!("no input workbooks given (pass files or --dir)");
    }
    info!(files = files.len(), range = %config.range, "startup");

    // ─── 3) consolidate + export ─────────────────────────────────────
    let bar = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("progress template")?,
    );
    let report = run(&config, &files, |p| {
        bar.set_position(p.processed as u64);
        bar.set_message(p.file.to_string());
    })?;
    bar.finish_and_clear();

    // ─── 4) report ───────────────────────────────────────────────────
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    if report.chart_error.is_some() {
        std::process::exit(2);
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.name, skipped.error);
    }
    match &report.output {
        None => println!("No data produced from {} file(s).", report.files),
        Some(path) => {
            println!(
                "Exported {} rows x {} columns to {}",
                report.rows,
                report.columns,
                path.display()
            );
            if let Some(charts) = &report.charts {
                println!("Charts: {}, {}", charts.bar.display(), charts.pie.display());
            }
            if let Some(err) = &report.chart_error {
                eprintln!("Charts not generated: {}", err);
            }
        }
    }
}
