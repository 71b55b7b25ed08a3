use clap::{Parser, Subcommand};
use log::info;
use numgen_common::{AttributeSpec, Config, SentinelPolicy};
use numgen_core::{
    generalize_attributes, open_parquet_file, print_summary, read_mapping_json, resolve_paths,
    write_mapping_csv, write_mapping_json, MappingDocument, ParquetFrequencySource,
};
use std::path::{Path, PathBuf};

fn parse_bin_size(s: &str) -> Result<u64, String> { // reject 0 at CLI parse time
    let v: u64 = s.parse().map_err(|_| format!("not a non-negative integer: {s}"))?;
    if v > 0 { Ok(v) } else { Err("minimum bin size must be greater than zero".into()) }
}

#[derive(Parser)]
#[command(name = "numgen", version, about = "Minimum-count binning of numeric attributes for de-identification")]
struct Cli {
    /// -v for info, -vv for debug (RUST_LOG takes precedence)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bin one or more columns and write a mapping file per column
    Bin {
        input: String,
        #[arg(long = "column", short = 'c', required = true)]
        columns: Vec<String>,
        #[arg(long, value_parser = parse_bin_size)]
        min_bin_size: Option<u64>,
        #[arg(long, allow_hyphen_values = true)]
        sentinel_marker: Option<i64>,
        #[arg(long, value_delimiter = ',')]
        include_sentinel: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        exclude_sentinel: Vec<String>,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// List columns and whether they can be binned
    Columns {
        input: String,
        #[arg(long)]
        json: bool,
    },
    /// Print a persisted mapping
    Show { mapping: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    let config = Config::load()?;
    match cli.command {
        Commands::Bin { input, columns, min_bin_size, sentinel_marker, include_sentinel, exclude_sentinel, format, output } => {
            let overrides = SpecOverrides { min_bin_size, sentinel_marker, include_sentinel, exclude_sentinel };
            let specs = resolve_specs(&config, &columns, &overrides)?;
            run_bin(&input, &specs, format, output, &config)?
        }
        Commands::Columns { input, json } => run_columns(&input, json)?,
        Commands::Show { mapping } => run_show(&mapping)?,
    }
    Ok(())
}

struct SpecOverrides {
    min_bin_size: Option<u64>,
    sentinel_marker: Option<i64>,
    include_sentinel: Vec<String>,
    exclude_sentinel: Vec<String>,
}

/// config entries per column, with command-line flags taking precedence
fn resolve_specs(config: &Config, columns: &[String], o: &SpecOverrides) -> anyhow::Result<Vec<AttributeSpec>> {
    if let Some(both) = o.include_sentinel.iter().find(|c| o.exclude_sentinel.contains(c)) {
        anyhow::bail!("column {both} cannot both include and exclude the sentinel");
    }
    for c in o.include_sentinel.iter().chain(&o.exclude_sentinel) {
        if !columns.contains(c) { anyhow::bail!("sentinel flag names column {c}, which is not being binned"); }
    }
    let mut seen = std::collections::HashSet::new();
    let mut specs = Vec::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.as_str()) { anyhow::bail!("column {column} given more than once"); }
        let mut spec = config.attribute_spec(column);
        if let Some(size) = o.min_bin_size { spec.min_bin_size = size; }
        if let Some(marker) = o.sentinel_marker { spec.marker = marker; }
        if o.include_sentinel.contains(column) { spec.sentinel = SentinelPolicy::Include; }
        if o.exclude_sentinel.contains(column) { spec.sentinel = SentinelPolicy::Exclude; }
        if spec.min_bin_size == 0 { anyhow::bail!("minimum bin size for {column} must be greater than zero"); }
        specs.push(spec);
    }
    Ok(specs)
}

fn run_bin(input: &str, specs: &[AttributeSpec], format: Option<String>, output: Option<String>, config: &Config) -> anyhow::Result<()> {
    let format = format.unwrap_or_else(|| config.export.format.clone());
    if format != "json" && format != "csv" { anyhow::bail!("Unknown format: {format} (use json or csv)"); }
    let out_dir = PathBuf::from(output.unwrap_or_else(|| config.export.output_dir.clone()));
    let source = ParquetFrequencySource::open(input, config.binning.batch_size)?;
    info!("scanning {} file(s) from {input}", source.paths().len());
    let results = generalize_attributes(&source, specs)?;
    std::fs::create_dir_all(&out_dir)?;
    for g in &results {
        let out_path = out_dir.join(format!("{}_bins.{format}", g.attribute));
        match format.as_str() {
            "json" => write_mapping_json(&out_path, g)?,
            _ => write_mapping_csv(&out_path, g)?,
        }
        print_summary(&MappingDocument::from_generalization(g));
        println!("Mapping written to {}", out_path.display());
        println!();
    }
    Ok(())
}

fn run_columns(input: &str, json: bool) -> anyhow::Result<()> {
    let paths = resolve_paths(input)?;
    let Some(first) = paths.first() else { anyhow::bail!("No Parquet files found: {input}") };
    let info = open_parquet_file(first)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }
    println!("{:<16} {} ({} rows, {} row groups)", "File:", info.path.display(), info.row_count, info.row_group_count);
    println!("{:<24} {:<12} {:<20} {}", "column", "physical", "arrow", "binnable");
    for c in &info.columns {
        println!("{:<24} {:<12} {:<20} {}", c.name, c.physical_type, c.arrow_type.as_deref().unwrap_or("-"), if c.binnable { "yes" } else { "no" });
    }
    Ok(())
}

fn run_show(mapping: &Path) -> anyhow::Result<()> {
    let doc = read_mapping_json(mapping)?;
    print_summary(&doc);
    Ok(())
}
