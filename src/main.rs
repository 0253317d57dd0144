// ==========================================
// 端架库存合并决策 - 命令行入口
// ==========================================
// 子命令:
//   plan           读取两张表，生成移库方案并写出 CSV
//   storage-types  列出两张表中出现的存储类型
// ==========================================

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use endcap_consolidation::{
    logging, ConfigManager, ConfigOverrides, ConsolidationPlanner, CsvReportWriter,
    InventoryImporter, MovePolicy, RunOutcome,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "endcap-consolidation",
    version,
    about = "Plan moves from endcap bins into open space bins"
)]
struct Cli {
    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a consolidation plan and write the result tables
    Plan(PlanArgs),
    /// List the storage types present in both tables
    StorageTypes(StorageTypesArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Endcap inventory table (.csv / .xlsx / .xls)
    #[arg(long, value_name = "FILE")]
    endcaps: PathBuf,

    /// Open space capacity table (.csv / .xlsx / .xls)
    #[arg(long = "open-space", value_name = "FILE")]
    open_space: PathBuf,

    /// Excel sheet name (defaults to the first sheet)
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Directory for the generated CSV files
    #[arg(long = "out-dir", value_name = "DIR")]
    out_dir: PathBuf,

    /// JSON config file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Storage type to evacuate (repeatable)
    #[arg(long = "source-type", value_name = "TYPE")]
    source_types: Vec<String>,

    /// Storage type allowed to receive stock (repeatable)
    #[arg(long = "target-type", value_name = "TYPE")]
    target_types: Vec<String>,

    /// full-move or partial-move
    #[arg(long, value_name = "POLICY")]
    policy: Option<MovePolicy>,

    /// Maximum batch date distance in days
    #[arg(long = "window-days", value_name = "DAYS")]
    window_days: Option<i64>,

    /// Also write the endcap rows that stay in place
    #[arg(long = "remaining-sources")]
    remaining_sources: bool,
}

#[derive(Args, Debug)]
struct StorageTypesArgs {
    #[command(flatten)]
    input: InputArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    info!(
        "{} v{}",
        endcap_consolidation::APP_NAME,
        endcap_consolidation::VERSION
    );

    match cli.command {
        Commands::Plan(args) => handle_plan(args),
        Commands::StorageTypes(args) => handle_storage_types(args),
    }
}

fn handle_plan(args: PlanArgs) -> Result<()> {
    let file_config =
        ConfigManager::load(args.config.as_deref()).context("failed to load config file")?;

    let overrides = ConfigOverrides {
        source_storage_types: args.source_types,
        target_storage_types: args.target_types,
        move_policy: args.policy,
        batch_window_days: args.window_days,
        emit_remaining_sources: args.remaining_sources.then_some(true),
        excel_sheet: args.input.sheet,
    };
    let config =
        ConfigManager::resolve(file_config, overrides).context("invalid run configuration")?;

    let planner = ConsolidationPlanner::new(config);
    let outcome = planner
        .run_files(&args.input.endcaps, &args.input.open_space)
        .context("failed to build consolidation plan")?;

    let report = match &outcome {
        RunOutcome::Planned(report) => report,
        RunOutcome::NoAssignments(report) => {
            println!("No eligible moves found.");
            report
        }
    };

    let files = CsvReportWriter::write_all(report, &args.out_dir)
        .with_context(|| format!("failed to write reports to {}", args.out_dir.display()))?;

    let stats = &report.stats;
    println!("Run {} ({})", report.run_id, report.policy);
    println!(
        "  source bins: {} committed, {} unmatched, {} skipped",
        stats.source_bins_committed, stats.source_bins_unmatched, stats.source_bins_skipped
    );
    println!(
        "  units moved: {} into {} target bins",
        stats.units_moved, stats.target_bins_touched
    );
    println!("  assignments: {}", files.assignments.display());
    println!("  summary:     {}", files.summary.display());
    println!("  open space:  {}", files.updated_targets.display());
    if let Some(path) = &files.remaining_sources {
        println!("  remaining:   {}", path.display());
    }

    Ok(())
}

fn handle_storage_types(args: StorageTypesArgs) -> Result<()> {
    let importer = InventoryImporter::new(args.input.sheet);
    let options = importer
        .storage_type_options(&args.input.endcaps, &args.input.open_space)
        .context("failed to read storage types")?;

    println!("Endcap storage types:");
    for storage_type in &options.source_types {
        println!("  {}", storage_type);
    }
    println!("Open space storage types:");
    for storage_type in &options.target_types {
        println!("  {}", storage_type);
    }

    Ok(())
}
