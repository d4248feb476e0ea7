//! Stanhope CLI - Migrate the legacy shop database to import files
//!
//! # Main Commands
//!
//! ```bash
//! stanhope migrate accounts -o accounts.csv   # One entity
//! stanhope all --out-dir out/                 # Every entity, one file each
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! stanhope load frame-orders --table FrameOrders --table OldFrameOrders
//! stanhope codes --lookup status
//! ```

use clap::{Args, Parser, Subcommand};
use stanhope::logs::{log_error, log_info, log_success, LogFormat, LOGGER};
use stanhope::{
    load, migrate, migrate_all, write_table, write_table_file, CodeBook, Config, Entity,
    Lookup, MigrationResult, OutputFormat, Source, Table,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "stanhope")]
#[command(about = "Migrate the Stanhope Framers legacy database", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Access database file (overrides STANHOPE_MDB)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Export program (overrides STANHOPE_MDB_EXPORT)
    #[arg(long, global = true)]
    export_program: Option<String>,

    /// Read <table>.csv files from this directory instead of exporting
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    /// Custom code book JSON (overrides STANHOPE_CODES)
    #[arg(long, global = true)]
    codes: Option<PathBuf>,

    /// Silence progress logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Progress log format: text or json
    #[arg(long, global = true, default_value = "text", value_parser = parse_log_format)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate one entity
    Migrate {
        /// accounts, contacts, orders or treatments
        entity: Entity,

        /// Legacy table to load (repeatable; default: the family's main table)
        #[arg(short, long = "table")]
        tables: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Migrate every entity into a directory
    All {
        /// Directory receiving one file per entity
        #[arg(long)]
        out_dir: PathBuf,

        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Load a working table without projecting it
    Load {
        /// customers or frame-orders
        source: Source,

        /// Legacy table to load (repeatable)
        #[arg(short, long = "table")]
        tables: Vec<String>,

        /// Output format: csv or json
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Show the active code book
    Codes {
        /// Only this lookup
        #[arg(short, long, value_parser = parse_lookup)]
        lookup: Option<Lookup>,
    },
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format '{}' (expected text or json)", other)),
    }
}

fn parse_lookup(s: &str) -> Result<Lookup, String> {
    Lookup::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = Lookup::ALL.iter().map(|l| l.name()).collect();
        format!("unknown lookup '{}' (expected one of: {})", s, names.join(", "))
    })
}

fn main() {
    let cli = Cli::parse();

    LOGGER.set_format(if cli.global.quiet {
        LogFormat::Off
    } else {
        cli.global.log_format
    });

    let config = build_config(&cli.global);

    let result = match cli.command {
        Commands::Migrate {
            entity,
            tables,
            output,
            format,
        } => cmd_migrate(&config, entity, &tables, output.as_deref(), format),

        Commands::All { out_dir, format } => cmd_all(&config, &out_dir, format),

        Commands::Load {
            source,
            tables,
            format,
        } => cmd_load(&config, source, &tables, format),

        Commands::Codes { lookup } => cmd_codes(&config, lookup),
    };

    if let Err(e) = result {
        // Errors are reported even when progress logging is off.
        if LOGGER.format() == LogFormat::Off {
            eprintln!("❌ Error: {}", e);
        } else {
            log_error(format!("Error: {}", e));
        }
        std::process::exit(1);
    }
}

/// Environment first, then flags.
fn build_config(global: &GlobalArgs) -> Config {
    let mut config = Config::from_env();
    if let Some(ref database) = global.database {
        config.database = database.clone();
    }
    if let Some(ref program) = global.export_program {
        config.export_program = program.clone();
    }
    if global.csv_dir.is_some() {
        config.csv_dir = global.csv_dir.clone();
    }
    if global.codes.is_some() {
        config.codes = global.codes.clone();
    }
    config
}

/// An empty `--table` list means the family defaults.
fn table_list(tables: &[String]) -> Option<&[String]> {
    (!tables.is_empty()).then_some(tables)
}

fn cmd_migrate(
    config: &Config,
    entity: Entity,
    tables: &[String],
    output: Option<&Path>,
    format: OutputFormat,
) -> MigrationResult<()> {
    let codes = CodeBook::load(config.codes.as_deref())?;
    let export = config.export_source();

    let table = migrate(entity, export.as_ref(), table_list(tables), &codes)?;
    write_output(&table, format, output)
}

fn cmd_all(config: &Config, out_dir: &Path, format: OutputFormat) -> MigrationResult<()> {
    let codes = CodeBook::load(config.codes.as_deref())?;
    let export = config.export_source();

    let outputs = migrate_all(export.as_ref(), &codes)?;

    fs::create_dir_all(out_dir)?;
    for (entity, table) in &outputs {
        let path = out_dir.join(format!(
            "{}.{}",
            entity.name().to_lowercase(),
            format.extension()
        ));
        write_table_file(table, format, &path)?;
        log_success(format!("{} written to {}", entity, path.display()));
    }
    Ok(())
}

fn cmd_load(
    config: &Config,
    source: Source,
    tables: &[String],
    format: OutputFormat,
) -> MigrationResult<()> {
    let export = config.export_source();
    let table = load(source, export.as_ref(), table_list(tables))?;
    write_output(&table, format, None)
}

fn cmd_codes(config: &Config, lookup: Option<Lookup>) -> MigrationResult<()> {
    let codes = CodeBook::load(config.codes.as_deref())?;
    match lookup {
        Some(lookup) => {
            for (code, label) in codes.entries(lookup) {
                println!("{}\t{}", code, label);
            }
        }
        None => println!("{}", codes.to_json()?),
    }
    Ok(())
}

fn write_output(table: &Table, format: OutputFormat, path: Option<&Path>) -> MigrationResult<()> {
    match path {
        Some(p) => {
            write_table_file(table, format, p)?;
            log_success(format!("Output written to: {}", p.display()));
        }
        None => {
            log_info(format!("Writing {} rows to stdout", table.len()));
            write_table(table, format, io::stdout().lock())?;
        }
    }
    Ok(())
}
