//! ptah CLI
//!
//! Command-line tool for comparing schemas and generating migration SQL.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use ptah_migrate::prelude::*;

/// Schema comparison and migration SQL generation.
#[derive(Parser)]
#[command(name = "ptah")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQL dialect: postgres, mysql, mariadb, or any other name for
    /// conservative generic SQL.
    #[arg(short, long, global = true, env = "PTAH_DIALECT", default_value = "postgres")]
    dialect: String,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the differences between the declared schema and the database.
    Compare {
        /// Declared schema (JSON).
        #[arg(short, long)]
        generated: PathBuf,

        /// Introspected database schema (JSON).
        #[arg(long)]
        database: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the SQL that brings the database in line with the schema.
    MigrateSql {
        /// Declared schema (JSON).
        #[arg(short, long)]
        generated: PathBuf,

        /// Introspected database schema (JSON).
        #[arg(long)]
        database: PathBuf,
    },

    /// Write the migration SQL to a timestamped file.
    Generate {
        /// Declared schema (JSON).
        #[arg(short, long)]
        generated: PathBuf,

        /// Introspected database schema (JSON).
        #[arg(long)]
        database: PathBuf,

        /// Migration name.
        #[arg(short, long, default_value = "auto")]
        name: String,

        /// Directory the file is written to.
        #[arg(short, long, default_value = "migrations")]
        output_dir: PathBuf,
    },

    /// Print the full creation script of the declared schema.
    Render {
        /// Declared schema (JSON).
        #[arg(short, long)]
        generated: PathBuf,
    },

    /// Print a report of a schema file.
    Describe {
        /// Declared schema (JSON).
        #[arg(short, long, conflicts_with = "database", required_unless_present = "database")]
        generated: Option<PathBuf>,

        /// Introspected database schema (JSON).
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays plain SQL.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!(dialect = %cli.dialect, "starting");

    match cli.command {
        Commands::Compare {
            generated,
            database,
            format,
        } => {
            let generated = load_generated(&generated)?;
            let database = load_database(&database, &cli.dialect)?;
            print!("{}", compare(&generated, &database, format)?);
        }

        Commands::MigrateSql {
            generated,
            database,
        } => {
            let generated = load_generated(&generated)?;
            let database = load_database(&database, &cli.dialect)?;
            print!("{}", migrate_sql(&generated, &database, &cli.dialect)?);
        }

        Commands::Generate {
            generated,
            database,
            name,
            output_dir,
        } => {
            let generated = load_generated(&generated)?;
            let database = load_database(&database, &cli.dialect)?;
            let path = generate(
                &generated,
                &database,
                &cli.dialect,
                &name,
                &output_dir,
                Utc::now(),
            )
            .with_context(|| format!("Failed to generate migration '{name}'"))?;
            if let Some(path) = path {
                println!("{}", path.display());
            }
        }

        Commands::Render { generated } => {
            let generated = load_generated(&generated)?;
            let sql = render(&generated, &cli.dialect)
                .with_context(|| format!("Failed to render schema for {}", cli.dialect))?;
            print!("{sql}");
        }

        Commands::Describe {
            generated,
            database,
        } => {
            if let Some(path) = database {
                let database = load_database(&path, &cli.dialect)?;
                print!("{}", describe_database(&database));
            } else if let Some(path) = generated {
                let generated = load_generated(&path)?;
                print!("{}", describe_generated(&generated));
            } else {
                info!("Nothing to describe, pass --generated or --database.");
            }
        }
    }

    Ok(())
}
