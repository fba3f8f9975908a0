use std::io;
use std::path::PathBuf;
use std::time::Instant;
use clap::{Args, Parser, Subcommand};
use log::info;
use jadwal::config::subsystems::logging::parse_level;
use jadwal::config::subsystems::LoggingConfig;
use jadwal::table::io::{read_table, write_csv, write_json, write_table, TableFormat};
use jadwal::table::{self, AppendType, JoinSpec, JoinType};
use jadwal::utils::init_logging;
use jadwal::{ClusterOptions, ClusteringMatcher, JadwalConfig, Result, Table};

/// Append, join and cluster-match CSV or JSON tables from the command line
#[derive(Parser, Debug)]
#[command(name = "jadwal", version, about)]
struct Cli {
    /// INI configuration file (only the [matcher] section is used)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level for stderr output
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a column mapping each value to its best fuzzy match in the column
    Cluster {
        /// Input table (.json records or CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Column to cluster
        #[arg(long)]
        col: String,

        /// Name for the derived column
        #[arg(long)]
        cluster_col_name: Option<String>,

        /// Drop the source column
        #[arg(long)]
        replace_col: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Stack two tables vertically or place them side by side
    Append {
        #[arg(long)]
        left: PathBuf,

        #[arg(long)]
        right: PathBuf,

        /// vertical or horizontal
        #[arg(long, default_value = "vertical")]
        append_type: AppendType,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Join two tables on a key column
    Join {
        #[arg(long)]
        left: PathBuf,

        #[arg(long)]
        right: PathBuf,

        /// Key column in the left table
        #[arg(long)]
        join_col_1: String,

        /// Key column in the right table
        #[arg(long)]
        join_col_2: String,

        /// inner, left, right or outer
        #[arg(long, default_value = "inner")]
        join_type: JoinType,

        /// New name for the surviving key column
        #[arg(long)]
        join_col_name: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output file; format follows the extension. Defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format for stdout output (csv or json)
    #[arg(long, default_value = "json")]
    format: TableFormat,
}

impl OutputArgs {
    fn write(&self, table: &Table) -> Result<()> {
        match self.output {
            Some(ref path) => {
                write_table(table, path)?;
                info!("Wrote {} rows to {:?}", table.row_count(), path);
                Ok(())
            }
            None => {
                let stdout = io::stdout().lock();
                match self.format {
                    TableFormat::Json => write_json(table, stdout),
                    TableFormat::Csv => write_csv(table, stdout),
                }
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig {
        level: parse_level(&cli.log_level)?,
        log_dir: None,
    })?;

    let config = match cli.config {
        Some(ref path) => JadwalConfig::from_ini(path)?,
        None => JadwalConfig::default(),
    };

    let start = Instant::now();
    match cli.command {
        Command::Cluster { input, col, cluster_col_name, replace_col, output } => {
            let matcher = ClusteringMatcher::new(config.matcher)?;
            let mut options = ClusterOptions::new(col).replacing(replace_col);
            if let Some(name) = cluster_col_name {
                options = options.with_name(name);
            }
            let result = matcher.cluster(read_table(&input)?, &options)?;
            output.write(&result)?;
        }
        Command::Append { left, right, append_type, output } => {
            let result = table::append(read_table(&left)?, read_table(&right)?, append_type)?;
            output.write(&result)?;
        }
        Command::Join { left, right, join_col_1, join_col_2, join_type, join_col_name, output } => {
            let mut spec = JoinSpec::new(join_col_1, join_col_2, join_type);
            if let Some(name) = join_col_name {
                spec = spec.with_key_name(name);
            }
            let result = table::join(&read_table(&left)?, &read_table(&right)?, &spec)?;
            output.write(&result)?;
        }
    }

    info!("Done in {:?}", start.elapsed());
    Ok(())
}
