use std::path::PathBuf;

use clap::Parser;
use edfread::export::default_output_path;
use edfread::{ChannelRead, EdfReader, ReadOptions, SampleMode, SampleTable};
use log::{error, info, warn, LevelFilter};

#[derive(Parser, Debug)]
#[command(
    name = "edf2csv",
    version = env!("CARGO_PKG_VERSION"),
    about = "Export EDF channels to a CSV table",
    long_about = None,
)]
struct Cli {
    /// EDF file to read
    input: PathBuf,
    /// Channel to export; repeat for several. Display labels
    /// ("EEG Fp1 - AgAgCl (uV)") are accepted
    #[arg(short, long = "channel")]
    channels: Vec<String>,
    /// Export every channel (default when no --channel is given)
    #[arg(short, long)]
    all: bool,
    /// Write raw digital values instead of physical units
    #[arg(short, long)]
    digital: bool,
    /// Output file. Defaults to the input path with a .csv extension
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the channel list and exit
    #[arg(short, long)]
    list: bool,
    /// Replace legacy accented header bytes with ASCII before parsing
    #[arg(long)]
    repair_legacy: bool,
    /// Reject files whose header size disagrees with the signal count
    #[arg(long)]
    strict: bool,
    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
    /// Log parse details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let options = ReadOptions {
        repair_legacy_header: cli.repair_legacy,
        strict_header_size: cli.strict,
    };

    let reader = match EdfReader::open_with(&cli.input, &options) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to decode {:?}: {e}", cli.input);
            std::process::exit(1);
        }
    };

    if cli.list {
        for (i, signal) in reader.signals().iter().enumerate() {
            println!("{i:>3}  {}", signal.display_label());
        }
        return;
    }

    // 按索引选择通道，同名通道也能分别导出
    let mut unresolved = Vec::new();
    let indices: Vec<usize> = if cli.all || cli.channels.is_empty() {
        (0..reader.signals().len()).collect()
    } else {
        cli.channels
            .iter()
            .filter_map(|name| match reader.resolve_channel(name) {
                Ok(index) => Some(index),
                Err(e) => {
                    unresolved.push(ChannelRead {
                        label: name.clone(),
                        column: Err(e),
                    });
                    None
                }
            })
            .collect()
    };

    let mode = if cli.digital { SampleMode::Digital } else { SampleMode::Physical };
    info!(
        "Exporting {} channels ({:?}) from {} records",
        indices.len(),
        mode,
        reader.record_count()
    );

    let (table, failed) = SampleTable::from_reads(reader.read_channels_by_index(&indices, mode));
    let failed: Vec<ChannelRead> = unresolved.into_iter().chain(failed).collect();
    for read in &failed {
        if let Err(e) = &read.column {
            warn!("Skipped {:?}: {e}", read.label);
        }
    }

    if table.columns().is_empty() {
        error!("No channel could be exported");
        std::process::exit(1);
    }

    let output = cli.output.clone().unwrap_or_else(|| default_output_path(&cli.input));
    if let Err(e) = table.write_csv_path(&output) {
        error!("Failed to write {:?}: {e}", output);
        std::process::exit(1);
    }

    info!("Signals exported to: {}", output.display());
    if !failed.is_empty() {
        std::process::exit(2);
    }
}
