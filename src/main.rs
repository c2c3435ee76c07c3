use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use rustdp::{ExecutionOptions, ParserEngine};

#[derive(Parser, Debug)]
#[command(name = "rustdp")]
#[command(about = "Greedy transition-based dependency parser")]
#[command(version)]
struct Args {
    /// Parser configuration file (YAML)
    config: PathBuf,

    /// Input in CoNLL-X format, gzipped or plain; reads standard input
    /// when omitted or "-"
    input: Option<PathBuf>,

    /// Log and drop sentences that fail to parse instead of aborting
    #[arg(long)]
    skip_failed: bool,

    /// Sentences per parallel batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let engine = ParserEngine::from_config_path(&args.config)?;
    let options = ExecutionOptions {
        fail_fast: !args.skip_failed,
        batch_size: args.batch_size,
    };

    let (reader, progress) = open_input(&args)?;
    let writer = BufWriter::new(io::stdout().lock());

    let start = Instant::now();
    let stats = engine.parse_corpus(reader, writer, &options)?;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    info!(
        "Parsed {} sentences ({} tokens, {} failed) in {:.2?}",
        stats.sentences,
        stats.tokens,
        stats.failed,
        start.elapsed()
    );

    Ok(())
}

/// Open the input stream; file input gets a byte-progress bar on stderr.
fn open_input(args: &Args) -> Result<(Box<dyn BufRead>, Option<ProgressBar>)> {
    let path = match &args.input {
        Some(path) if path.as_os_str() != "-" => path,
        _ => return Ok((Box::new(BufReader::new(io::stdin().lock())), None)),
    };

    let file =
        File::open(path).with_context(|| format!("Cannot open input file {}", path.display()))?;

    let progress = if args.quiet {
        None
    } else {
        let bar = ProgressBar::new(file.metadata()?.len());
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {bytes}/{total_bytes} ({eta})")
                .expect("static progress template"),
        );
        Some(bar)
    };

    let reader: Box<dyn io::Read> = match &progress {
        Some(bar) => Box::new(bar.wrap_read(file)),
        None => Box::new(file),
    };

    let is_gzip = path.extension().map(|ext| ext == "gz").unwrap_or(false);
    let reader: Box<dyn BufRead> = if is_gzip {
        Box::new(BufReader::new(GzDecoder::new(reader)))
    } else {
        Box::new(BufReader::new(reader))
    };

    Ok((reader, progress))
}
