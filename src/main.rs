use clap::{Parser, Subcommand};
use log::{error, info};
use mimalloc::MiMalloc;
use std::path::{Path, PathBuf};

use vcfscore::variant::COLUMNS;
use vcfscore::{build_default_header, filter_pass, parse, read_header, score, write};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_REFERENCE: &str = "data/Homo_sapiens_assembly38.fasta";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keep only variants whose FILTER is PASS or '.'.
    Filter {
        /// Input VCF, optionally gzipped (.gz).
        input: PathBuf,

        /// Output path. A .gz suffix writes BGZF.
        #[arg(short, long, default_value = "out.vcf")]
        output: PathBuf,

        /// Write a freshly generated header instead of the input's header.
        #[arg(long, default_value_t = false)]
        default_header: bool,

        /// Reference genome recorded in a generated header.
        #[arg(long, default_value = DEFAULT_REFERENCE)]
        reference: String,
    },
    /// Compare predicted variants against a truth set.
    Score {
        predicted: PathBuf,
        truth: PathBuf,
    },
    /// Filter `input` to `output`, then score `predicted` against the filtered variants.
    Run {
        input: PathBuf,
        predicted: PathBuf,

        #[arg(short, long, default_value = "out.vcf")]
        output: PathBuf,
    },
}

/// With `default_reference`, the output gets a generated header that keeps
/// the input's FORMAT and sample column names.
fn run_filter(input: &Path, output: &Path, default_reference: Option<&str>) -> vcfscore::Result<()> {
    let table = parse(input)?;
    let header = match default_reference {
        Some(reference) => build_default_header(chrono::Local::now().date_naive(), reference)
            .with_extra_columns(&table.columns()[COLUMNS.len()..]),
        None => read_header(input)?,
    };
    let n = table.len();
    let filtered = filter_pass(table);
    write(&filtered, &header, output)?;
    info!(
        "{}: kept {} of {} variants, wrote {}",
        input.display(),
        filtered.len(),
        n,
        output.display()
    );
    Ok(())
}

fn run_score(predicted: &Path, truth: &Path) -> vcfscore::Result<()> {
    let pred = parse(predicted)?;
    let truth_table = parse(truth)?;
    let metrics = score(&pred, &truth_table)?;
    info!(
        "tp={} fp={} fn={}",
        metrics.counts.tp, metrics.counts.fp, metrics.counts.fn_
    );
    println!("{}", metrics);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    let result = match args.command {
        Commands::Filter {
            input,
            output,
            default_header,
            reference,
        } => run_filter(&input, &output, default_header.then_some(reference.as_str())),
        Commands::Score { predicted, truth } => run_score(&predicted, &truth),
        Commands::Run {
            input,
            predicted,
            output,
        } => run_filter(&input, &output, None).and_then(|_| run_score(&predicted, &output)),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
