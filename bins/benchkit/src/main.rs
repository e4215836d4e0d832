//! benchkit command - inspect unit formatting and CIDR target ranges.

mod output;
mod range;
mod units;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "benchkit",
    version,
    about = "Load generator unit and target range tool"
)]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Log parse diagnostics.
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a number with scaled units.
    #[command(visible_alias = "f", visible_alias = "fmt")]
    Format(units::FormatArgs),

    /// Read a scaled quantity back into a count.
    #[command(visible_alias = "s")]
    Scan(units::ScanArgs),

    /// Expand a CIDR target range.
    #[command(visible_alias = "r", visible_alias = "cidr")]
    Range(range::RangeArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let result = match cli.command {
        Command::Format(args) => units::run_format(args, format),
        Command::Scan(args) => units::run_scan(args, format),
        Command::Range(args) => range::run(args, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        // Malformed input exits like a usage error.
        let code = match e.downcast_ref::<benchkit::Error>() {
            Some(err) if err.is_input_error() => 2,
            _ => 1,
        };
        std::process::exit(code);
    }

    Ok(())
}
