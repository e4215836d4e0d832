//! Format and scan commands.

use clap::{Args, ValueEnum};

use crate::output::{OutputFormat, print_json};

#[derive(Args)]
pub struct FormatArgs {
    /// Unit table to render with
    #[arg(value_enum)]
    pub kind: FormatKind,

    /// Value to render (bytes, count, microseconds or seconds)
    #[arg(allow_negative_numbers = true)]
    pub value: f64,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatKind {
    /// Powers of 1024 (K, M, G, T)
    Binary,
    /// Powers of 1000 (k, M, G, T)
    Metric,
    /// Microseconds (us, ms, s, m)
    TimeUs,
    /// Whole seconds (s, m)
    TimeS,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Unit table to read with
    #[arg(value_enum)]
    pub kind: ScanKind,

    /// Text such as 10k, 4M or 2m
    pub text: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScanKind {
    /// k, M, G, T, P as powers of 1000
    Metric,
    /// K, M, G, T, P as powers of 1024
    Binary,
    /// s, m, h as seconds
    Time,
}

pub fn run_format(args: FormatArgs, format: OutputFormat) -> anyhow::Result<()> {
    let text = match args.kind {
        FormatKind::Binary => benchkit::format_binary(args.value),
        FormatKind::Metric => benchkit::format_metric(args.value),
        FormatKind::TimeUs => benchkit::format_time_us(args.value),
        FormatKind::TimeS => benchkit::format_time_s(args.value),
    };

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "value": args.value,
            "text": text,
        }))?,
        OutputFormat::Text => println!("{}", text),
    }
    Ok(())
}

pub fn run_scan(args: ScanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let count = scan(args.kind, &args.text)?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "text": args.text,
            "count": count,
        }))?,
        OutputFormat::Text => println!("{}", count),
    }
    Ok(())
}

fn scan(kind: ScanKind, text: &str) -> benchkit::Result<u64> {
    let count = match kind {
        ScanKind::Metric => benchkit::scan_metric(text)?,
        ScanKind::Binary => benchkit::scan_binary(text)?,
        ScanKind::Time => benchkit::scan_time(text)?,
    };
    Ok(count)
}
