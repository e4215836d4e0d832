//! Output formatting for the benchkit command.

use std::io::{self, Write};

use benchkit::AddressRange;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a JSON value followed by a newline.
pub fn print_json(value: &serde_json::Value) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

/// Large integers stay numbers while they fit in a u64, strings beyond that.
pub fn wide_number(n: u128) -> serde_json::Value {
    match u64::try_from(n) {
        Ok(n) => serde_json::json!(n),
        Err(_) => serde_json::json!(n.to_string()),
    }
}

pub fn range_to_json(range: &AddressRange, listed: &[String]) -> serde_json::Value {
    let mut json = serde_json::json!({
        "range": range.to_string(),
        "family": range.family().to_string(),
        "first": range.first().to_string(),
        "last": range.last().to_string(),
        "count": wide_number(range.count()),
    });

    if !listed.is_empty() {
        json["addresses"] = serde_json::json!(listed);
    }

    json
}

/// Print a range as aligned `key value` lines.
pub fn print_range_text(range: &AddressRange, listed: &[String]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "range   {}", range)?;
    writeln!(handle, "family  {}", range.family())?;
    writeln!(handle, "first   {}", range.first())?;
    writeln!(handle, "last    {}", range.last())?;
    writeln!(handle, "count   {}", range.count())?;
    for addr in listed {
        writeln!(handle, "  {}", addr)?;
    }
    Ok(())
}
