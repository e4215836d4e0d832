//! Range command implementation.

use clap::Args;

use benchkit::{AddressRange, Family, SystemResolver};

use crate::output::{OutputFormat, print_json, print_range_text, range_to_json};

#[derive(Args)]
pub struct RangeArgs {
    /// Target in CIDR notation, e.g. 10.0.0.0/24 or 2001:db8::/64
    pub cidr: String,

    /// Use IPv4 only.
    #[arg(short = '4', conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Use IPv6 only.
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Also list up to N addresses of the range.
    #[arg(short = 'l', long, value_name = "N")]
    pub list: Option<usize>,
}

impl RangeArgs {
    fn family(&self) -> Option<Family> {
        match (self.ipv4, self.ipv6) {
            (true, false) => Some(Family::V4),
            (false, true) => Some(Family::V6),
            _ => None,
        }
    }
}

pub fn run(args: RangeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let range = parse(&args)?;

    let listed: Vec<String> = range
        .iter()
        .take(args.list.unwrap_or(0))
        .map(|addr| addr.to_string())
        .collect();

    match format {
        OutputFormat::Json => print_json(&range_to_json(&range, &listed))?,
        OutputFormat::Text => print_range_text(&range, &listed)?,
    }
    Ok(())
}

fn parse(args: &RangeArgs) -> benchkit::Result<AddressRange> {
    let range = benchkit::parse_cidr_range_with(&args.cidr, SystemResolver, args.family())?;
    Ok(range)
}
