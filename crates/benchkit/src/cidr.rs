//! CIDR target ranges.
//!
//! A load generator pointed at `10.0.0.0/24` spreads connections over every
//! address in the block. [`parse_cidr_range`] turns that notation into an
//! [`AddressRange`]: first and last address as 128-bit integers, the number of
//! addresses past the first, and a cursor the connection layer advances for
//! round-robin selection.
//!
//! IPv4 addresses occupy the low 32 bits of the integers.
//!
//! # Example
//!
//! ```
//! use benchkit::cidr::parse_cidr_range;
//!
//! let range = parse_cidr_range("10.0.0.0/24").unwrap();
//! assert_eq!(range.first().to_string(), "10.0.0.0");
//! assert_eq!(range.last().to_string(), "10.0.0.255");
//! assert_eq!(range.count(), 255);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::resolve::{ResolveError, Resolver, SystemResolver};

/// Error type for CIDR parsing.
#[derive(Debug, thiserror::Error)]
pub enum CidrError {
    #[error("cannot resolve {host:?}: {source}")]
    AddressResolution {
        host: String,
        #[source]
        source: ResolveError,
    },

    #[error("invalid mask length: {0}")]
    InvalidMask(String),

    #[error("{host:?} has no {wanted} address")]
    UnsupportedFamily { host: String, wanted: Family },

    #[error("{addr}/{prefix_len} has non-network bits set")]
    NonNetworkAddress { addr: IpAddr, prefix_len: u8 },
}

pub type Result<T> = std::result::Result<T, CidrError>;

/// Longest mask accepted before the address family is known.
const MAX_PREFIX: u8 = 128;

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Family of `addr`.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// Address width in bits.
    pub const fn bits(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    /// All address bits set.
    pub const fn full_mask(self) -> u128 {
        match self {
            Family::V4 => u32::MAX as u128,
            Family::V6 => u128::MAX,
        }
    }

    /// Network mask for a prefix of `prefix_len` bits.
    ///
    /// Returns `None` when `prefix_len` exceeds [`bits`](Self::bits).
    pub fn mask(self, prefix_len: u8) -> Option<u128> {
        let host_bits = self.bits().checked_sub(prefix_len)?;
        let full = self.full_mask();
        // A shift by the full width leaves nothing (a /0 mask).
        Some(full.checked_shl(u32::from(host_bits)).unwrap_or(0) & full)
    }

    fn addr_from_bits(self, bits: u128) -> IpAddr {
        match self {
            Family::V4 => IpAddr::V4(Ipv4Addr::from(bits as u32)),
            Family::V6 => IpAddr::V6(Ipv6Addr::from(bits)),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

fn addr_to_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

/// A contiguous block of addresses described by one network and mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRange {
    first_ip: u128,
    last_ip: u128,
    count: u128,
    /// Address most recently handed out by the connection layer.
    ///
    /// Starts at the first address. Nothing in this crate moves it.
    pub cursor: u128,
    family: Family,
}

impl AddressRange {
    /// Build the range for network `addr` with a mask of `prefix_len` bits.
    ///
    /// Without a mask the range is the single address. `addr` must be the
    /// network address itself; host bits are rejected, not cleared.
    pub fn new(addr: IpAddr, prefix_len: Option<u8>) -> Result<Self> {
        let family = Family::of(&addr);
        let width = family.bits();
        let prefix_len = prefix_len.unwrap_or(width);
        let mask = family.mask(prefix_len).ok_or_else(|| {
            CidrError::InvalidMask(format!("{prefix_len} exceeds maximum {width} for {family}"))
        })?;

        let full = family.full_mask();
        let base = addr_to_bits(addr);
        tracing::trace!(
            addr = format_args!("{base:#034x}"),
            full = format_args!("{full:#034x}"),
            mask = format_args!("{mask:#034x}"),
            "computing range"
        );

        let first_ip = base & mask;
        if first_ip != base {
            return Err(CidrError::NonNetworkAddress { addr, prefix_len });
        }
        let last_ip = first_ip | (!mask & full);

        Ok(Self {
            first_ip,
            last_ip,
            count: last_ip - first_ip,
            cursor: first_ip,
            family,
        })
    }

    /// First address as an integer.
    pub fn first_ip(&self) -> u128 {
        self.first_ip
    }

    /// Last address as an integer.
    pub fn last_ip(&self) -> u128 {
        self.last_ip
    }

    /// Number of addresses after the first; 0 for a single host.
    pub fn count(&self) -> u128 {
        self.count
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn first(&self) -> IpAddr {
        self.family.addr_from_bits(self.first_ip)
    }

    pub fn last(&self) -> IpAddr {
        self.family.addr_from_bits(self.last_ip)
    }

    /// The cursor as an address.
    pub fn cursor_addr(&self) -> IpAddr {
        self.family.addr_from_bits(self.cursor)
    }

    pub fn prefix_len(&self) -> u8 {
        self.family.bits() - self.count.count_ones() as u8
    }

    /// Total number of addresses, or `None` for `::/0`.
    pub fn size(&self) -> Option<u128> {
        self.count.checked_add(1)
    }

    /// Check if `addr` falls inside the range.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        if Family::of(addr) != self.family {
            return false;
        }
        let bits = addr_to_bits(*addr);
        self.first_ip <= bits && bits <= self.last_ip
    }

    /// Iterate over every address from first to last.
    pub fn iter(&self) -> Addresses {
        Addresses {
            next: Some(self.first_ip),
            last: self.last_ip,
            family: self.family,
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first(), self.prefix_len())
    }
}

/// Addresses are written in their textual form and `count` as a decimal
/// string, since it does not fit a JSON number for most IPv6 ranges.
#[cfg(feature = "serde")]
impl serde::Serialize for AddressRange {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("AddressRange", 6)?;
        state.serialize_field("family", &self.family)?;
        state.serialize_field("first", &self.first())?;
        state.serialize_field("last", &self.last())?;
        state.serialize_field("prefix_len", &self.prefix_len())?;
        state.serialize_field("count", &self.count.to_string())?;
        state.serialize_field("cursor", &self.cursor_addr())?;
        state.end()
    }
}

impl IntoIterator for &AddressRange {
    type Item = IpAddr;
    type IntoIter = Addresses;

    fn into_iter(self) -> Addresses {
        self.iter()
    }
}

/// Iterator over the addresses of an [`AddressRange`].
#[derive(Debug, Clone)]
pub struct Addresses {
    next: Option<u128>,
    last: u128,
    family: Family,
}

impl Iterator for Addresses {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        let current = self.next?;
        self.next = (current < self.last).then(|| current + 1);
        Some(self.family.addr_from_bits(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some(next) = self.next else {
            return (0, Some(0));
        };
        match usize::try_from(self.last - next)
            .ok()
            .and_then(|n| n.checked_add(1))
        {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Addresses {}

/// Parse `<address>[/<mask-length>]` using the system resolver.
///
/// The address may be a literal of either family or a host name.
pub fn parse_cidr_range(text: &str) -> Result<AddressRange> {
    parse_cidr_range_with(text, SystemResolver, None)
}

/// Parse `<address>[/<mask-length>]` with an explicit resolver.
///
/// With `family` set, the first resolved address of that family is used and
/// a name without one fails with [`CidrError::UnsupportedFamily`].
pub fn parse_cidr_range_with<R: Resolver>(
    text: &str,
    resolver: R,
    family: Option<Family>,
) -> Result<AddressRange> {
    let text = text.trim();
    let (host, prefix_len) = match text.split_once('/') {
        Some((host, mask)) => (host, Some(parse_mask(mask)?)),
        None => (text, None),
    };

    if host.is_empty() {
        tracing::warn!(input = text, "IP address could not be read");
        return Err(CidrError::AddressResolution {
            host: host.to_string(),
            source: ResolveError::NotFound("empty address".to_string()),
        });
    }

    let addrs = resolver.resolve(host).map_err(|source| {
        tracing::warn!(host, error = %source, "can't parse IP address");
        CidrError::AddressResolution {
            host: host.to_string(),
            source,
        }
    })?;

    let addr = pick_address(host, &addrs, family)?;
    let range = AddressRange::new(addr, prefix_len).inspect_err(|e| {
        tracing::warn!(input = text, error = %e, "rejected CIDR range");
    })?;
    tracing::debug!(
        input = text,
        first = %range.first(),
        last = %range.last(),
        count = range.count(),
        "parsed CIDR range"
    );
    Ok(range)
}

fn pick_address(host: &str, addrs: &[IpAddr], family: Option<Family>) -> Result<IpAddr> {
    let Some(wanted) = family else {
        return addrs
            .first()
            .copied()
            .ok_or_else(|| CidrError::AddressResolution {
                host: host.to_string(),
                source: ResolveError::NotFound(host.to_string()),
            });
    };

    addrs
        .iter()
        .copied()
        .find(|a| Family::of(a) == wanted)
        .ok_or_else(|| {
            tracing::warn!(host, %wanted, "unsupported address family");
            CidrError::UnsupportedFamily {
                host: host.to_string(),
                wanted,
            }
        })
}

fn parse_mask(s: &str) -> Result<u8> {
    let invalid = || {
        tracing::warn!(mask = s, "netmask must be between 0 and {}", MAX_PREFIX);
        CidrError::InvalidMask(s.to_string())
    };
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match s.parse::<u8>() {
        Ok(len) if len <= MAX_PREFIX => Ok(len),
        _ => Err(invalid()),
    }
}
