//! Building blocks for network load generators.
//!
//! This crate covers two small jobs every HTTP/TCP benchmark needs:
//!
//! - [`units`] - human-readable scaled quantities. Byte counts in powers of
//!   1024, request counts in powers of 1000, latencies in us/ms/s, and the
//!   reverse direction for command-line values such as `10k` or `2m`.
//! - [`cidr`] - target ranges written as `address/mask`. The result is an
//!   [`AddressRange`] the connection layer walks round-robin.
//!
//! Name resolution sits behind the [`Resolver`] trait so the masking logic can
//! be driven by a [`StaticResolver`](resolve::StaticResolver) in tests.
//!
//! # Features
//!
//! - `serde` - `Serialize` for [`AddressRange`] and [`Family`]
//!
//! # Example
//!
//! ```
//! use benchkit::{parse_cidr_range, units};
//!
//! let range = parse_cidr_range("192.168.10.0/29")?;
//! for addr in &range {
//!     println!("{addr}");
//! }
//!
//! let connections = units::scan_metric("10k")?;
//! println!("{} connections", units::format_metric(connections as f64));
//! # Ok::<(), benchkit::Error>(())
//! ```

pub mod cidr;
pub mod error;
pub mod resolve;
pub mod units;

// Re-export common types at crate root for convenience
pub use cidr::{AddressRange, Family, parse_cidr_range, parse_cidr_range_with};
pub use error::{Error, Result};
pub use resolve::{Resolver, SystemResolver};
pub use units::{
    format_binary, format_metric, format_time_s, format_time_us, scan_binary, scan_metric,
    scan_time,
};
