//! Host name resolution.
//!
//! [`parse_cidr_range`](crate::cidr::parse_cidr_range) never talks to the
//! name service directly; it goes through a [`Resolver`]. The
//! [`SystemResolver`] uses the platform resolver and may block. The
//! [`StaticResolver`] answers from an in-memory table, which keeps tests
//! independent of the environment.

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, ToSocketAddrs};

/// Error type for name resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The system resolver failed in a way a retry may fix.
    #[error("lookup failed: {0}")]
    Io(#[from] io::Error),

    /// The name does not resolve to any address.
    #[error("no addresses found for {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Turns a host name or address literal into IP addresses.
pub trait Resolver {
    /// Resolve `host`, preferred address first.
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        (**self).resolve(host)
    }
}

/// Resolver backed by the platform name service (`getaddrinfo`).
///
/// Address literals never hit the name service. Names do, and the call
/// blocks for as long as the system resolver takes.
///
/// Lookup failures are reported as [`ResolveError::NotFound`] unless the
/// OS signals a timeout or interruption, which stays [`ResolveError::Io`].
/// The standard library does not expose the `getaddrinfo` error code, so an
/// unknown name and an unreachable name server look the same here.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        if let Ok(addr) = host.parse::<IpAddr>() {
            return Ok(vec![addr]);
        }

        tracing::debug!(host, "resolving via system resolver");
        let resolved = (host, 0)
            .to_socket_addrs()
            .map_err(|e| lookup_error(host, e))?;
        let mut addrs: Vec<IpAddr> = Vec::new();
        for sa in resolved {
            if !addrs.contains(&sa.ip()) {
                addrs.push(sa.ip());
            }
        }

        if addrs.is_empty() {
            return Err(ResolveError::NotFound(host.to_string()));
        }
        Ok(addrs)
    }
}

fn lookup_error(host: &str, err: io::Error) -> ResolveError {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => {
            ResolveError::Io(err)
        }
        _ => {
            tracing::debug!(host, error = %err, "name lookup failed");
            ResolveError::NotFound(host.to_string())
        }
    }
}

/// Resolver that answers from a fixed table.
///
/// Address literals are accepted as-is; any other name must have been
/// registered with [`insert`](Self::insert).
///
/// ```
/// use std::net::{IpAddr, Ipv4Addr};
/// use benchkit::resolve::{Resolver, StaticResolver};
///
/// let resolver = StaticResolver::new().with("target", [IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0))]);
/// assert_eq!(resolver.resolve("target").unwrap(), vec![IpAddr::from([10, 0, 0, 0])]);
/// assert!(resolver.resolve("elsewhere").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the addresses `host` resolves to, replacing earlier entries.
    pub fn insert(&mut self, host: impl Into<String>, addrs: impl IntoIterator<Item = IpAddr>) {
        self.hosts.insert(host.into(), addrs.into_iter().collect());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, host: impl Into<String>, addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        self.insert(host, addrs);
        self
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        if let Ok(addr) = host.parse::<IpAddr>() {
            return Ok(vec![addr]);
        }
        match self.hosts.get(host) {
            Some(addrs) if !addrs.is_empty() => Ok(addrs.clone()),
            _ => Err(ResolveError::NotFound(host.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_system_resolver_literals() {
        assert_eq!(
            SystemResolver.resolve("192.168.1.1").unwrap(),
            vec![IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))]
        );
        assert_eq!(
            SystemResolver.resolve("::1").unwrap(),
            vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]
        );
    }

    #[test]
    fn test_lookup_error_kinds() {
        let unknown = io::Error::other(
            "failed to lookup address information: Name or service not known",
        );
        assert!(matches!(
            lookup_error("not-an-address", unknown),
            ResolveError::NotFound(h) if h == "not-an-address"
        ));

        let timeout = io::Error::from(io::ErrorKind::TimedOut);
        assert!(matches!(
            lookup_error("slow.example", timeout),
            ResolveError::Io(_)
        ));
    }

    #[test]
    fn test_system_resolver_unknown_name() {
        assert!(matches!(
            SystemResolver.resolve("not-an-address"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_static_resolver() {
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        let resolver = StaticResolver::new().with("dual", [Ipv4Addr::LOCALHOST.into(), v6]);

        assert_eq!(resolver.resolve("dual").unwrap().len(), 2);
        assert_eq!(
            resolver.resolve("10.1.2.3").unwrap(),
            vec![IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3))]
        );
        assert!(matches!(
            resolver.resolve("missing"),
            Err(ResolveError::NotFound(h)) if h == "missing"
        ));
    }

    #[test]
    fn test_static_resolver_empty_entry() {
        let resolver = StaticResolver::new().with("empty", Vec::new());
        assert!(matches!(
            resolver.resolve("empty"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolver_by_reference() {
        fn first(resolver: impl Resolver, host: &str) -> IpAddr {
            resolver.resolve(host).unwrap()[0]
        }
        let resolver = StaticResolver::new();
        assert_eq!(first(&resolver, "::"), IpAddr::V6(Ipv6Addr::UNSPECIFIED));
    }
}
