use log::{debug, warn};
use std::io;
use std::net::IpAddr;
use std::time::Duration;
use trust_dns_resolver::config::LookupIpStrategy;
use trust_dns_resolver::config::ResolverConfig;
use trust_dns_resolver::config::ResolverOpts;
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::Resolver;

#[derive(Debug, PartialEq, Eq)]
pub enum DnsCheck {
    Resolved(IpAddr),
    Unresolved { reason: String },
}

impl DnsCheck {
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            DnsCheck::Resolved(addr) => Some(*addr),
            DnsCheck::Unresolved { .. } => None,
        }
    }
}

/// One-shot blocking resolver: a single attempt per query, hosts file honoured.
pub struct HostResolver {
    resolver: Resolver,
}

impl HostResolver {
    pub fn new(timeout: Duration) -> io::Result<Self> {
        let (config, mut opts) = match read_system_conf() {
            Ok(conf) => conf,
            Err(err) => {
                warn!(
                    "Failed to read system resolver configuration, using defaults: {}",
                    err
                );
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.ip_strategy = LookupIpStrategy::Ipv4thenIpv6;
        opts.use_hosts_file = true;
        debug!(
            "Resolver using {} name servers, timeout {:?}",
            config.name_servers().len(),
            opts.timeout
        );

        let resolver = Resolver::new(config, opts)?;
        Ok(Self { resolver })
    }

    pub fn resolve(&self, hostname: &str) -> DnsCheck {
        let literal = hostname.trim_start_matches('[').trim_end_matches(']');
        if let Ok(addr) = literal.parse::<IpAddr>() {
            debug!("{} is an IP literal, skipping lookup", hostname);
            return DnsCheck::Resolved(addr);
        }

        let response = match self.resolver.lookup_ip(hostname) {
            Ok(r) => r,
            Err(err) => {
                debug!("Failed to resolve {}: {}", hostname, err);
                return DnsCheck::Unresolved {
                    reason: err.to_string(),
                };
            }
        };
        match response.iter().next() {
            Some(addr) => DnsCheck::Resolved(addr),
            None => DnsCheck::Unresolved {
                reason: String::from("no addresses returned"),
            },
        }
    }
}

/// Returns the first operator-supplied prefix the address falls under.
pub fn suspect_prefix(addr: IpAddr, prefixes: &[String]) -> Option<&str> {
    let text = addr.to_string();
    prefixes
        .iter()
        .map(String::as_str)
        .find(|prefix| !prefix.is_empty() && text.starts_with(prefix))
}
