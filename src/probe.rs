use log::info;
use std::io::{self, Write};
use std::net::SocketAddr;

use crate::check::dns::{self, DnsCheck, HostResolver};
use crate::check::tcp::{self, TcpCheck};
use crate::check::url::{self, UrlCheck};
use crate::report::{self, Reporter, Verdict};
use crate::settings::ProbeSettings;
use crate::target::BrokerScheme;

/// Runs the URL, DNS and TCP checks in order and reports as it goes.
pub struct ConnectivityProbe {
    settings: ProbeSettings,
}

impl ConnectivityProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }

    pub fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> io::Result<Verdict> {
        reporter.banner()?;

        reporter.section("1. URL syntax")?;
        let url = url::check(&self.settings.url);
        reporter.url_check(&url)?;

        reporter.section("2. Network")?;
        let (dns, tcp) = match self.endpoint(&url) {
            Some((host, port)) => self.network(reporter, &host, port)?,
            None => {
                reporter.skipped("no host to probe, pass --host to check the network anyway")?;
                (None, None)
            }
        };

        let verdict = report::conclude(&url, dns.as_ref(), tcp.as_ref());
        info!("Verdict: {:?}", verdict);
        reporter.verdict(&verdict)?;
        Ok(verdict)
    }

    // Explicit overrides win; an ambiguous string still yields the host of its corrected form.
    fn endpoint(&self, url: &UrlCheck) -> Option<(String, u16)> {
        let target = match url {
            UrlCheck::Valid { target, .. } => Some(target),
            UrlCheck::Ambiguous { target, .. } => target.as_ref(),
            UrlCheck::Malformed { .. } => None,
        };
        if let Some(target) = target {
            info!("Probing {}", target);
        }

        let host = self
            .settings
            .host
            .clone()
            .or_else(|| target.map(|t| t.hostname.clone()))?;
        let port = self
            .settings
            .port
            .or_else(|| target.map(|t| t.port))
            .unwrap_or_else(|| BrokerScheme::Amqp.default_port());
        Some((host, port))
    }

    fn network<W: Write>(
        &self,
        reporter: &mut Reporter<W>,
        host: &str,
        port: u16,
    ) -> io::Result<(Option<DnsCheck>, Option<TcpCheck>)> {
        reporter.resolving(host)?;
        let dns = match HostResolver::new(self.settings.dns_timeout) {
            Ok(resolver) => resolver.resolve(host),
            Err(err) => DnsCheck::Unresolved {
                reason: format!("resolver unavailable: {}", err),
            },
        };
        reporter.dns_check(host, &dns)?;

        let ip = match dns.address() {
            Some(ip) => ip,
            None => return Ok((Some(dns), None)),
        };

        let addr = SocketAddr::new(ip, port);
        reporter.connecting(addr)?;
        let tcp = tcp::check(addr, self.settings.connect_timeout);
        reporter.tcp_check(port, &tcp)?;

        if let Some(prefix) = dns::suspect_prefix(ip, &self.settings.suspect_prefixes) {
            reporter.suspect_address(ip, prefix)?;
        }

        Ok((Some(dns), Some(tcp)))
    }
}
