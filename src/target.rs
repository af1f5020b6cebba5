use std::fmt;

use url::{Host, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerScheme {
    Amqp,
    Amqps,
}

impl BrokerScheme {
    pub fn from_scheme(value: &str) -> Option<Self> {
        match value {
            "amqp" => Some(BrokerScheme::Amqp),
            "amqps" => Some(BrokerScheme::Amqps),
            _ => None,
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            BrokerScheme::Amqp => 5672,
            BrokerScheme::Amqps => 5671,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BrokerScheme::Amqp => "amqp",
            BrokerScheme::Amqps => "amqps",
        }
    }
}

/// What the URL parser extracted from a connection string.
///
/// Username and password are kept exactly as they appear in the parsed URL,
/// so an escaped password stays escaped (`Admin%40123`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub scheme: BrokerScheme,
    pub username: Option<String>,
    pub password: Option<String>,
    pub hostname: String,
    pub port: u16,
}

impl ConnectionTarget {
    pub fn from_url(url: &Url) -> Result<Self, String> {
        let scheme = BrokerScheme::from_scheme(url.scheme())
            .ok_or_else(|| format!("unsupported scheme '{}'", url.scheme()))?;
        let hostname = match url.host() {
            Some(Host::Domain(h)) if !h.is_empty() => String::from(h),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(String::from("missing host")),
        };
        let port = url.port().unwrap_or_else(|| scheme.default_port());
        let username = if url.username().is_empty() {
            None
        } else {
            Some(String::from(url.username()))
        };
        let password = url.password().map(String::from);
        Ok(Self {
            scheme,
            username,
            password,
            hostname,
            port,
        })
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme.as_str())?;
        if let Some(username) = &self.username {
            f.write_str(username)?;
            if self.password.is_some() {
                f.write_str(":****")?;
            }
            f.write_str("@")?;
        }
        if self.hostname.contains(':') {
            write!(f, "[{}]:{}", self.hostname, self.port)
        } else {
            write!(f, "{}:{}", self.hostname, self.port)
        }
    }
}
