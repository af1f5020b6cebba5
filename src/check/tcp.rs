use log::debug;
use mio::net::{TcpSocket, TcpStream};
use mio::{Events, Interest, Poll, Token};
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

const PROBE: Token = Token(0);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub enum TcpCheck {
    Reachable {
        elapsed: Duration,
    },
    /// The connect attempt itself failed; `code` is the OS error number when there is one.
    Unreachable {
        code: Option<i32>,
        reason: String,
    },
    /// Socket creation or poll plumbing failed before a verdict on the target could be made.
    Failed {
        reason: String,
    },
}

impl TcpCheck {
    pub fn is_reachable(&self) -> bool {
        matches!(self, TcpCheck::Reachable { .. })
    }
}

pub fn check(addr: SocketAddr, timeout: Duration) -> TcpCheck {
    let start = Instant::now();
    // A timeout too large to add to the clock means no deadline at all.
    let result = connect_until(addr, start, start.checked_add(timeout));
    debug!("TCP check of {} finished after {:?}", addr, start.elapsed());
    result
}

fn connect_until(addr: SocketAddr, start: Instant, deadline: Option<Instant>) -> TcpCheck {
    let socket = match open_socket(addr) {
        Ok(s) => s,
        Err(err) => return failed(err),
    };
    let stream = match socket.connect(addr) {
        Ok(s) => s,
        Err(err) => return unreachable(err),
    };

    match wait_connected(stream, deadline) {
        Ok(Ok(())) => TcpCheck::Reachable {
            elapsed: start.elapsed(),
        },
        Ok(Err(err)) => unreachable(err),
        Err(err) => failed(err),
    }
}

fn open_socket(addr: SocketAddr) -> io::Result<TcpSocket> {
    match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
}

fn unreachable(err: io::Error) -> TcpCheck {
    TcpCheck::Unreachable {
        code: err.raw_os_error(),
        reason: err.to_string(),
    }
}

fn failed(err: io::Error) -> TcpCheck {
    TcpCheck::Failed {
        reason: err.to_string(),
    }
}

// The outer result is poll plumbing, the inner one the connect outcome.
// The stream is owned here, so it is closed on every return path.
fn wait_connected(
    mut stream: TcpStream,
    deadline: Option<Instant>,
) -> io::Result<io::Result<()>> {
    let mut poll = Poll::new()?;
    let mut events = Events::with_capacity(8);
    poll.registry()
        .register(&mut stream, PROBE, Interest::WRITABLE)?;

    loop {
        let remaining = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "connection attempt timed out",
                    )));
                }
                Some(deadline - now)
            }
            None => None,
        };

        match poll.poll(&mut events, remaining) {
            Ok(()) => {}
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }

        for event in events.iter() {
            if event.token() != PROBE {
                continue;
            }
            debug!(
                "TCP probe wakeup, writable: {}, error: {}",
                event.is_writable(),
                event.is_error()
            );
            if let Some(err) = stream.take_error()? {
                return Ok(Err(err));
            }
            match stream.peer_addr() {
                Ok(_) => return Ok(Ok(())),
                Err(ref err) if err.kind() == io::ErrorKind::NotConnected => {}
                Err(err) => return Ok(Err(err)),
            }
        }
    }
}
