//! Resilient connection establishment to the dealer.
//!
//! Many training clients are typically launched at once against a single
//! dealer, so the connect loop both shuffles the candidate hosts each round
//! and sleeps a jittered interval between rounds to keep the herd spread out.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::constants::{
    CONNECT_BACKOFF_BASE_MS, CONNECT_BACKOFF_JITTER_MS, CONNECT_TIMEOUT_MS,
};
use crate::error::QjackError;

/// Candidate hosts in preference order: the configured host first, then the
/// loopback literal, the loopback name, and the local hostname. De-duplicated
/// while preserving order.
pub fn candidate_hosts(configured: &str) -> Vec<String> {
    let local = gethostname::gethostname().to_string_lossy().into_owned();
    let mut hosts: Vec<String> = Vec::new();
    for host in [configured, "127.0.0.1", "localhost", local.as_str()] {
        if !host.is_empty() && !hosts.iter().any(|h| h == host) {
            hosts.push(host.to_string());
        }
    }
    hosts
}

/// Attempts to open a TCP connection to the dealer, trying every candidate
/// host per round for up to `max_rounds` rounds. The per-attempt connect
/// timeout is short; once a connection is open, read/write timeouts are
/// cleared because the dealer may legitimately think for a while.
///
/// Exhausting every round is fatal: the returned error carries the attempt
/// count and the last underlying cause.
pub fn connect<R: Rng>(
    configured_host: &str,
    port: u16,
    max_rounds: u32,
    rng: &mut R,
) -> Result<TcpStream, QjackError> {
    let mut hosts = candidate_hosts(configured_host);
    let timeout = Duration::from_millis(CONNECT_TIMEOUT_MS);
    let mut last_cause: Option<io::Error> = None;

    for round in 0..max_rounds {
        hosts.shuffle(rng);
        for host in &hosts {
            match try_host(host, port, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(None)?;
                    stream.set_write_timeout(None)?;
                    debug!("connected to dealer at {}:{} (round {})", host, port, round + 1);
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("connect to {}:{} failed: {}", host, port, e);
                    last_cause = Some(e);
                }
            }
        }
        if round + 1 < max_rounds {
            let jitter = rng.gen_range(0..=CONNECT_BACKOFF_JITTER_MS);
            std::thread::sleep(Duration::from_millis(CONNECT_BACKOFF_BASE_MS + jitter));
        }
    }

    Err(QjackError::Connect {
        attempts: max_rounds,
        last_cause: last_cause
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no candidate hosts")),
    })
}

fn try_host(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last: Option<io::Error> = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last = Some(e),
        }
    }
    Err(last.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("{} resolved to no addresses", host))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn candidates_are_deduped_in_order() {
        let hosts = candidate_hosts("127.0.0.1");
        assert_eq!(hosts[0], "127.0.0.1");
        assert_eq!(hosts.iter().filter(|h| *h == "127.0.0.1").count(), 1);
        assert!(hosts.contains(&"localhost".to_string()));
    }

    #[test]
    fn exhausted_attempts_report_attempt_count() {
        let mut rng = StdRng::seed_from_u64(1);
        // Reserved port with nothing listening; refused immediately on loopback.
        let err = connect("127.0.0.1", 1, 2, &mut rng).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2 attempts"), "unexpected message: {}", msg);
    }
}
