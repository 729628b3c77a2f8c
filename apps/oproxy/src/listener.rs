use std::io;

use tokio::net::TcpListener;
use tracing::warn;

/// Binds `hostname:port`, moving on to the next port while the address is in use, for
/// at most `max_attempts` extra ports. Any other bind error is returned immediately.
pub(crate) async fn bind_with_retry(
    hostname: &str,
    port: u16,
    max_attempts: u16,
) -> io::Result<TcpListener> {
    let mut port = port;
    let mut attempts = 0;
    loop {
        match TcpListener::bind((hostname, port)).await {
            Ok(listener) => return Ok(listener),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse && attempts < max_attempts => {
                let Some(next) = port.checked_add(1) else {
                    return Err(err);
                };
                warn!(port, next, "port in use, trying next");
                attempts += 1;
                port = next;
            }
            Err(err) => return Err(err),
        }
    }
}
