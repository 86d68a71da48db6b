//! TCP transport implementation
//!
//! Listeners run non-blocking so the connection manager can poll both
//! channels and accept in whichever order the pilot connects. Accepted
//! streams are switched back to blocking with a short read timeout; reads
//! that time out surface as "no data yet" and writes block until complete.

use super::{Endpoint, EndpointListener, Role};
use crate::error::Result;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

/// Poll interval for endpoint reads
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// A bound TCP listener for one channel
pub struct TcpChannelListener {
    role: Role,
    listener: TcpListener,
}

impl TcpChannelListener {
    /// Bind and start listening; failure here aborts startup.
    pub fn bind(role: Role, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        log::info!("Listening for {} connection on {}", role, listener.local_addr()?);
        Ok(Self { role, listener })
    }

    /// Actual bound address (useful when binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

impl EndpointListener for TcpChannelListener {
    fn role(&self) -> Role {
        self.role
    }

    fn try_accept(&mut self) -> Result<Option<Box<dyn Endpoint>>> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                log::info!("Accepted {} connection from {}", self.role, peer);
                stream.set_nonblocking(false)?;
                stream.set_read_timeout(Some(READ_TIMEOUT))?;
                Ok(Some(Box::new(TcpEndpoint { stream })))
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// An accepted TCP stream
pub struct TcpEndpoint {
    stream: TcpStream,
}

impl Endpoint for TcpEndpoint {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.stream.read(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data)?;
        Ok(())
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_accept_without_client() {
        let mut listener = TcpChannelListener::bind(Role::Control, "127.0.0.1:0").unwrap();
        assert!(listener.try_accept().unwrap().is_none());
    }

    #[test]
    fn test_accept_and_round_trip() {
        let mut listener = TcpChannelListener::bind(Role::Media, "127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"ping").unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).unwrap();
            buf
        });

        let mut endpoint = loop {
            if let Some(ep) = listener.try_accept().unwrap() {
                break ep;
            }
            std::thread::sleep(Duration::from_millis(5));
        };

        let mut buf = [0u8; 16];
        let n = loop {
            if let Some(n) = endpoint.try_read(&mut buf).unwrap() {
                break n;
            }
        };
        assert_eq!(&buf[..n], b"ping");

        endpoint.write_all(b"pong").unwrap();
        assert_eq!(&client.join().unwrap(), b"pong");
    }
}
