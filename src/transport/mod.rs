//! Transport layer: byte-stream endpoints for the pilot session
//!
//! A session rides on two independent byte streams, control and media,
//! carried over TCP sockets or RFCOMM radio sockets. Both sides of the
//! abstraction are non-blocking-friendly: listeners report "no connection
//! yet" and endpoints report "no data yet" instead of blocking forever, so
//! the single-threaded session loop can multiplex a small fixed set of
//! handles by polling.

use crate::config::{LinkMode, NetworkConfig};
use crate::error::Result;
use std::fmt;

pub mod mock;
#[cfg(target_os = "linux")]
pub mod radio;
pub mod tcp;

/// Which channel an endpoint carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Command tokens inbound, length headers outbound
    Control,
    /// Raw image bytes outbound
    Media,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Control => write!(f, "control"),
            Role::Media => write!(f, "media"),
        }
    }
}

/// A connected byte-stream endpoint
pub trait Endpoint: Send {
    /// Read available bytes.
    ///
    /// Returns `Ok(None)` when no data arrived within the poll interval,
    /// `Ok(Some(0))` when the peer closed the stream.
    fn try_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>>;

    /// Write the whole buffer
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Shut the stream down; further reads and writes fail
    fn close(&mut self);
}

/// A bound, listening endpoint that has not yet accepted its connection
pub trait EndpointListener: Send {
    fn role(&self) -> Role;

    /// Accept the pending connection, if one has arrived.
    fn try_accept(&mut self) -> Result<Option<Box<dyn Endpoint>>>;
}

/// Bind the control and media listeners selected by the configuration.
///
/// A bind or listen failure here is fatal to startup.
pub fn bind(config: &NetworkConfig) -> Result<(Box<dyn EndpointListener>, Box<dyn EndpointListener>)> {
    match config.mode {
        LinkMode::Tcp => {
            let control = tcp::TcpChannelListener::bind(Role::Control, &config.control_address)?;
            let media = tcp::TcpChannelListener::bind(Role::Media, &config.media_address)?;
            Ok((Box::new(control), Box::new(media)))
        }
        LinkMode::Radio => bind_radio(config),
    }
}

#[cfg(target_os = "linux")]
fn bind_radio(
    config: &NetworkConfig,
) -> Result<(Box<dyn EndpointListener>, Box<dyn EndpointListener>)> {
    let control = radio::RadioChannelListener::bind(Role::Control, config.radio_control_channel)?;
    let media = radio::RadioChannelListener::bind(Role::Media, config.radio_media_channel)?;
    Ok((Box::new(control), Box::new(media)))
}

#[cfg(not(target_os = "linux"))]
fn bind_radio(
    _config: &NetworkConfig,
) -> Result<(Box<dyn EndpointListener>, Box<dyn EndpointListener>)> {
    Err(crate::error::Error::NotSupported(
        "radio link requires Linux RFCOMM sockets".to_string(),
    ))
}
