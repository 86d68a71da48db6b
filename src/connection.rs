//! Connection lifecycle: dual accept and the pilot session
//!
//! A session needs both channels connected before any command is processed.
//! The pilot may dial control and media in either order, so the manager
//! polls both listening endpoints and accepts each exactly once, then stops
//! listening on it. There is no timeout; the wait ends when both channels
//! are up or shutdown is requested.

use crate::error::{Error, Result};
use crate::transport::{Endpoint, EndpointListener, Role};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Sleep between accept polling rounds
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Performs the dual-accept handshake over a pair of bound listeners.
pub struct ConnectionManager {
    pending: Vec<Box<dyn EndpointListener>>,
}

impl ConnectionManager {
    pub fn new(control: Box<dyn EndpointListener>, media: Box<dyn EndpointListener>) -> Self {
        Self {
            pending: vec![control, media],
        }
    }

    /// Block until both the control and the media endpoint are accepted, in
    /// whichever order the pilot connects, then return the ready session.
    ///
    /// Listeners are dropped (and stop listening) as soon as their
    /// connection is accepted. Returns [`Error::Interrupted`] if shutdown is
    /// requested while waiting.
    pub fn wait_for_connections(mut self, running: &AtomicBool) -> Result<Session> {
        let mut control: Option<Box<dyn Endpoint>> = None;
        let mut media: Option<Box<dyn Endpoint>> = None;

        while !self.pending.is_empty() {
            if !running.load(Ordering::Relaxed) {
                return Err(Error::Interrupted);
            }

            let mut accepted_any = false;
            let mut index = 0;
            while index < self.pending.len() {
                match self.pending[index].try_accept()? {
                    Some(endpoint) => {
                        let listener = self.pending.remove(index);
                        match listener.role() {
                            Role::Control => control = Some(endpoint),
                            Role::Media => media = Some(endpoint),
                        }
                        accepted_any = true;
                    }
                    None => index += 1,
                }
            }

            if !accepted_any && !self.pending.is_empty() {
                std::thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }

        // Both ends of the handshake are guaranteed once the pending set is
        // drained: exactly one listener carried each role.
        let control = control.ok_or_else(|| Error::Other("control endpoint missing".into()))?;
        let media = media.ok_or_else(|| Error::Other("media endpoint missing".into()))?;

        log::info!("Both channels connected, session ready");
        Ok(Session::new(control, media))
    }
}

/// The lifetime of one accepted control + media endpoint pair.
///
/// Owns both endpoints exclusively; they are closed on [`Session::close`] or
/// when the session is dropped, so no exit path leaks a connection.
pub struct Session {
    control: Box<dyn Endpoint>,
    media: Box<dyn Endpoint>,
    closed: bool,
}

impl Session {
    pub fn new(control: Box<dyn Endpoint>, media: Box<dyn Endpoint>) -> Self {
        Self {
            control,
            media,
            closed: false,
        }
    }

    /// Multiplex wait over both endpoints: read from whichever becomes
    /// readable first.
    ///
    /// Returns `Ok(None)` when neither endpoint had data within one poll
    /// round, `Ok(Some(0))` when a peer closed its stream. Commands normally
    /// arrive on control, but bytes from either endpoint are surfaced, as
    /// the wire protocol allows.
    pub fn poll_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        if let Some(n) = self.control.try_read(buf)? {
            return Ok(Some(n));
        }
        if let Some(n) = self.media.try_read(buf)? {
            return Ok(Some(n));
        }
        Ok(None)
    }

    /// Transmit one encoded image using the media protocol: the byte length
    /// and a `;` go out on control, then exactly that many bytes on media.
    pub fn send_media(&mut self, payload: &[u8]) -> Result<()> {
        let header = format!("{};", payload.len());
        self.control.write_all(header.as_bytes())?;
        self.media.write_all(payload)?;
        log::debug!("Sent {} media bytes", payload.len());
        Ok(())
    }

    /// Orderly teardown of both endpoints.
    pub fn close(&mut self) {
        if !self.closed {
            self.control.close();
            self.media.close();
            self.closed = true;
            log::info!("Session closed");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
