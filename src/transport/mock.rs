//! Mock transport for testing
//!
//! In-memory endpoints and listeners with the same readiness semantics as
//! the real transports. The mock endpoint is `Clone` (shared interior), so a
//! test can keep a handle for injecting reads and inspecting writes after
//! handing the endpoint to the session.

use super::{Endpoint, EndpointListener, Role};
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock endpoint for unit testing
#[derive(Clone)]
pub struct MockEndpoint {
    inner: Arc<Mutex<MockEndpointInner>>,
}

struct MockEndpointInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    peer_closed: bool,
    closed: bool,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockEndpointInner {
                read_buffer: VecDeque::new(),
                write_buffer: Vec::new(),
                peer_closed: false,
                closed: false,
            })),
        }
    }

    /// Inject bytes to be read by the session
    pub fn inject_read(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.read_buffer.extend(data);
    }

    /// Simulate the peer closing its end; reads return EOF once drained
    pub fn close_peer(&self) {
        self.inner.lock().unwrap().peer_closed = true;
    }

    /// All bytes written by the session so far
    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().unwrap().write_buffer.clone()
    }

    /// Whether the session closed this endpoint
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

impl Default for MockEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl Endpoint for MockEndpoint {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let mut inner = self.inner.lock().unwrap();
        let available = inner.read_buffer.len().min(buf.len());
        if available == 0 {
            return if inner.peer_closed {
                Ok(Some(0))
            } else {
                Ok(None)
            };
        }
        for slot in buf.iter_mut().take(available) {
            *slot = inner.read_buffer.pop_front().unwrap();
        }
        Ok(Some(available))
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.write_buffer.extend_from_slice(data);
        Ok(())
    }

    fn close(&mut self) {
        self.inner.lock().unwrap().closed = true;
    }
}

/// Mock listener whose connections arrive on demand
pub struct MockListener {
    role: Role,
    pending: Arc<Mutex<VecDeque<MockEndpoint>>>,
}

/// Handle for delivering connections to a [`MockListener`] after it has been
/// handed to the connection manager.
#[derive(Clone)]
pub struct MockListenerHandle {
    pending: Arc<Mutex<VecDeque<MockEndpoint>>>,
}

impl MockListener {
    pub fn new(role: Role) -> (Self, MockListenerHandle) {
        let pending = Arc::new(Mutex::new(VecDeque::new()));
        (
            Self {
                role,
                pending: Arc::clone(&pending),
            },
            MockListenerHandle { pending },
        )
    }
}

impl MockListenerHandle {
    /// Make a connection available for the next `try_accept`
    pub fn connect(&self, endpoint: MockEndpoint) {
        self.pending.lock().unwrap().push_back(endpoint);
    }
}

impl EndpointListener for MockListener {
    fn role(&self) -> Role {
        self.role
    }

    fn try_accept(&mut self) -> Result<Option<Box<dyn Endpoint>>> {
        let next = self.pending.lock().unwrap().pop_front();
        Ok(next.map(|ep| Box::new(ep) as Box<dyn Endpoint>))
    }
}
