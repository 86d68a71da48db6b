//! RFCOMM radio transport (Linux)
//!
//! The short-range radio link uses Bluetooth RFCOMM stream sockets, one
//! channel per endpoint, bound to the local adapter. The kernel exposes
//! these through `AF_BLUETOOTH` sockets; the address and protocol constants
//! live outside the libc crate, so they are declared here.

use super::{Endpoint, EndpointListener, Role};
use crate::error::{Error, Result};
use std::io;
use std::os::unix::io::RawFd;

const BTPROTO_RFCOMM: libc::c_int = 3;

/// `struct sockaddr_rc` from `<bluetooth/rfcomm.h>`
#[repr(C)]
struct SockaddrRc {
    rc_family: libc::sa_family_t,
    /// BDADDR_ANY when binding the local adapter
    rc_bdaddr: [u8; 6],
    rc_channel: u8,
}

fn last_os_error() -> Error {
    Error::Io(io::Error::last_os_error())
}

fn set_nonblocking(fd: RawFd) -> Result<()> {
    // SAFETY: plain fcntl on a descriptor we own.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(last_os_error());
        }
    }
    Ok(())
}

fn rfcomm_socket() -> Result<RawFd> {
    // SAFETY: creating a socket has no memory-safety preconditions.
    let fd = unsafe { libc::socket(libc::AF_BLUETOOTH, libc::SOCK_STREAM, BTPROTO_RFCOMM) };
    if fd < 0 {
        return Err(last_os_error());
    }
    Ok(fd)
}

/// A bound RFCOMM listener for one channel
pub struct RadioChannelListener {
    role: Role,
    fd: RawFd,
}

impl RadioChannelListener {
    /// Bind the local adapter on the given RFCOMM channel and listen.
    pub fn bind(role: Role, channel: u8) -> Result<Self> {
        let fd = rfcomm_socket()?;
        let addr = SockaddrRc {
            rc_family: libc::AF_BLUETOOTH as libc::sa_family_t,
            rc_bdaddr: [0u8; 6],
            rc_channel: channel,
        };
        // SAFETY: addr is a valid sockaddr_rc for the lifetime of the call.
        let rc = unsafe {
            libc::bind(
                fd,
                &addr as *const SockaddrRc as *const libc::sockaddr,
                std::mem::size_of::<SockaddrRc>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            let err = last_os_error();
            unsafe { libc::close(fd) };
            return Err(err);
        }
        // SAFETY: fd is a bound socket we own.
        if unsafe { libc::listen(fd, 1) } < 0 {
            let err = last_os_error();
            unsafe { libc::close(fd) };
            return Err(err);
        }
        set_nonblocking(fd)?;
        log::info!("Listening for {} connection on RFCOMM channel {}", role, channel);
        Ok(Self { role, fd })
    }
}

impl EndpointListener for RadioChannelListener {
    fn role(&self) -> Role {
        self.role
    }

    fn try_accept(&mut self) -> Result<Option<Box<dyn Endpoint>>> {
        // SAFETY: accept on a listening socket; we discard the peer address.
        let conn = unsafe { libc::accept(self.fd, std::ptr::null_mut(), std::ptr::null_mut()) };
        if conn < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock => Ok(None),
                _ => Err(Error::Io(err)),
            };
        }
        log::info!("Accepted {} connection over radio", self.role);
        Ok(Some(Box::new(RadioEndpoint { fd: conn })))
    }
}

impl Drop for RadioChannelListener {
    fn drop(&mut self) {
        // SAFETY: closing a descriptor we own.
        unsafe { libc::close(self.fd) };
    }
}

/// An accepted RFCOMM stream
pub struct RadioEndpoint {
    fd: RawFd,
}

/// Poll interval for endpoint reads, matching the TCP transport
const READ_TIMEOUT_MS: libc::c_int = 50;

impl Endpoint for RadioEndpoint {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: pfd is valid for the duration of the call.
        let ready = unsafe { libc::poll(&mut pfd, 1, READ_TIMEOUT_MS) };
        if ready < 0 {
            return Err(last_os_error());
        }
        if ready == 0 {
            return Ok(None);
        }
        // SAFETY: buf is a valid writable region of its own length.
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if n < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                _ => Err(Error::Io(err)),
            };
        }
        Ok(Some(n as usize))
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < data.len() {
            let remaining = &data[written..];
            // SAFETY: remaining is a valid readable region of its own length.
            let n = unsafe {
                libc::write(
                    self.fd,
                    remaining.as_ptr() as *const libc::c_void,
                    remaining.len(),
                )
            };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(Error::Io(err));
            }
            written += n as usize;
        }
        Ok(())
    }

    fn close(&mut self) {
        // SAFETY: shutting down a descriptor we own.
        unsafe { libc::shutdown(self.fd, libc::SHUT_RDWR) };
    }
}

impl Drop for RadioEndpoint {
    fn drop(&mut self) {
        // SAFETY: closing a descriptor we own.
        unsafe { libc::close(self.fd) };
    }
}
