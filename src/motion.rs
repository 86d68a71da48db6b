//! Motion link to the chassis controller
//!
//! Movement requests become fixed-format wire packets on a serial link:
//!
//! ```text
//! <command code> [ ',' <argument> ]... ';'
//! ```
//!
//! Each argument field is the base64 text of exactly one byte, so legal
//! magnitudes are bounded to the signed single-byte range −128..=127. The
//! bound is part of the controller protocol and is enforced here with a
//! clear error instead of silently truncating.
//!
//! The serial link is assumed unreliable: a failed send triggers exactly one
//! reconnect (same port, same baud) followed by one resend of the same
//! packet. A second consecutive failure is fatal for that command only.

use crate::config::ActuatorConfig;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::io::Write;
use std::time::Duration;

/// Field separator inside a packet
pub const FIELD_SEPARATOR: u8 = b',';
/// Packet terminator
pub const COMMAND_SEPARATOR: u8 = b';';

/// Command code: move forward/backward by a signed distance
pub const CMD_MOVE_DIST: u8 = b'5';
/// Command code: rotate in place by a signed angle
pub const CMD_ROTATE: u8 = b'6';

/// The serial collaborator behind the motion link
pub trait ActuatorLink: Send {
    /// Write one packet to the wire
    fn send(&mut self, packet: &[u8]) -> Result<()>;

    /// Re-open the link with its original configuration
    fn reconnect(&mut self) -> Result<()>;
}

/// Serial-port actuator link
pub struct SerialActuatorLink {
    port: Box<dyn serialport::SerialPort>,
    path: String,
    baud: u32,
}

impl SerialActuatorLink {
    /// Open the chassis controller port.
    pub fn open(config: &ActuatorConfig) -> Result<Self> {
        let port = Self::open_port(&config.port, config.baud)?;
        Ok(Self {
            port,
            path: config.port.clone(),
            baud: config.baud,
        })
    }

    fn open_port(path: &str, baud: u32) -> Result<Box<dyn serialport::SerialPort>> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(100))
            .open()?;
        log::info!("Opened actuator port {} at {} baud", path, baud);
        Ok(port)
    }
}

impl ActuatorLink for SerialActuatorLink {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        self.port.write_all(packet)?;
        Ok(())
    }

    fn reconnect(&mut self) -> Result<()> {
        self.port = Self::open_port(&self.path, self.baud)?;
        Ok(())
    }
}

/// Encodes move/rotate requests and manages the reconnect-on-failure policy.
pub struct MotionLink {
    link: Box<dyn ActuatorLink>,
}

impl MotionLink {
    pub fn new(link: Box<dyn ActuatorLink>) -> Self {
        Self { link }
    }

    /// Move forward (positive) or backward (negative) the given distance.
    ///
    /// The argument arrives as the raw token from the control channel and is
    /// validated here.
    pub fn move_distance(&mut self, arg: &str) -> Result<()> {
        let packet = packetize(CMD_MOVE_DIST, &[parse_magnitude(arg)?]);
        self.send_with_retry(&packet)
    }

    /// Rotate in place; positive is clockwise, in degrees.
    pub fn rotate(&mut self, arg: &str) -> Result<()> {
        let packet = packetize(CMD_ROTATE, &[parse_magnitude(arg)?]);
        self.send_with_retry(&packet)
    }

    fn send_with_retry(&mut self, packet: &[u8]) -> Result<()> {
        log::debug!("Sending motion packet: {:?}", packet);
        if let Err(first) = self.link.send(packet) {
            log::warn!("Motion send failed ({}), reconnecting once", first);
            self.link.reconnect()?;
            self.link.send(packet).map_err(|second| {
                Error::LinkFailed(format!("resend after reconnect failed: {}", second))
            })?;
        }
        Ok(())
    }
}

/// Build one wire packet: command code, separated argument fields, terminator.
pub fn packetize(command: u8, args: &[i8]) -> Vec<u8> {
    let mut packet = vec![command];
    for &arg in args {
        packet.push(FIELD_SEPARATOR);
        packet.extend_from_slice(encode_magnitude(arg).as_bytes());
    }
    packet.push(COMMAND_SEPARATOR);
    packet
}

/// Base64 text of the argument's single two's-complement byte
fn encode_magnitude(value: i8) -> String {
    BASE64.encode([value as u8])
}

/// Inverse of [`encode_magnitude`], used by tests and diagnostics.
pub fn decode_magnitude(field: &str) -> Result<i8> {
    let bytes = BASE64
        .decode(field)
        .map_err(|e| Error::InvalidParameter(format!("bad argument field: {}", e)))?;
    match bytes.as_slice() {
        [byte] => Ok(*byte as i8),
        _ => Err(Error::InvalidParameter(format!(
            "argument field holds {} bytes, expected 1",
            bytes.len()
        ))),
    }
}

/// Parse and bounds-check a motion argument token.
fn parse_magnitude(arg: &str) -> Result<i8> {
    let value: i32 = arg
        .trim()
        .parse()
        .map_err(|_| Error::InvalidParameter(format!("'{}' is not a number", arg)))?;
    i8::try_from(value).map_err(|_| {
        Error::InvalidParameter(format!(
            "magnitude {} outside single-byte range -128..=127",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scriptable link: records packets, fails the next N sends.
    #[derive(Clone)]
    struct MockLink {
        inner: Arc<Mutex<MockLinkInner>>,
    }

    #[derive(Default)]
    struct MockLinkInner {
        sent: Vec<Vec<u8>>,
        fail_sends: usize,
        reconnects: usize,
    }

    impl MockLink {
        fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(MockLinkInner::default())),
            }
        }

        fn fail_next_sends(&self, count: usize) {
            self.inner.lock().unwrap().fail_sends = count;
        }

        fn sent(&self) -> Vec<Vec<u8>> {
            self.inner.lock().unwrap().sent.clone()
        }

        fn reconnects(&self) -> usize {
            self.inner.lock().unwrap().reconnects
        }
    }

    impl ActuatorLink for MockLink {
        fn send(&mut self, packet: &[u8]) -> Result<()> {
            let mut inner = self.inner.lock().unwrap();
            if inner.fail_sends > 0 {
                inner.fail_sends -= 1;
                return Err(Error::Other("simulated send failure".to_string()));
            }
            inner.sent.push(packet.to_vec());
            Ok(())
        }

        fn reconnect(&mut self) -> Result<()> {
            self.inner.lock().unwrap().reconnects += 1;
            Ok(())
        }
    }

    fn split_packet(packet: &[u8]) -> (u8, Vec<String>) {
        assert_eq!(*packet.last().unwrap(), COMMAND_SEPARATOR);
        let body = &packet[..packet.len() - 1];
        let mut fields = body.split(|&b| b == FIELD_SEPARATOR);
        let code = fields.next().unwrap()[0];
        let args = fields
            .map(|f| String::from_utf8(f.to_vec()).unwrap())
            .collect();
        (code, args)
    }

    #[test]
    fn test_move_and_rotate_packets_round_trip() {
        let link = MockLink::new();
        let mut motion = MotionLink::new(Box::new(link.clone()));

        motion.move_distance("5").unwrap();
        motion.rotate("-3").unwrap();

        let sent = link.sent();
        assert_eq!(sent.len(), 2);

        let (move_code, move_args) = split_packet(&sent[0]);
        let (rotate_code, rotate_args) = split_packet(&sent[1]);
        assert_ne!(move_code, rotate_code);
        assert_eq!(decode_magnitude(&move_args[0]).unwrap(), 5);
        assert_eq!(decode_magnitude(&rotate_args[0]).unwrap(), -3);
    }

    #[test]
    fn test_out_of_range_magnitude_rejected() {
        let link = MockLink::new();
        let mut motion = MotionLink::new(Box::new(link.clone()));

        assert!(matches!(
            motion.move_distance("300"),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            motion.rotate("-129"),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            motion.move_distance("fast"),
            Err(Error::InvalidParameter(_))
        ));
        // Nothing reached the wire.
        assert!(link.sent().is_empty());
    }

    #[test]
    fn test_boundary_magnitudes_accepted() {
        let link = MockLink::new();
        let mut motion = MotionLink::new(Box::new(link.clone()));
        motion.move_distance("127").unwrap();
        motion.move_distance("-128").unwrap();
        assert_eq!(link.sent().len(), 2);
    }

    #[test]
    fn test_one_failure_triggers_one_reconnect_and_resend() {
        let link = MockLink::new();
        let mut motion = MotionLink::new(Box::new(link.clone()));

        link.fail_next_sends(1);
        motion.move_distance("10").unwrap();

        assert_eq!(link.reconnects(), 1);
        let sent = link.sent();
        assert_eq!(sent.len(), 1);
        let (code, args) = split_packet(&sent[0]);
        assert_eq!(code, CMD_MOVE_DIST);
        assert_eq!(decode_magnitude(&args[0]).unwrap(), 10);
    }

    #[test]
    fn test_second_failure_propagates_without_third_attempt() {
        let link = MockLink::new();
        let mut motion = MotionLink::new(Box::new(link.clone()));

        link.fail_next_sends(2);
        assert!(matches!(
            motion.move_distance("10"),
            Err(Error::LinkFailed(_))
        ));
        // One reconnect, no successful send, and no third attempt.
        assert_eq!(link.reconnects(), 1);
        assert!(link.sent().is_empty());
    }
}
