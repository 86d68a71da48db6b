//! Command dispatch
//!
//! Interprets framed tokens and drives the camera and motion collaborators.
//! The only persistent protocol state is the active camera mode, owned by
//! the camera module. Per-command failures (capture errors, bad or
//! out-of-range motion arguments, an actuator link that stays down after its
//! one retry) abandon that command and keep the session alive; only
//! transport write failures and `QUIT` end the session.

use crate::camera::Camera;
use crate::command::Command;
use crate::connection::Session;
use crate::error::{Error, Result};
use crate::motion::MotionLink;

/// What the session loop should do after a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

pub struct CommandDispatcher {
    camera: Camera,
    motion: MotionLink,
}

impl CommandDispatcher {
    pub fn new(camera: Camera, motion: MotionLink) -> Self {
        Self { camera, motion }
    }

    /// Execute one framed token against the session.
    pub fn dispatch(&mut self, token: &str, session: &mut Session) -> Result<Outcome> {
        let Some(command) = Command::parse(token) else {
            // Unrecognized tokens are ignored, not errors.
            log::debug!("Ignoring unknown command token: {:?}", token);
            return Ok(Outcome::Continue);
        };

        match command {
            Command::Quit => {
                log::info!("QUIT received, ending session");
                Ok(Outcome::Quit)
            }
            Command::Image => {
                // Capture and encode before touching the wire, so a capture
                // failure leaves no partial write behind.
                match self.camera.capture_jpeg() {
                    Ok(jpeg) => session.send_media(&jpeg).map(|_| Outcome::Continue),
                    Err(Error::Capture(reason)) => {
                        log::error!("Image capture failed, skipping: {}", reason);
                        Ok(Outcome::Continue)
                    }
                    Err(other) => Err(other),
                }
            }
            Command::SetMode(mode) => {
                self.camera.set_mode(mode);
                Ok(Outcome::Continue)
            }
            Command::Move(arg) => {
                if let Err(e) = self.motion.move_distance(&arg) {
                    log::error!("MOVE {} failed: {}", arg, e);
                }
                Ok(Outcome::Continue)
            }
            Command::Rotate(arg) => {
                if let Err(e) = self.motion.rotate(&arg) {
                    log::error!("ROTATE {} failed: {}", arg, e);
                }
                Ok(Outcome::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{FrameSource, TestPatternSource};
    use crate::command::CameraMode;
    use crate::config::CameraConfig;
    use crate::motion::ActuatorLink;
    use crate::pipeline::Frame;
    use crate::transport::mock::MockEndpoint;
    use std::sync::{Arc, Mutex};

    struct RecordingLink {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl ActuatorLink for RecordingLink {
        fn send(&mut self, packet: &[u8]) -> Result<()> {
            self.sent.lock().unwrap().push(packet.to_vec());
            Ok(())
        }
        fn reconnect(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct FailingSource;
    impl FrameSource for FailingSource {
        fn capture_frame(&mut self) -> Result<Frame> {
            Err(Error::Capture("device yielded nothing".to_string()))
        }
    }

    fn camera_config() -> CameraConfig {
        CameraConfig {
            device: "pattern".to_string(),
            target_width: 32,
            target_height: 24,
            jpeg_quality: 80,
        }
    }

    fn dispatcher_with(source: Box<dyn FrameSource>) -> (CommandDispatcher, Arc<Mutex<Vec<Vec<u8>>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let motion = MotionLink::new(Box::new(RecordingLink {
            sent: Arc::clone(&sent),
        }));
        let camera = Camera::new(source, camera_config());
        (CommandDispatcher::new(camera, motion), sent)
    }

    fn session() -> (Session, MockEndpoint, MockEndpoint) {
        let control = MockEndpoint::new();
        let media = MockEndpoint::new();
        let session = Session::new(Box::new(control.clone()), Box::new(media.clone()));
        (session, control, media)
    }

    #[test]
    fn test_image_writes_header_then_payload() {
        let (mut dispatcher, _) = dispatcher_with(Box::new(TestPatternSource::new(32, 24)));
        let (mut session, control, media) = session();

        assert_eq!(
            dispatcher.dispatch("IMAGE", &mut session).unwrap(),
            Outcome::Continue
        );

        let header = String::from_utf8(control.written()).unwrap();
        let length: usize = header.strip_suffix(';').unwrap().parse().unwrap();
        assert_eq!(media.written().len(), length);
        assert!(length > 0);
    }

    #[test]
    fn test_capture_failure_abandons_command() {
        let (mut dispatcher, _) = dispatcher_with(Box::new(FailingSource));
        let (mut session, control, media) = session();

        assert_eq!(
            dispatcher.dispatch("IMAGE", &mut session).unwrap(),
            Outcome::Continue
        );
        // No partial write on either channel.
        assert!(control.written().is_empty());
        assert!(media.written().is_empty());
    }

    #[test]
    fn test_mode_switch_has_no_wire_side_effect() {
        let (mut dispatcher, _) = dispatcher_with(Box::new(TestPatternSource::new(32, 24)));
        let (mut session, control, media) = session();

        dispatcher.dispatch("EDGE", &mut session).unwrap();
        assert_eq!(dispatcher.camera.mode(), CameraMode::EdgeDetect);
        dispatcher.dispatch("DOOR", &mut session).unwrap();
        assert_eq!(dispatcher.camera.mode(), CameraMode::DoorDetect);
        assert!(control.written().is_empty());
        assert!(media.written().is_empty());
    }

    #[test]
    fn test_motion_commands_reach_the_link() {
        let (mut dispatcher, sent) = dispatcher_with(Box::new(TestPatternSource::new(32, 24)));
        let (mut session, _, _) = session();

        dispatcher.dispatch("MOVE 5", &mut session).unwrap();
        dispatcher.dispatch("ROTATE -3", &mut session).unwrap();
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_bad_motion_argument_keeps_session_alive() {
        let (mut dispatcher, sent) = dispatcher_with(Box::new(TestPatternSource::new(32, 24)));
        let (mut session, _, _) = session();

        assert_eq!(
            dispatcher.dispatch("MOVE 9000", &mut session).unwrap(),
            Outcome::Continue
        );
        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_tokens_ignored_and_quit_ends() {
        let (mut dispatcher, _) = dispatcher_with(Box::new(TestPatternSource::new(32, 24)));
        let (mut session, _, _) = session();

        assert_eq!(
            dispatcher.dispatch("FROBNICATE", &mut session).unwrap(),
            Outcome::Continue
        );
        assert_eq!(
            dispatcher.dispatch("QUIT", &mut session).unwrap(),
            Outcome::Quit
        );
    }
}
