//! Application orchestration
//!
//! Brings up the collaborators, performs the dual-accept handshake, and runs
//! the single-threaded session loop: one blocking multiplex wait, one token
//! fully dispatched before the next is read. Cleanup is scoped: the session
//! and the actuator link close their resources on drop, so every exit path —
//! `QUIT`, peer disconnect, fatal I/O error, or an interrupt signal — tears
//! down cleanly.

use crate::camera::{self, Camera};
use crate::config::AppConfig;
use crate::connection::{ConnectionManager, Session};
use crate::dispatch::{CommandDispatcher, Outcome};
use crate::error::Result;
use crate::framer::Framer;
use crate::motion::{MotionLink, SerialActuatorLink};
use crate::transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Read buffer size for the session loop
const READ_BUFFER_SIZE: usize = 4096;

/// Sleep when neither endpoint had data in a poll round
const IDLE_SLEEP: Duration = Duration::from_millis(5);

pub struct TeleopApp {
    config: AppConfig,
    running: Arc<AtomicBool>,
}

impl TeleopApp {
    pub fn new(config: AppConfig, running: Arc<AtomicBool>) -> Self {
        Self { config, running }
    }

    /// Run one pilot session to completion.
    ///
    /// Binds both listeners (fatal on failure), opens the camera and the
    /// actuator link, waits for the pilot to connect both channels, then
    /// serves commands until `QUIT`, disconnect, or shutdown.
    pub fn run(&self) -> Result<()> {
        let (control, media) = transport::bind(&self.config.network)?;
        let manager = ConnectionManager::new(control, media);

        let source = camera::open_source(&self.config.camera)?;
        let camera = Camera::new(source, self.config.camera.clone());

        log::info!(
            "Opening actuator link on {}",
            self.config.actuator.port
        );
        let link = SerialActuatorLink::open(&self.config.actuator)?;
        let motion = MotionLink::new(Box::new(link));

        let mut dispatcher = CommandDispatcher::new(camera, motion);

        log::info!("Waiting for pilot connections...");
        let mut session = manager.wait_for_connections(&self.running)?;

        serve(&mut session, &mut dispatcher, &self.running)
    }
}

/// The main session loop: multiplex-wait on both endpoints, frame whatever
/// arrives, and dispatch each token strictly in order.
pub fn serve(
    session: &mut Session,
    dispatcher: &mut CommandDispatcher,
    running: &AtomicBool,
) -> Result<()> {
    let mut framer = Framer::new();
    let mut buf = [0u8; READ_BUFFER_SIZE];

    while running.load(Ordering::Relaxed) {
        match session.poll_read(&mut buf)? {
            Some(0) => {
                log::info!("Pilot disconnected");
                break;
            }
            Some(n) => {
                for token in framer.push(&buf[..n]) {
                    if dispatcher.dispatch(&token, session)? == Outcome::Quit {
                        session.close();
                        return Ok(());
                    }
                }
            }
            None => std::thread::sleep(IDLE_SLEEP),
        }
    }

    session.close();
    Ok(())
}
