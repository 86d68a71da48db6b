//! Sarathi - teleoperation daemon for a camera-equipped rover
//!
//! A remote pilot connects two byte streams (control + media) over TCP or an
//! RFCOMM radio link, issues `;`-delimited commands, pulls JPEG stills
//! through a runtime-selected processing chain, and drives the chassis
//! through a packetized serial actuator link.

pub mod app;
pub mod camera;
pub mod command;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod filters;
pub mod framer;
pub mod motion;
pub mod pipeline;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
