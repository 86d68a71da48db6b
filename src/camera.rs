//! Camera collaborator and processing-mode ownership
//!
//! Frame acquisition is a trait seam: the daemon only requires something that
//! can yield a frame or report a capture failure. The built-in
//! [`TestPatternSource`] keeps the daemon runnable on hardware-free benches;
//! device-backed sources implement the same trait.

use crate::command::CameraMode;
use crate::config::CameraConfig;
use crate::error::{Error, Result};
use crate::pipeline::{self, Frame, PipelineStage};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

/// External frame producer
pub trait FrameSource: Send {
    /// Capture one raw frame.
    ///
    /// Fails with [`Error::Capture`] when the device yields nothing.
    fn capture_frame(&mut self) -> Result<Frame>;
}

/// Camera module: owns the frame source, the active mode and its stage chain.
pub struct Camera {
    source: Box<dyn FrameSource>,
    config: CameraConfig,
    mode: CameraMode,
    chain: Box<dyn PipelineStage>,
}

impl Camera {
    pub fn new(source: Box<dyn FrameSource>, config: CameraConfig) -> Self {
        let mode = CameraMode::default();
        let chain = pipeline::build_chain(mode, &config);
        Self {
            source,
            config,
            mode,
            chain,
        }
    }

    /// Active processing mode
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switch the processing mode, rebuilding the stage chain.
    pub fn set_mode(&mut self, mode: CameraMode) {
        log::info!("Camera mode -> {:?}", mode);
        self.mode = mode;
        self.chain = pipeline::build_chain(mode, &self.config);
    }

    /// Capture a frame and run it through the active chain.
    pub fn capture_image(&mut self) -> Result<Frame> {
        let frame = self.source.capture_frame()?;
        Ok(self.chain.process(frame))
    }

    /// Capture, process, and encode one frame as JPEG bytes.
    pub fn capture_jpeg(&mut self) -> Result<Vec<u8>> {
        let image = self.capture_image()?;
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.config.jpeg_quality);
        image
            .write_with_encoder(encoder)
            .map_err(|e| Error::Capture(format!("JPEG encoding failed: {}", e)))?;
        Ok(bytes)
    }
}

/// Synthetic frame source: a gradient with a sweeping vertical bar.
///
/// The bar advances one column per capture so consecutive stills differ.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    tick: u32,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tick: 0,
        }
    }
}

impl FrameSource for TestPatternSource {
    fn capture_frame(&mut self) -> Result<Frame> {
        let bar = self.tick % self.width.max(1);
        self.tick = self.tick.wrapping_add(1);
        let img = RgbImage::from_fn(self.width, self.height, |x, y| {
            if x == bar {
                Rgb([255, 255, 255])
            } else {
                Rgb([(x % 256) as u8, (y % 256) as u8, 64])
            }
        });
        Ok(Frame::ImageRgb8(img))
    }
}

/// Build the frame source named by the configuration.
pub fn open_source(config: &CameraConfig) -> Result<Box<dyn FrameSource>> {
    match config.device.as_str() {
        "pattern" => Ok(Box::new(TestPatternSource::new(
            config.target_width.max(1),
            config.target_height.max(1),
        ))),
        other => Err(Error::NotSupported(format!(
            "unknown camera device '{}'",
            other
        ))),
    }
}
