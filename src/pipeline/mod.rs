//! Image processing pipeline
//!
//! A captured frame passes through an ordered chain of stages before it is
//! encoded and transmitted. Each stage applies one transform and forwards the
//! result to its exclusively-owned successor; the chain is linear, never
//! branching, never cyclic. Chains are rebuilt whenever the camera mode
//! changes:
//!
//! | Mode         | Chain                        |
//! |--------------|------------------------------|
//! | `Raw`        | resize                       |
//! | `EdgeDetect` | resize → edge-detect         |
//! | `DoorDetect` | resize → edge-detect → door  |
//!
//! With resizing disabled (zero target dimensions) the leading stage is a
//! pass-through instead.

use crate::command::CameraMode;
use crate::config::CameraConfig;

mod door;
mod edge;
mod passthrough;
mod resize;

pub use door::DoorDetectStage;
pub use edge::EdgeDetectStage;
pub use passthrough::PassthroughStage;
pub use resize::ResizeStage;

/// The frame currency flowing between stages
pub type Frame = image::DynamicImage;

/// One transform in the chain-of-responsibility
pub trait PipelineStage: Send {
    /// Short stage name for logs and chain inspection
    fn label(&self) -> &'static str;

    /// Apply this stage's own transform
    fn transform(&self, frame: Frame) -> Frame;

    /// The owned successor, if any
    fn next(&self) -> Option<&dyn PipelineStage>;

    /// Run this stage and every stage after it
    fn process(&self, frame: Frame) -> Frame {
        let frame = self.transform(frame);
        match self.next() {
            Some(stage) => stage.process(frame),
            None => frame,
        }
    }
}

/// Build the stage chain for a camera mode.
pub fn build_chain(mode: CameraMode, config: &CameraConfig) -> Box<dyn PipelineStage> {
    match mode {
        CameraMode::Raw => scaling_stage(config, None),
        CameraMode::EdgeDetect => {
            scaling_stage(config, Some(Box::new(EdgeDetectStage::new(None))))
        }
        CameraMode::DoorDetect => scaling_stage(
            config,
            Some(Box::new(EdgeDetectStage::new(Some(Box::new(
                DoorDetectStage::new(None),
            ))))),
        ),
    }
}

fn scaling_stage(
    config: &CameraConfig,
    next: Option<Box<dyn PipelineStage>>,
) -> Box<dyn PipelineStage> {
    if config.target_width == 0 || config.target_height == 0 {
        Box::new(PassthroughStage::new(next))
    } else {
        Box::new(ResizeStage::new(
            config.target_width,
            config.target_height,
            next,
        ))
    }
}

/// Labels of every stage in chain order, for inspection and tests.
pub fn chain_labels(chain: &dyn PipelineStage) -> Vec<&'static str> {
    let mut labels = vec![chain.label()];
    let mut cursor = chain.next();
    while let Some(stage) = cursor {
        labels.push(stage.label());
        cursor = stage.next();
    }
    labels
}
