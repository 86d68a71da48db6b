//! Edge detection stage

use super::{Frame, PipelineStage};
use crate::filters;

/// Gradient magnitudes at or above this become edge pixels.
const EDGE_THRESHOLD: u16 = 128;

pub struct EdgeDetectStage {
    next: Option<Box<dyn PipelineStage>>,
}

impl EdgeDetectStage {
    pub fn new(next: Option<Box<dyn PipelineStage>>) -> Self {
        Self { next }
    }
}

impl PipelineStage for EdgeDetectStage {
    fn label(&self) -> &'static str {
        "edge-detect"
    }

    fn transform(&self, frame: Frame) -> Frame {
        let gray = filters::grayscale(&frame);
        let edges = filters::edge_map(&gray, EDGE_THRESHOLD);
        Frame::ImageLuma8(edges)
    }

    fn next(&self) -> Option<&dyn PipelineStage> {
        self.next.as_deref()
    }
}
