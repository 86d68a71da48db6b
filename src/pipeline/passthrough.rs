//! A stage which does nothing

use super::{Frame, PipelineStage};

pub struct PassthroughStage {
    next: Option<Box<dyn PipelineStage>>,
}

impl PassthroughStage {
    pub fn new(next: Option<Box<dyn PipelineStage>>) -> Self {
        Self { next }
    }
}

impl PipelineStage for PassthroughStage {
    fn label(&self) -> &'static str {
        "passthrough"
    }

    fn transform(&self, frame: Frame) -> Frame {
        frame
    }

    fn next(&self) -> Option<&dyn PipelineStage> {
        self.next.as_deref()
    }
}
