//! Synchronous facade over buffer + assembler.
//!
//! This is the unit the chunking-invariance tests exercise: feed it text in
//! any split whatsoever and the emitted snapshots converge on the same final
//! presentation.

use deck_common::{MarkerSet, PartialPresentation};

use crate::assembler::{PresentationAssembler, SlideCallback};

pub struct StreamParser {
    buffer: String,
    assembler: PresentationAssembler,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new(MarkerSet::default())
    }
}

impl StreamParser {
    pub fn new(markers: MarkerSet) -> Self {
        Self {
            buffer: String::new(),
            assembler: PresentationAssembler::new(markers),
        }
    }

    pub fn set_slide_callback(&mut self, callback: SlideCallback) {
        self.assembler.set_slide_callback(callback);
    }

    /// Append one chunk and run the pipeline over whatever is now complete.
    /// Returns the snapshots this chunk unlocked, possibly none.
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<PartialPresentation> {
        if self.assembler.is_complete() {
            return Vec::new();
        }
        self.buffer.push_str(chunk);
        self.assembler.process_buffer(&mut self.buffer)
    }

    /// Signal end of input. Emits the final snapshot if the terminal marker
    /// never arrived.
    pub fn finish(&mut self) -> Option<PartialPresentation> {
        self.assembler.finish()
    }

    pub fn is_complete(&self) -> bool {
        self.assembler.is_complete()
    }

    pub fn state(&self) -> &PartialPresentation {
        self.assembler.state()
    }

    pub fn into_state(self) -> PartialPresentation {
        self.assembler.into_state()
    }
}
