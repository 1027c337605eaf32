//! Stream driver: pulls model output chunks, feeds the parser, forwards
//! snapshots, and enforces the completion and failure contract.

use deck_common::{MarkerSet, PartialPresentation};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::warn;

use crate::assembler::SlideCallback;
use crate::client::ResponseEvent;
use crate::error::GenerationError;
use crate::parser::StreamParser;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

pub struct StreamDriver {
    chunks: Receiver<ResponseEvent>,
    parser: StreamParser,
    tx_snapshots: Sender<PartialPresentation>,
}

impl StreamDriver {
    /// Build a driver over a model output stream. The returned receiver is
    /// the live snapshot sequence; dropping it simply stops delivery.
    pub fn new(chunks: Receiver<ResponseEvent>) -> (Self, Receiver<PartialPresentation>) {
        Self::with_markers(chunks, MarkerSet::default())
    }

    pub fn with_markers(
        chunks: Receiver<ResponseEvent>,
        markers: MarkerSet,
    ) -> (Self, Receiver<PartialPresentation>) {
        let (tx_snapshots, rx_snapshots) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let driver = Self {
            chunks,
            parser: StreamParser::new(markers),
            tx_snapshots,
        };
        (driver, rx_snapshots)
    }

    pub fn set_slide_callback(&mut self, callback: SlideCallback) {
        self.parser.set_slide_callback(callback);
    }

    /// Consume the model stream to completion.
    ///
    /// Stops as soon as the presentation completes, even if the source still
    /// has data buffered. If the source ends or fails first, the partial
    /// presentation is finalized and a last snapshot still goes out.
    ///
    /// Failure policy: a transport error with a usable partial (title or at
    /// least one slide) degrades to `Ok`; a clean stream that produced no
    /// title or no slides is an error carrying the partial.
    pub async fn run(mut self) -> Result<PartialPresentation, GenerationError> {
        let mut transport_error: Option<String> = None;

        while let Some(event) = self.chunks.recv().await {
            match event {
                ResponseEvent::TextDelta(chunk) => {
                    for snapshot in self.parser.push_chunk(&chunk) {
                        let _ = self.tx_snapshots.send(snapshot).await;
                    }
                    if self.parser.is_complete() {
                        break;
                    }
                }
                ResponseEvent::Completed => break,
                ResponseEvent::Error(message) => {
                    transport_error = Some(message);
                    break;
                }
            }
        }

        if let Some(snapshot) = self.parser.finish() {
            let _ = self.tx_snapshots.send(snapshot).await;
        }
        let state = self.parser.into_state();

        if let Some(message) = transport_error {
            if state.has_usable_content() {
                warn!("model stream failed mid-generation, keeping partial presentation: {message}");
                return Ok(state);
            }
            return Err(GenerationError::Transport { message });
        }
        if state.main_title.is_none() {
            return Err(GenerationError::MissingTitle { partial: state });
        }
        if state.slides.is_empty() {
            return Err(GenerationError::NoSlides { partial: state });
        }
        Ok(state)
    }
}
