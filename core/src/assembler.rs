//! Incremental presentation assembly.
//!
//! The assembler owns the evolving [`PartialPresentation`] and decides when a
//! snapshot is emitted: once when the title lands, once per decoded slide,
//! and once at completion. It never emits the same state twice and never
//! re-opens a completed presentation.

use deck_common::{MarkerSet, PartialPresentation, Slide};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::decode::decode_record;
use crate::extract::RecordExtractor;

/// Invoked synchronously with each validated slide and its zero-based index,
/// before the matching snapshot goes out. Intended for eager prefetch of
/// slide assets (images, narration) keyed off the slide text.
pub type SlideCallback = Box<dyn FnMut(&Slide, usize) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingTitle,
    StreamingSlides,
    Complete,
}

/// Minimal object the model emits ahead of any record markers.
#[derive(Deserialize)]
struct TitleObject {
    main_title: String,
}

pub struct PresentationAssembler {
    extractor: RecordExtractor,
    phase: Phase,
    /// One-shot latch for the title snapshot.
    title_emitted: bool,
    state: PartialPresentation,
    on_slide: Option<SlideCallback>,
}

impl PresentationAssembler {
    pub fn new(markers: MarkerSet) -> Self {
        Self {
            extractor: RecordExtractor::new(markers),
            phase: Phase::AwaitingTitle,
            title_emitted: false,
            state: PartialPresentation::default(),
            on_slide: None,
        }
    }

    pub fn set_slide_callback(&mut self, callback: SlideCallback) {
        self.on_slide = Some(callback);
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn state(&self) -> &PartialPresentation {
        &self.state
    }

    pub fn into_state(self) -> PartialPresentation {
        self.state
    }

    /// Process everything newly available in `buf`, returning the snapshots
    /// to emit, in order. Call once per appended chunk; one large chunk may
    /// produce several snapshots.
    pub fn process_buffer(&mut self, buf: &mut String) -> Vec<PartialPresentation> {
        if self.phase == Phase::Complete {
            return Vec::new();
        }
        let mut snapshots = Vec::new();

        if self.state.main_title.is_none() {
            self.try_capture_title(buf, &mut snapshots);
        }

        for raw in self.extractor.drain_records(buf) {
            match decode_record(&raw) {
                Ok(slide) => {
                    self.state.slides.push(slide);
                    let index = self.state.slides.len() - 1;
                    if let (Some(cb), Some(slide)) =
                        (self.on_slide.as_mut(), self.state.slides.last())
                    {
                        cb(slide, index);
                    }
                    snapshots.push(self.state.clone());
                }
                Err(err) => {
                    warn!("dropping malformed slide record: {err}");
                    debug!("malformed record body: {raw}");
                }
            }
        }

        if buf.contains(&self.extractor.markers().presentation_complete) {
            snapshots.push(self.complete());
        }
        snapshots
    }

    /// Force completion, e.g. when the upstream source ends without ever
    /// sending the terminal marker. Returns the final snapshot, or `None`
    /// if the presentation already completed.
    pub fn finish(&mut self) -> Option<PartialPresentation> {
        if self.phase == Phase::Complete {
            return None;
        }
        Some(self.complete())
    }

    fn complete(&mut self) -> PartialPresentation {
        self.phase = Phase::Complete;
        self.state.is_complete = true;
        self.state.clone()
    }

    /// Look for the title object in the text before any record markers. The
    /// candidate is the first `{..}` span; if it does not parse as the
    /// minimal title object yet, leave the buffer alone and retry on the
    /// next chunk.
    fn try_capture_title(&mut self, buf: &mut String, snapshots: &mut Vec<PartialPresentation>) {
        let Some(open) = buf.find('{') else { return };
        let Some(close) = buf[open..].find('}').map(|i| open + i) else {
            return;
        };
        let candidate = &buf[open..=close];
        let Ok(obj) = serde_json::from_str::<TitleObject>(candidate) else {
            return;
        };
        self.state.main_title = Some(obj.main_title);
        buf.drain(..=close);
        if self.phase == Phase::AwaitingTitle {
            self.phase = Phase::StreamingSlides;
        }
        if !self.title_emitted {
            self.title_emitted = true;
            snapshots.push(self.state.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn assembler() -> PresentationAssembler {
        PresentationAssembler::new(MarkerSet::default())
    }

    const SLIDE_ONE: &str = "SLIDE_START_DELIMITER\n{\"title\":\"T1\",\"content\":\"C1\",\"layout\":\"title_content\"}\nSLIDE_END_DELIMITER";

    #[test]
    fn test_title_snapshot_emitted_once() {
        let mut a = assembler();
        let mut buf = String::from("{\"main_title\": \"Topic A\"}");
        let snaps = a.process_buffer(&mut buf);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].main_title.as_deref(), Some("Topic A"));
        assert!(snaps[0].slides.is_empty());
        assert!(!snaps[0].is_complete);

        // More chatter before the first slide must not re-emit the title.
        buf.push_str("\nsome interstitial text");
        assert!(a.process_buffer(&mut buf).is_empty());
    }

    #[test]
    fn test_title_buffer_consumed() {
        let mut a = assembler();
        let mut buf = format!("{{\"main_title\": \"Topic\"}}\n{SLIDE_ONE}");
        let snaps = a.process_buffer(&mut buf);
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[1].slides.len(), 1);
        assert_eq!(snaps[1].slides[0].title, "T1");
    }

    #[test]
    fn test_malformed_record_dropped() {
        let mut a = assembler();
        let mut buf = format!(
            "{{\"main_title\":\"T\"}}{SLIDE_ONE}\
             SLIDE_START_DELIMITER not json SLIDE_END_DELIMITER\
             SLIDE_START_DELIMITER\n{{\"title\":\"T2\",\"content\":\"C2\",\"layout\":\"quote\"}}\nSLIDE_END_DELIMITER"
        );
        let snaps = a.process_buffer(&mut buf);
        // title + two good slides; the broken one vanished.
        assert_eq!(snaps.len(), 3);
        let last = &snaps[2];
        assert_eq!(last.slides.len(), 2);
        assert_eq!(last.slides[0].title, "T1");
        assert_eq!(last.slides[1].title, "T2");
    }

    #[test]
    fn test_terminal_marker_completes() {
        let mut a = assembler();
        let mut buf = format!("{{\"main_title\":\"T\"}}{SLIDE_ONE}PRESENTATION_COMPLETE_DELIMITER");
        let snaps = a.process_buffer(&mut buf);
        assert_eq!(snaps.len(), 3);
        assert!(snaps[2].is_complete);
        assert!(a.is_complete());

        // Frozen after completion.
        let mut more = SLIDE_ONE.to_string();
        assert!(a.process_buffer(&mut more).is_empty());
        assert_eq!(a.state().slides.len(), 1);
    }

    #[test]
    fn test_finish_without_terminal_marker() {
        let mut a = assembler();
        let mut buf = format!("{{\"main_title\":\"T\"}}{SLIDE_ONE}");
        a.process_buffer(&mut buf);
        let final_snap = a.finish().unwrap();
        assert!(final_snap.is_complete);
        assert_eq!(final_snap.slides.len(), 1);
        assert!(a.finish().is_none());
    }

    #[test]
    fn test_slide_callback_order() {
        let seen: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut a = assembler();
        a.set_slide_callback(Box::new(move |slide, index| {
            if let Ok(mut v) = sink.lock() {
                v.push((slide.title.clone(), index));
            }
        }));
        let mut buf = format!(
            "{{\"main_title\":\"T\"}}{SLIDE_ONE}\
             SLIDE_START_DELIMITER\n{{\"title\":\"T2\",\"content\":\"C2\",\"layout\":\"quote\"}}\nSLIDE_END_DELIMITER"
        );
        a.process_buffer(&mut buf);
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![("T1".to_string(), 0), ("T2".to_string(), 1)]);
    }

    #[test]
    fn test_slides_without_title_still_accumulate() {
        let mut a = assembler();
        let mut buf = SLIDE_ONE.to_string();
        let snaps = a.process_buffer(&mut buf);
        assert_eq!(snaps.len(), 1);
        assert!(snaps[0].main_title.is_none());
        assert_eq!(snaps[0].slides.len(), 1);
    }
}
