use deck_common::{GenerationRequest, PartialPresentation, Slide};
use serde::{Deserialize, Serialize};

/// Events flowing out of a generation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SessionConfigured {},
    GenerationStarted,
    /// Full self-contained snapshot of the evolving presentation.
    Snapshot { presentation: PartialPresentation },
    /// A slide just validated, emitted ahead of its snapshot so asset
    /// prefetch can start immediately.
    SlideReady { slide: Slide, index: usize },
    /// Final state of a finished generation. The presentation may still be
    /// degraded (stream failed mid-way with usable partial content).
    Completed { presentation: PartialPresentation },
    Error { message: String },
    ShutdownComplete,
}

/// Operations a caller can submit to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Op {
    StartGeneration { request: GenerationRequest },
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub op: Op,
}

impl Submission {
    pub fn new(op: Op) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            op,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_ids_unique() {
        let a = Submission::new(Op::Shutdown);
        let b = Submission::new(Op::Shutdown);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_event_serde_round_trip() {
        let ev = Event::SlideReady {
            slide: serde_json::from_str(
                r#"{"title":"T","content":"C","layout":"quote"}"#,
            )
            .unwrap(),
            index: 0,
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Event::SlideReady { index: 0, .. }));
    }
}
