use deck_common::PartialPresentation;
use thiserror::Error;

/// Terminal failures of one generation request.
///
/// Record-level problems (a slide that does not parse or validate) are never
/// represented here; those are dropped and logged where they happen.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The model stream failed before anything usable arrived.
    #[error("model stream failed before any content arrived: {message}")]
    Transport { message: String },

    /// The stream ended cleanly but never produced a presentation title.
    /// The partial state is attached so callers can still inspect it.
    #[error("generation finished without a presentation title")]
    MissingTitle { partial: PartialPresentation },

    /// The stream ended cleanly but produced zero slides.
    #[error("generation finished with no slides")]
    NoSlides { partial: PartialPresentation },
}

impl GenerationError {
    /// Whatever partial presentation survived the failure, if any.
    pub fn partial(&self) -> Option<&PartialPresentation> {
        match self {
            GenerationError::Transport { .. } => None,
            GenerationError::MissingTitle { partial } => Some(partial),
            GenerationError::NoSlides { partial } => Some(partial),
        }
    }
}
