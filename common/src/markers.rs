//! Delimiter vocabulary shared between prompt construction and the parser.
//!
//! These are out-of-band sentinels the model is instructed to emit verbatim;
//! they are not a self-describing wire format. Any change here must be
//! mirrored in the prompt text, or the parser will silently see nothing.

/// Opens one slide record.
pub const SLIDE_START: &str = "SLIDE_START_DELIMITER";
/// Closes one slide record.
pub const SLIDE_END: &str = "SLIDE_END_DELIMITER";
/// Signals that no further records will be produced.
pub const PRESENTATION_COMPLETE: &str = "PRESENTATION_COMPLETE_DELIMITER";

/// The set of sentinel tokens in force for one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    pub slide_start: String,
    pub slide_end: String,
    pub presentation_complete: String,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            slide_start: SLIDE_START.to_string(),
            slide_end: SLIDE_END.to_string(),
            presentation_complete: PRESENTATION_COMPLETE.to_string(),
        }
    }
}
