//! Record decoding: one extracted raw record → one validated, fully
//! defaulted [`Slide`].
//!
//! Failure here is always local. The caller drops the record, logs, and
//! moves on; a single garbled record must never take down the stream.

use deck_common::{Slide, SlideLayout};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record missing required field `{0}`")]
    MissingField(&'static str),
}

/// Wire shape before validation. Everything optional so we can distinguish
/// "absent" from "present but empty" and report which field was missing.
#[derive(Debug, Deserialize)]
struct RawRecord {
    title: Option<String>,
    content: Option<String>,
    layout: Option<SlideLayout>,
    #[serde(default)]
    image_prompt: Option<String>,
    #[serde(default)]
    speaker_notes: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(rename = "keyPoints", default)]
    key_points: Option<Vec<String>>,
    #[serde(default)]
    examples: Option<Vec<String>>,
    #[serde(default)]
    statistics: Option<String>,
}

/// Decode and validate one raw record.
///
/// `title` and `content` must be present and non-empty; `layout` must be one
/// of the closed tag set (an unknown tag already fails JSON decoding). All
/// optional fields are defaulted so the returned slide needs no null checks.
pub fn decode_record(raw: &str) -> Result<Slide, DecodeError> {
    let record: RawRecord = serde_json::from_str(raw)?;

    let title = match record.title {
        Some(t) if !t.is_empty() => t,
        _ => return Err(DecodeError::MissingField("title")),
    };
    let content = match record.content {
        Some(c) if !c.is_empty() => c,
        _ => return Err(DecodeError::MissingField("content")),
    };
    let layout = record
        .layout
        .ok_or(DecodeError::MissingField("layout"))?;

    Ok(Slide {
        title,
        content,
        layout,
        image_prompt: record.image_prompt.unwrap_or_default(),
        speaker_notes: record.speaker_notes.unwrap_or_default(),
        subtitle: record.subtitle.unwrap_or_default(),
        key_points: record.key_points.unwrap_or_default(),
        examples: record.examples.unwrap_or_default(),
        statistics: record.statistics.unwrap_or_default(),
    })
}
