use serde::{Deserialize, Serialize};

/// Closed set of layout tags the model is allowed to emit. A record carrying
/// any other tag fails decoding and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideLayout {
    TitleContent,
    TitleOnly,
    SectionHeader,
    TwoColumn,
    Comparison,
    ImageLeft,
    ImageRight,
    FullImage,
    Quote,
    BulletPoints,
    NumberedList,
    Timeline,
    Statistics,
    ProcessSteps,
    Conclusion,
}

impl SlideLayout {
    /// Tag names as they appear on the wire, for prompt construction.
    pub const ALL_TAGS: &'static [&'static str] = &[
        "title_content",
        "title_only",
        "section_header",
        "two_column",
        "comparison",
        "image_left",
        "image_right",
        "full_image",
        "quote",
        "bullet_points",
        "numbered_list",
        "timeline",
        "statistics",
        "process_steps",
        "conclusion",
    ];
}

/// One fully-decoded slide. Optional fields are always populated with their
/// defaults, so consumers never need to null-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    /// Markdown-ish body; a literal `|` separates columns in two-sided layouts.
    pub content: String,
    pub layout: SlideLayout,
    /// Empty string means "no image".
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default)]
    pub speaker_notes: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(rename = "keyPoints", default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub statistics: String,
}

/// The evolving presentation state emitted to consumers at every point where
/// something new became usable. Every value is a full snapshot, not a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialPresentation {
    pub main_title: Option<String>,
    /// Append-only while streaming; frozen once `is_complete` flips.
    pub slides: Vec<Slide>,
    #[serde(rename = "isComplete")]
    pub is_complete: bool,
}

impl PartialPresentation {
    /// True if there is anything here worth showing a user.
    pub fn has_usable_content(&self) -> bool {
        self.main_title.is_some() || !self.slides.is_empty()
    }
}

/// What the user asked to generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub num_slides: usize,
    pub language: String,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            num_slides: 6,
            language: "en".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_round_trip() {
        let json = serde_json::to_string(&SlideLayout::TitleContent).unwrap();
        assert_eq!(json, "\"title_content\"");
        let back: SlideLayout = serde_json::from_str("\"quote\"").unwrap();
        assert_eq!(back, SlideLayout::Quote);
    }

    #[test]
    fn test_unknown_layout_rejected() {
        assert!(serde_json::from_str::<SlideLayout>("\"freeform\"").is_err());
    }

    #[test]
    fn test_all_tags_matches_variant_count() {
        for tag in SlideLayout::ALL_TAGS {
            let quoted = format!("\"{tag}\"");
            assert!(
                serde_json::from_str::<SlideLayout>(&quoted).is_ok(),
                "tag {tag} did not parse"
            );
        }
    }

    #[test]
    fn test_slide_optional_defaults() {
        let slide: Slide = serde_json::from_str(
            r#"{"title":"T","content":"C","layout":"title_content"}"#,
        )
        .unwrap();
        assert_eq!(slide.image_prompt, "");
        assert_eq!(slide.speaker_notes, "");
        assert_eq!(slide.subtitle, "");
        assert!(slide.key_points.is_empty());
        assert!(slide.examples.is_empty());
        assert_eq!(slide.statistics, "");
    }

    #[test]
    fn test_key_points_wire_name() {
        let slide: Slide = serde_json::from_str(
            r#"{"title":"T","content":"C","layout":"bullet_points","keyPoints":["a","b"]}"#,
        )
        .unwrap();
        assert_eq!(slide.key_points, vec!["a", "b"]);
    }

    #[test]
    fn test_usable_content() {
        let mut p = PartialPresentation::default();
        assert!(!p.has_usable_content());
        p.main_title = Some("Topic".to_string());
        assert!(p.has_usable_content());
    }
}
