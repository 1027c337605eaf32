//! Prompt construction.
//!
//! The parser's entire grammar lives in the instructions below: the title
//! object, the start/end markers around every record, the record field
//! schema, and the terminal marker. Changing any token here without updating
//! `deck_common::markers` (or vice versa) breaks ingestion silently.

use deck_common::{GenerationRequest, MarkerSet, SlideLayout};

pub fn build_presentation_prompt(request: &GenerationRequest, markers: &MarkerSet) -> String {
    let layouts = SlideLayout::ALL_TAGS.join(", ");
    format!(
        r#"You are generating a slide presentation in {language} about: {topic}

Output rules, follow them exactly:

1. First output a single JSON object carrying only the presentation title:
{{"main_title": "..."}}

2. Then output exactly {num_slides} slides. Each slide is ONE flat JSON object on its own lines, wrapped in literal marker lines:
{start}
{{"title": "...", "content": "...", "layout": "...", "image_prompt": "...", "speaker_notes": "...", "subtitle": "...", "keyPoints": ["..."], "examples": ["..."], "statistics": "..."}}
{end}

- "title", "content" and "layout" are required and must be non-empty.
- "layout" must be one of: {layouts}.
- "content" may use light markdown (headers, emphasis, lists, blockquotes); use a literal | to separate the two sides of two-sided layouts.
- "image_prompt" describes an illustrative image, or "" for no image.
- Omit optional fields you have nothing for.
- Never use the marker tokens inside any field text.

3. After the last slide, output the single line:
{complete}

Do not output anything else: no prose, no code fences, no commentary."#,
        language = request.language,
        topic = request.topic,
        num_slides = request.num_slides,
        start = markers.slide_start,
        end = markers.slide_end,
        complete = markers.presentation_complete,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_grammar() {
        let request = GenerationRequest::new("Rust ownership");
        let markers = MarkerSet::default();
        let prompt = build_presentation_prompt(&request, &markers);
        assert!(prompt.contains("SLIDE_START_DELIMITER"));
        assert!(prompt.contains("SLIDE_END_DELIMITER"));
        assert!(prompt.contains("PRESENTATION_COMPLETE_DELIMITER"));
        assert!(prompt.contains("\"main_title\""));
        assert!(prompt.contains("title_content"));
        assert!(prompt.contains("Rust ownership"));
        assert!(prompt.contains("exactly 6 slides"));
    }
}
