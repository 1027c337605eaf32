//! Delimiter-based record extraction.
//!
//! The model brackets every slide record with literal sentinel tokens. The
//! extractor scans an accumulating buffer for complete start/end pairs and
//! drains them out, leaving any trailing partial record for the next chunk.
//! Chunk boundaries are arbitrary: a token may arrive split across chunks,
//! so "not found yet" always means "wait", never "fail".

use deck_common::MarkerSet;

/// Upper bound on scan passes per call. Every successful extraction strictly
/// shrinks the buffer, so this is unreachable unless the scan itself is
/// broken; it exists to turn a hypothetical livelock into a bounded pass.
const EXTRACTION_PASS_LIMIT: usize = 512;

#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    markers: MarkerSet,
}

impl RecordExtractor {
    pub fn new(markers: MarkerSet) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Pull every complete record out of `buf`, in order.
    ///
    /// Consumed text (markers included) is removed from the buffer. If an
    /// end marker appears with no start marker before it, extraction stops
    /// for this pass; the leading text stays in the buffer until more input
    /// arrives.
    pub fn drain_records(&self, buf: &mut String) -> Vec<String> {
        let mut records = Vec::new();
        for _ in 0..EXTRACTION_PASS_LIMIT {
            let Some(start) = buf.find(&self.markers.slide_start) else {
                break;
            };
            let Some(end) = buf.find(&self.markers.slide_end) else {
                break;
            };
            if end < start {
                // Malformed ordering; defer rather than error.
                break;
            }
            let body_from = start + self.markers.slide_start.len();
            // A start marker directly followed by the end marker yields an
            // empty record; the decoder will drop it.
            let raw = if body_from <= end {
                buf[body_from..end].trim().to_string()
            } else {
                String::new()
            };
            buf.drain(..end + self.markers.slide_end.len());
            records.push(raw);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RecordExtractor {
        RecordExtractor::new(MarkerSet::default())
    }

    #[test]
    fn test_no_complete_pair_waits() {
        let mut buf = "SLIDE_START_DELIMITER\n{\"title\":".to_string();
        assert!(extractor().drain_records(&mut buf).is_empty());
        assert!(buf.contains("SLIDE_START_DELIMITER"));
    }

    #[test]
    fn test_single_record() {
        let mut buf =
            "SLIDE_START_DELIMITER\n{\"a\":1}\nSLIDE_END_DELIMITER tail".to_string();
        let records = extractor().drain_records(&mut buf);
        assert_eq!(records, vec!["{\"a\":1}"]);
        assert_eq!(buf, " tail");
    }

    #[test]
    fn test_multiple_records_one_pass() {
        let mut buf = "xSLIDE_START_DELIMITER r1 SLIDE_END_DELIMITER\
                       SLIDE_START_DELIMITER r2 SLIDE_END_DELIMITER"
            .to_string();
        let records = extractor().drain_records(&mut buf);
        assert_eq!(records, vec!["r1", "r2"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_end_before_start_defers() {
        let mut buf =
            "junk SLIDE_END_DELIMITER SLIDE_START_DELIMITER r SLIDE_END".to_string();
        let records = extractor().drain_records(&mut buf);
        assert!(records.is_empty());
        // Nothing consumed; the stray end marker is still there.
        assert!(buf.starts_with("junk"));
    }

    #[test]
    fn test_split_marker_across_calls() {
        let ex = extractor();
        let mut buf = "SLIDE_START_DELIM".to_string();
        assert!(ex.drain_records(&mut buf).is_empty());
        buf.push_str("ITER body SLIDE_END_DELIMITER");
        assert_eq!(ex.drain_records(&mut buf), vec!["body"]);
    }

    #[test]
    fn test_empty_record_between_markers() {
        let mut buf = "SLIDE_START_DELIMITERSLIDE_END_DELIMITER".to_string();
        let records = extractor().drain_records(&mut buf);
        assert_eq!(records, vec![""]);
    }

    #[test]
    fn test_custom_markers() {
        let ex = RecordExtractor::new(MarkerSet {
            slide_start: "<<".to_string(),
            slide_end: ">>".to_string(),
            presentation_complete: "FIN".to_string(),
        });
        let mut buf = "<< hello >>".to_string();
        assert_eq!(ex.drain_records(&mut buf), vec!["hello"]);
    }
}
