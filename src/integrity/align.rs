//! Segment alignment: map oracle-reported substrings back onto the document.
//!
//! The similarity oracle returns flagged passages as plain text. To highlight
//! them we need exact byte ranges in the source. Placement is a single greedy
//! left-to-right pass:
//!
//! 1. Segments are ordered by the position of their first occurrence in the
//!    whole document (stable, so ties keep the oracle's order; segments that
//!    never occur sort first).
//! 2. A cursor starts at 0. Each segment is searched for at or after the
//!    cursor. On a hit, the gap before it becomes a plain run, the hit becomes
//!    a flagged run, and the cursor moves past it. On a miss the segment is
//!    dropped and the cursor stays put.
//! 3. The tail after the cursor becomes the final plain run.
//!
//! Flagged ranges are therefore strictly increasing and never overlap, and
//! concatenating the runs reproduces the document byte for byte. Duplicate
//! phrases are matched once each, left to right.
//!
//! All offsets are UTF-8 byte offsets into the document and always fall on
//! char boundaries.

use std::ops::Range;

use serde::Serialize;

use crate::domain::Segment;

/// One piece of the aligned document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Run {
    /// Unflagged text (may be empty)
    Plain { text: String, range: Range<usize> },

    /// Text matched to an oracle segment
    Flagged {
        text: String,
        range: Range<usize>,
        segment: Segment,
    },
}

impl Run {
    /// The run's text
    pub fn text(&self) -> &str {
        match self {
            Run::Plain { text, .. } | Run::Flagged { text, .. } => text,
        }
    }

    /// Byte range of the run in the source document
    pub fn range(&self) -> Range<usize> {
        match self {
            Run::Plain { range, .. } | Run::Flagged { range, .. } => range.clone(),
        }
    }

    /// Whether this run is flagged
    pub fn is_flagged(&self) -> bool {
        matches!(self, Run::Flagged { .. })
    }

    /// The segment metadata, for flagged runs
    pub fn segment(&self) -> Option<&Segment> {
        match self {
            Run::Flagged { segment, .. } => Some(segment),
            Run::Plain { .. } => None,
        }
    }
}

/// Why a segment could not be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Segment text is empty; empty text is never matched
    EmptyText,

    /// Segment text does not occur anywhere in the document
    NotFound,

    /// Segment text only occurs before the cursor (already consumed)
    AlreadyConsumed,
}

/// A segment that was left out of the rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedSegment {
    pub segment: Segment,
    pub reason: DropReason,
}

/// Result of aligning segments onto a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    runs: Vec<Run>,
    applied: usize,
    dropped: Vec<DroppedSegment>,
}

impl Alignment {
    /// All runs in document order
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Consume the alignment, returning its runs
    pub fn into_runs(self) -> Vec<Run> {
        self.runs
    }

    /// Number of segments placed as flagged runs
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Number of segments that could not be placed
    pub fn dropped(&self) -> usize {
        self.dropped.len()
    }

    /// Segments that could not be placed, in processing order
    pub fn dropped_segments(&self) -> &[DroppedSegment] {
        &self.dropped
    }

    /// Flagged runs in document order
    pub fn flagged(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter().filter(|r| r.is_flagged())
    }

    /// Byte ranges of flagged runs (strictly increasing, non-overlapping)
    pub fn flagged_ranges(&self) -> Vec<Range<usize>> {
        self.flagged().map(Run::range).collect()
    }

    /// Concatenation of every run; always equal to the aligned document
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }
}

/// Align oracle segments onto `content`.
///
/// Never fails. Segments that cannot be placed are reported through
/// [`Alignment::dropped_segments`].
pub fn align(content: &str, segments: &[Segment]) -> Alignment {
    let mut ordered: Vec<(Option<usize>, &Segment)> = segments
        .iter()
        .map(|segment| (first_occurrence(content, &segment.text), segment))
        .collect();
    // sort_by_key is stable: ties keep the oracle's relative order
    ordered.sort_by_key(|(position, _)| *position);

    let mut runs = Vec::with_capacity(ordered.len() * 2 + 1);
    let mut dropped = Vec::new();
    let mut applied = 0;
    let mut cursor = 0;

    for (first, segment) in ordered {
        if segment.text.is_empty() {
            dropped.push(DroppedSegment {
                segment: segment.clone(),
                reason: DropReason::EmptyText,
            });
            continue;
        }

        match find_from(content, &segment.text, cursor) {
            Some(start) => {
                let end = start + segment.text.len();
                runs.push(plain(content, cursor..start));
                runs.push(Run::Flagged {
                    text: content[start..end].to_string(),
                    range: start..end,
                    segment: segment.clone(),
                });
                cursor = end;
                applied += 1;
            }
            None => {
                let reason = if first.is_some() {
                    DropReason::AlreadyConsumed
                } else {
                    DropReason::NotFound
                };
                dropped.push(DroppedSegment {
                    segment: segment.clone(),
                    reason,
                });
            }
        }
    }

    runs.push(plain(content, cursor..content.len()));

    Alignment {
        runs,
        applied,
        dropped,
    }
}

fn plain(content: &str, range: Range<usize>) -> Run {
    Run::Plain {
        text: content[range.clone()].to_string(),
        range,
    }
}

fn first_occurrence(content: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    content.find(needle)
}

/// Search for `needle` at or after byte offset `from`
fn find_from(content: &str, needle: &str, from: usize) -> Option<usize> {
    content[from..].find(needle).map(|offset| from + offset)
}

/// Line and column position (1-indexed for editor compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// Convert a byte offset into a 1-indexed line/column.
///
/// Columns count characters, not bytes.
pub fn offset_to_line_col(content: &str, offset: usize) -> LineCol {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    let prefix = &content[..offset];

    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = content[line_start..offset].chars().count() + 1;

    LineCol { line, col }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, similarity: f64) -> Segment {
        Segment::new(text, similarity)
    }

    #[test]
    fn test_no_segments_is_single_plain_run() {
        let alignment = align("hello world", &[]);
        assert_eq!(alignment.runs().len(), 1);
        assert_eq!(alignment.runs()[0].text(), "hello world");
        assert!(!alignment.runs()[0].is_flagged());
        assert_eq!(alignment.applied(), 0);
        assert_eq!(alignment.dropped(), 0);
    }

    #[test]
    fn test_single_segment_in_middle() {
        let alignment = align("The quick brown fox", &[seg("quick brown", 0.9)]);
        let texts: Vec<_> = alignment.runs().iter().map(Run::text).collect();
        assert_eq!(texts, vec!["The ", "quick brown", " fox"]);
        assert!(alignment.runs()[1].is_flagged());
        assert_eq!(alignment.runs()[1].range(), 4..15);
        assert_eq!(alignment.runs()[1].segment().unwrap().similarity, 0.9);
    }

    #[test]
    fn test_duplicate_text_matched_left_to_right() {
        let alignment = align("ab ab", &[seg("ab", 0.5), seg("ab", 0.5)]);
        let texts: Vec<_> = alignment.runs().iter().map(Run::text).collect();
        assert_eq!(texts, vec!["", "ab", " ", "ab", ""]);
        assert_eq!(alignment.flagged_ranges(), vec![0..2, 3..5]);
        assert_eq!(alignment.applied(), 2);
    }

    #[test]
    fn test_third_duplicate_is_dropped_as_consumed() {
        let alignment = align("ab ab", &[seg("ab", 0.1), seg("ab", 0.2), seg("ab", 0.3)]);
        assert_eq!(alignment.applied(), 2);
        assert_eq!(alignment.dropped(), 1);
        assert_eq!(alignment.dropped_segments()[0].reason, DropReason::AlreadyConsumed);
        assert_eq!(alignment.dropped_segments()[0].segment.similarity, 0.3);
        assert_eq!(alignment.text(), "ab ab");
    }

    #[test]
    fn test_out_of_order_segments_are_sorted() {
        let content = "alpha beta gamma";
        let alignment = align(content, &[seg("gamma", 0.3), seg("alpha", 0.7)]);
        let flagged: Vec<_> = alignment.flagged().map(Run::text).collect();
        assert_eq!(flagged, vec!["alpha", "gamma"]);
        assert_eq!(alignment.text(), content);
    }

    #[test]
    fn test_overlapping_segment_is_dropped() {
        // "brown fox" starts inside the already-placed "quick brown"
        let content = "quick brown fox";
        let alignment = align(content, &[seg("quick brown", 0.9), seg("brown fox", 0.8)]);
        assert_eq!(alignment.applied(), 1);
        assert_eq!(alignment.dropped_segments()[0].reason, DropReason::AlreadyConsumed);
        assert_eq!(alignment.text(), content);
    }

    #[test]
    fn test_absent_and_empty_segments_are_dropped() {
        let alignment = align("some text", &[seg("missing", 0.4), seg("", 0.9), seg("text", 0.2)]);
        assert_eq!(alignment.applied(), 1);
        assert_eq!(alignment.dropped(), 2);
        let reasons: Vec<_> = alignment.dropped_segments().iter().map(|d| d.reason).collect();
        assert!(reasons.contains(&DropReason::NotFound));
        assert!(reasons.contains(&DropReason::EmptyText));
        assert_eq!(alignment.text(), "some text");
    }

    #[test]
    fn test_stable_sort_keeps_oracle_order_for_ties() {
        // Both segments first occur at 0; the oracle's order decides which wins.
        let alignment = align("abc abc", &[seg("abc", 0.1), seg("ab", 0.2)]);
        let first = alignment.flagged().next().unwrap();
        assert_eq!(first.text(), "abc");
        assert_eq!(first.range(), 0..3);
        let second = alignment.flagged().nth(1).unwrap();
        assert_eq!(second.text(), "ab");
        assert_eq!(second.range(), 4..6);
    }

    #[test]
    fn test_multibyte_content() {
        let content = "café — naïve résumé";
        let alignment = align(content, &[seg("naïve", 0.6)]);
        assert_eq!(alignment.text(), content);
        let range = alignment.flagged_ranges()[0].clone();
        assert_eq!(&content[range], "naïve");
    }

    #[test]
    fn test_offset_to_line_col() {
        let content = "line1\nline2\nline3";
        assert_eq!(offset_to_line_col(content, 0), LineCol { line: 1, col: 1 });
        assert_eq!(offset_to_line_col(content, 6), LineCol { line: 2, col: 1 });
        assert_eq!(offset_to_line_col(content, 8), LineCol { line: 2, col: 3 });
    }
}
