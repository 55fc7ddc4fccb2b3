//! Output of the external similarity oracle.

use serde::{Deserialize, Serialize};

/// A passage the oracle flagged as resembling an external source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Verbatim substring expected to occur in the document
    pub text: String,

    /// Similarity weight (0-1)
    pub similarity: f64,

    /// Likely source or reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Why the passage was flagged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Segment {
    /// Create a segment with no source or explanation
    pub fn new(text: impl Into<String>, similarity: f64) -> Self {
        Self {
            text: text.into(),
            similarity,
            source: None,
            explanation: None,
        }
    }

    /// Set the likely source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the explanation
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

/// A matching paper or article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub url: String,
}

/// Full similarity report for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityAnalysis {
    /// Overall similarity percentage (0-100)
    pub score: f64,

    /// Executive summary
    pub summary: String,

    /// Flagged passages
    #[serde(default)]
    pub segments: Vec<Segment>,

    /// Matching sources
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl SimilarityAnalysis {
    /// Clamp scores into range; remote models do not always respect the schema
    pub fn normalized(mut self) -> Self {
        self.score = clamp_finite(self.score, 100.0);
        for segment in &mut self.segments {
            segment.similarity = clamp_finite(segment.similarity, 1.0);
        }
        self
    }
}

fn clamp_finite(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_optional_fields() {
        let json = r#"{"score": 42, "summary": "ok", "segments": [{"text": "a", "similarity": 0.5}]}"#;
        let analysis: SimilarityAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.score, 42.0);
        assert!(analysis.references.is_empty());
        assert_eq!(analysis.segments[0].source, None);
    }

    #[test]
    fn test_normalized_clamps() {
        let analysis = SimilarityAnalysis {
            score: 180.0,
            summary: String::new(),
            segments: vec![Segment::new("a", 1.7), Segment::new("b", -0.2), Segment::new("c", f64::NAN)],
            references: Vec::new(),
        }
        .normalized();

        assert_eq!(analysis.score, 100.0);
        assert_eq!(analysis.segments[0].similarity, 1.0);
        assert_eq!(analysis.segments[1].similarity, 0.0);
        assert_eq!(analysis.segments[2].similarity, 0.0);
    }
}
