//! Analysis response model.
//!
//! The simplification service answers with sentences, each carrying
//! descriptions anchored by absolute offsets, plus document statistics:
//!
//! ```json
//! {
//!   "sentences": [
//!     { "text": "...", "begin": 0, "tooLong": false,
//!       "descriptions": [ { "begin": 4, "end": 9, "text": "...", "form": "..." } ] }
//!   ],
//!   "statistics": { "gulpease": 61.2, "sentenceCount": 1, "spos": { "S": 3 } }
//! }
//! ```
//!
//! Besides deserialization this module derives the numbers the page hands
//! to its chart collaborator: readability gauges, summary rows and the
//! part-of-speech histogram.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::overlay::{Segment, Span};

/// A complete analysis response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Sentences in document order
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    /// Document statistics, when the service computed them
    #[serde(default)]
    pub statistics: Option<Statistics>,
}

impl AnalysisResponse {
    /// Parse a JSON response.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of descriptions over all sentences.
    #[must_use]
    pub fn description_count(&self) -> usize {
        self.sentences.iter().map(|s| s.descriptions.len()).sum()
    }
}

/// One sentence of the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    /// Sentence text
    pub text: String,
    /// Absolute offset of the sentence in the document
    pub begin: usize,
    /// The service gave up on the sentence because of its length
    #[serde(default)]
    pub too_long: bool,
    /// Descriptions to overlay
    #[serde(default)]
    pub descriptions: Vec<Description>,
}

impl Sentence {
    /// The sentence as an overlay segment.
    #[must_use]
    pub fn segment(&self) -> Segment {
        Segment::new(self.text.clone(), self.begin)
    }
}

/// A description anchored to a document range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// Absolute begin offset
    pub begin: usize,
    /// Absolute end offset
    pub end: usize,
    /// Explanation shown in the popover
    #[serde(default)]
    pub text: String,
    /// Surface or category shown as the marker title
    #[serde(default)]
    pub form: String,
}

impl From<&Description> for Span {
    fn from(d: &Description) -> Self {
        Span::new(d.begin, d.end, d.form.clone(), d.text.clone())
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Document statistics computed by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statistics {
    /// Gulpease readability index, 0 to 100
    pub gulpease: f64,
    /// Content words found in the basic vocabulary, level 1
    pub level1_word_size: u64,
    /// Content words found in vocabulary level 2
    pub level2_word_size: u64,
    /// Content words found in vocabulary level 3
    pub level3_word_size: u64,
    /// Content words eligible for level 1
    pub content_easy_word_size: u64,
    /// All content words
    pub content_word_size: u64,
    /// Number of sentences
    pub sentence_count: u64,
    /// Number of tokens
    pub token_count: u64,
    /// Number of words
    pub word_count: u64,
    /// Part-of-speech tag counts
    pub spos: BTreeMap<String, u64>,
}

/// Color band of a 0..=100 gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeBand {
    /// Below 40
    Red,
    /// 40 up to 80
    Yellow,
    /// 80 and above
    Green,
}

impl GaugeBand {
    /// Band of `value`.
    #[must_use]
    pub fn of(value: f64) -> Self {
        if value < 40.0 {
            GaugeBand::Red
        } else if value < 80.0 {
            GaugeBand::Yellow
        } else {
            GaugeBand::Green
        }
    }
}

/// A labelled gauge reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    /// Gauge label
    pub label: &'static str,
    /// Reading, 0 to 100
    pub value: f64,
}

impl Gauge {
    /// Color band of the reading.
    #[must_use]
    pub fn band(&self) -> GaugeBand {
        GaugeBand::of(self.value)
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

impl Statistics {
    /// The Gulpease gauge.
    #[must_use]
    pub fn gulpease_gauge(&self) -> Gauge {
        Gauge {
            label: "Gulpease",
            value: self.gulpease,
        }
    }

    /// Vocabulary level gauges, as percentages.
    ///
    /// Level 1 is measured against the easy content words, levels 2 and 3
    /// against all content words. An empty denominator reads as 0.
    #[must_use]
    pub fn level_gauges(&self) -> [Gauge; 3] {
        [
            Gauge {
                label: "Level1",
                value: percent(self.level1_word_size, self.content_easy_word_size),
            },
            Gauge {
                label: "Level2",
                value: percent(self.level2_word_size, self.content_word_size),
            },
            Gauge {
                label: "Level3",
                value: percent(self.level3_word_size, self.content_word_size),
            },
        ]
    }

    /// Rows of the summary list.
    #[must_use]
    pub fn summary_rows(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("Sentences:", self.sentence_count),
            ("Tokens:", self.token_count),
            ("Words:", self.word_count),
            ("Content words:", self.content_word_size),
        ]
    }

    /// Part-of-speech histogram rows, sorted by tag.
    #[must_use]
    pub fn pos_rows(&self) -> Vec<(&str, u64)> {
        self.spos.iter().map(|(tag, &n)| (tag.as_str(), n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "sentences": [
            {
                "text": "Il gatto dorme.",
                "begin": 0,
                "tooLong": false,
                "descriptions": [
                    { "begin": 3, "end": 8, "text": "animale domestico", "form": "gatto" }
                ]
            },
            {
                "text": "Poi mangia.",
                "begin": 16,
                "tooLong": true,
                "descriptions": []
            }
        ],
        "statistics": {
            "gulpease": 72.5,
            "level1WordSize": 3,
            "level2WordSize": 1,
            "level3WordSize": 2,
            "contentEasyWordSize": 4,
            "contentWordSize": 5,
            "sentenceCount": 2,
            "tokenCount": 7,
            "wordCount": 5,
            "spos": { "V": 2, "S": 1, "E": 1 }
        }
    }"#;

    #[test]
    fn parses_sample_response() {
        let response = AnalysisResponse::from_json(SAMPLE).unwrap();
        assert_eq!(response.sentences.len(), 2);
        assert_eq!(response.description_count(), 1);

        let first = &response.sentences[0];
        assert_eq!(first.segment(), Segment::new("Il gatto dorme.", 0));
        let span = Span::from(&first.descriptions[0]);
        assert_eq!(span.label, "gatto");
        assert_eq!(span.tooltip, "animale domestico");
        assert!(response.sentences[1].too_long);
    }

    #[test]
    fn missing_optional_fields_default() {
        let response =
            AnalysisResponse::from_json(r#"{"sentences":[{"text":"x","begin":5}]}"#).unwrap();
        assert!(response.statistics.is_none());
        assert!(!response.sentences[0].too_long);
        assert!(response.sentences[0].descriptions.is_empty());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = AnalysisResponse::from_json("{\"sentences\": [").unwrap_err();
        assert!(matches!(err, crate::Error::Parse(_)));
    }

    #[test]
    fn gauges_and_rows() {
        let stats = AnalysisResponse::from_json(SAMPLE)
            .unwrap()
            .statistics
            .unwrap();

        let g = stats.gulpease_gauge();
        assert_eq!(g.value, 72.5);
        assert_eq!(g.band(), GaugeBand::Yellow);

        let [l1, l2, l3] = stats.level_gauges();
        assert_eq!(l1.value, 75.0);
        assert_eq!(l2.value, 20.0);
        assert_eq!(l3.value, 40.0);
        assert_eq!(l3.band(), GaugeBand::Yellow);

        assert_eq!(stats.summary_rows()[1], ("Tokens:", 7));
        assert_eq!(stats.pos_rows(), vec![("E", 1), ("S", 1), ("V", 2)]);
    }

    #[test]
    fn empty_denominators_read_zero() {
        let stats = Statistics {
            level1_word_size: 3,
            level2_word_size: 3,
            ..Statistics::default()
        };
        assert!(stats.level_gauges().iter().all(|g| g.value == 0.0));
    }

    #[test]
    fn band_edges() {
        assert_eq!(GaugeBand::of(0.0), GaugeBand::Red);
        assert_eq!(GaugeBand::of(39.9), GaugeBand::Red);
        assert_eq!(GaugeBand::of(40.0), GaugeBand::Yellow);
        assert_eq!(GaugeBand::of(80.0), GaugeBand::Green);
        assert_eq!(GaugeBand::of(100.0), GaugeBand::Green);
    }
}
