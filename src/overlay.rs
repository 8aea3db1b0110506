//! Inline span overlays over segment text.
//!
//! Spans carry absolute document offsets; a [`Segment`] (one sentence)
//! knows where it starts, so `span.begin - segment.begin` is the position
//! inside the segment text. Each span becomes an interactive marker:
//!
//! ```text
//!   segment  "hello world"  (begin 100)
//!   span     [106, 111)  label "NOUN"  tooltip "a planet"
//!
//!   hello <a data-content="a planet" title="NOUN" ... id="form106">world</a>
//! ```
//!
//! # Why descending order
//!
//! Markers are spliced into one ordered sequence. Every insertion shifts all
//! positions after it, so spans are applied from the highest begin offset
//! down: nothing below the current span has been touched yet and its
//! offsets are still the original ones.
//!
//! ```text
//!   "abcdef", spans [0,2) and [3,5)
//!
//!   descending:  [3,5) → abc<m>de</m>f
//!                [0,2) → <m>ab</m>c<m>de</m>f        correct
//!
//!   ascending:   [0,2) → <m>ab</m>cdef
//!                [3,5) → <m>ab<m></m>c</m>def        [3,5) now lands on markup
//! ```
//!
//! Spans that reach into an already wrapped region (nested or crossing) are
//! handled by [`OverlapPolicy`].

use serde::{Deserialize, Serialize};

use crate::config::{OverlapPolicy, OverlayConfig};
use crate::error::{Error, Result};
use crate::offset::OffsetMap;
use crate::payload::{AnalysisResponse, Sentence};

/// A contiguous piece of text with its absolute start offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment text
    pub text: String,
    /// Absolute offset of the first character
    pub begin: usize,
}

impl Segment {
    /// Create a segment.
    #[must_use]
    pub fn new(text: impl Into<String>, begin: usize) -> Self {
        Self {
            text: text.into(),
            begin,
        }
    }
}

/// An annotated range with display attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Absolute begin offset (inclusive)
    pub begin: usize,
    /// Absolute end offset (exclusive)
    pub end: usize,
    /// Short label, shown as the marker title
    pub label: String,
    /// Longer description, shown in the popover
    pub tooltip: String,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub fn new(begin: usize, end: usize, label: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            begin,
            end,
            label: label.into(),
            tooltip: tooltip.into(),
        }
    }
}

// =============================================================================
// Marked sequence
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Char(char),
    Markup(String),
}

/// Text as an ordered sequence of characters and inserted markup.
///
/// Positions index the current sequence, markup included, the same way an
/// index into a string that already holds markup would.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedText {
    pieces: Vec<Piece>,
}

impl MarkedText {
    /// Start from plain text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            pieces: text.chars().map(Piece::Char).collect(),
        }
    }

    /// Current length of the sequence, inserted markup counted as one each.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// True if there is nothing in the sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Number of inserted markup pieces.
    #[must_use]
    pub fn markup_count(&self) -> usize {
        self.pieces
            .iter()
            .filter(|p| matches!(p, Piece::Markup(_)))
            .count()
    }

    /// Insert `open` at `begin` and `close` at `end`.
    pub fn wrap(&mut self, begin: usize, end: usize, open: String, close: String) -> Result<()> {
        if begin > end || end > self.pieces.len() {
            return Err(Error::InvalidSpanRange {
                begin,
                end,
                segment_begin: 0,
                len: self.pieces.len(),
            });
        }
        self.pieces.insert(end, Piece::Markup(close));
        self.pieces.insert(begin, Piece::Markup(open));
        Ok(())
    }

    /// Render with characters HTML-escaped and markup emitted verbatim.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(self.pieces.len());
        for piece in &self.pieces {
            match piece {
                Piece::Char(c) => push_escaped_char(&mut out, *c),
                Piece::Markup(m) => out.push_str(m),
            }
        }
        out
    }

    /// The characters alone, without markup.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Char(c) => Some(*c),
                Piece::Markup(_) => None,
            })
            .collect()
    }
}

fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(c),
    }
}

/// Escape a value for a double-quoted HTML attribute.
///
/// Non-breaking spaces become `&nbsp;` so they survive attribute parsing.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Remove every tag and decode entities, recovering the plain text.
///
/// Inverse of rendering: `strip_markers(&render_segment(s, spans)?) == s.text`.
#[must_use]
pub fn strip_markers(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars();
    while let Some(c) = chars.next() {
        match c {
            '<' => {
                for t in chars.by_ref() {
                    if t == '>' {
                        break;
                    }
                }
            }
            '&' => {
                let mut entity = String::new();
                for t in chars.by_ref() {
                    if t == ';' {
                        break;
                    }
                    entity.push(t);
                }
                match entity.as_str() {
                    "amp" => out.push('&'),
                    "lt" => out.push('<'),
                    "gt" => out.push('>'),
                    "quot" => out.push('"'),
                    "nbsp" => out.push('\u{a0}'),
                    other => {
                        out.push('&');
                        out.push_str(other);
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Renderer
// =============================================================================

/// A sentence rendered with its markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSentence {
    /// Position in the response
    pub index: usize,
    /// Annotated HTML fragment
    pub html: String,
    /// The producer flagged the sentence as too long
    pub too_long: bool,
    /// Why the descriptions could not be applied; `html` is then the
    /// escaped sentence text without markers
    pub error: Option<String>,
}

impl RenderedSentence {
    /// Wrap the fragment in its paragraph element.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut class = String::from("sentence");
        if self.too_long {
            class.push_str(" too-long");
        }
        if self.error.is_some() {
            class.push_str(" unannotated");
        }
        format!(
            r#"<p id="sentence{}" class="{}">{}</p>"#,
            self.index, class, self.html
        )
    }

    /// True if the descriptions were applied.
    #[must_use]
    pub fn is_annotated(&self) -> bool {
        self.error.is_none()
    }
}

/// Span overlay renderer.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    config: OverlayConfig,
}

impl Overlay {
    /// Create a renderer with the given settings.
    #[must_use]
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    /// Wrap every span of `segment` in a marker.
    ///
    /// All spans are range-checked before any markup is produced.
    ///
    /// ```
    /// use annoview::overlay::{Overlay, Segment, Span};
    ///
    /// let html = Overlay::default()
    ///     .render_segment(&Segment::new("hello world", 0), &[Span::new(6, 11, "X", "")])
    ///     .unwrap();
    /// assert!(html.starts_with("hello <a "));
    /// assert!(html.ends_with(r#"id="form6">world</a>"#));
    /// ```
    pub fn render_segment(&self, segment: &Segment, spans: &[Span]) -> Result<String> {
        let map = OffsetMap::new(&segment.text, self.config.offsets);
        let mut resolved = spans
            .iter()
            .map(|span| resolve(segment, &map, span).map(|range| (range, span)))
            .collect::<Result<Vec<_>>>()?;

        // Highest begin first; on equal begins the longer span wraps first.
        resolved.sort_by(|((b1, e1), _), ((b2, e2), _)| b2.cmp(b1).then(e2.cmp(e1)));

        let mut text = MarkedText::new(&segment.text);
        // (char position, absolute offset) of the lowest wrapped begin so far
        let mut boundary: Option<(usize, usize)> = None;

        for ((begin, end), span) in resolved {
            if let Some((lowest, absolute)) = boundary {
                if end > lowest {
                    match self.config.overlap {
                        OverlapPolicy::Skip => {
                            log::warn!(
                                "skipping span [{}, {}) '{}': overlaps wrapped region at {}",
                                span.begin,
                                span.end,
                                span.label,
                                absolute
                            );
                            continue;
                        }
                        OverlapPolicy::Reject => {
                            return Err(Error::OverlappingSpans {
                                begin: span.begin,
                                end: span.end,
                                boundary: absolute,
                            });
                        }
                    }
                }
            }
            let (open, close) = self.marker(span);
            text.wrap(begin, end, open, close)?;
            boundary = Some((begin, span.begin));
        }

        Ok(text.to_html())
    }

    /// Render one sentence of an analysis response.
    pub fn render_sentence(&self, index: usize, sentence: &Sentence) -> Result<RenderedSentence> {
        let spans: Vec<Span> = sentence.descriptions.iter().map(Span::from).collect();
        let html = self.render_segment(&sentence.segment(), &spans)?;
        Ok(RenderedSentence {
            index,
            html,
            too_long: sentence.too_long,
            error: None,
        })
    }

    /// Render every sentence of an analysis response, in order.
    ///
    /// Sentences are independent: one whose descriptions cannot be applied
    /// is logged and emitted as escaped plain text with its `error` set,
    /// and the following sentences are rendered as usual.
    #[must_use]
    pub fn render_response(&self, response: &AnalysisResponse) -> Vec<RenderedSentence> {
        response
            .sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| {
                self.render_sentence(i, sentence).unwrap_or_else(|e| {
                    log::warn!("sentence {} rendered without descriptions: {}", i, e);
                    RenderedSentence {
                        index: i,
                        html: MarkedText::new(&sentence.text).to_html(),
                        too_long: sentence.too_long,
                        error: Some(e.to_string()),
                    }
                })
            })
            .collect()
    }

    fn marker(&self, span: &Span) -> (String, String) {
        let style = &self.config.marker;
        let open = format!(
            r#"<{tag} data-content="{content}" title="{title}" tabindex="0" role="button" class="{class}" id="{prefix}{begin}">"#,
            tag = style.tag,
            content = escape_attr(&span.tooltip),
            title = escape_attr(&span.label),
            class = escape_attr(&style.class),
            prefix = escape_attr(&style.id_prefix),
            begin = span.begin,
        );
        let close = format!("</{}>", style.tag);
        (open, close)
    }
}

/// Convert a span to char positions inside `segment`.
fn resolve(segment: &Segment, map: &OffsetMap, span: &Span) -> Result<(usize, usize)> {
    let invalid = || {
        log::warn!(
            "span [{}, {}) does not fit segment at {} (length {})",
            span.begin,
            span.end,
            segment.begin,
            map.len()
        );
        Error::InvalidSpanRange {
            begin: span.begin,
            end: span.end,
            segment_begin: segment.begin,
            len: map.len(),
        }
    };
    if span.begin < segment.begin || span.end < span.begin {
        return Err(invalid());
    }
    let begin = map.to_char(span.begin - segment.begin).ok_or_else(invalid)?;
    let end = map.to_char(span.end - segment.begin).ok_or_else(invalid)?;
    Ok((begin, end))
}

/// Render with the default settings.
pub fn render_segment(segment: &Segment, spans: &[Span]) -> Result<String> {
    Overlay::default().render_segment(segment, spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MarkerStyle, OffsetUnit};
    use crate::payload::Description;

    fn plain_marker() -> Overlay {
        Overlay::new(OverlayConfig {
            marker: MarkerStyle {
                tag: "m".to_string(),
                class: String::new(),
                id_prefix: String::new(),
            },
            ..OverlayConfig::default()
        })
    }

    /// Shorten `<m data-content=... id="N">` to `<N>` for readable asserts.
    fn compact(html: &str) -> String {
        let mut out = String::new();
        let mut rest = html;
        while let Some(start) = rest.find("<m ") {
            out.push_str(&rest[..start]);
            let tag_end = start + rest[start..].find('>').unwrap();
            let tag = &rest[start..tag_end];
            let id_at = tag.find("id=\"").unwrap() + 4;
            let id = &tag[id_at..tag.len() - 1];
            out.push('<');
            out.push_str(id);
            out.push('>');
            rest = &rest[tag_end + 1..];
        }
        out.push_str(rest);
        out
    }

    #[test]
    fn single_span() {
        let html = render_segment(
            &Segment::new("hello world", 0),
            &[Span::new(6, 11, "X", "tip")],
        )
        .unwrap();
        assert_eq!(
            html,
            r#"hello <a data-content="tip" title="X" tabindex="0" role="button" class="my-popover label label-primary" id="form6">world</a>"#
        );
    }

    #[test]
    fn offsets_are_relative_to_segment() {
        let html = plain_marker()
            .render_segment(&Segment::new("hello world", 100), &[Span::new(106, 111, "X", "")])
            .unwrap();
        assert_eq!(compact(&html), "hello <106>world</m>");
    }

    #[test]
    fn multiple_spans_any_arrival_order() {
        let segment = Segment::new("abcdef", 0);
        let ascending = [Span::new(0, 2, "A", ""), Span::new(3, 5, "B", "")];
        let shuffled = [ascending[1].clone(), ascending[0].clone()];
        let overlay = plain_marker();

        let a = overlay.render_segment(&segment, &ascending).unwrap();
        let b = overlay.render_segment(&segment, &shuffled).unwrap();
        assert_eq!(a, b);
        assert_eq!(compact(&a), "<0>ab</m>c<3>de</m>f");
    }

    #[test]
    fn ascending_splice_corrupts_later_offsets() {
        let overlay = plain_marker();
        let spans = [Span::new(0, 2, "A", ""), Span::new(3, 5, "B", "")];

        let mut forward = MarkedText::new("abcdef");
        for span in &spans {
            let (open, close) = overlay.marker(span);
            forward.wrap(span.begin, span.end, open, close).unwrap();
        }
        let corrupted = compact(&forward.to_html());
        assert_eq!(corrupted, "<0>ab<3></m>c</m>def");
        assert!(!corrupted.contains("de</m>"));

        let mut backward = MarkedText::new("abcdef");
        for span in spans.iter().rev() {
            let (open, close) = overlay.marker(span);
            backward.wrap(span.begin, span.end, open, close).unwrap();
        }
        assert_eq!(compact(&backward.to_html()), "<0>ab</m>c<3>de</m>f");
    }

    #[test]
    fn adjacent_spans() {
        let html = plain_marker()
            .render_segment(
                &Segment::new("abcd", 0),
                &[Span::new(0, 2, "", ""), Span::new(2, 4, "", "")],
            )
            .unwrap();
        assert_eq!(compact(&html), "<0>ab</m><2>cd</m>");
    }

    #[test]
    fn zero_length_span() {
        let html = plain_marker()
            .render_segment(&Segment::new("abc", 0), &[Span::new(1, 1, "", "")])
            .unwrap();
        assert_eq!(compact(&html), "a<1></m>bc");
    }

    #[test]
    fn whole_segment_span() {
        let html = plain_marker()
            .render_segment(&Segment::new("abc", 10), &[Span::new(10, 13, "", "")])
            .unwrap();
        assert_eq!(compact(&html), "<10>abc</m>");
    }

    #[test]
    fn empty_span_list_only_escapes() {
        let html = render_segment(&Segment::new("a < b & c", 0), &[]).unwrap();
        assert_eq!(html, "a &lt; b &amp; c");
    }

    #[test]
    fn text_is_not_a_pattern() {
        // characters that would mean something in a regex or in HTML
        let segment = Segment::new("(.*) <b>$1</b>", 0);
        let html = plain_marker()
            .render_segment(&segment, &[Span::new(5, 8, "", "")])
            .unwrap();
        assert_eq!(compact(&html), "(.*) <5>&lt;b&gt;</m>$1&lt;/b&gt;");
        assert_eq!(strip_markers(&html), segment.text);
    }

    #[test]
    fn attributes_are_escaped() {
        let html = render_segment(
            &Segment::new("x", 0),
            &[Span::new(0, 1, "a\"b", "1 < 2 &\u{a0}3")],
        )
        .unwrap();
        assert!(html.contains(r#"title="a&quot;b""#));
        assert!(html.contains(r#"data-content="1 &lt; 2 &amp;&nbsp;3""#));
    }

    #[test]
    fn invalid_ranges() {
        let segment = Segment::new("hello", 10);
        let cases = [
            Span::new(5, 12, "", ""),  // before the segment
            Span::new(13, 12, "", ""), // inverted
            Span::new(12, 16, "", ""), // past the end
        ];
        for span in cases {
            let err = render_segment(&segment, &[span.clone()]).unwrap_err();
            assert!(
                matches!(err, Error::InvalidSpanRange { begin, end, segment_begin: 10, len: 5 } if begin == span.begin && end == span.end),
                "{:?}",
                span
            );
        }
    }

    #[test]
    fn invalid_span_fails_whole_segment() {
        let segment = Segment::new("hello", 0);
        let spans = [Span::new(0, 2, "", ""), Span::new(3, 99, "", "")];
        assert!(render_segment(&segment, &spans).is_err());
    }

    #[test]
    fn nested_span_is_skipped_by_default() {
        let segment = Segment::new("New York City", 0);
        let spans = [Span::new(0, 13, "outer", ""), Span::new(4, 8, "inner", "")];
        let html = plain_marker().render_segment(&segment, &spans).unwrap();
        // inner wins: it is applied first, the outer one would cover markup
        assert_eq!(compact(&html), "New <4>York</m> City");
        assert_eq!(strip_markers(&html), segment.text);
    }

    #[test]
    fn crossing_span_rejected_when_configured() {
        let overlay = Overlay::new(OverlayConfig {
            overlap: OverlapPolicy::Reject,
            ..OverlayConfig::default()
        });
        let spans = [Span::new(0, 4, "", ""), Span::new(2, 6, "", "")];
        let err = overlay
            .render_segment(&Segment::new("abcdefg", 0), &spans)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::OverlappingSpans { begin: 0, end: 4, boundary: 2 }
        ));
    }

    #[test]
    fn same_begin_keeps_longer_span() {
        let spans = [Span::new(0, 1, "", ""), Span::new(0, 3, "", "")];
        let html = plain_marker()
            .render_segment(&Segment::new("abcd", 0), &spans)
            .unwrap();
        assert_eq!(compact(&html), "<0>abc</m>d");
    }

    #[test]
    fn char_offsets_with_multibyte_text() {
        let html = plain_marker()
            .render_segment(&Segment::new("café €50 ok", 0), &[Span::new(5, 8, "", "")])
            .unwrap();
        assert_eq!(compact(&html), "café <5>€50</m> ok");
    }

    #[test]
    fn utf16_offsets_by_default() {
        let overlay = plain_marker();
        // 👋 takes two UTF-16 units, so "there" starts at unit 6
        let segment = Segment::new("Hi 👋 there", 0);
        let html = overlay
            .render_segment(&segment, &[Span::new(6, 11, "", "")])
            .unwrap();
        assert_eq!(compact(&html), "Hi 👋 <6>there</m>");

        // inside the surrogate pair
        assert!(matches!(
            overlay.render_segment(&segment, &[Span::new(4, 5, "", "")]),
            Err(Error::InvalidSpanRange { len: 11, .. })
        ));
    }

    #[test]
    fn char_offsets_when_configured() {
        let overlay = Overlay::new(OverlayConfig {
            offsets: OffsetUnit::Chars,
            marker: plain_marker().config.marker,
            ..OverlayConfig::default()
        });
        let segment = Segment::new("Hi 👋 there", 0);
        let html = overlay
            .render_segment(&segment, &[Span::new(5, 10, "", "")])
            .unwrap();
        assert_eq!(compact(&html), "Hi 👋 <5>there</m>");
    }

    #[test]
    fn strip_markers_round_trip() {
        let segment = Segment::new("Tom & Jerry <3 \"cartoons\"", 0);
        let spans = [Span::new(0, 3, "PER", ""), Span::new(6, 11, "PER", "")];
        let html = render_segment(&segment, &spans).unwrap();
        assert_eq!(strip_markers(&html), segment.text);
    }

    #[test]
    fn rendered_sentence_paragraph() {
        let s = RenderedSentence {
            index: 2,
            html: "x".to_string(),
            too_long: true,
            error: None,
        };
        assert!(s.is_annotated());
        assert_eq!(s.to_html(), r#"<p id="sentence2" class="sentence too-long">x</p>"#);

        let failed = RenderedSentence {
            error: Some("bad span".to_string()),
            too_long: false,
            ..s
        };
        assert!(!failed.is_annotated());
        assert_eq!(failed.to_html(), r#"<p id="sentence2" class="sentence unannotated">x</p>"#);
    }

    #[test]
    fn bad_sentence_does_not_stop_the_response() {
        let response = AnalysisResponse {
            sentences: vec![
                Sentence {
                    text: "a<c".to_string(),
                    begin: 0,
                    descriptions: vec![Description {
                        begin: 0,
                        end: 9,
                        text: String::new(),
                        form: "X".to_string(),
                    }],
                    ..Sentence::default()
                },
                Sentence {
                    text: "good sentence".to_string(),
                    begin: 4,
                    descriptions: vec![Description {
                        begin: 9,
                        end: 17,
                        text: String::new(),
                        form: "Y".to_string(),
                    }],
                    ..Sentence::default()
                },
            ],
            statistics: None,
        };
        let rendered = plain_marker().render_response(&response);
        assert_eq!(rendered.len(), 2);

        assert_eq!(rendered[0].html, "a&lt;c");
        let err = rendered[0].error.as_deref().unwrap();
        assert!(err.contains("[0, 9)"), "{}", err);

        assert!(rendered[1].is_annotated());
        assert_eq!(compact(&rendered[1].html), "good <9>sentence</m>");
    }

    #[test]
    fn marked_text_wrap_bounds() {
        let mut text = MarkedText::new("ab");
        assert!(text.wrap(1, 3, String::new(), String::new()).is_err());
        assert!(text.wrap(2, 1, String::new(), String::new()).is_err());
        text.wrap(0, 2, "[".into(), "]".into()).unwrap();
        assert_eq!(text.len(), 4);
        assert_eq!(text.markup_count(), 2);
        assert_eq!(text.plain_text(), "ab");
    }
}
