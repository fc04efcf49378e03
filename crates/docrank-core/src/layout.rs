//! Largest-font heuristic used by layout-driven extraction backends.

/// A run of text on a page rendered at a single font size.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpan {
    pub text: String,
    /// Font size in points.
    pub size: f32,
    /// Top edge of the span's line, in page coordinates (smaller is higher).
    pub y0: f32,
}

impl FontSpan {
    pub fn new(text: impl Into<String>, size: f32, y0: f32) -> Self {
        Self {
            text: text.into(),
            size,
            y0,
        }
    }
}

/// Pick the heading span of a page: the largest font, topmost on ties.
///
/// Spans whose text is blank are ignored. Returns `None` when no span has
/// visible text.
pub fn select_heading_span(spans: &[FontSpan]) -> Option<&FontSpan> {
    let mut best: Option<&FontSpan> = None;
    for span in spans {
        if span.text.trim().is_empty() {
            continue;
        }
        best = match best {
            None => Some(span),
            Some(current) => {
                if span.size > current.size || (span.size == current.size && span.y0 < current.y0)
                {
                    Some(span)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}
