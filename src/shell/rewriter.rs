//! Placeholder substitution for the shell document.
//!
//! # Design Decisions
//! - Markers are literal byte strings; no template language
//! - Each emitted marker is replaced at most once (first occurrence)
//! - All markers are located in the original document before any
//!   replacement, so substitution order never matters and replacement
//!   values are never rescanned
//! - A missing marker is a no-op

use std::ops::Range;

/// Base element shipped in the web client's `index.html`.
pub const BASE_HREF_MARKER: &str = r#"<base href="/">"#;

/// Route URL strategy token.
pub const ROUTE_STRATEGY_MARKER: &str = "%FLET_ROUTE_URL_STRATEGY%";

/// Slot for the renderer selection script.
pub const WEB_RENDERER_MARKER: &str = "<!-- flutterWebRenderer -->";

/// Slot for the color emoji script.
pub const COLOR_EMOJI_MARKER: &str = "<!-- useColorEmoji -->";

/// One literal substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub marker: &'a str,
    pub value: String,
    /// When false the marker is left in place.
    pub emit: bool,
}

impl<'a> Placeholder<'a> {
    pub fn new(marker: &'a str, value: impl Into<String>) -> Self {
        Self {
            marker,
            value: value.into(),
            emit: true,
        }
    }

    pub fn emit_if(mut self, emit: bool) -> Self {
        self.emit = emit;
        self
    }
}

/// Replace the first occurrence of every emitted marker in `document`.
///
/// The input is never modified; a new buffer is returned.
pub fn substitute(document: &[u8], placeholders: &[Placeholder<'_>]) -> Vec<u8> {
    let mut hits: Vec<(Range<usize>, &[u8])> = placeholders
        .iter()
        .filter(|p| p.emit && !p.marker.is_empty())
        .filter_map(|p| {
            find(document, p.marker.as_bytes())
                .map(|start| (start..start + p.marker.len(), p.value.as_bytes()))
        })
        .collect();
    hits.sort_by_key(|(range, _)| range.start);

    let extra: usize = hits.iter().map(|(_, value)| value.len()).sum();
    let mut out = Vec::with_capacity(document.len() + extra);
    let mut cursor = 0;
    for (range, value) in hits {
        // Overlapping markers: the earlier one wins.
        if range.start < cursor {
            continue;
        }
        out.extend_from_slice(&document[cursor..range.start]);
        out.extend_from_slice(value);
        cursor = range.end;
    }
    out.extend_from_slice(&document[cursor..]);
    out
}

/// Rewrite the shell document for one response.
pub fn rewrite(
    shell: &[u8],
    base_href: &str,
    route_strategy: &str,
    web_renderer: &str,
    use_color_emoji: bool,
) -> Vec<u8> {
    let placeholders = [
        Placeholder::new(BASE_HREF_MARKER, format!(r#"<base href="{base_href}">"#)),
        Placeholder::new(ROUTE_STRATEGY_MARKER, route_strategy),
        Placeholder::new(
            WEB_RENDERER_MARKER,
            format!(r#"<script>var flutterWebRenderer="{web_renderer}";</script>"#),
        )
        .emit_if(!web_renderer.is_empty()),
        Placeholder::new(
            COLOR_EMOJI_MARKER,
            format!("<script>var useColorEmoji={use_color_emoji};</script>"),
        ),
    ];
    substitute(shell, &placeholders)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
