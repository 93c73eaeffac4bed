//! Tagged redline markup: `[DELETE]…[/DELETE]` and `[ADD]…[/ADD]`.
//!
//! Each line is scanned by a three-state machine (plain, in-delete, in-add).
//! Tags do not nest: inside a tagged span only its own closing tag is
//! recognized, and the first one wins. An opening tag without a closing tag
//! later on the same line is literal text, as is a stray closing tag.

use serde::Serialize;

pub const DELETE_OPEN: &str = "[DELETE]";
pub const DELETE_CLOSE: &str = "[/DELETE]";
pub const ADD_OPEN: &str = "[ADD]";
pub const ADD_CLOSE: &str = "[/ADD]";

/// How a span of text is marked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SegmentKind {
    Plain,
    Delete,
    Add,
}

impl SegmentKind {
    fn open_tag(&self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::Delete => DELETE_OPEN,
            Self::Add => ADD_OPEN,
        }
    }

    fn close_tag(&self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::Delete => DELETE_CLOSE,
            Self::Add => ADD_CLOSE,
        }
    }
}

/// A non-empty run of text with a single markup kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Plain,
    InDelete,
    InAdd,
}

/// Split one line of markup into segments.
///
/// Empty segments are dropped and adjacent plain text is merged.
pub fn parse_line(line: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut state = State::Plain;
    let mut buf = String::new();
    let mut rest = line;

    while let Some(ch) = rest.chars().next() {
        match state {
            State::Plain => {
                let opened = [(SegmentKind::Delete, State::InDelete), (SegmentKind::Add, State::InAdd)]
                    .into_iter()
                    .find(|(kind, _)| {
                        rest.strip_prefix(kind.open_tag())
                            .is_some_and(|after| after.contains(kind.close_tag()))
                    });
                if let Some((kind, next)) = opened {
                    push_segment(&mut segments, SegmentKind::Plain, std::mem::take(&mut buf));
                    rest = &rest[kind.open_tag().len()..];
                    state = next;
                    continue;
                }
            }
            State::InDelete | State::InAdd => {
                let kind = if state == State::InDelete {
                    SegmentKind::Delete
                } else {
                    SegmentKind::Add
                };
                if let Some(after) = rest.strip_prefix(kind.close_tag()) {
                    push_segment(&mut segments, kind, std::mem::take(&mut buf));
                    rest = after;
                    state = State::Plain;
                    continue;
                }
            }
        }
        buf.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    // The opening lookahead guarantees every tagged span is closed.
    debug_assert_eq!(state, State::Plain);
    push_segment(&mut segments, SegmentKind::Plain, buf);
    segments
}

/// Parse multi-line markup; one entry per input line.
pub fn parse(markup: &str) -> Vec<Vec<Segment>> {
    split_lines(markup).map(parse_line).collect()
}

/// Split on `\n`, tolerating `\r\n`. An empty input is one empty line.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l))
}

fn push_segment(segments: &mut Vec<Segment>, kind: SegmentKind, text: String) {
    if text.is_empty() {
        return;
    }
    if kind == SegmentKind::Plain
        && let Some(last) = segments.last_mut()
        && last.kind == SegmentKind::Plain
    {
        last.text.push_str(&text);
        return;
    }
    segments.push(Segment { kind, text });
}

/// Render segments back into tagged markup.
pub fn to_markup(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        out.push_str(seg.kind.open_tag());
        out.push_str(&seg.text);
        out.push_str(seg.kind.close_tag());
    }
    out
}
