//! Word-level markup generation from an original and a corrected text.
//!
//! Lines are aligned first; the word-level diff then runs only on pairs of
//! changed lines, so work grows with the size of each change rather than the
//! document. Lines with no counterpart are deleted or added whole.
//!
//! Within a line, text is tokenized into words, whitespace runs and single
//! punctuation marks, so changes always cover whole words. Every output line
//! is independently parseable by [`markup::parse_line`].
//!
//! [`markup::parse_line`]: crate::redline::markup::parse_line

use std::sync::OnceLock;

use regex::Regex;

use crate::redline::markup::{Segment, SegmentKind, to_markup};

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\n|[^\S\n]+|\w+|[^\w\s]").unwrap())
}

/// Split text into diff tokens. Concatenating the tokens yields the input.
pub fn tokenize(text: &str) -> Vec<&str> {
    token_regex().find_iter(text).map(|m| m.as_str()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Keep(usize),
    Delete(usize),
    Insert(usize),
}

/// LCS edit script from `a` to `b`. Indices refer to `a` for `Keep` and
/// `Delete`, to `b` for `Insert`. Deletions win ties.
fn lcs_edits<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Edit> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let (a_mid, b_mid) = (&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix]);
    let (n, m) = (a_mid.len(), b_mid.len());

    // lcs[i][j] = LCS length of a_mid[i..] and b_mid[j..]
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a_mid[i] == b_mid[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut edits: Vec<Edit> = (0..prefix).map(Edit::Keep).collect();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a_mid[i] == b_mid[j] {
            edits.push(Edit::Keep(prefix + i));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            edits.push(Edit::Delete(prefix + i));
            i += 1;
        } else {
            edits.push(Edit::Insert(prefix + j));
            j += 1;
        }
    }
    edits.extend((i..n).map(|i| Edit::Delete(prefix + i)));
    edits.extend((j..m).map(|j| Edit::Insert(prefix + j)));
    edits.extend((a.len() - suffix..a.len()).map(Edit::Keep));
    edits
}

/// Token-level edit script between `original` and `corrected`.
///
/// Adjacent operations of the same kind are merged; where a span is
/// replaced the deletion comes first.
pub fn diff_segments(original: &str, corrected: &str) -> Vec<Segment> {
    let a = tokenize(original);
    let b = tokenize(corrected);

    let ops = lcs_edits(&a, &b).into_iter().map(|edit| match edit {
        Edit::Keep(i) => (SegmentKind::Plain, a[i]),
        Edit::Delete(i) => (SegmentKind::Delete, a[i]),
        Edit::Insert(j) => (SegmentKind::Add, b[j]),
    });

    let mut segments = merge(ops);
    order_replacements(&mut segments);
    merge(segments.into_iter().map(|s| (s.kind, s.text)))
}

fn merge<S: AsRef<str>>(ops: impl IntoIterator<Item = (SegmentKind, S)>) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    for (kind, text) in ops {
        let text = text.as_ref();
        match segments.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(text),
            _ => segments.push(Segment::new(kind, text)),
        }
    }
    segments
}

/// Put every deletion before its neighbouring insertion.
fn order_replacements(segments: &mut [Segment]) {
    let mut k = 0;
    while k + 1 < segments.len() {
        if segments[k].kind == SegmentKind::Add && segments[k + 1].kind == SegmentKind::Delete {
            segments.swap(k, k + 1);
            k = k.saturating_sub(1);
        } else {
            k += 1;
        }
    }
}

/// Produce redline markup turning `original` into `corrected`.
pub fn diff_to_markup(original: &str, corrected: &str) -> String {
    let a: Vec<&str> = original.split('\n').collect();
    let b: Vec<&str> = corrected.split('\n').collect();

    let mut lines: Vec<String> = Vec::new();
    let mut deleted: Vec<&str> = Vec::new();
    let mut added: Vec<&str> = Vec::new();
    for edit in lcs_edits(&a, &b) {
        match edit {
            Edit::Keep(i) => {
                flush_changed_block(&mut lines, &mut deleted, &mut added);
                lines.push(whole_line(SegmentKind::Plain, a[i]));
            }
            Edit::Delete(i) => deleted.push(a[i]),
            Edit::Insert(j) => added.push(b[j]),
        }
    }
    flush_changed_block(&mut lines, &mut deleted, &mut added);

    lines.join("\n")
}

/// Pair changed lines in order and word-diff each pair; leftovers are
/// deleted or added whole.
fn flush_changed_block<'a>(lines: &mut Vec<String>, deleted: &mut Vec<&'a str>, added: &mut Vec<&'a str>) {
    let paired = deleted.len().min(added.len());
    for (old, new) in deleted.iter().zip(added.iter()) {
        lines.push(to_markup(&diff_segments(old, new)));
    }
    lines.extend(deleted[paired..].iter().map(|l| whole_line(SegmentKind::Delete, l)));
    lines.extend(added[paired..].iter().map(|l| whole_line(SegmentKind::Add, l)));
    deleted.clear();
    added.clear();
}

fn whole_line(kind: SegmentKind, text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        to_markup(&[Segment::new(kind, text)])
    }
}
