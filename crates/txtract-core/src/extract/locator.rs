//! Field locator: finds candidate date, description, amount and balance spans.
//!
//! Labeled lines (`Amount: -420.00`) are resolved first; a kind found on a
//! labeled line is never inferred. When the same kind is labeled more than
//! once the last line wins. Kinds without a label are inferred from the shape
//! of the remaining lines.

use std::collections::BTreeMap;
use std::ops::Range;

use regex::Regex;
use tracing::debug;

use super::rules::lookup_label;
use super::rules::patterns::{
    AMOUNT_TOKEN, DATE_ISO_TOKEN, DATE_NAMED_TOKEN, DATE_NUMERIC_TOKEN, LABELED_LINE,
    MONETARY_HINT,
};
use crate::models::record::{FieldKind, FieldSpan, SpanOrigin};

/// Trimmed from both ends of an inferred description.
const DESCRIPTION_EDGE: &[char] = &['|', ',', ';', ':', '-', '/', '*', '#'];

/// A line of the source text and its byte offset.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    start: usize,
    text: &'a str,
}

/// Locate field spans in `text`, ordered by start offset.
pub fn locate(text: &str) -> Vec<FieldSpan> {
    let lines = split_lines(text);

    let mut labeled: BTreeMap<FieldKind, FieldSpan> = BTreeMap::new();
    let mut residual = Vec::new();
    let mut unknown = Vec::new();

    for line in &lines {
        let Some(caps) = LABELED_LINE.captures(line.text) else {
            residual.push(*line);
            continue;
        };

        let Some((kind, direction)) = lookup_label(&caps[1]) else {
            unknown.push(*line);
            continue;
        };

        let value = caps.get(2).map(|m| m.range()).unwrap_or(0..0);
        if value.is_empty() {
            debug!("Label {:?} has no value", &caps[1]);
            continue;
        }

        let span = FieldSpan::new(
            kind,
            line.start + value.start,
            line.start + value.end,
            SpanOrigin::Labeled { direction },
        );
        if labeled.insert(kind, span).is_some() {
            debug!("Repeated {} label, keeping the later line", kind);
        }
    }

    // Without any known label the whole text is narrative
    if labeled.is_empty() && !unknown.is_empty() {
        residual = lines.clone();
    }

    let mut spans: Vec<FieldSpan> = labeled.values().copied().collect();
    spans.extend(infer_spans(text, &residual, &labeled));
    spans.sort_by_key(|s| (s.start, s.end));

    debug!(
        "Located {} spans ({} labeled)",
        spans.len(),
        spans.iter().filter(|s| s.is_labeled()).count()
    );

    spans
}

fn infer_spans(
    text: &str,
    residual: &[Line],
    labeled: &BTreeMap<FieldKind, FieldSpan>,
) -> Vec<FieldSpan> {
    let need = |kind: FieldKind| !labeled.contains_key(&kind);

    let mut date_tokens = Vec::new();
    let mut amount_tokens = Vec::new();

    for line in residual {
        let dates = find_dates(line.text);
        let masked = mask(line.text, &dates);
        let amounts = find_amounts(&masked);

        date_tokens.extend(dates.iter().map(|r| offset(r, line.start)));
        amount_tokens.extend(amounts.iter().map(|r| offset(r, line.start)));
    }

    let mut spans = Vec::new();

    if need(FieldKind::Date) {
        let mut seen: Vec<&str> = Vec::new();
        for range in &date_tokens {
            let token = &text[range.clone()];
            if !seen.contains(&token) {
                seen.push(token);
                spans.push(FieldSpan::new(FieldKind::Date, range.start, range.end, SpanOrigin::Inferred));
            }
        }
    }

    let inferred = |kind: FieldKind, range: &Range<usize>| {
        FieldSpan::new(kind, range.start, range.end, SpanOrigin::Inferred)
    };

    match (need(FieldKind::Amount), need(FieldKind::Balance), amount_tokens.as_slice()) {
        (true, true, [amount, balance]) => {
            spans.push(inferred(FieldKind::Amount, amount));
            spans.push(inferred(FieldKind::Balance, balance));
        }
        (true, _, tokens) => {
            spans.extend(tokens.iter().map(|r| inferred(FieldKind::Amount, r)));
        }
        (false, true, tokens) => {
            spans.extend(tokens.iter().map(|r| inferred(FieldKind::Balance, r)));
        }
        (false, false, _) => {}
    }

    if need(FieldKind::Description) {
        let mut taken: Vec<Range<usize>> = date_tokens;
        taken.extend(amount_tokens);
        if let Some(range) = best_description(text, residual, &taken) {
            spans.push(inferred(FieldKind::Description, &range));
        }
    }

    spans
}

/// Split on `\n`, `\r\n` or `\r`, keeping byte offsets.
fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(Line { start, text: &text[start..i] });
                start = i + 1;
            }
            b'\r' => {
                lines.push(Line { start, text: &text[start..i] });
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < text.len() {
        lines.push(Line { start, text: &text[start..] });
    }

    lines
}

/// Date-shaped tokens, non-overlapping, earlier patterns taking priority.
fn find_dates(line: &str) -> Vec<Range<usize>> {
    let patterns: [&Regex; 3] = [&*DATE_NAMED_TOKEN, &*DATE_ISO_TOKEN, &*DATE_NUMERIC_TOKEN];
    let mut found: Vec<Range<usize>> = Vec::new();

    for pattern in patterns {
        for m in pattern.find_iter(line) {
            let range = m.range();
            if !found.iter().any(|r| overlaps(r, &range)) {
                found.push(range);
            }
        }
    }

    found.sort_by_key(|r| r.start);
    found
}

/// Currency-shaped tokens that stand alone and look like money.
fn find_amounts(line: &str) -> Vec<Range<usize>> {
    AMOUNT_TOKEN
        .find_iter(line)
        .filter_map(|m| {
            let range = trim_range(line, m.range(), |c| c.is_whitespace());
            let token = &line[range.clone()];
            let standalone = !line[..range.start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric)
                && !line[range.end..].chars().next().is_some_and(char::is_alphanumeric);
            (standalone && MONETARY_HINT.is_match(token)).then_some(range)
        })
        .collect()
}

/// The residual segment with the most letters, tie going to the earliest.
fn best_description(text: &str, residual: &[Line], taken: &[Range<usize>]) -> Option<Range<usize>> {
    let mut best: Option<(usize, Range<usize>)> = None;

    for line in residual {
        let line_range = line.start..line.start + line.text.len();
        let mut cuts: Vec<&Range<usize>> = taken.iter().filter(|r| overlaps(r, &line_range)).collect();
        cuts.sort_by_key(|r| r.start);

        let mut cursor = line_range.start;
        let mut segments = Vec::new();
        for cut in cuts {
            segments.push(cursor..cut.start.max(cursor));
            cursor = cursor.max(cut.end);
        }
        segments.push(cursor..line_range.end);

        for segment in segments {
            let segment = trim_range(text, segment, |c| c.is_whitespace() || DESCRIPTION_EDGE.contains(&c));
            let letters = text[segment.clone()].chars().filter(|c| c.is_alphabetic()).count();
            if letters > 0 && best.as_ref().is_none_or(|(most, _)| letters > *most) {
                best = Some((letters, segment));
            }
        }
    }

    best.map(|(_, range)| range)
}

/// Replace the given ranges with spaces, keeping byte offsets intact.
fn mask(line: &str, ranges: &[Range<usize>]) -> String {
    line.char_indices()
        .map(|(i, c)| {
            if ranges.iter().any(|r| r.contains(&i)) {
                " ".repeat(c.len_utf8())
            } else {
                c.to_string()
            }
        })
        .collect()
}

fn trim_range(text: &str, range: Range<usize>, trim: impl Fn(char) -> bool) -> Range<usize> {
    let slice = &text[range.clone()];
    let leading = slice.len() - slice.trim_start_matches(|c| trim(c)).len();
    let trailing = slice.len() - slice.trim_end_matches(|c| trim(c)).len();
    if leading + trailing >= slice.len() {
        return range.start..range.start;
    }
    range.start + leading..range.end - trailing
}

fn offset(range: &Range<usize>, by: usize) -> Range<usize> {
    range.start + by..range.end + by
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
