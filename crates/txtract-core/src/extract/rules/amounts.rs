//! Amount parsing for transaction text.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::patterns::{CURRENCY_LEADING, CURRENCY_TRAILING, MARKER_LEADING, MARKER_TRAILING};
use super::FieldParser;
use crate::error::ExtractionError;
use crate::models::record::{Direction, ParsedAmount, SignSource};

/// Characters that may group thousands but never separate decimals.
const GROUP_ONLY: [char; 5] = [' ', '\'', '\u{00a0}', '\u{2009}', '\u{202f}'];

/// Amount and balance parser.
///
/// A direction implied by the span's label (`Debit:`, `Credit:`) is used when
/// the text itself carries no sign or marker.
#[derive(Debug, Clone, Default)]
pub struct AmountParser {
    direction: Option<Direction>,
}

impl AmountParser {
    pub fn new() -> Self {
        Self { direction: None }
    }

    pub fn with_direction(mut self, direction: Option<Direction>) -> Self {
        self.direction = direction;
        self
    }
}

impl FieldParser for AmountParser {
    type Output = ParsedAmount;

    fn parse(&self, text: &str) -> Result<ParsedAmount, ExtractionError> {
        parse_amount_with(text, self.direction)
    }
}

/// Parse an amount such as `-420.00`, `₹1,234.50 Dr`, `(45.00)` or `1 234,56 zł`.
pub fn parse_amount(text: &str) -> Result<ParsedAmount, ExtractionError> {
    parse_amount_with(text, None)
}

#[derive(Debug, Default)]
struct Decorations {
    explicit: Option<bool>,
    marker: Option<Direction>,
    parenthesized: bool,
}

fn parse_amount_with(
    text: &str,
    label_direction: Option<Direction>,
) -> Result<ParsedAmount, ExtractionError> {
    let original = text.trim();
    let unparseable = || ExtractionError::UnparseableAmount(original.to_string());

    let (literal, decorations) = strip_decorations(original).ok_or_else(unparseable)?;
    let normalized = normalize_number(literal).ok_or_else(unparseable)?;
    let magnitude = Decimal::from_str(&normalized).map_err(|_| unparseable())?;

    let marker = decorations.marker.or(label_direction);
    let (negative, sign) = if let Some(negative) = decorations.explicit {
        (negative, SignSource::Explicit)
    } else if let Some(direction) = marker {
        (direction == Direction::Debit, SignSource::Marker)
    } else if decorations.parenthesized {
        (true, SignSource::Parenthesized)
    } else {
        (false, SignSource::Inferred)
    };

    if decorations.explicit.is_some() && decorations.marker.is_some() {
        debug!("Amount {:?} has both a sign and a marker; the sign wins", original);
    }

    let value = if negative { -magnitude } else { magnitude };
    Ok(ParsedAmount::new(value, sign))
}

/// Peel signs, markers, parentheses and currency off the numeric literal.
fn strip_decorations(text: &str) -> Option<(&str, Decorations)> {
    let mut rest = text.trim();
    let mut decorations = Decorations::default();

    loop {
        let before = rest.len();

        if decorations.marker.is_none() {
            if let Some((marker, start)) = trailing_marker(rest) {
                decorations.marker = Some(direction_of(marker));
                rest = rest[..start].trim();
            } else if let Some((marker, end)) = leading_marker(rest) {
                decorations.marker = Some(direction_of(marker));
                rest = rest[end..].trim();
            }
        }

        if !decorations.parenthesized && rest.starts_with('(') && rest.ends_with(')') && rest.len() >= 2 {
            decorations.parenthesized = true;
            rest = rest[1..rest.len() - 1].trim();
        }

        if decorations.explicit.is_none() {
            if let Some(stripped) = rest.strip_prefix('-') {
                decorations.explicit = Some(true);
                rest = stripped.trim_start();
            } else if let Some(stripped) = rest.strip_prefix('+') {
                decorations.explicit = Some(false);
                rest = stripped.trim_start();
            } else if let Some(stripped) = rest.strip_suffix('-') {
                decorations.explicit = Some(true);
                rest = stripped.trim_end();
            }
        }

        if let Some(m) = CURRENCY_LEADING.find(rest) {
            rest = &rest[m.end()..];
        }
        if let Some(m) = CURRENCY_TRAILING.find(rest) {
            rest = &rest[..m.start()];
        }
        rest = rest.trim();

        if rest.len() == before {
            break;
        }
    }

    if rest.is_empty() {
        None
    } else {
        Some((rest, decorations))
    }
}

/// A Dr/Cr marker ending `text` and the offset where it starts, unless it is
/// the tail of a word (`abcdr`).
fn trailing_marker(text: &str) -> Option<(&str, usize)> {
    let caps = MARKER_TRAILING.captures(text)?;
    let word = caps.get(1)?;
    if text[..word.start()].chars().next_back().is_some_and(char::is_alphabetic) {
        return None;
    }
    Some((word.as_str(), caps.get(0)?.start()))
}

/// A Dr/Cr marker opening `text` and the offset where the rest begins, unless
/// it is the head of a word (`crore`).
fn leading_marker(text: &str) -> Option<(&str, usize)> {
    let caps = MARKER_LEADING.captures(text)?;
    let word = caps.get(1)?;
    if text[word.end()..].chars().next().is_some_and(char::is_alphabetic) {
        return None;
    }
    Some((word.as_str(), caps.get(0)?.end()))
}

fn direction_of(marker: &str) -> Direction {
    match marker.to_lowercase().as_str() {
        "dr" | "debit" => Direction::Debit,
        _ => Direction::Credit,
    }
}

/// Turn a grouped literal (`1,234.50`, `1.234,50`, `12 345`) into `1234.50`.
///
/// Returns `None` when the literal is not a well-formed number.
pub fn normalize_number(literal: &str) -> Option<String> {
    if !literal
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == ',' || GROUP_ONLY.contains(&c))
    {
        return None;
    }

    let dots = literal.matches('.').count();
    let commas = literal.matches(',').count();

    let (integer, fraction, group) = match (dots, commas) {
        (0, 0) => (literal, None, None),
        (_, 0) | (0, _) => {
            let sep = if dots > 0 { '.' } else { ',' };
            if dots + commas > 1 {
                (literal, None, Some(sep))
            } else {
                let (int, frac) = literal.split_once(sep)?;
                let digits: String = int.chars().filter(char::is_ascii_digit).collect();
                let as_group = frac.len() == 3
                    && !digits.starts_with('0')
                    && split_groups(literal, Some(sep)).is_some();
                if as_group {
                    (literal, None, Some(sep))
                } else {
                    (int, Some(frac), None)
                }
            }
        }
        _ => {
            let last_dot = literal.rfind('.')?;
            let last_comma = literal.rfind(',')?;
            let (decimal, group) = if last_dot > last_comma { ('.', ',') } else { (',', '.') };
            if literal.matches(decimal).count() != 1 {
                return None;
            }
            let (int, frac) = literal.split_once(decimal)?;
            (int, Some(frac), Some(group))
        }
    };

    let integer = split_groups(integer, group)?;
    match fraction {
        Some(frac) if !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()) => {
            Some(format!("{}.{}", integer, frac))
        }
        Some(_) => None,
        None => Some(integer),
    }
}

/// Validate digit grouping and return the bare digits.
fn split_groups(integer: &str, group: Option<char>) -> Option<String> {
    if integer.is_empty() {
        return Some("0".to_string());
    }

    let is_sep = |c: char| GROUP_ONLY.contains(&c) || Some(c) == group;
    let groups: Vec<&str> = integer.split(is_sep).collect();

    if groups.len() == 1 {
        let digits = groups[0];
        return (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
            .then(|| digits.to_string());
    }

    let (first, rest) = groups.split_first()?;
    let well_formed = (1..=3).contains(&first.len())
        && first.chars().all(|c| c.is_ascii_digit())
        && rest
            .iter()
            .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()));

    well_formed.then(|| groups.concat())
}
