//! Common regex patterns for transaction text extraction.

use lazy_static::lazy_static;
use regex::Regex;

const MONTH_PREFIX: &str = r"jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

const CURRENCY: &str = r"₹|\$|€|£|¥|zł|rs\.?|inr|usd|eur|gbp|jpy|aud|cad|chf|sgd|aed|pln";

const CURRENCY_CODE: &str = r"zł|rs|inr|usd|eur|gbp|jpy|aud|cad|chf|sgd|aed|pln";

lazy_static! {
    // `Label: value` lines
    pub static ref LABELED_LINE: Regex = Regex::new(
        r"^\s*([A-Za-z][A-Za-z ._/()\-]{0,40}?)\s*:\s*(.*?)\s*$"
    ).unwrap();

    // Whole-field date formats, in priority order
    pub static ref DATE_NAMED_FULL: Regex = Regex::new(
        r"(?i)^(\d{1,2})(?:st|nd|rd|th)?[\s\-/.]*([a-z]{3,9})\.?,?[\s\-/.]*(\d{4})$"
    ).unwrap();

    pub static ref DATE_ISO_FULL: Regex = Regex::new(
        r"^(\d{4})[\-/.](\d{1,2})[\-/.](\d{1,2})$"
    ).unwrap();

    pub static ref DATE_NUMERIC_FULL: Regex = Regex::new(
        r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})$"
    ).unwrap();

    // Date-shaped tokens inside narrative text
    pub static ref DATE_NAMED_TOKEN: Regex = Regex::new(&format!(
        r"(?i)\b\d{{1,2}}(?:st|nd|rd|th)?[\s\-/.]*(?:{MONTH_PREFIX})[a-z]*\.?,?[\s\-/.]+\d{{4}}\b"
    )).unwrap();

    pub static ref DATE_ISO_TOKEN: Regex = Regex::new(
        r"\b\d{4}[\-/.]\d{1,2}[\-/.]\d{1,2}\b"
    ).unwrap();

    pub static ref DATE_NUMERIC_TOKEN: Regex = Regex::new(
        r"\b\d{1,2}[/\-.]\d{1,2}[/\-.](?:\d{4}|\d{2})\b"
    ).unwrap();

    // Currency-shaped tokens inside narrative text
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(&format!(
        r"(?i)\(?[-+]?\s?(?:(?:{CURRENCY})\s?)?[-+]?\d(?:[\d,.'\u{{00a0}}\u{{2009}}\u{{202f}}]*\d)?-?\)?(?:\s?(?:{CURRENCY_CODE})\b)?(?:\s?(?:dr|cr)\b\.?)?"
    )).unwrap();

    // Sign and currency decorations around a single amount. Markers may be
    // glued to the figure (`500.00Dr`); the caller rejects them inside words.
    pub static ref MARKER_LEADING: Regex = Regex::new(
        r"(?i)^(debit|credit|dr|cr)\.?\s*"
    ).unwrap();

    pub static ref MARKER_TRAILING: Regex = Regex::new(
        r"(?i)\s*(debit|credit|dr|cr)\.?$"
    ).unwrap();

    pub static ref CURRENCY_LEADING: Regex = Regex::new(&format!(
        r"(?i)^(?:{CURRENCY})\s*"
    )).unwrap();

    pub static ref CURRENCY_TRAILING: Regex = Regex::new(&format!(
        r"(?i)\s*(?:{CURRENCY})$"
    )).unwrap();

    // Two-digit fraction or an explicit currency/marker: enough to call a token money
    pub static ref MONETARY_HINT: Regex = Regex::new(&format!(
        r"(?i)(?:[.,]\d{{2}}-?\)?(?:\s|$)|[.,]\d{{2}}\s?(?:{CURRENCY}|dr|cr)|{CURRENCY}|\b(?:dr|cr)\b|^\(.*\)$)"
    )).unwrap();
}
