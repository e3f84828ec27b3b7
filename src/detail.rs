//! Unit detail page parsing.
//!
//! Costs live in the unit characteristics block. Each field is found by
//! its label: first through the wiki's known markup, then by plain text
//! proximity, so a style-only markup change degrades instead of breaking.
//! The fallback only runs when no row carries the label at all; a
//! labeled row with an unreadable value reads as zero.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::CostRecord;

// Characteristics markup as the wiki renders it. Talisman and purchase
// costs sit in regular rows, the ace crew cost in an indented sub-row
// whose label span carries no class of its own.
const CHARS_LINE_SELECTOR: &str = "div.game-unit_chars-line";
const CHARS_SUBLINE_SELECTOR: &str = "div.game-unit_chars-subline";
const CHARS_HEADER_SELECTOR: &str = "span.game-unit_chars-header";
const CHARS_VALUE_SELECTOR: &str = "span.game-unit_chars-value";
const SPAN_SELECTOR: &str = "span";

// Labels as the wiki prints them
const BASE_COST_LABEL: &str = "Purchase cost";
const TALISMAN_LABEL: &str = "Talisman cost";
const ACE_LABEL: &str = "Aces";

/// How far past a label the text fallback looks for a number
const PROXIMITY_WINDOW: usize = 48;

lazy_static! {
    /// First run of digits, allowing thousands separators
    static ref NUMBER_TOKEN: Regex = Regex::new(r"\d[\d,.]*").unwrap();
}

/// Cost fields parsed from one unit page, plus the labels that had no
/// usable value so the caller can log the misses with item context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDetail {
    pub record: CostRecord,
    pub missing_labels: Vec<&'static str>,
}

/// What a label lookup found in the characteristics markup
enum FieldLookup {
    /// A row with the label and a readable number
    Value(u64),
    /// A row with the label, but no readable number in it
    Unusable,
    /// No row carries the label
    Absent,
}

/// Extracts the Golden Eagle cost fields from a unit detail page.
///
/// A label the page does not show reads as 0, as does an unreadable
/// value. Same markup in, same result out.
pub fn parse_detail(html: &str) -> ParsedDetail {
    let document = Html::parse_document(html);
    let page_text = element_text(&document.root_element());
    let mut missing_labels = Vec::new();

    let base_cost = resolve_field(
        chars_line_value(&document, BASE_COST_LABEL),
        &page_text,
        BASE_COST_LABEL,
        &mut missing_labels,
    );
    let talisman_cost = resolve_field(
        chars_line_value(&document, TALISMAN_LABEL),
        &page_text,
        TALISMAN_LABEL,
        &mut missing_labels,
    );
    let ace_cost = resolve_field(
        chars_subline_value(&document, ACE_LABEL),
        &page_text,
        ACE_LABEL,
        &mut missing_labels,
    );

    ParsedDetail {
        record: CostRecord {
            base_cost,
            talisman_cost,
            ace_cost,
        },
        missing_labels,
    }
}

/// Folds one field's lookup into a number, recording the label when no
/// usable value exists. The text fallback runs only when no row
/// carries the label; on a matched row with an unreadable value the
/// fallback would attribute a neighboring row's number to it, so the
/// field reads 0 instead.
fn resolve_field(
    lookup: FieldLookup,
    page_text: &str,
    label: &'static str,
    missing: &mut Vec<&'static str>,
) -> u64 {
    match lookup {
        FieldLookup::Value(amount) => amount,
        FieldLookup::Unusable => {
            missing.push(label);
            0
        }
        FieldLookup::Absent => match proximity_value(page_text, label) {
            Some(amount) => amount,
            None => {
                missing.push(label);
                0
            }
        },
    }
}

/// Looks `label` up among the characteristics rows; first match wins
fn chars_line_value(document: &Html, label: &str) -> FieldLookup {
    let line_sel = Selector::parse(CHARS_LINE_SELECTOR).unwrap();
    let header_sel = Selector::parse(CHARS_HEADER_SELECTOR).unwrap();
    let value_sel = Selector::parse(CHARS_VALUE_SELECTOR).unwrap();

    for line in document.select(&line_sel) {
        let header = match line.select(&header_sel).next() {
            Some(header) => header,
            None => continue,
        };
        if element_text(&header) != label {
            continue;
        }
        return match line
            .select(&value_sel)
            .next()
            .and_then(|v| parse_ge_amount(&element_text(&v)))
        {
            Some(amount) => FieldLookup::Value(amount),
            None => FieldLookup::Unusable,
        };
    }
    FieldLookup::Absent
}

/// Looks `label` up among the sub-rows by their leading span
fn chars_subline_value(document: &Html, label: &str) -> FieldLookup {
    let subline_sel = Selector::parse(CHARS_SUBLINE_SELECTOR).unwrap();
    let span_sel = Selector::parse(SPAN_SELECTOR).unwrap();
    let value_sel = Selector::parse(CHARS_VALUE_SELECTOR).unwrap();

    for subline in document.select(&subline_sel) {
        let first_span = match subline.select(&span_sel).next() {
            Some(span) => span,
            None => continue,
        };
        if element_text(&first_span) != label {
            continue;
        }
        return match subline
            .select(&value_sel)
            .next()
            .and_then(|v| parse_ge_amount(&element_text(&v)))
        {
            Some(amount) => FieldLookup::Value(amount),
            None => FieldLookup::Unusable,
        };
    }
    FieldLookup::Absent
}

/// Text fallback: the first number token shortly after the label
fn proximity_value(page_text: &str, label: &str) -> Option<u64> {
    let start = page_text.find(label)? + label.len();
    let window = char_window(&page_text[start..], PROXIMITY_WINDOW);
    let token = NUMBER_TOKEN.find(window)?;
    parse_ge_amount(token.as_str())
}

/// Parses a displayed amount by keeping only its digits.
/// Returns None when the text holds no digits at all.
fn parse_ge_amount(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Joined, whitespace-normalized text content of an element
fn element_text(element: &ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prefix of `s` at most `max_chars` characters long, cut on a char boundary
fn char_window(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
#[path = "detail_tests.rs"]
mod tests;
