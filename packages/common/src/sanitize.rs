use std::str::FromStr;

use rust_decimal::Decimal;

use crate::buyer::{BuyerField, BuyerRecord};
use crate::cell::{CellValue, RawRow};
use crate::normalize::NormalizedRow;

/// Maximum stored length of a text field, in characters.
pub const MAX_TEXT_LEN: usize = 1000;

/// Why a row was left out of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingEmail,
    MissingMobile,
}

/// Per-row result of sanitization. A skip is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(BuyerRecord),
    Skipped(SkipReason),
}

/// Clean a text cell: angle brackets removed, surrounding whitespace trimmed,
/// capped at [`MAX_TEXT_LEN`] characters.
pub fn sanitize_string(value: &CellValue) -> String {
    let stripped: String = value
        .to_text()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect();
    let capped: String = stripped.trim().chars().take(MAX_TEXT_LEN).collect();
    capped.trim_end().to_string()
}

/// Parse a money-like cell into a non-negative decimal.
///
/// Everything but digits, `.` and `-` is discarded first, so `"$1,200.50"`
/// reads as `1200.50`. Garbage and negative amounts become zero.
pub fn parse_number(value: &CellValue) -> Decimal {
    let cleaned: String = value
        .to_text()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();

    match leading_decimal(&cleaned) {
        Some(n) if !n.is_sign_negative() => n,
        _ => Decimal::ZERO,
    }
}

/// Longest numeric prefix of `s`: optional `-`, digits, optional fraction.
fn leading_decimal(s: &str) -> Option<Decimal> {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };

    let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let int_part = &rest[..int_len];

    let frac_part = match rest[int_len..].strip_prefix('.') {
        Some(after_dot) => {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            &after_dot[..frac_len]
        }
        None => "",
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let literal = if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    };

    Decimal::from_str(&literal).ok()
}

/// Turn a normalized row into a buyer record, or decide to skip it.
pub fn sanitize_row(row: &NormalizedRow) -> RowOutcome {
    let text = |field| row.lookup(field).map(sanitize_string).unwrap_or_default();
    let amount = |field| row.lookup(field).map(parse_number).unwrap_or(Decimal::ZERO);

    let name = text(BuyerField::Name);
    if name.is_empty() {
        return RowOutcome::Skipped(SkipReason::MissingName);
    }
    let email = text(BuyerField::Email);
    if email.is_empty() {
        return RowOutcome::Skipped(SkipReason::MissingEmail);
    }
    let mobile = text(BuyerField::Mobile);
    if mobile.is_empty() {
        return RowOutcome::Skipped(SkipReason::MissingMobile);
    }

    RowOutcome::Accepted(BuyerRecord {
        name,
        email,
        mobile,
        address: text(BuyerField::Address),
        total_invoice: amount(BuyerField::TotalInvoice),
        amount_paid: amount(BuyerField::AmountPaid),
        amount_due: amount(BuyerField::AmountDue),
    })
}

/// Normalize and sanitize a raw row in one step.
pub fn prepare_row(raw: &RawRow) -> RowOutcome {
    sanitize_row(&NormalizedRow::from_raw(raw))
}
