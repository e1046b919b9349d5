use std::collections::HashMap;

use crate::buyer::BuyerField;
use crate::cell::{CellValue, RawRow};

/// Canonicalize a spreadsheet header into a lookup key.
///
/// Lowercases, trims, then drops every whitespace and `_` character, so
/// `"Total Invoice"`, `"total_invoice"` and `" TotalInvoice "` all become
/// `"totalinvoice"`.
pub fn normalize_key(header: &str) -> String {
    header
        .to_lowercase()
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

/// Normalized keys accepted for each field, in priority order.
pub fn aliases(field: BuyerField) -> &'static [&'static str] {
    match field {
        BuyerField::Name => &["name"],
        BuyerField::Email => &["email"],
        BuyerField::Mobile => &["mobile"],
        BuyerField::Address => &["address"],
        BuyerField::TotalInvoice => &["totalinvoice", "invoice"],
        BuyerField::AmountPaid => &["amountpaid", "paid"],
        BuyerField::AmountDue => &["amountdue", "due"],
    }
}

/// A raw row re-keyed by normalized header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    values: HashMap<String, CellValue>,
}

impl NormalizedRow {
    /// Build from a raw row. When two headers collapse onto the same key,
    /// the one further right in the source wins.
    pub fn from_raw(raw: &RawRow) -> Self {
        let values = raw
            .iter()
            .map(|(header, value)| (normalize_key(header), value.clone()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.values.get(key)
    }

    /// Value of the first alias present for `field`.
    ///
    /// Presence is about the key, not the content: an empty `Total Invoice`
    /// column shadows a populated `Invoice` column.
    pub fn lookup(&self, field: BuyerField) -> Option<&CellValue> {
        aliases(field).iter().find_map(|alias| self.values.get(*alias))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
