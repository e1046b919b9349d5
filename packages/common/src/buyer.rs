use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cell::{CellValue, RawRow};

/// Canonical buyer columns, in the fixed order used for positional
/// spreadsheet ingestion (column A is `Name`, column G is `AmountDue`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuyerField {
    Name,
    Email,
    Mobile,
    Address,
    TotalInvoice,
    AmountPaid,
    AmountDue,
}

impl BuyerField {
    pub const ALL: [BuyerField; 7] = [
        BuyerField::Name,
        BuyerField::Email,
        BuyerField::Mobile,
        BuyerField::Address,
        BuyerField::TotalInvoice,
        BuyerField::AmountPaid,
        BuyerField::AmountDue,
    ];

    /// Column name used in the database and for positional rows.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::Address => "address",
            Self::TotalInvoice => "total_invoice",
            Self::AmountPaid => "amount_paid",
            Self::AmountDue => "amount_due",
        }
    }
}

/// A validated buyer row, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerRecord {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub total_invoice: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
}

impl BuyerRecord {
    /// Render the record back into a raw row keyed by canonical column names.
    pub fn to_raw_row(&self) -> RawRow {
        vec![
            (BuyerField::Name.column_name().into(), CellValue::from(self.name.as_str())),
            (BuyerField::Email.column_name().into(), CellValue::from(self.email.as_str())),
            (BuyerField::Mobile.column_name().into(), CellValue::from(self.mobile.as_str())),
            (BuyerField::Address.column_name().into(), CellValue::from(self.address.as_str())),
            (
                BuyerField::TotalInvoice.column_name().into(),
                CellValue::Text(self.total_invoice.to_string()),
            ),
            (
                BuyerField::AmountPaid.column_name().into(),
                CellValue::Text(self.amount_paid.to_string()),
            ),
            (
                BuyerField::AmountDue.column_name().into(),
                CellValue::Text(self.amount_due.to_string()),
            ),
        ]
    }
}
