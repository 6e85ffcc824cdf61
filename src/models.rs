use serde::{Deserialize, Serialize};

pub const UNKNOWN_MERCHANT: &str = "Unknown Merchant";
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Separator {
    /// Detection order; earlier candidates win ties.
    pub const CANDIDATES: [Separator; 4] = [
        Separator::Comma,
        Separator::Semicolon,
        Separator::Tab,
        Separator::Pipe,
    ];

    pub fn as_char(&self) -> char {
        match self {
            Self::Comma => ',',
            Self::Semicolon => ';',
            Self::Tab => '\t',
            Self::Pipe => '|',
        }
    }

    pub fn as_byte(&self) -> u8 {
        self.as_char() as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Tab => "tab",
            Self::Pipe => "pipe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Merchant,
    Amount,
    Category,
    Unmapped,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Merchant => "merchant",
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Unmapped => "unmapped",
        }
    }
}

/// Column index to semantic field, built once from the header line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMapping {
    pub names: Vec<String>,
    pub fields: Vec<Field>,
}

impl HeaderMapping {
    pub fn field_for(&self, column: usize) -> Field {
        self.fields.get(column).copied().unwrap_or(Field::Unmapped)
    }

    /// Mapped columns in header order, unmapped ones skipped.
    pub fn columns(&self) -> impl Iterator<Item = (usize, Field)> + '_ {
        self.fields
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, f)| *f != Field::Unmapped)
    }
}

/// One accepted, fully defaulted statement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: String,
    pub merchant: String,
    pub amount: f64,
    pub category: String,
}
