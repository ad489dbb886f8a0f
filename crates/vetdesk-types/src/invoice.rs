//! Invoice and invoice numbering types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ClinicId;

/// Invoice ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub Uuid);

impl InvoiceId {
    /// Create a new invoice ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an invoice ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for InvoiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice is a draft
    Draft,
    /// Invoice is issued and awaiting payment
    Open,
    /// Invoice has been paid
    Paid,
    /// Invoice is void
    Void,
}

impl InvoiceStatus {
    /// Storage representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Paid => "paid",
            Self::Void => "void",
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = crate::VetDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "paid" => Ok(Self::Paid),
            "void" => Ok(Self::Void),
            other => Err(crate::VetDeskError::InvalidInvoiceStatus(other.to_string())),
        }
    }
}

/// Calendar day an invoice number belongs to, rendered as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Day key for a date
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Day key for the UTC date of a timestamp
    pub fn from_utc(ts: DateTime<Utc>) -> Self {
        Self(ts.date_naive())
    }

    /// Underlying date
    pub const fn date(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl std::str::FromStr for DateKey {
    type Err = crate::VetDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(crate::VetDeskError::InvalidInvoiceNumber(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(Self)
            .map_err(|_| crate::VetDeskError::InvalidInvoiceNumber(s.to_string()))
    }
}

/// Key of one invoice sequence: a clinic on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceSequenceKey {
    /// Owning clinic
    pub clinic_id: ClinicId,
    /// Day of issue
    pub date_key: DateKey,
}

impl InvoiceSequenceKey {
    /// Create a new sequence key
    pub const fn new(clinic_id: ClinicId, date_key: DateKey) -> Self {
        Self { clinic_id, date_key }
    }
}

/// Minimum digits of the sequence part of an invoice number
pub const INVOICE_SEQUENCE_MIN_DIGITS: usize = 3;

/// Invoice number `YYYYMMDD-NNN`.
///
/// The sequence is zero-padded to three digits and grows past `999`
/// without truncation (`20250101-1000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceNumber {
    /// Day of issue
    pub date_key: DateKey,
    /// 1-based sequence within the day
    pub sequence: u32,
}

impl InvoiceNumber {
    /// Create an invoice number
    pub const fn new(date_key: DateKey, sequence: u32) -> Self {
        Self { date_key, sequence }
    }
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{:0width$}",
            self.date_key,
            self.sequence,
            width = INVOICE_SEQUENCE_MIN_DIGITS
        )
    }
}

impl std::str::FromStr for InvoiceNumber {
    type Err = crate::VetDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::VetDeskError::InvalidInvoiceNumber(s.to_string());

        let (date, seq) = s.split_once('-').ok_or_else(invalid)?;
        if seq.len() < INVOICE_SEQUENCE_MIN_DIGITS || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let date_key: DateKey = date.parse().map_err(|_| invalid())?;
        let sequence: u32 = seq.parse().map_err(|_| invalid())?;
        if sequence == 0 {
            return Err(invalid());
        }

        Ok(Self { date_key, sequence })
    }
}

impl Serialize for InvoiceNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InvoiceNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID
    pub id: InvoiceId,
    /// Clinic that issued the invoice
    pub clinic_id: ClinicId,
    /// Human-readable number, unique per clinic
    pub number: InvoiceNumber,
    /// Invoice status
    pub status: InvoiceStatus,
    /// Amount in cents
    pub amount_cents: i64,
    /// Currency (e.g., "eur")
    pub currency: String,
    /// Invoice description
    pub description: Option<String>,
    /// When the invoice was created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_date_key_format() {
        assert_eq!(day(2025, 1, 1).to_string(), "20250101");
        assert_eq!(day(2024, 12, 31).to_string(), "20241231");
    }

    #[test]
    fn test_invoice_number_padding() {
        assert_eq!(InvoiceNumber::new(day(2025, 1, 1), 1).to_string(), "20250101-001");
        assert_eq!(InvoiceNumber::new(day(2025, 1, 1), 42).to_string(), "20250101-042");
        assert_eq!(InvoiceNumber::new(day(2025, 1, 1), 999).to_string(), "20250101-999");
    }

    #[test]
    fn test_invoice_number_grows_past_three_digits() {
        assert_eq!(InvoiceNumber::new(day(2025, 1, 1), 1000).to_string(), "20250101-1000");
        assert_eq!(InvoiceNumber::new(day(2025, 1, 1), 12345).to_string(), "20250101-12345");
    }

    #[test]
    fn test_invoice_number_parse() {
        let n: InvoiceNumber = "20250101-008".parse().unwrap();
        assert_eq!(n, InvoiceNumber::new(day(2025, 1, 1), 8));

        let n: InvoiceNumber = "20250101-1000".parse().unwrap();
        assert_eq!(n.sequence, 1000);
    }

    #[test]
    fn test_invoice_number_parse_rejects_garbage() {
        for bad in [
            "",
            "20250101",
            "20250101-",
            "20250101-1",
            "20250101-01",
            "20250101-000",
            "2025011-001",
            "20251301-001",
            "20250101-00a",
            "20250101-+01",
            "abcdefgh-001",
        ] {
            assert!(bad.parse::<InvoiceNumber>().is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn test_invoice_number_serializes_as_string() {
        let n = InvoiceNumber::new(day(2025, 1, 1), 7);
        assert_eq!(serde_json::to_value(n).unwrap(), serde_json::json!("20250101-007"));
    }
}
