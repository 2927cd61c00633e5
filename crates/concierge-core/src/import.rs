//! # Customer CSV Import/Export
//!
//! Maps customer spreadsheets with unpredictable header spellings onto the
//! canonical customer fields.
//!
//! ## How Header Mapping Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Incoming file:   "Guest Name", "E-Mail", "ZIP", "Street Address"       │
//! │        │                                                                │
//! │        ▼  normalize (lowercase, strip non-alphanumerics)                │
//! │   "guestname", "email", "zip", "streetaddress"                          │
//! │        │                                                                │
//! │        ▼  prioritized alias table (first alias hit wins)                │
//! │   Name ◄── guestname      Email ◄── email                               │
//! │   PostalCode ◄── zip      AddressLine1 ◄── streetaddress                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   required fields unmapped? ──► typed MissingRequiredColumns error      │
//! │   otherwise ──► ColumnMap ──► per-row extraction + validation           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A header-level failure aborts the import with a typed error instead of
//! silently importing empty strings. Row-level failures (blank name, bad
//! email) are collected with their 1-based row numbers so one bad row does
//! not sink the file.
//!
//! This module only ever touches in-memory buffers; reading the uploaded
//! file is the caller's job.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ImportError;
use crate::types::Customer;
use crate::validation::{validate_email, validate_name};

// =============================================================================
// Canonical Fields and Alias Table
// =============================================================================

/// The canonical customer fields a CSV column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    Name,
    Email,
    Phone,
    AddressLine1,
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    Notes,
}

/// All fields, in canonical (export) column order.
pub const ALL_FIELDS: [CustomerField; 10] = [
    CustomerField::Name,
    CustomerField::Email,
    CustomerField::Phone,
    CustomerField::AddressLine1,
    CustomerField::AddressLine2,
    CustomerField::City,
    CustomerField::State,
    CustomerField::PostalCode,
    CustomerField::Country,
    CustomerField::Notes,
];

impl CustomerField {
    /// The canonical header name written on export.
    pub const fn canonical(self) -> &'static str {
        match self {
            CustomerField::Name => "name",
            CustomerField::Email => "email",
            CustomerField::Phone => "phone",
            CustomerField::AddressLine1 => "address_line1",
            CustomerField::AddressLine2 => "address_line2",
            CustomerField::City => "city",
            CustomerField::State => "state",
            CustomerField::PostalCode => "postal_code",
            CustomerField::Country => "country",
            CustomerField::Notes => "notes",
        }
    }

    /// Accepted header spellings, highest priority first.
    ///
    /// Spellings are compared AFTER normalization, so "E-Mail Address"
    /// matches the `emailaddress` alias.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            CustomerField::Name => &["name", "fullname", "customername", "guestname", "customer"],
            CustomerField::Email => &["email", "emailaddress", "mail"],
            CustomerField::Phone => &["phone", "phonenumber", "telephone", "mobile", "cell"],
            CustomerField::AddressLine1 => &[
                "addressline1",
                "address1",
                "streetaddress",
                "street",
                "address",
            ],
            CustomerField::AddressLine2 => &["addressline2", "address2", "apt", "unit", "suite"],
            CustomerField::City => &["city", "town"],
            CustomerField::State => &["state", "province", "region"],
            CustomerField::PostalCode => &["postalcode", "zip", "zipcode", "postcode"],
            CustomerField::Country => &["country"],
            CustomerField::Notes => &["notes", "note", "comments", "remarks"],
        }
    }

    /// Fields the import cannot proceed without.
    pub const fn is_required(self) -> bool {
        matches!(self, CustomerField::Name | CustomerField::Email)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Normalizes a raw header for alias comparison: lowercase, alphanumerics
/// only. "Guest Name" and "guest_name" both become "guestname".
fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

// =============================================================================
// Column Map
// =============================================================================

/// Resolved mapping from canonical field to source column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; ALL_FIELDS.len()],
}

impl ColumnMap {
    /// Builds the map from a header row.
    ///
    /// For each field the alias list is walked in priority order; the first
    /// alias that matches a normalized header claims that column.
    ///
    /// ## Errors
    /// [`ImportError::MissingRequiredColumns`] naming every required field
    /// that no header matched.
    pub fn from_headers<'a, I>(headers: I) -> Result<Self, ImportError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized: Vec<String> = headers.into_iter().map(normalize_header).collect();

        if normalized.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let mut columns = [None; ALL_FIELDS.len()];
        for field in ALL_FIELDS {
            columns[field.index()] = field
                .aliases()
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias));
        }

        let missing: Vec<String> = ALL_FIELDS
            .iter()
            .filter(|f| f.is_required() && columns[f.index()].is_none())
            .map(|f| f.canonical().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::MissingRequiredColumns { columns: missing });
        }

        Ok(ColumnMap { columns })
    }

    /// The source column index for a field, if one was mapped.
    pub fn column(&self, field: CustomerField) -> Option<usize> {
        self.columns[field.index()]
    }

    fn value<'r>(&self, record: &'r csv::StringRecord, field: CustomerField) -> Option<&'r str> {
        self.column(field)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

// =============================================================================
// Parsed Rows
// =============================================================================

/// A customer row extracted from a CSV, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

/// A data row that failed validation, with its position in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RowError {
    /// 1-based data row number (the header is row 0).
    pub row: usize,
    pub message: String,
}

/// The outcome of parsing one file: importable rows plus skipped ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportOutcome {
    pub rows: Vec<CustomerDraft>,
    pub skipped: Vec<RowError>,
}

// =============================================================================
// Parse / Export
// =============================================================================

/// Parses a customer CSV held in memory.
///
/// ## Example
/// ```rust
/// use concierge_core::import::parse_customers_csv;
///
/// let data = "Guest Name,E-Mail,ZIP\nAlice Park,alice@example.com,32830\n";
/// let outcome = parse_customers_csv(data).unwrap();
///
/// assert_eq!(outcome.rows.len(), 1);
/// assert_eq!(outcome.rows[0].name, "Alice Park");
/// assert_eq!(outcome.rows[0].postal_code.as_deref(), Some("32830"));
/// ```
pub fn parse_customers_csv(data: &str) -> Result<ImportOutcome, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::EmptyFile);
    }

    let map = ColumnMap::from_headers(headers.iter())?;

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let row_number = idx + 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                skipped.push(RowError {
                    row: row_number,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let name = map.value(&record, CustomerField::Name).unwrap_or("");
        let email = map.value(&record, CustomerField::Email).unwrap_or("");

        if let Err(e) = validate_name("name", name).and_then(|_| validate_email(email)) {
            skipped.push(RowError {
                row: row_number,
                message: e.to_string(),
            });
            continue;
        }

        rows.push(CustomerDraft {
            name: name.to_string(),
            email: email.to_string(),
            phone: map.value(&record, CustomerField::Phone).map(String::from),
            address_line1: map
                .value(&record, CustomerField::AddressLine1)
                .map(String::from),
            address_line2: map
                .value(&record, CustomerField::AddressLine2)
                .map(String::from),
            city: map.value(&record, CustomerField::City).map(String::from),
            state: map.value(&record, CustomerField::State).map(String::from),
            postal_code: map
                .value(&record, CustomerField::PostalCode)
                .map(String::from),
            country: map.value(&record, CustomerField::Country).map(String::from),
            notes: map.value(&record, CustomerField::Notes).map(String::from),
        });
    }

    Ok(ImportOutcome { rows, skipped })
}

/// Renders customers as a CSV string with canonical headers.
pub fn export_customers_csv(customers: &[Customer]) -> Result<String, ImportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(ALL_FIELDS.map(CustomerField::canonical))?;

    for c in customers {
        writer.write_record([
            c.name.as_str(),
            c.email.as_str(),
            c.phone.as_deref().unwrap_or(""),
            c.address_line1.as_deref().unwrap_or(""),
            c.address_line2.as_deref().unwrap_or(""),
            c.city.as_deref().unwrap_or(""),
            c.state.as_deref().unwrap_or(""),
            c.postal_code.as_deref().unwrap_or(""),
            c.country.as_deref().unwrap_or(""),
            c.notes.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// =============================================================================
// Unit Tests
// =============================================================================
