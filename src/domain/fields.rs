// src/domain/fields.rs

use std::collections::BTreeMap;

/// Every lead attribute the product knows how to show.
///
/// Backend deployments name these differently (`"Property Address"` vs
/// `"property_address"`), so nothing outside [`FieldSchema`] should ever spell
/// out a raw key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    // Property
    PropertyAddress,
    City,
    State,
    Zip,
    County,
    PropertyType,
    Apn,
    // Owner
    OwnerFirstName,
    OwnerLastName,
    PhoneNumbers,
    Emails,
    OwnerOccupied,
    // Mailing
    MailingAddress,
    MailingCity,
    MailingState,
    MailingZip,
    MailingCounty,
    // Building
    Bedrooms,
    Bathrooms,
    PropertySqft,
    LotSize,
    YearBuilt,
    // Financial
    EstValue,
    AssessedValue,
    LastSaleDate,
    LastSaleAmount,
    TotalLoanBalance,
    EstEquity,
    EstLtv,
    // Status
    Vacancy,
    MlsStatus,
    Probate,
    Liens,
    PreForeclosure,
    Taxes,
    Vacant,
}

impl Field {
    pub const ALL: [Field; 36] = [
        Field::PropertyAddress,
        Field::City,
        Field::State,
        Field::Zip,
        Field::County,
        Field::PropertyType,
        Field::Apn,
        Field::OwnerFirstName,
        Field::OwnerLastName,
        Field::PhoneNumbers,
        Field::Emails,
        Field::OwnerOccupied,
        Field::MailingAddress,
        Field::MailingCity,
        Field::MailingState,
        Field::MailingZip,
        Field::MailingCounty,
        Field::Bedrooms,
        Field::Bathrooms,
        Field::PropertySqft,
        Field::LotSize,
        Field::YearBuilt,
        Field::EstValue,
        Field::AssessedValue,
        Field::LastSaleDate,
        Field::LastSaleAmount,
        Field::TotalLoanBalance,
        Field::EstEquity,
        Field::EstLtv,
        Field::Vacancy,
        Field::MlsStatus,
        Field::Probate,
        Field::Liens,
        Field::PreForeclosure,
        Field::Taxes,
        Field::Vacant,
    ];

    /// Columns of the compact results table.
    pub const SUMMARY: [Field; 8] = [
        Field::PropertyAddress,
        Field::City,
        Field::State,
        Field::Zip,
        Field::EstValue,
        Field::PropertyType,
        Field::Bedrooms,
        Field::Bathrooms,
    ];

    /// Key used by deployments that ship spreadsheet-style column names.
    /// "Year Build" is not a typo on our side.
    pub fn display_key(self) -> &'static str {
        match self {
            Field::PropertyAddress => "Property Address",
            Field::City => "City",
            Field::State => "State",
            Field::Zip => "Zip",
            Field::County => "County",
            Field::PropertyType => "Property Type",
            Field::Apn => "APN",
            Field::OwnerFirstName => "Owner First Name",
            Field::OwnerLastName => "Owner Last Name",
            Field::PhoneNumbers => "Phone Numbers",
            Field::Emails => "Emails",
            Field::OwnerOccupied => "Owner Occupied",
            Field::MailingAddress => "Mailing Address",
            Field::MailingCity => "Mailing City",
            Field::MailingState => "Mailing State",
            Field::MailingZip => "Mailing Zip Code",
            Field::MailingCounty => "Mailing County",
            Field::Bedrooms => "Bedrooms",
            Field::Bathrooms => "Bathrooms",
            Field::PropertySqft => "Property Sqft",
            Field::LotSize => "Lot Size",
            Field::YearBuilt => "Year Build",
            Field::EstValue => "Est. Value",
            Field::AssessedValue => "Assessed Value",
            Field::LastSaleDate => "Last Sale Date",
            Field::LastSaleAmount => "Last Sale Amount",
            Field::TotalLoanBalance => "Total Loan Balance",
            Field::EstEquity => "Est. Equity",
            Field::EstLtv => "Est. LTV",
            Field::Vacancy => "Vacancy",
            Field::MlsStatus => "MLS Status",
            Field::Probate => "Probate",
            Field::Liens => "Liens",
            Field::PreForeclosure => "Pre-Foreclosure",
            Field::Taxes => "Taxes",
            Field::Vacant => "Vacant",
        }
    }

    pub fn snake_key(self) -> &'static str {
        match self {
            Field::PropertyAddress => "property_address",
            Field::City => "city",
            Field::State => "state",
            Field::Zip => "zip",
            Field::County => "county",
            Field::PropertyType => "property_type",
            Field::Apn => "apn",
            Field::OwnerFirstName => "owner_first_name",
            Field::OwnerLastName => "owner_last_name",
            Field::PhoneNumbers => "phone_numbers",
            Field::Emails => "emails",
            Field::OwnerOccupied => "owner_occupied",
            Field::MailingAddress => "mailing_address",
            Field::MailingCity => "mailing_city",
            Field::MailingState => "mailing_state",
            Field::MailingZip => "mailing_zip",
            Field::MailingCounty => "mailing_county",
            Field::Bedrooms => "bedrooms",
            Field::Bathrooms => "bathrooms",
            Field::PropertySqft => "property_sqft",
            Field::LotSize => "lot_size",
            Field::YearBuilt => "year_built",
            Field::EstValue => "est_value",
            Field::AssessedValue => "assessed_value",
            Field::LastSaleDate => "last_sale_date",
            Field::LastSaleAmount => "last_sale_amount",
            Field::TotalLoanBalance => "total_loan_balance",
            Field::EstEquity => "est_equity",
            Field::EstLtv => "est_ltv",
            Field::Vacancy => "vacancy",
            Field::MlsStatus => "mls_status",
            Field::Probate => "probate",
            Field::Liens => "liens",
            Field::PreForeclosure => "pre_foreclosure",
            Field::Taxes => "taxes",
            Field::Vacant => "vacant",
        }
    }

    /// Column header for exports and terminal tables.
    pub fn label(self) -> &'static str {
        match self {
            Field::PropertyAddress => "Address",
            Field::MailingZip => "Mailing Zip Code",
            Field::YearBuilt => "Year Built",
            Field::EstValue => "Estimated Value",
            Field::EstEquity => "Estimated Equity",
            Field::EstLtv => "Estimated LTV",
            other => other.display_key(),
        }
    }
}

/// Per-deployment mapping from [`Field`] to the backend's key for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    keys: BTreeMap<Field, String>,
}

impl FieldSchema {
    pub fn display_names() -> Self {
        Self::from_fn(Field::display_key)
    }

    pub fn snake_case() -> Self {
        Self::from_fn(Field::snake_key)
    }

    fn from_fn(key: fn(Field) -> &'static str) -> Self {
        let keys = Field::ALL
            .iter()
            .map(|&f| (f, key(f).to_string()))
            .collect();
        Self { keys }
    }

    /// Override a single key, e.g. a nested path like `"owner.first_name"`.
    pub fn with_key(mut self, field: Field, key: impl Into<String>) -> Self {
        self.keys.insert(field, key.into());
        self
    }

    pub fn key(&self, field: Field) -> &str {
        self.keys
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.display_key())
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::display_names()
    }
}
