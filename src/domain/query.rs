// src/domain/query.rs

use crate::errors::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The fixed set of listing filters the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    City,
    State,
    Zip,
    County,
    PropertyType,
    MinValue,
    MaxValue,
    MinEquity,
    MaxEquity,
    MinBedrooms,
    MinBathrooms,
    MinSqft,
    MaxSqft,
    MinYearBuilt,
    MaxYearBuilt,
    OwnerOccupied,
    Vacant,
    PreForeclosure,
    Probate,
}

impl FilterKey {
    pub const ALL: [FilterKey; 19] = [
        FilterKey::City,
        FilterKey::State,
        FilterKey::Zip,
        FilterKey::County,
        FilterKey::PropertyType,
        FilterKey::MinValue,
        FilterKey::MaxValue,
        FilterKey::MinEquity,
        FilterKey::MaxEquity,
        FilterKey::MinBedrooms,
        FilterKey::MinBathrooms,
        FilterKey::MinSqft,
        FilterKey::MaxSqft,
        FilterKey::MinYearBuilt,
        FilterKey::MaxYearBuilt,
        FilterKey::OwnerOccupied,
        FilterKey::Vacant,
        FilterKey::PreForeclosure,
        FilterKey::Probate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::City => "city",
            FilterKey::State => "state",
            FilterKey::Zip => "zip",
            FilterKey::County => "county",
            FilterKey::PropertyType => "propertyType",
            FilterKey::MinValue => "minValue",
            FilterKey::MaxValue => "maxValue",
            FilterKey::MinEquity => "minEquity",
            FilterKey::MaxEquity => "maxEquity",
            FilterKey::MinBedrooms => "minBedrooms",
            FilterKey::MinBathrooms => "minBathrooms",
            FilterKey::MinSqft => "minSqft",
            FilterKey::MaxSqft => "maxSqft",
            FilterKey::MinYearBuilt => "minYearBuilt",
            FilterKey::MaxYearBuilt => "maxYearBuilt",
            FilterKey::OwnerOccupied => "ownerOccupied",
            FilterKey::Vacant => "vacant",
            FilterKey::PreForeclosure => "preForeclosure",
            FilterKey::Probate => "probate",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SearchError::Validation(format!("Unknown filter '{s}'")))
    }
}

/// Orderings the listing endpoint accepts. No selection means the backend's
/// default ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    EstValueDesc,
    EstValueAsc,
    EstEquityDesc,
    EstEquityAsc,
    LastSaleDateDesc,
    YearBuiltDesc,
    YearBuiltAsc,
    PropertySqftDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::EstValueDesc,
        SortKey::EstValueAsc,
        SortKey::EstEquityDesc,
        SortKey::EstEquityAsc,
        SortKey::LastSaleDateDesc,
        SortKey::YearBuiltDesc,
        SortKey::YearBuiltAsc,
        SortKey::PropertySqftDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::EstValueDesc => "est_value_desc",
            SortKey::EstValueAsc => "est_value_asc",
            SortKey::EstEquityDesc => "est_equity_desc",
            SortKey::EstEquityAsc => "est_equity_asc",
            SortKey::LastSaleDateDesc => "last_sale_date_desc",
            SortKey::YearBuiltDesc => "year_built_desc",
            SortKey::YearBuiltAsc => "year_built_asc",
            SortKey::PropertySqftDesc => "property_sqft_desc",
        }
    }

    /// Parses a sort `<select>` value. The empty selector is "default ordering".
    pub fn parse_selector(selector: &str) -> SearchResult<Option<SortKey>> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Ok(None);
        }
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == selector)
            .map(Some)
            .ok_or_else(|| SearchError::Validation(format!("Unknown sort option '{selector}'")))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-based page of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }
}

/// Body of `POST /api/leads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadsRequest {
    pub filters: BTreeMap<FilterKey, String>,
    pub offset: u64,
    pub limit: u32,
    #[serde(rename = "sortBy", default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,
}

/// Drops every filter without a usable value. Absence, not `""`, means
/// "no constraint".
pub fn build_filters<V, I>(raw: I) -> BTreeMap<FilterKey, String>
where
    V: AsRef<str>,
    I: IntoIterator<Item = (FilterKey, Option<V>)>,
{
    raw.into_iter()
        .filter_map(|(key, value)| {
            let value = value?;
            let value = value.as_ref().trim();
            (!value.is_empty()).then(|| (key, value.to_string()))
        })
        .collect()
}

pub fn build_query<V, I>(raw: I, sort: Option<SortKey>, page: Page) -> LeadsRequest
where
    V: AsRef<str>,
    I: IntoIterator<Item = (FilterKey, Option<V>)>,
{
    LeadsRequest {
        filters: build_filters(raw),
        offset: page.offset(),
        limit: page.size,
        sort_by: sort,
    }
}

/// Filter form, sort selector and pager for listing mode.
///
/// Any change to the filters or the sort sends the pager back to page 1.
#[derive(Debug, Clone)]
pub struct ListingControls {
    inputs: BTreeMap<FilterKey, String>,
    sort: Option<SortKey>,
    page: u32,
    page_size: u32,
}

impl ListingControls {
    pub fn new(page_size: u32) -> Self {
        Self {
            inputs: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn set_filter(&mut self, key: FilterKey, value: impl Into<String>) {
        self.inputs.insert(key, value.into());
        self.page = 1;
    }

    pub fn clear_filter(&mut self, key: FilterKey) {
        self.inputs.remove(&key);
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.inputs.clear();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortKey>) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_sort_selector(&mut self, selector: &str) -> SearchResult<()> {
        let sort = SortKey::parse_selector(selector)?;
        self.set_sort(sort);
        Ok(())
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn inputs(&self) -> &BTreeMap<FilterKey, String> {
        &self.inputs
    }

    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }

    /// Back to a blank form; the page size stays.
    pub fn reset(&mut self) {
        self.clear_filters();
        self.sort = None;
    }

    pub fn request(&self) -> LeadsRequest {
        build_query(
            self.inputs.iter().map(|(k, v)| (*k, Some(v.as_str()))),
            self.sort,
            Page::new(self.page, self.page_size),
        )
    }
}
