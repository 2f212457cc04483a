//! Request and response types shared by the searcher, the stores and the HTTP layer.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u32 = 12;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A public professional profile.
///
/// Rows are written by an external sync process and soft-deleted through
/// `active`; this service only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub first_name: String,
    pub last_initial: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub summary: String,
    pub office: String,
    pub profession_type: String,
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Location,
    Profession,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "location" => Some(Self::Location),
            "profession" => Some(Self::Profession),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// One-based page number and page size, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Cap the page size at `max_limit`.
    pub fn capped(self, max_limit: u32) -> Self {
        Self::new(self.page, self.limit.min(max_limit.max(1)))
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    pub const fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

/// A fully parsed search request. Built once per request and not mutated after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub professions: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub postal_codes: Vec<String>,
    pub radius_miles: Option<f64>,
    pub office: Option<String>,
    pub pagination: Pagination,
    pub sort: Sort,
}

impl SearchQuery {
    pub fn builder() -> SearchQueryBuilder {
        SearchQueryBuilder::default()
    }

    /// The radius, if it is a usable positive distance.
    pub fn radius(&self) -> Option<f64> {
        self.radius_miles.filter(|r| r.is_finite() && *r > 0.0)
    }

    /// Radius centers: the postal code list, or the single postal code when
    /// no list was given.
    pub fn centers(&self) -> Vec<String> {
        if self.postal_codes.is_empty() {
            self.postal_code.iter().cloned().collect()
        } else {
            self.postal_codes.clone()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchQueryBuilder {
    query: SearchQuery,
}

impl SearchQueryBuilder {
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.keywords = clean_list(keywords);
        self
    }

    pub fn professions<I, S>(mut self, professions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.professions = clean_list(professions);
        self
    }

    pub fn postal_codes<I, S>(mut self, postal_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.postal_codes = clean_list(postal_codes);
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.query.postal_code = non_blank(postal_code.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.query.city = non_blank(city.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.query.state = non_blank(state.into()).map(|s| s.to_uppercase());
        self
    }

    pub fn office(mut self, office: impl Into<String>) -> Self {
        self.query.office = non_blank(office.into());
        self
    }

    pub fn radius(mut self, miles: f64) -> Self {
        self.query.radius_miles = Some(miles);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.query.pagination = Pagination::new(page, self.query.pagination.limit());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.query.pagination = Pagination::new(self.query.pagination.page(), limit);
        self
    }

    pub fn sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.query.sort = Sort { field, direction };
        self
    }

    pub fn build(self) -> SearchQuery {
        self.query
    }
}

/// Raw query-string parameters of `GET /api/profiles`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub keywords: Option<String>,
    pub zip_codes: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub radius: Option<String>,
    pub professions: Option<String>,
    pub office: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl SearchParams {
    /// Parse into a [`SearchQuery`]. Malformed numbers and unknown sort values
    /// fall back to their defaults instead of failing the request.
    pub fn into_query(self, default_limit: u32, max_limit: u32) -> SearchQuery {
        let page = parse_number::<u32>(self.page.as_deref()).unwrap_or(1);
        let limit = parse_number::<u32>(self.limit.as_deref()).unwrap_or(default_limit);
        let sort = Sort {
            field: self
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or_default(),
            direction: self
                .sort_direction
                .as_deref()
                .and_then(SortDirection::parse)
                .unwrap_or_default(),
        };

        SearchQuery {
            keywords: split_list(self.keywords.as_deref()),
            professions: split_list(self.professions.as_deref()),
            city: self.city.and_then(non_blank),
            state: self.state.and_then(non_blank).map(|s| s.to_uppercase()),
            postal_code: self.zip_code.and_then(non_blank),
            postal_codes: split_list(self.zip_codes.as_deref()),
            radius_miles: parse_number::<f64>(self.radius.as_deref()),
            office: self.office.and_then(non_blank),
            pagination: Pagination::new(page, limit).capped(max_limit),
            sort,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub profiles: Vec<Profile>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl SearchPage {
    pub fn new(profiles: Vec<Profile>, total: u64, pagination: Pagination) -> Self {
        Self {
            profiles,
            total,
            page: pagination.page(),
            limit: pagination.limit(),
            total_pages: pagination.total_pages(total),
        }
    }

    pub fn empty(pagination: Pagination) -> Self {
        Self::new(Vec::new(), 0, pagination)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

fn clean_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .filter_map(|v| non_blank(v.into()))
        .unique()
        .collect()
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value.map_or_else(Vec::new, |v| clean_list(v.split(',')))
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}
