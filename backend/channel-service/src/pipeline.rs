//! Aggregation pipeline stages for read paths.
//!
//! A read view is assembled as `matching -> sort -> paginate -> join -> reshape`.
//! The memory backend runs every stage through [`Pipeline`]; the postgres
//! backend pushes matching, sorting and pagination into SQL and the services
//! perform the join and reshape with [`Lookup`].

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::config::PaginationConfig;
use crate::domain::{User, Video};
use crate::error::{AppError, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

const SEARCH_PATTERN_SIZE_LIMIT: usize = 1 << 20;

// =====================================================================
// Pagination
// =====================================================================

/// One-based page window. `page >= 1`, `limit >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page == 0 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if limit == 0 {
            return Err(AppError::validation("limit must be at least 1"));
        }
        Ok(Self { page, limit })
    }

    /// Build from optional query parameters, clamping `limit` to the configured maximum
    pub fn from_query(page: Option<u32>, limit: Option<u32>, config: &PaginationConfig) -> Result<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(config.default_limit.max(1));
        let max = config.max_page_limit.max(1);
        Self::new(page, limit.min(max))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Skip/limit over an already ordered sequence
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect()
    }
}

// =====================================================================
// Sorting
// =====================================================================

/// Fields the feed may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Views,
    Duration,
}

impl SortField {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "views" => Ok(SortField::Views),
            "duration" => Ok(SortField::Duration),
            other => Err(AppError::validation(format!("cannot sort by '{}'", other))),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Views => "views",
            SortField::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// `asc` is ascending; anything else, including nothing, is descending
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => Direction::Asc,
            _ => Direction::Desc,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: Direction,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: Direction::Desc,
        }
    }
}

impl SortSpec {
    pub fn from_query(sort_by: Option<&str>, sort_type: Option<&str>) -> Result<Self> {
        let field = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => SortField::parse(raw)?,
            None => SortField::CreatedAt,
        };
        Ok(Self {
            field,
            direction: Direction::parse(sort_type),
        })
    }

    pub fn compare<T: Sortable>(&self, a: &T, b: &T) -> Ordering {
        let ordering = a.sort_value(self.field).compare(&b.sort_value(self.field));
        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

pub enum SortValue<'a> {
    Time(DateTime<Utc>),
    Text(&'a str),
    Number(f64),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        }
    }
}

pub trait Sortable {
    fn sort_value(&self, field: SortField) -> SortValue<'_>;
}

impl Sortable for Video {
    fn sort_value(&self, field: SortField) -> SortValue<'_> {
        match field {
            SortField::CreatedAt => SortValue::Time(self.created_at),
            SortField::UpdatedAt => SortValue::Time(self.updated_at),
            SortField::Title => SortValue::Text(&self.title),
            SortField::Views => SortValue::Number(self.views as f64),
            SortField::Duration => SortValue::Number(self.duration),
        }
    }
}

// =====================================================================
// Text search
// =====================================================================

/// Case-insensitive regular expression over a record's text fields.
/// An empty query matches everything.
///
/// The same pattern is run by the `regex` crate and by PostgreSQL's `~*`, so
/// only the syntax both read alike is accepted: escapes are limited to
/// `\d \D \s \S \w \W` and escaped punctuation, and `(?:` is the only
/// group modifier. Constructs the two engines read differently, such as
/// Unicode classes or inline flags, are rejected.
#[derive(Debug, Clone, Default)]
pub struct TextSearch {
    pattern: Option<Regex>,
}

impl TextSearch {
    pub fn new(query: Option<&str>) -> Result<Self> {
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return Ok(Self::default());
        };

        check_portable(query)?;

        let pattern = RegexBuilder::new(query)
            .case_insensitive(true)
            .size_limit(SEARCH_PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|e| AppError::validation(format!("invalid search pattern: {}", e)))?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// True when any of `fields` matches
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        match &self.pattern {
            Some(pattern) => fields.iter().any(|f| pattern.is_match(f)),
            None => true,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }
}

/// Escapes that mean the same in both engines
const PORTABLE_CLASS_ESCAPES: &str = "dDsSwW";

fn check_portable(query: &str) -> Result<()> {
    let mut chars = query.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(e) if e.is_ascii_alphanumeric() && !PORTABLE_CLASS_ESCAPES.contains(e) => {
                    return Err(AppError::validation(format!(
                        "unsupported escape \\{} in search pattern",
                        e
                    )));
                }
                Some(_) => {}
                None => return Err(AppError::validation("search pattern ends with an escape")),
            },
            '(' if chars.peek() == Some(&'?') => {
                chars.next();
                if chars.peek() != Some(&':') {
                    return Err(AppError::validation(
                        "only (?:...) groups are supported in search patterns",
                    ));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

// =====================================================================
// Pipeline
// =====================================================================

/// In-memory staged pipeline over a record set
pub struct Pipeline<T> {
    items: Vec<T>,
}

impl<T> Pipeline<T> {
    pub fn from_source(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn matching(self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        Self {
            items: self.items.into_iter().filter(|item| predicate(item)).collect(),
        }
    }

    /// Stable sort: ties keep source order
    pub fn sorted_by(mut self, spec: &SortSpec) -> Self
    where
        T: Sortable,
    {
        self.items.sort_by(|a, b| spec.compare(a, b));
        self
    }

    pub fn paginate(self, page: &Page) -> Self {
        Self {
            items: page.window(self.items),
        }
    }

    /// Inner join: records for which `join` yields nothing are dropped
    pub fn join<U>(self, join: impl FnMut(T) -> Option<U>) -> Pipeline<U> {
        Pipeline {
            items: self.items.into_iter().filter_map(join).collect(),
        }
    }

    pub fn reshape<U>(self, shape: impl FnMut(T) -> U) -> Pipeline<U> {
        Pipeline {
            items: self.items.into_iter().map(shape).collect(),
        }
    }

    pub fn collect(self) -> Vec<T> {
        self.items
    }
}

// =====================================================================
// Lookup
// =====================================================================

/// Rows addressable by id
pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for User {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Video {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Id-keyed join table
pub struct Lookup<V> {
    rows: HashMap<Uuid, V>,
}

impl<V: Keyed> Lookup<V> {
    pub fn from_rows(rows: Vec<V>) -> Self {
        Self {
            rows: rows.into_iter().map(|row| (row.key(), row)).collect(),
        }
    }

    /// One-to-one join on a singular reference
    pub fn first(&self, id: Uuid) -> Option<&V> {
        self.rows.get(&id)
    }

    /// One-to-many join in the order of `ids`; dangling ids are dropped
    pub fn many(&self, ids: &[Uuid]) -> Vec<&V> {
        ids.iter().filter_map(|id| self.rows.get(id)).collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.rows.values()
    }
}

/// Distinct ids in first-seen order
pub fn distinct_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
