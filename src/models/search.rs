use serde::{Deserialize, Serialize};
use validator::Validate;

/// Client search request for house listings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    /// City code (required)
    #[validate(length(min = 1, max = 64))]
    pub city_en_name: String,

    /// Region code within the city
    #[serde(default)]
    pub region_en_name: Option<String>,

    /// Full-text keyword
    #[serde(default)]
    pub keyword: String,

    #[serde(default)]
    pub area_min: Option<i32>,

    #[serde(default)]
    pub area_max: Option<i32>,

    #[serde(default)]
    pub price_min: Option<i32>,

    #[serde(default)]
    pub price_max: Option<i32>,

    /// Facing direction code, applied when > 0
    #[serde(default)]
    pub direction: Option<i32>,

    /// Rent-way code, applied when >= 0
    #[serde(default)]
    pub rent_way: Option<i32>,

    /// Sort field name, e.g. `price` or `lastUpdateTime`
    #[serde(default)]
    pub order_by: Option<String>,

    /// `asc` or `desc`
    #[serde(default)]
    pub sort_direction: Option<String>,

    /// 1-based page number
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = 1000))]
    pub page: u32,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,
}

impl SearchRequest {
    /// Create a request for a city and keyword with every optional filter unset
    pub fn new(city_en_name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            city_en_name: city_en_name.into(),
            region_en_name: None,
            keyword: keyword.into(),
            area_min: None,
            area_max: None,
            price_min: None,
            price_max: None,
            direction: None,
            rent_way: None,
            order_by: None,
            sort_direction: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

/// Total count plus one page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiResult<T> {
    pub total: usize,
    pub results: Vec<T>,
}

impl<T> MultiResult<T> {
    pub fn new(total: usize, results: Vec<T>) -> Self {
        Self { total, results }
    }

    pub fn empty() -> Self {
        Self {
            total: 0,
            results: Vec::new(),
        }
    }
}
