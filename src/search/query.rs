//! Translation of client search requests into structured index queries

use crate::models::SearchRequest;
use crate::search::document::keys;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

/// Sort direction
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a client-supplied direction; anything unrecognized means descending
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|v| SortOrder::from_str(v.trim()).ok())
            .unwrap_or_default()
    }
}

/// Fields results can be ordered by
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum HouseSortField {
    #[default]
    LastUpdateTime,
    CreateTime,
    Price,
    Area,
    DistanceToSubway,
}

impl HouseSortField {
    /// Parse a client-supplied sort key; unknown keys fall back to the default
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|v| HouseSortField::from_str(v.trim()).ok())
            .unwrap_or_default()
    }

    /// Index field backing this sort key
    pub fn index_field(&self) -> &'static str {
        match self {
            HouseSortField::LastUpdateTime => keys::LAST_UPDATE_TIME,
            HouseSortField::CreateTime => keys::CREATE_TIME,
            HouseSortField::Price => keys::PRICE,
            HouseSortField::Area => keys::AREA,
            HouseSortField::DistanceToSubway => keys::DISTANCE_TO_SUBWAY,
        }
    }
}

/// Exact-match value of a term filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermValue {
    Text(String),
    Int(i64),
}

/// A single non-scoring filter clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    Term {
        field: &'static str,
        value: TermValue,
    },
    /// Inclusive range; a missing bound leaves that side open
    Range {
        field: &'static str,
        gte: Option<i64>,
        lte: Option<i64>,
    },
}

/// Scoring full-text match over several fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub text: String,
    pub fields: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: HouseSortField,
    pub order: SortOrder,
}

/// Engine-independent description of a house search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredQuery {
    pub filters: Vec<FilterClause>,
    pub keyword: KeywordMatch,
    pub sort: SortSpec,
    pub offset: usize,
    pub limit: usize,
}

/// Builds a [`StructuredQuery`] from a [`SearchRequest`]
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn build(request: &SearchRequest) -> StructuredQuery {
        let mut filters = vec![FilterClause::Term {
            field: keys::CITY_EN_NAME,
            value: TermValue::Text(request.city_en_name.clone()),
        }];

        if let Some(region) = request
            .region_en_name
            .as_deref()
            .filter(|r| !r.trim().is_empty())
        {
            filters.push(FilterClause::Term {
                field: keys::REGION_EN_NAME,
                value: TermValue::Text(region.to_string()),
            });
        }

        // Area is only constrained by bounds that are actually positive
        let area_min = request.area_min.filter(|v| *v > 0).map(i64::from);
        let area_max = request.area_max.filter(|v| *v > 0).map(i64::from);
        if area_min.is_some() || area_max.is_some() {
            filters.push(FilterClause::Range {
                field: keys::AREA,
                gte: area_min,
                lte: area_max,
            });
        }

        // Price attaches whenever a bound was supplied, even if both end up open
        if request.price_min.is_some() || request.price_max.is_some() {
            filters.push(FilterClause::Range {
                field: keys::PRICE,
                gte: request.price_min.filter(|v| *v > 0).map(i64::from),
                lte: request.price_max.filter(|v| *v > 0).map(i64::from),
            });
        }

        if let Some(direction) = request.direction.filter(|d| *d > 0) {
            filters.push(FilterClause::Term {
                field: keys::DIRECTION,
                value: TermValue::Int(i64::from(direction)),
            });
        }

        if let Some(rent_way) = request.rent_way.filter(|r| *r >= 0) {
            filters.push(FilterClause::Term {
                field: keys::RENT_WAY,
                value: TermValue::Int(i64::from(rent_way)),
            });
        }

        let keyword = KeywordMatch {
            text: request.keyword.clone(),
            fields: vec![
                keys::TITLE,
                keys::TRAFFIC,
                keys::DISTRICT,
                keys::ROUND_SERVICE,
                keys::SUBWAY_LINE_NAME,
                keys::SUBWAY_STATION_NAME,
            ],
        };

        let sort = SortSpec {
            field: HouseSortField::parse_lenient(request.order_by.as_deref()),
            order: SortOrder::parse_lenient(request.sort_direction.as_deref()),
        };

        let page = request.page.max(1) as usize;
        let limit = request.page_size as usize;

        StructuredQuery {
            filters,
            keyword,
            sort,
            offset: (page - 1).saturating_mul(limit),
            limit,
        }
    }
}
