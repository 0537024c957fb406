//! Search document structures and schema

use crate::models::{House, HouseDetail, HouseTag};
use crate::search::error::{SearchError, SearchResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tantivy::schema::{Field, Schema, FAST, INDEXED, STORED, STRING, TEXT};
use tantivy::TantivyDocument;

/// Index field names
pub mod keys {
    pub const HOUSE_ID: &str = "house_id";
    pub const CITY_EN_NAME: &str = "city_en_name";
    pub const REGION_EN_NAME: &str = "region_en_name";
    pub const PRICE: &str = "price";
    pub const AREA: &str = "area";
    pub const DIRECTION: &str = "direction";
    pub const RENT_WAY: &str = "rent_way";
    pub const CREATE_TIME: &str = "create_time";
    pub const LAST_UPDATE_TIME: &str = "last_update_time";
    pub const DISTANCE_TO_SUBWAY: &str = "distance_to_subway";
    pub const TITLE: &str = "title";
    pub const DISTRICT: &str = "district";
    pub const TRAFFIC: &str = "traffic";
    pub const ROUND_SERVICE: &str = "round_service";
    pub const SUBWAY_LINE_NAME: &str = "subway_line_name";
    pub const SUBWAY_STATION_NAME: &str = "subway_station_name";
    pub const DESCRIPTION: &str = "description";
    pub const LAYOUT_DESC: &str = "layout_desc";
    pub const TAGS: &str = "tags";
    pub const SUGGEST: &str = "suggest";
    pub const SOURCE: &str = "source";
}

/// Weighted autocomplete phrase attached to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionEntry {
    pub input: String,
    pub weight: u32,
}

impl SuggestionEntry {
    pub fn new(input: impl Into<String>, weight: u32) -> Self {
        Self {
            input: input.into(),
            weight,
        }
    }
}

/// Denormalized house document stored in the search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseDocument {
    pub house_id: u64,
    pub title: String,
    pub price: i32,
    pub area: i32,
    pub create_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
    pub city_en_name: String,
    pub region_en_name: String,
    pub direction: i32,
    pub distance_to_subway: i32,
    pub subway_line_name: String,
    pub subway_station_name: String,
    pub tags: Vec<String>,
    pub street: String,
    pub district: String,
    pub description: String,
    pub layout_desc: String,
    pub traffic: String,
    pub round_service: String,
    pub rent_way: i32,
    pub room: i32,
    pub parlour: i32,
    pub floor: i32,

    /// Autocomplete phrases; filled in by the suggestion builder
    #[serde(default)]
    pub suggests: Vec<SuggestionEntry>,
}

impl HouseDocument {
    /// Merge a house, its detail and its tags into one document.
    ///
    /// Tags keep the order they were handed in. `suggests` starts empty.
    pub fn from_parts(house: &House, detail: &HouseDetail, tags: &[HouseTag]) -> Self {
        Self {
            house_id: house.id,
            title: house.title.clone(),
            price: house.price,
            area: house.area,
            create_time: house.create_time,
            last_update_time: house.last_update_time,
            city_en_name: house.city_en_name.clone(),
            region_en_name: house.region_en_name.clone(),
            direction: house.direction,
            distance_to_subway: house.distance_to_subway,
            subway_line_name: detail.subway_line_name.clone().unwrap_or_default(),
            subway_station_name: detail.subway_station_name.clone().unwrap_or_default(),
            tags: tags.iter().map(|tag| tag.name.clone()).collect(),
            street: house.street.clone(),
            district: house.district.clone(),
            description: detail.description.clone(),
            layout_desc: detail.layout_desc.clone(),
            traffic: detail.traffic.clone(),
            round_service: detail.round_service.clone(),
            rent_way: house.rent_way,
            room: house.room,
            parlour: house.parlour,
            floor: house.floor,
            suggests: Vec::new(),
        }
    }
}

/// Resolved handles for every field of the house schema
#[derive(Debug, Clone)]
pub struct HouseFields {
    pub house_id: Field,
    pub city_en_name: Field,
    pub region_en_name: Field,
    pub price: Field,
    pub area: Field,
    pub direction: Field,
    pub rent_way: Field,
    pub create_time: Field,
    pub last_update_time: Field,
    pub distance_to_subway: Field,
    pub title: Field,
    pub district: Field,
    pub traffic: Field,
    pub round_service: Field,
    pub subway_line_name: Field,
    pub subway_station_name: Field,
    pub description: Field,
    pub layout_desc: Field,
    pub tags: Field,
    pub suggest: Field,
    pub source: Field,
}

impl HouseFields {
    /// Look up every field by name
    pub fn resolve(schema: &Schema) -> SearchResult<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| SearchError::SchemaError(format!("missing field {}: {}", name, e)))
        };

        Ok(Self {
            house_id: field(keys::HOUSE_ID)?,
            city_en_name: field(keys::CITY_EN_NAME)?,
            region_en_name: field(keys::REGION_EN_NAME)?,
            price: field(keys::PRICE)?,
            area: field(keys::AREA)?,
            direction: field(keys::DIRECTION)?,
            rent_way: field(keys::RENT_WAY)?,
            create_time: field(keys::CREATE_TIME)?,
            last_update_time: field(keys::LAST_UPDATE_TIME)?,
            distance_to_subway: field(keys::DISTANCE_TO_SUBWAY)?,
            title: field(keys::TITLE)?,
            district: field(keys::DISTRICT)?,
            traffic: field(keys::TRAFFIC)?,
            round_service: field(keys::ROUND_SERVICE)?,
            subway_line_name: field(keys::SUBWAY_LINE_NAME)?,
            subway_station_name: field(keys::SUBWAY_STATION_NAME)?,
            description: field(keys::DESCRIPTION)?,
            layout_desc: field(keys::LAYOUT_DESC)?,
            tags: field(keys::TAGS)?,
            suggest: field(keys::SUGGEST)?,
            source: field(keys::SOURCE)?,
        })
    }

    /// Convert a house document into a Tantivy document
    pub fn to_tantivy_doc(&self, document: &HouseDocument) -> SearchResult<TantivyDocument> {
        let source = serde_json::to_string(document).map_err(|e| {
            SearchError::IndexingFailed(format!(
                "Failed to encode house {}: {}",
                document.house_id, e
            ))
        })?;

        let mut doc = TantivyDocument::new();
        doc.add_u64(self.house_id, document.house_id);
        doc.add_text(self.city_en_name, &document.city_en_name);
        doc.add_text(self.region_en_name, &document.region_en_name);

        doc.add_i64(self.price, i64::from(document.price));
        doc.add_i64(self.area, i64::from(document.area));
        doc.add_i64(self.direction, i64::from(document.direction));
        doc.add_i64(self.rent_way, i64::from(document.rent_way));
        doc.add_i64(self.distance_to_subway, i64::from(document.distance_to_subway));
        doc.add_i64(self.create_time, document.create_time.timestamp_millis());
        doc.add_i64(self.last_update_time, document.last_update_time.timestamp_millis());

        doc.add_text(self.title, &document.title);
        doc.add_text(self.district, &document.district);
        doc.add_text(self.traffic, &document.traffic);
        doc.add_text(self.round_service, &document.round_service);
        doc.add_text(self.subway_line_name, &document.subway_line_name);
        doc.add_text(self.subway_station_name, &document.subway_station_name);
        doc.add_text(self.description, &document.description);
        doc.add_text(self.layout_desc, &document.layout_desc);

        for tag in &document.tags {
            doc.add_text(self.tags, tag);
        }

        // Empty phrases stay in the source but never become completion terms
        for entry in &document.suggests {
            if !entry.input.trim().is_empty() {
                doc.add_text(self.suggest, entry.input.to_lowercase());
            }
        }

        doc.add_text(self.source, source);

        Ok(doc)
    }
}

/// Build the search schema for houses
pub fn build_house_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    schema_builder.add_u64_field(keys::HOUSE_ID, INDEXED | STORED | FAST);

    // Exact-match filters
    schema_builder.add_text_field(keys::CITY_EN_NAME, STRING);
    schema_builder.add_text_field(keys::REGION_EN_NAME, STRING);
    schema_builder.add_text_field(keys::TAGS, STRING);

    // Numeric filters and sort keys; times are epoch millis
    for name in [
        keys::PRICE,
        keys::AREA,
        keys::DIRECTION,
        keys::RENT_WAY,
        keys::CREATE_TIME,
        keys::LAST_UPDATE_TIME,
        keys::DISTANCE_TO_SUBWAY,
    ] {
        schema_builder.add_i64_field(name, INDEXED | FAST);
    }

    for name in [
        keys::TITLE,
        keys::DISTRICT,
        keys::TRAFFIC,
        keys::ROUND_SERVICE,
        keys::SUBWAY_LINE_NAME,
        keys::SUBWAY_STATION_NAME,
        keys::DESCRIPTION,
        keys::LAYOUT_DESC,
    ] {
        schema_builder.add_text_field(name, TEXT);
    }

    // Lowercased whole phrases for prefix completion
    schema_builder.add_text_field(keys::SUGGEST, STRING);

    // Full document as JSON, used to rebuild hits and completions
    schema_builder.add_text_field(keys::SOURCE, STORED);

    schema_builder.build()
}
