use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A house listing as stored in the relational store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    /// Unique identifier
    pub id: u64,

    /// Listing title
    pub title: String,

    /// Monthly price
    pub price: i32,

    /// Floor area in square meters
    pub area: i32,

    /// Number of bedrooms
    pub room: i32,

    /// Number of living rooms
    pub parlour: i32,

    /// Floor the unit is on
    pub floor: i32,

    /// Facing direction code
    pub direction: i32,

    /// Rent-way code (0 is a valid value)
    pub rent_way: i32,

    /// Distance to the nearest subway station in meters
    pub distance_to_subway: i32,

    /// City code
    pub city_en_name: String,

    /// Region code within the city
    pub region_en_name: String,

    /// Street name
    pub street: String,

    /// Residential district / compound name
    pub district: String,

    /// Creation timestamp
    pub create_time: DateTime<Utc>,

    /// Last update timestamp
    pub last_update_time: DateTime<Utc>,
}

/// One-to-one extension of a [`House`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseDetail {
    /// Owning house
    pub house_id: u64,

    /// Free-text description
    pub description: String,

    /// Layout description
    pub layout_desc: String,

    /// Transit description
    pub traffic: String,

    /// Surrounding services
    pub round_service: String,

    /// Street address
    pub address: String,

    /// Nearest subway line, if any
    pub subway_line_name: Option<String>,

    /// Nearest subway station, if any
    pub subway_station_name: Option<String>,
}

/// Short label attached to a house
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseTag {
    pub house_id: u64,
    pub name: String,
}

impl HouseTag {
    pub fn new(house_id: u64, name: impl Into<String>) -> Self {
        Self {
            house_id,
            name: name.into(),
        }
    }
}
