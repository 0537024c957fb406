//! Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use house_search::models::{House, HouseDetail, HouseTag};
use house_search::state::InMemoryHouseStore;
use std::collections::HashMap;

/// A house in Beijing/Haidian with fixed timestamps offset by id
pub fn house(id: u64, title: &str, district: &str) -> House {
    let ts = Utc.timestamp_opt(1_700_000_000 + id as i64 * 60, 0).unwrap();
    House {
        id,
        title: title.to_string(),
        price: 3000,
        area: 60,
        room: 2,
        parlour: 1,
        floor: 5,
        direction: 1,
        rent_way: 1,
        distance_to_subway: 500,
        city_en_name: "bj".to_string(),
        region_en_name: "hd".to_string(),
        street: "Zhongguancun St".to_string(),
        district: district.to_string(),
        create_time: ts,
        last_update_time: ts,
    }
}

pub fn detail(house_id: u64, subway_line: Option<&str>, subway_station: Option<&str>) -> HouseDetail {
    HouseDetail {
        house_id,
        description: "Bright corner unit".to_string(),
        layout_desc: "Two bedrooms facing south".to_string(),
        traffic: "Five minutes to the bus hub".to_string(),
        round_service: "Supermarket and park nearby".to_string(),
        address: format!("{} Zhongguancun St", house_id),
        subway_line_name: subway_line.map(str::to_string),
        subway_station_name: subway_station.map(str::to_string),
    }
}

/// Store the house with a detail row and the given tags
pub fn seed(store: &InMemoryHouseStore, house: House, tags: &[&str]) {
    let id = house.id;
    store.put_house(house);
    store.put_detail(detail(id, Some("Line 10"), None));
    for tag in tags {
        store.add_tag(HouseTag::new(id, *tag));
    }
}

/// Parse Prometheus exposition format into metric name -> lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                current_metric = parts[2].to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
