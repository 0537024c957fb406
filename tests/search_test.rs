//! Search and autocomplete against a real Tantivy index

mod common;

use common::{detail, house};
use house_search::models::{House, HouseTag, SearchRequest};
use house_search::search::{
    HouseDocument, SearchConfig, SearchConfigBuilder, SearchIndex, SearchService,
    SuggestionBuilder, TantivySearchIndex,
};
use std::sync::Arc;
use tempfile::TempDir;

async fn index_houses(index: &TantivySearchIndex, houses: Vec<House>) {
    let suggester = SuggestionBuilder::new();
    for house in houses {
        let mut doc = HouseDocument::from_parts(
            &house,
            &detail(house.id, Some("Line 10"), Some("Zhichunlu")),
            &[HouseTag::new(house.id, "quiet")],
        );
        suggester.apply(&mut doc);
        index.upsert_document(&doc).await.unwrap();
    }
}

/// Three towers in bj/hd with distinct area, price and rent-way
async fn tower_service() -> SearchService {
    let index = Arc::new(TantivySearchIndex::in_memory().unwrap());

    let mut small = house(1, "Sunrise Tower A", "Downtown");
    small.area = 40;
    small.price = 2500;
    small.rent_way = 0;
    small.direction = 2;

    let mut medium = house(2, "Sunrise Tower B", "Downtown");
    medium.area = 60;
    medium.price = 3500;

    let mut large = house(3, "Sunrise Tower C", "Riverside");
    large.area = 90;
    large.price = 6000;
    large.region_en_name = "cy".to_string();

    index_houses(&index, vec![small, medium, large]).await;
    SearchService::new(index, SearchConfig::default())
}

fn tower_request() -> SearchRequest {
    SearchRequest::new("bj", "tower")
}

#[tokio::test]
async fn test_zero_area_bounds_do_not_filter() {
    let service = tower_service().await;

    let mut request = tower_request();
    request.area_min = Some(0);
    request.area_max = Some(0);
    assert_eq!(service.search(&request).await.unwrap().total, 3);

    request.area_min = Some(50);
    let result = service.search(&request).await.unwrap();
    assert_eq!(result.total, 2);
    assert!(!result.results.contains(&1));
}

#[tokio::test]
async fn test_price_bounds() {
    let service = tower_service().await;

    let mut request = tower_request();
    request.price_min = Some(0);
    request.price_max = Some(4000);
    let result = service.search(&request).await.unwrap();
    assert_eq!(result.total, 2);
    assert!(!result.results.contains(&3));

    request.price_min = Some(3000);
    request.price_max = None;
    assert_eq!(service.search(&request).await.unwrap().total, 2);
}

#[tokio::test]
async fn test_rent_way_zero_and_direction() {
    let service = tower_service().await;

    let mut request = tower_request();
    request.rent_way = Some(0);
    assert_eq!(service.search(&request).await.unwrap().results, vec![1]);

    request.rent_way = Some(-1);
    request.direction = Some(2);
    assert_eq!(service.search(&request).await.unwrap().results, vec![1]);

    request.direction = Some(0);
    assert_eq!(service.search(&request).await.unwrap().total, 3);
}

#[tokio::test]
async fn test_city_and_region_filters() {
    let service = tower_service().await;

    let mut request = tower_request();
    request.region_en_name = Some("cy".to_string());
    assert_eq!(service.search(&request).await.unwrap().results, vec![3]);

    request.region_en_name = Some("   ".to_string());
    assert_eq!(service.search(&request).await.unwrap().total, 3);

    let elsewhere = SearchRequest::new("sh", "tower");
    assert_eq!(service.search(&elsewhere).await.unwrap().total, 0);
}

#[tokio::test]
async fn test_sorting_and_pagination() {
    let service = tower_service().await;

    let mut request = tower_request();
    request.order_by = Some("price".to_string());
    request.sort_direction = Some("ASC".to_string());
    assert_eq!(service.search(&request).await.unwrap().results, vec![1, 2, 3]);

    request.sort_direction = Some("sideways".to_string());
    assert_eq!(service.search(&request).await.unwrap().results, vec![3, 2, 1]);

    // Unknown field sorts by last update time, newest first
    request.order_by = Some("popularity".to_string());
    request.sort_direction = None;
    assert_eq!(service.search(&request).await.unwrap().results, vec![3, 2, 1]);

    request.page = 2;
    request.page_size = 2;
    let page = service.search(&request).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.results, vec![1]);
}

#[tokio::test]
async fn test_huge_page_returns_empty_page() {
    let service = tower_service().await;

    let mut request = tower_request();
    request.page = u32::MAX;
    request.page_size = 100;

    let result = service.search(&request).await.unwrap();
    assert_eq!(result.total, 3);
    assert!(result.results.is_empty());
}

#[tokio::test]
async fn test_keyword_matching() {
    let service = tower_service().await;

    // Subway station is one of the keyword fields
    let by_station = SearchRequest::new("bj", "zhichunlu");
    assert_eq!(service.search(&by_station).await.unwrap().total, 3);

    let by_district = SearchRequest::new("bj", "riverside");
    assert_eq!(service.search(&by_district).await.unwrap().results, vec![3]);

    // Description is not searched
    let by_description = SearchRequest::new("bj", "corner");
    assert_eq!(service.search(&by_description).await.unwrap().total, 0);

    let blank = SearchRequest::new("bj", "  ");
    let result = service.search(&blank).await.unwrap();
    assert_eq!(result.total, 0);
    assert!(result.results.is_empty());
}

#[tokio::test]
async fn test_suggest_dedupes_shared_titles() {
    let index = Arc::new(TantivySearchIndex::in_memory().unwrap());
    index_houses(
        &index,
        vec![
            house(1, "Sunrise Tower", "Downtown"),
            house(2, "Sunrise Tower", "Downtown"),
            house(3, "Lakeview", "Sunny Side"),
        ],
    )
    .await;
    let service = SearchService::new(index, SearchConfig::default());

    let result = service.suggest("sun").await.unwrap();
    let mut phrases = result.results.clone();
    phrases.sort();
    assert_eq!(phrases, vec!["Sunny Side".to_string(), "Sunrise Tower".to_string()]);
    assert_eq!(result.total, 2);

    let limited = service.suggest_with_size("sun", 1).await.unwrap();
    assert_eq!(limited.total, 1);

    assert!(service.suggest("zzz").await.unwrap().results.is_empty());
    assert!(service.suggest_with_size("sun", 0).await.unwrap().results.is_empty());
}

#[tokio::test]
async fn test_on_disk_index_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = SearchConfigBuilder::new()
        .index_path(temp_dir.path().to_path_buf())
        .build();

    {
        let index = TantivySearchIndex::new(&config).unwrap();
        index_houses(&index, vec![house(9, "Harbor View", "Port")]).await;
    }

    let reopened = Arc::new(TantivySearchIndex::new(&config).unwrap());
    assert_eq!(reopened.document_count().await.unwrap(), 1);

    let service = SearchService::new(reopened, config);
    let result = service
        .search(&SearchRequest::new("bj", "harbor"))
        .await
        .unwrap();
    assert_eq!(result.results, vec![9]);
}
