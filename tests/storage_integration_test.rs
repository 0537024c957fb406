mod common;

use common::{detail, house};
use house_search::{
    config::{StateBackend, StateConfig},
    indexing::{ConsumeOutcome, HouseIndexWriter, IndexEventConsumer, ProjectionMapper},
    models::HouseTag,
    search::{SearchIndex, SuggestionBuilder, TantivySearchIndex},
    state::{create_store, HouseStore, InMemoryHouseStore, SledHouseStore},
};
use std::sync::Arc;
use tempfile::TempDir;

/// Test suite that runs against any HouseStore implementation
async fn test_store_reads<S: HouseStore + 'static>(store: Arc<S>) {
    let found = store.get_house(21).await.unwrap();
    assert_eq!(found.as_ref().map(|h| h.title.as_str()), Some("Elm Residence"));

    let detail = store.get_detail_by_house_id(21).await.unwrap().unwrap();
    assert_eq!(detail.subway_station_name.as_deref(), Some("Xizhimen"));

    let tags: Vec<String> = store
        .get_tags_by_house_id(21)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(tags, vec!["balcony".to_string(), "pets".to_string()]);

    assert!(store.get_house(22).await.unwrap().is_none());
    assert!(store.get_detail_by_house_id(22).await.unwrap().is_none());
    assert!(store.get_tags_by_house_id(22).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_in_memory_store() {
    let store = Arc::new(InMemoryHouseStore::new());
    store.put_house(house(21, "Elm Residence", "Xicheng"));
    store.put_detail(detail(21, Some("Line 2"), Some("Xizhimen")));
    store.add_tag(HouseTag::new(21, "balcony"));
    store.add_tag(HouseTag::new(21, "pets"));

    test_store_reads(store).await;
}

#[tokio::test]
async fn test_sled_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SledHouseStore::new(temp_dir.path()).unwrap());
    store.put_house(&house(21, "Elm Residence", "Xicheng")).unwrap();
    store
        .put_detail(&detail(21, Some("Line 2"), Some("Xizhimen")))
        .unwrap();
    store.add_tag(&HouseTag::new(21, "balcony")).unwrap();
    store.add_tag(&HouseTag::new(21, "pets")).unwrap();
    store.flush().await.unwrap();

    test_store_reads(store).await;
}

#[tokio::test]
async fn test_sled_rows_persist_across_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = SledHouseStore::new(temp_dir.path()).unwrap();
        store.put_house(&house(5, "Oak Terrace", "Fengtai")).unwrap();
        store.flush().await.unwrap();
    }

    let store = SledHouseStore::new(temp_dir.path()).unwrap();
    let found = store.get_house(5).await.unwrap().unwrap();
    assert_eq!(found.district, "Fengtai");
}

#[tokio::test]
async fn test_factory_rejects_sled_without_path() {
    let config = StateConfig {
        backend: StateBackend::Sled,
        path: None,
    };
    assert!(create_store(&config).is_err());

    let config = StateConfig {
        backend: StateBackend::InMemory,
        path: None,
    };
    let store = create_store(&config).unwrap();
    assert!(store.get_house(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_pipeline_over_sled_store() {
    let temp_dir = TempDir::new().unwrap();
    let sled = SledHouseStore::new(temp_dir.path()).unwrap();
    sled.put_house(&house(30, "Willow Lane", "Tongzhou")).unwrap();
    sled.put_detail(&detail(30, None, None)).unwrap();

    let index = Arc::new(TantivySearchIndex::in_memory().unwrap());
    let consumer = IndexEventConsumer::new(
        ProjectionMapper::new(Arc::new(sled.clone())),
        SuggestionBuilder::new(),
        HouseIndexWriter::new(index.clone()),
    );

    let outcome = consumer
        .handle_payload(r#"{"id":30,"operation":"INDEX","attempt":0}"#)
        .await;
    assert_eq!(outcome, ConsumeOutcome::Indexed(30));

    // The store is the source of truth: removing the house and replaying INDEX fails
    assert!(sled.remove_house(30).unwrap());
    let replay = consumer
        .handle_payload(r#"{"id":30,"operation":"INDEX","attempt":1}"#)
        .await;
    assert!(matches!(replay, ConsumeOutcome::Failed { house_id: 30, .. }));

    let doc = index.get_document(30).await.unwrap().unwrap();
    assert!(doc.tags.is_empty());
}
