//! End-to-end tests for the asynchronous indexing pipeline

mod common;

use common::{detail, house, seed};
use house_search::indexing::{
    ConsumeOutcome, HouseIndexWriter, IndexEventConsumer, IndexEventProducer, IndexingError,
    ProcessingStage, ProjectionMapper,
};
use house_search::messaging::{InMemoryBroker, MessagingConfig, MessagingService};
use house_search::models::{HouseTag, SearchRequest};
use house_search::search::{
    SearchConfig, SearchIndex, SearchService, SimpleTokenizer, SuggestionBuilder,
    TantivySearchIndex,
};
use house_search::state::InMemoryHouseStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct Pipeline {
    store: Arc<InMemoryHouseStore>,
    index: Arc<TantivySearchIndex>,
    consumer: IndexEventConsumer,
}

fn pipeline() -> Pipeline {
    let store = Arc::new(InMemoryHouseStore::new());
    let index = Arc::new(TantivySearchIndex::in_memory().unwrap());
    let consumer = IndexEventConsumer::new(
        ProjectionMapper::new(store.clone()),
        SuggestionBuilder::new(),
        HouseIndexWriter::new(index.clone()),
    );
    Pipeline {
        store,
        index,
        consumer,
    }
}

fn index_payload(id: u64) -> String {
    format!(r#"{{"id":{},"operation":"INDEX","attempt":0}}"#, id)
}

fn delete_payload(id: u64) -> String {
    format!(r#"{{"id":{},"operation":"DELETE","attempt":0}}"#, id)
}

#[tokio::test]
async fn test_index_command_builds_full_document() {
    let p = pipeline();
    p.store.put_house(house(42, "Sunrise Tower", "Downtown"));
    p.store.put_detail(detail(42, Some("Line 1"), None));
    p.store.add_tag(HouseTag::new(42, "metro"));
    p.store.add_tag(HouseTag::new(42, "new"));

    let outcome = p.consumer.handle_payload(&index_payload(42)).await;
    assert_eq!(outcome, ConsumeOutcome::Indexed(42));

    let doc = p.index.get_document(42).await.unwrap().unwrap();
    assert_eq!(doc.title, "Sunrise Tower");
    assert_eq!(doc.district, "Downtown");
    assert_eq!(doc.subway_line_name, "Line 1");
    assert_eq!(doc.subway_station_name, "");
    assert_eq!(doc.tags, vec!["metro".to_string(), "new".to_string()]);

    let suggests: Vec<(&str, u32)> = doc
        .suggests
        .iter()
        .map(|s| (s.input.as_str(), s.weight))
        .collect();
    assert_eq!(
        suggests,
        vec![
            ("Sunrise Tower", 30),
            ("Downtown", 20),
            ("Line 1", 15),
            ("", 15)
        ]
    );

    let service = SearchService::new(p.index.clone(), SearchConfig::default());
    let found = service
        .search(&SearchRequest::new("bj", "sunrise"))
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.results, vec![42]);

    let completions = service.suggest("Sun").await.unwrap();
    assert_eq!(completions.results, vec!["Sunrise Tower".to_string()]);
}

#[tokio::test]
async fn test_house_without_transit_or_tags() {
    let store = Arc::new(InMemoryHouseStore::new());
    let index = Arc::new(TantivySearchIndex::in_memory().unwrap());
    let consumer = IndexEventConsumer::new(
        ProjectionMapper::new(store.clone()),
        SuggestionBuilder::from_config(&SearchConfig::default()),
        HouseIndexWriter::new(index.clone()),
    );
    store.put_house(house(42, "Sunrise Tower", "Downtown"));
    store.put_detail(detail(42, None, None));

    assert_eq!(
        consumer.handle_payload(&index_payload(42)).await,
        ConsumeOutcome::Indexed(42)
    );

    let doc = index.get_document(42).await.unwrap().unwrap();
    assert!(doc.tags.is_empty());
    assert_eq!(doc.subway_line_name, "");
    assert_eq!(doc.subway_station_name, "");

    let suggests: Vec<(&str, u32)> = doc
        .suggests
        .iter()
        .map(|s| (s.input.as_str(), s.weight))
        .collect();
    assert_eq!(
        suggests,
        vec![
            ("Sunrise Tower", 30),
            ("Downtown", 20),
            ("", 15),
            ("", 15)
        ]
    );
}

#[tokio::test]
async fn test_reindex_replaces_document() {
    let p = pipeline();
    seed(&p.store, house(7, "Maple Court", "Haidian"), &["quiet"]);

    assert_eq!(
        p.consumer.handle_payload(&index_payload(7)).await,
        ConsumeOutcome::Indexed(7)
    );
    assert_eq!(
        p.consumer.handle_payload(&index_payload(7)).await,
        ConsumeOutcome::Indexed(7)
    );
    assert_eq!(p.index.document_count().await.unwrap(), 1);

    let mut updated = house(7, "Maple Court Renovated", "Haidian");
    updated.price = 4500;
    p.store.put_house(updated);

    p.consumer.handle_payload(&index_payload(7)).await;

    let doc = p.index.get_document(7).await.unwrap().unwrap();
    assert_eq!(doc.price, 4500);
    assert_eq!(doc.title, "Maple Court Renovated");
    assert_eq!(doc.tags, vec!["quiet".to_string()]);
    assert_eq!(p.index.document_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_twice_reports_missing_document() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut p = pipeline();
    p.consumer = p.consumer.with_failure_channel(tx);
    seed(&p.store, house(3, "Pine House", "Chaoyang"), &[]);

    p.consumer.handle_payload(&index_payload(3)).await;
    assert_eq!(
        p.consumer.handle_payload(&delete_payload(3)).await,
        ConsumeOutcome::Deleted(3)
    );
    assert!(p.index.get_document(3).await.unwrap().is_none());

    let second = p.consumer.handle_payload(&delete_payload(3)).await;
    assert_eq!(
        second,
        ConsumeOutcome::Failed {
            house_id: 3,
            stage: ProcessingStage::WriteFailed,
            error: IndexingError::DocumentNotFound(3),
        }
    );

    let failure = rx.recv().await.unwrap();
    assert_eq!(failure.error, IndexingError::DocumentNotFound(3));

    // Consumer keeps working after a failure
    seed(&p.store, house(4, "Cedar Flat", "Chaoyang"), &[]);
    assert_eq!(
        p.consumer.handle_payload(&index_payload(4)).await,
        ConsumeOutcome::Indexed(4)
    );
}

#[tokio::test]
async fn test_missing_entities_never_produce_documents() {
    let p = pipeline();

    let outcome = p.consumer.handle_payload(&index_payload(500)).await;
    assert!(matches!(
        outcome,
        ConsumeOutcome::Failed {
            stage: ProcessingStage::MapFailed,
            error: IndexingError::EntityNotFound(500),
            ..
        }
    ));

    // House without detail row
    p.store.put_house(house(501, "Lonely Loft", "Xicheng"));
    let outcome = p.consumer.handle_payload(&index_payload(501)).await;
    assert!(matches!(
        outcome,
        ConsumeOutcome::Failed {
            error: IndexingError::DetailNotFound(501),
            ..
        }
    ));

    assert_eq!(p.index.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_and_unknown_commands() {
    let p = pipeline();
    seed(&p.store, house(8, "Birch Place", "Dongcheng"), &[]);

    for payload in ["", "INDEX 8", r#"{"id":"eight","operation":"INDEX"}"#] {
        assert_eq!(p.consumer.handle_payload(payload).await, ConsumeOutcome::Dropped);
    }

    assert_eq!(
        p.consumer
            .handle_payload(r#"{"id":8,"operation":"REINDEX","attempt":0}"#)
            .await,
        ConsumeOutcome::Rejected(8)
    );
    assert_eq!(p.index.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_tokenizer_appends_descriptive_terms() {
    let store = Arc::new(InMemoryHouseStore::new());
    let index = Arc::new(TantivySearchIndex::in_memory().unwrap());
    let consumer = IndexEventConsumer::new(
        ProjectionMapper::new(store.clone()),
        SuggestionBuilder::with_tokenizer(Arc::new(SimpleTokenizer)),
        HouseIndexWriter::new(index.clone()),
    );
    seed(&store, house(12, "Garden Villa 88", "Shunyi"), &[]);

    consumer.handle_payload(&index_payload(12)).await;

    let doc = index.get_document(12).await.unwrap().unwrap();
    let extra: Vec<&str> = doc.suggests[4..].iter().map(|s| s.input.as_str()).collect();
    assert!(extra.contains(&"garden"));
    assert!(extra.contains(&"supermarket"));
    assert!(!extra.contains(&"88"));
    assert!(doc.suggests[4..].iter().all(|s| s.weight == 10));
}

#[tokio::test]
async fn test_commands_flow_through_messaging() {
    let p = pipeline();
    seed(&p.store, house(42, "Sunrise Tower", "Downtown"), &["metro"]);

    let broker = Arc::new(InMemoryBroker::default());
    let messaging = Arc::new(MessagingService::with_transport(
        MessagingConfig::default(),
        broker.clone(),
        broker,
    ));

    let handle = messaging
        .subscribe("house-index", Arc::new(p.consumer))
        .await
        .unwrap();
    let producer = IndexEventProducer::new(messaging.clone(), "house-index");

    producer.request_index(42).await.unwrap();
    wait_for_document(&p.index, 42, true).await;

    producer.request_delete(42).await.unwrap();
    wait_for_document(&p.index, 42, false).await;

    handle.shutdown().await;
}

async fn wait_for_document(index: &TantivySearchIndex, house_id: u64, present: bool) {
    for _ in 0..100 {
        if index.get_document(house_id).await.unwrap().is_some() == present {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("house {} never reached present={}", house_id, present);
}
