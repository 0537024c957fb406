use crate::error::Result;
use crate::models::{House, HouseDetail, HouseTag};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Read access to the relational listing store
#[async_trait]
pub trait HouseStore: Send + Sync {
    /// Get a house by ID
    async fn get_house(&self, house_id: u64) -> Result<Option<House>>;

    /// Get the detail row belonging to a house
    async fn get_detail_by_house_id(&self, house_id: u64) -> Result<Option<HouseDetail>>;

    /// Get every tag of a house, in insertion order
    async fn get_tags_by_house_id(&self, house_id: u64) -> Result<Vec<HouseTag>>;
}

/// In-memory house store (for development and testing)
#[derive(Clone, Default)]
pub struct InMemoryHouseStore {
    houses: Arc<DashMap<u64, House>>,
    details: Arc<DashMap<u64, HouseDetail>>,
    tags: Arc<DashMap<u64, Vec<HouseTag>>>,
}

impl InMemoryHouseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a house
    pub fn put_house(&self, house: House) {
        tracing::debug!(house_id = house.id, "House stored");
        self.houses.insert(house.id, house);
    }

    /// Insert or replace the detail of a house
    pub fn put_detail(&self, detail: HouseDetail) {
        self.details.insert(detail.house_id, detail);
    }

    /// Append a tag to a house
    pub fn add_tag(&self, tag: HouseTag) {
        self.tags.entry(tag.house_id).or_default().push(tag);
    }

    /// Remove a house together with its detail and tags
    pub fn remove_house(&self, house_id: u64) -> Option<House> {
        self.details.remove(&house_id);
        self.tags.remove(&house_id);
        self.houses.remove(&house_id).map(|(_, house)| house)
    }
}

#[async_trait]
impl HouseStore for InMemoryHouseStore {
    async fn get_house(&self, house_id: u64) -> Result<Option<House>> {
        Ok(self.houses.get(&house_id).map(|entry| entry.clone()))
    }

    async fn get_detail_by_house_id(&self, house_id: u64) -> Result<Option<HouseDetail>> {
        Ok(self.details.get(&house_id).map(|entry| entry.clone()))
    }

    async fn get_tags_by_house_id(&self, house_id: u64) -> Result<Vec<HouseTag>> {
        Ok(self
            .tags
            .get(&house_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }
}
