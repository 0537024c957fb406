use crate::error::{AppError, Result};
use crate::models::{House, HouseDetail, HouseTag};
use crate::state::HouseStore;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::Arc;

/// Persistent house store using the Sled embedded database
#[derive(Clone)]
pub struct SledHouseStore {
    db: Arc<Db>,
    houses_tree: sled::Tree,
    details_tree: sled::Tree,
    tags_tree: sled::Tree,
}

impl SledHouseStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref).map_err(|e| {
            AppError::Database(format!("Failed to open Sled database: {}", e))
        })?;

        let houses_tree = Self::open_tree(&db, "houses")?;
        let details_tree = Self::open_tree(&db, "house_details")?;
        let tags_tree = Self::open_tree(&db, "house_tags")?;

        tracing::info!("Initialized Sled house store at {:?}", path_ref);

        Ok(Self {
            db: Arc::new(db),
            houses_tree,
            details_tree,
            tags_tree,
        })
    }

    fn open_tree(db: &Db, name: &str) -> Result<sled::Tree> {
        db.open_tree(name)
            .map_err(|e| AppError::Database(format!("Failed to open {} tree: {}", name, e)))
    }

    fn key(house_id: u64) -> [u8; 8] {
        house_id.to_be_bytes()
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| AppError::Serialization(format!("Failed to encode row: {}", e)))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to decode row: {}", e)))
    }

    fn read<T: DeserializeOwned>(tree: &sled::Tree, house_id: u64) -> Result<Option<T>> {
        let bytes = tree
            .get(Self::key(house_id))
            .map_err(|e| AppError::Database(format!("Failed to read row {}: {}", house_id, e)))?;

        bytes.map(|b| Self::decode(&b)).transpose()
    }

    fn write<T: Serialize>(tree: &sled::Tree, house_id: u64, value: &T) -> Result<()> {
        let bytes = Self::encode(value)?;
        tree.insert(Self::key(house_id), bytes)
            .map_err(|e| AppError::Database(format!("Failed to write row {}: {}", house_id, e)))?;
        Ok(())
    }

    /// Insert or replace a house
    pub fn put_house(&self, house: &House) -> Result<()> {
        Self::write(&self.houses_tree, house.id, house)
    }

    /// Insert or replace the detail of a house
    pub fn put_detail(&self, detail: &HouseDetail) -> Result<()> {
        Self::write(&self.details_tree, detail.house_id, detail)
    }

    /// Append a tag to a house
    pub fn add_tag(&self, tag: &HouseTag) -> Result<()> {
        let mut failure: Option<AppError> = None;

        // Compare-and-swap loop; the closure reruns on contention
        self.tags_tree
            .update_and_fetch(Self::key(tag.house_id), |old| {
                failure = None;
                let appended = old
                    .map(Self::decode::<Vec<HouseTag>>)
                    .transpose()
                    .and_then(|tags| {
                        let mut tags = tags.unwrap_or_default();
                        tags.push(tag.clone());
                        Self::encode(&tags)
                    });

                match appended {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        failure = Some(e);
                        old.map(|b| b.to_vec())
                    }
                }
            })
            .map_err(|e| {
                AppError::Database(format!("Failed to append tag to {}: {}", tag.house_id, e))
            })?;

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Remove a house together with its detail and tags
    pub fn remove_house(&self, house_id: u64) -> Result<bool> {
        let key = Self::key(house_id);
        let map_err = |e: sled::Error| {
            AppError::Database(format!("Failed to remove house {}: {}", house_id, e))
        };

        self.details_tree.remove(key).map_err(map_err)?;
        self.tags_tree.remove(key).map_err(map_err)?;
        let removed = self.houses_tree.remove(key).map_err(map_err)?;
        Ok(removed.is_some())
    }

    /// Flush all pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| AppError::Database(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl HouseStore for SledHouseStore {
    async fn get_house(&self, house_id: u64) -> Result<Option<House>> {
        Self::read(&self.houses_tree, house_id)
    }

    async fn get_detail_by_house_id(&self, house_id: u64) -> Result<Option<HouseDetail>> {
        Self::read(&self.details_tree, house_id)
    }

    async fn get_tags_by_house_id(&self, house_id: u64) -> Result<Vec<HouseTag>> {
        Ok(Self::read(&self.tags_tree, house_id)?.unwrap_or_default())
    }
}
