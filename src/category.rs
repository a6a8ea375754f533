use std::collections::HashMap;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tokio::time::sleep;
use tracing::info;

use crate::{
    data::CategoryRecord,
    rakuten::{CategoryType, GatewayError, RakutenClient},
};

/// Medium and small category tables, immutable once loaded.
#[derive(Debug)]
pub struct CategoryStore {
    medium: HashMap<String, CategoryRecord>,
    small: HashMap<String, CategoryRecord>,
    small_ids: Vec<String>,
}

impl CategoryStore {
    /// Build the store and shuffle the small category ids with `rng`.
    pub fn new<R: Rng + ?Sized>(
        medium: HashMap<String, CategoryRecord>,
        small: HashMap<String, CategoryRecord>,
        rng: &mut R,
    ) -> Self {
        let mut small_ids: Vec<String> = small.keys().cloned().collect();
        // hash order is not stable, sort so a seeded rng gives a stable order
        small_ids.sort();
        small_ids.shuffle(rng);

        Self {
            medium,
            small,
            small_ids,
        }
    }

    pub fn small_ids(&self) -> &[String] {
        &self.small_ids
    }

    pub fn medium_count(&self) -> usize {
        self.medium.len()
    }

    pub fn small_count(&self) -> usize {
        self.small.len()
    }

    /// Resolve a small category id into the `large-medium-small` path expected by
    /// the ranking endpoint. Returns `None` when any link of the parent chain is
    /// missing.
    pub fn resolve_full_path(&self, small_id: &str) -> Option<String> {
        let small = self.small.get(small_id)?;
        let medium = self.medium.get(&small.parent_id)?;
        if medium.parent_id.is_empty() {
            return None;
        }

        Some(format!("{}-{}-{}", medium.parent_id, medium.id, small.id))
    }
}

/// Load the medium and small tables, pausing between calls to stay under the
/// upstream rate limit. Any failure fails the whole load.
pub async fn load_all(client: &RakutenClient) -> Result<CategoryStore, GatewayError> {
    let medium = client.fetch_category_type(CategoryType::Medium).await?;
    sleep(client.request_interval()).await;

    let small = client.fetch_category_type(CategoryType::Small).await?;
    sleep(client.request_interval()).await;

    info!(
        "Medium: {}, Small: {} categories loaded",
        medium.len(),
        small.len()
    );
    Ok(CategoryStore::new(medium, small, &mut StdRng::from_entropy()))
}
