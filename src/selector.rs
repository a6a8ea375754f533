use std::sync::{Mutex, PoisonError};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{info, warn};

use crate::{
    category::CategoryStore,
    data::RecipeRecord,
    rakuten::{GatewayError, RakutenClient},
};

#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("category data is not loaded")]
    NotReady,
    #[error("fail to build the full category path of small category {0}")]
    PathResolution(String),
    #[error("category {0} has no ranked recipes")]
    EmptyCategory(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Picks a random small category, then a random recipe out of its ranking.
pub struct DishSelector {
    gateway: RakutenClient,
    rng: Mutex<StdRng>,
}

impl DishSelector {
    pub fn new(gateway: RakutenClient) -> Self {
        Self::with_rng(gateway, StdRng::from_entropy())
    }

    pub fn with_rng(gateway: RakutenClient, rng: StdRng) -> Self {
        Self {
            gateway,
            rng: Mutex::new(rng),
        }
    }

    /// `store` is `None` until the category load has succeeded.
    pub async fn pick_random_dish(
        &self,
        store: Option<&CategoryStore>,
    ) -> Result<RecipeRecord, SelectorError> {
        let store = store.ok_or(SelectorError::NotReady)?;

        // the guard must be gone before the ranking request is awaited
        let small_id = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            store
                .small_ids()
                .choose(&mut *rng)
                .cloned()
                .ok_or(SelectorError::NotReady)?
        };

        let Some(full_path) = store.resolve_full_path(&small_id) else {
            warn!("fail to build full category path for small category {small_id}");
            return Err(SelectorError::PathResolution(small_id));
        };

        let recipes = self.gateway.fetch_ranking(&full_path).await?;
        let recipe = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            recipes.choose(&mut *rng).cloned()
        };

        match recipe {
            Some(recipe) => {
                info!(
                    "picked dish: {} (category: {full_path}, image: {}, url: {})",
                    recipe.title, recipe.image_url, recipe.url
                );
                Ok(recipe)
            }
            None => {
                warn!("no recipes in the ranking of category {full_path}");
                Err(SelectorError::EmptyCategory(full_path))
            }
        }
    }
}
