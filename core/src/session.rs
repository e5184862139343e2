//! Per-page-load recommendation context.
//!
//! A session owns the current user, the loaded catalog and the index built
//! from it. It is created when a page loads and dropped when the page goes
//! away; nothing is shared between sessions.

use crate::catalog::{Catalog, Item, UserContext};
use crate::config::RecommenderConfig;
use crate::error::{RecoError, Result};
use crate::history::InteractionHistory;
use crate::index::{build_index, TfIdfIndex};
use crate::recommend::{CollaborativeFilter, NoCollaborative, Recommender};

struct Loaded {
    catalog: Catalog,
    index: TfIdfIndex,
}

pub struct Session<C = NoCollaborative> {
    user: Option<UserContext>,
    loaded: Option<Loaded>,
    recommender: Recommender<C>,
}

impl Session<NoCollaborative> {
    pub fn new(user: Option<UserContext>, config: RecommenderConfig) -> Self {
        Self::with_recommender(user, Recommender::new(config))
    }
}

impl<C: CollaborativeFilter> Session<C> {
    pub fn with_recommender(user: Option<UserContext>, recommender: Recommender<C>) -> Self {
        Self { user, loaded: None, recommender }
    }

    /// Replace the catalog and rebuild the whole index from it.
    pub fn load_catalog(&mut self, catalog: Catalog) -> &TfIdfIndex {
        let index = build_index(&catalog);
        tracing::debug!(num_items = catalog.item_count(), "session catalog loaded");
        &self.loaded.insert(Loaded { catalog, index }).index
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn user(&self) -> Option<&UserContext> {
        self.user.as_ref()
    }

    pub fn catalog(&self) -> Result<&Catalog> {
        self.loaded().map(|l| &l.catalog)
    }

    pub fn index(&self) -> Result<&TfIdfIndex> {
        self.loaded().map(|l| &l.index)
    }

    /// Recommendations for the session's user. Fails if no catalog was loaded.
    pub fn recommend(&self, history: &InteractionHistory) -> Result<Vec<&Item>> {
        let loaded = self.loaded()?;
        self.recommender.recommend(self.user.as_ref(), history, &loaded.index, &loaded.catalog)
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(RecoError::CatalogNotLoaded)
    }
}
