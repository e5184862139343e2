use crate::catalog::{Catalog, Item, ItemId, UserContext};
use crate::config::RecommenderConfig;
use crate::error::{RecoError, Result};
use crate::history::InteractionHistory;
use crate::index::{TermWeights, TfIdfIndex};
use crate::similarity::cosine_similarity;
use serde::Serialize;
use std::collections::HashSet;

/// Strategy slot for recommendations drawn from other users' behaviour.
pub trait CollaborativeFilter: Send + Sync {
    fn recommend(&self, user: &UserContext, history: &InteractionHistory, catalog: &Catalog) -> Vec<ItemId>;
}

/// Collaborative filtering without any multi-user signal: never suggests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCollaborative;

impl CollaborativeFilter for NoCollaborative {
    fn recommend(&self, _user: &UserContext, _history: &InteractionHistory, _catalog: &Catalog) -> Vec<ItemId> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem<'a> {
    pub item: &'a Item,
    /// Mean cosine similarity against the viewed items.
    pub score: f64,
}

pub struct Recommender<C = NoCollaborative> {
    config: RecommenderConfig,
    collaborative: C,
}

impl Default for Recommender<NoCollaborative> {
    fn default() -> Self {
        Self::new(RecommenderConfig::default())
    }
}

impl Recommender<NoCollaborative> {
    pub fn new(config: RecommenderConfig) -> Self {
        Self { config, collaborative: NoCollaborative }
    }
}

impl<C: CollaborativeFilter> Recommender<C> {
    pub fn with_collaborative(config: RecommenderConfig, collaborative: C) -> Self {
        Self { config, collaborative }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Recommend up to `top_k` items for the user.
    ///
    /// Anonymous callers get nothing. Collaborative results, when there are
    /// any, are returned as they come; otherwise items are ranked by
    /// content similarity to the user's viewed items.
    pub fn recommend<'a>(
        &self,
        user: Option<&UserContext>,
        history: &InteractionHistory,
        index: &TfIdfIndex,
        catalog: &'a Catalog,
    ) -> Result<Vec<&'a Item>> {
        let Some(user) = user else {
            return Ok(Vec::new());
        };
        let top_k = self.config.effective_top_k();

        let collaborative = self.collaborative.recommend(user, history, catalog);
        if !collaborative.is_empty() {
            let items: Vec<&Item> = collaborative.into_iter().filter_map(|id| catalog.find(id)).take(top_k).collect();
            tracing::debug!(user = %user.username, count = items.len(), "collaborative recommendations");
            return Ok(items);
        }

        let scored = self.content_based(history, index, catalog)?;
        tracing::debug!(user = %user.username, count = scored.len(), "content-based recommendations");
        Ok(scored.into_iter().map(|s| s.item).collect())
    }

    /// Rank unseen items by their mean cosine similarity to the viewed items.
    ///
    /// Viewed ids that are not in the catalog are skipped. Ties keep catalog order.
    pub fn content_based<'a>(
        &self,
        history: &InteractionHistory,
        index: &TfIdfIndex,
        catalog: &'a Catalog,
    ) -> Result<Vec<ScoredItem<'a>>> {
        if history.views.is_empty() {
            return Ok(Vec::new());
        }

        let known: HashSet<ItemId> = catalog.items().map(|item| item.id).collect();
        let mut interacted: Vec<&TermWeights> = Vec::with_capacity(history.views.len());
        for id in &history.views {
            if !known.contains(id) {
                tracing::debug!(item_id = id, "viewed item not in catalog, skipping");
                continue;
            }
            interacted.push(vector_for(index, *id)?);
        }
        if interacted.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<ScoredItem<'a>> = Vec::with_capacity(catalog.item_count());
        for item in catalog.items() {
            if history.has_viewed(item.id) {
                continue;
            }
            let vector = vector_for(index, item.id)?;
            let total: f64 = interacted.iter().map(|seen| cosine_similarity(vector, seen)).sum();
            scored.push(ScoredItem { item, score: total / interacted.len() as f64 });
        }

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.config.effective_top_k());
        Ok(scored)
    }
}

fn vector_for(index: &TfIdfIndex, id: ItemId) -> Result<&TermWeights> {
    index.vector(id).ok_or(RecoError::StaleIndex { item_id: id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::index::build_index;

    fn fixture() -> Catalog {
        Catalog::new(vec![Category::new("Fruit", vec![
            Item::new(1, "red apple", "sweet red fruit", ""),
            Item::new(2, "green apple", "tart green fruit", ""),
            Item::new(3, "banana", "yellow sweet fruit", ""),
        ])])
    }

    struct Fixed(Vec<ItemId>);

    impl CollaborativeFilter for Fixed {
        fn recommend(&self, _: &UserContext, _: &InteractionHistory, _: &Catalog) -> Vec<ItemId> {
            self.0.clone()
        }
    }

    #[test]
    fn anonymous_user_gets_nothing() {
        let catalog = fixture();
        let index = build_index(&catalog);
        let history = InteractionHistory::with_views([1]);
        let out = Recommender::default().recommend(None, &history, &index, &catalog).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn ranks_by_shared_terms() {
        let catalog = fixture();
        let index = build_index(&catalog);
        let user = UserContext::new("alice");
        let history = InteractionHistory::with_views([1]);
        let out = Recommender::default().recommend(Some(&user), &history, &index, &catalog).unwrap();
        let ids: Vec<ItemId> = out.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn collaborative_results_win_verbatim() {
        let catalog = fixture();
        let index = build_index(&catalog);
        let user = UserContext::new("alice");
        let history = InteractionHistory::with_views([1]);
        let recommender = Recommender::with_collaborative(RecommenderConfig::default(), Fixed(vec![1, 99, 2]));
        let out = recommender.recommend(Some(&user), &history, &index, &catalog).unwrap();
        let ids: Vec<ItemId> = out.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn unknown_views_are_skipped() {
        let catalog = fixture();
        let index = build_index(&catalog);
        let recommender = Recommender::default();

        let only_unknown = InteractionHistory::with_views([404]);
        assert!(recommender.content_based(&only_unknown, &index, &catalog).unwrap().is_empty());

        let mixed = InteractionHistory::with_views([404, 1]);
        let plain = InteractionHistory::with_views([1]);
        let a = recommender.content_based(&mixed, &index, &catalog).unwrap();
        let b = recommender.content_based(&plain, &index, &catalog).unwrap();
        let scores_a: Vec<f64> = a.iter().map(|s| s.score).collect();
        let scores_b: Vec<f64> = b.iter().map(|s| s.score).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn stale_index_is_rejected() {
        let catalog = fixture();
        let index = build_index(&Catalog::new(vec![Category::new("Fruit", vec![
            Item::new(1, "red apple", "sweet red fruit", ""),
        ])]));
        let history = InteractionHistory::with_views([1]);
        let err = Recommender::default().content_based(&history, &index, &catalog).unwrap_err();
        assert!(matches!(err, RecoError::StaleIndex { item_id: 2 }));
    }

    #[test]
    fn duplicate_ids_rank_together_with_the_later_vector() {
        let catalog = Catalog::new(vec![Category::new("Fruit", vec![
            Item::new(1, "red apple", "sweet red fruit", ""),
            Item::new(2, "green apple", "tart green fruit", ""),
            Item::new(1, "banana", "yellow sweet fruit", ""),
        ])]);
        let index = build_index(&catalog);
        let recommender = Recommender::default();

        let scored = recommender.content_based(&InteractionHistory::with_views([2]), &index, &catalog).unwrap();
        let names: Vec<&str> = scored.iter().map(|s| s.item.name.as_str()).collect();
        assert_eq!(names, vec!["red apple", "banana"]);
        assert_eq!(scored[0].score, scored[1].score);

        let scored = recommender.content_based(&InteractionHistory::with_views([1]), &index, &catalog).unwrap();
        let ids: Vec<ItemId> = scored.iter().map(|s| s.item.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = Catalog::new(vec![Category::new("Misc", vec![
            Item::new(10, "alpha", "", ""),
            Item::new(11, "beta", "", ""),
            Item::new(12, "gamma", "", ""),
            Item::new(13, "delta", "", ""),
        ])]);
        let index = build_index(&catalog);
        let history = InteractionHistory::with_views([10]);
        let out = Recommender::default().content_based(&history, &index, &catalog).unwrap();
        let ids: Vec<ItemId> = out.iter().map(|s| s.item.id).collect();
        assert_eq!(ids, vec![11, 12, 13]);
    }
}
