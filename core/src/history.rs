use crate::catalog::{ItemId, UserContext};
use crate::error::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Interaction {
    View(ItemId),
    Buy(ItemId),
    Search(String),
}

/// Per-user interaction log, append-only within a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionHistory {
    pub views: Vec<ItemId>,
    pub buys: Vec<ItemId>,
    pub searches: Vec<String>,
}

impl InteractionHistory {
    pub fn with_views(views: impl IntoIterator<Item = ItemId>) -> Self {
        Self { views: views.into_iter().collect(), ..Self::default() }
    }

    pub fn record(&mut self, interaction: Interaction) {
        match interaction {
            Interaction::View(id) => self.views.push(id),
            Interaction::Buy(id) => self.buys.push(id),
            Interaction::Search(query) => self.searches.push(query),
        }
    }

    pub fn has_viewed(&self, id: ItemId) -> bool {
        self.views.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty() && self.buys.is_empty() && self.searches.is_empty()
    }
}

/// Everything kept about one user between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub history: InteractionHistory,
    /// Purchased item ids, deduplicated, in first-purchase order.
    pub purchased: Vec<ItemId>,
}

impl UserRecord {
    pub fn add_purchase(&mut self, id: ItemId) {
        if !self.purchased.contains(&id) {
            self.purchased.push(id);
        }
    }
}

/// Storage of interaction histories. The recommender only reads from it;
/// the application writes on view, buy and search events.
///
/// `update` must apply its mutation atomically per user. It may call `f` more
/// than once if the backend retries.
pub trait InteractionStore: Send + Sync {
    fn load(&self, user: &UserContext) -> Result<UserRecord>;

    fn update(&self, user: &UserContext, f: &mut dyn FnMut(&mut UserRecord)) -> Result<()>;

    fn clear(&self, user: &UserContext) -> Result<()>;

    fn history(&self, user: &UserContext) -> Result<InteractionHistory> {
        Ok(self.load(user)?.history)
    }

    fn purchased(&self, user: &UserContext) -> Result<Vec<ItemId>> {
        Ok(self.load(user)?.purchased)
    }

    fn record(&self, user: &UserContext, interaction: Interaction) -> Result<()> {
        self.update(user, &mut |record| record.history.record(interaction.clone()))
    }

    fn add_purchase(&self, user: &UserContext, id: ItemId) -> Result<()> {
        self.update(user, &mut |record| record.add_purchase(id))
    }

    /// Log a buy and add it to the purchases in one update.
    fn record_purchase(&self, user: &UserContext, id: ItemId) -> Result<()> {
        self.update(user, &mut |record| {
            record.history.record(Interaction::Buy(id));
            record.add_purchase(id);
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractionStore for MemoryStore {
    fn load(&self, user: &UserContext) -> Result<UserRecord> {
        Ok(self.users.read().get(&user.username).cloned().unwrap_or_default())
    }

    fn update(&self, user: &UserContext, f: &mut dyn FnMut(&mut UserRecord)) -> Result<()> {
        let mut users = self.users.write();
        f(users.entry(user.username.clone()).or_default());
        Ok(())
    }

    fn clear(&self, user: &UserContext) -> Result<()> {
        self.users.write().remove(&user.username);
        Ok(())
    }
}
