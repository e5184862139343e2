use crate::tokenizer::extract_keywords;
use serde::{Deserialize, Serialize};

pub type ItemId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// Name of the owning category, filled in when the catalog is assembled.
    #[serde(default, skip_deserializing)]
    pub category: String,
    /// Normalized tokens of name + description + category, derived on load.
    #[serde(skip)]
    pub keywords: Vec<String>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, description: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            image: image.into(),
            category: String::new(),
            keywords: Vec::new(),
        }
    }

    /// Case-insensitive substring match on name or description. `query` must already be lowercase.
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query) || self.description.to_lowercase().contains(query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(rename = "products", default)]
    pub items: Vec<Item>,
}

impl Category {
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        Self { name: name.into(), items }
    }
}

/// Ordered categories. The concatenation of each category's items is the
/// catalog order used for ranking tie-breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCatalog")]
pub struct Catalog {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    categories: Vec<Category>,
}

impl From<RawCatalog> for Catalog {
    fn from(raw: RawCatalog) -> Self {
        Catalog::new(raw.categories)
    }
}

impl Catalog {
    /// Assemble a catalog, stamping each item with its category and deriving its keywords.
    pub fn new(mut categories: Vec<Category>) -> Self {
        for category in categories.iter_mut() {
            for item in category.items.iter_mut() {
                item.category = category.name.clone();
                item.keywords = extract_keywords(&item.name, &item.description, &category.name);
            }
        }
        Self { categories }
    }

    /// Concatenate several catalogs, preserving their order.
    pub fn merge(catalogs: impl IntoIterator<Item = Catalog>) -> Self {
        let categories = catalogs.into_iter().flat_map(|c| c.categories).collect();
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Items in catalog order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items().find(|item| item.id == id)
    }

    /// Items whose name or description contains `query`, ignoring case and
    /// surrounding whitespace. An empty query matches nothing.
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&Item> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        match category {
            Some(name) => self
                .category(name)
                .map(|c| c.items.iter().filter(|item| item.matches(&query)).collect())
                .unwrap_or_default(),
            None => self.items().filter(|item| item.matches(&query)).collect(),
        }
    }
}

/// An authenticated user. Only its presence matters to the recommender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub username: String,
}

impl UserContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }
}
