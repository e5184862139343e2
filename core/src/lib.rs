pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod index;
pub mod persist;
pub mod recommend;
pub mod session;
pub mod similarity;
pub mod tokenizer;

pub use catalog::{Catalog, Category, Item, ItemId, UserContext};
pub use config::RecommenderConfig;
pub use error::{RecoError, Result};
pub use history::{Interaction, InteractionHistory, InteractionStore, MemoryStore};
pub use index::{build_index, TfIdfIndex, TermWeights, Vocabulary};
pub use recommend::{CollaborativeFilter, NoCollaborative, Recommender};
pub use session::Session;
pub use similarity::cosine_similarity;
