use crate::catalog::{Catalog, Item, ItemId};
use std::collections::{BTreeMap, HashMap, HashSet};

pub type TermId = u32;

/// Sparse term -> weight map. Terms missing from the map weigh 0.
///
/// Ordered so that every sum over a vector runs in the same order on every build.
pub type TermWeights = BTreeMap<String, f64>;

/// Unique non-empty keywords of a catalog in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    dictionary: HashMap<String, TermId>,
}

impl Vocabulary {
    /// Walk categories, then items, then keywords, keeping the first occurrence of each term.
    pub fn build(catalog: &Catalog) -> Self {
        let mut vocabulary = Self::default();
        for item in catalog.items() {
            for keyword in &item.keywords {
                if keyword.is_empty() || vocabulary.dictionary.contains_key(keyword) {
                    continue;
                }
                let id = vocabulary.terms.len() as TermId;
                vocabulary.dictionary.insert(keyword.clone(), id);
                vocabulary.terms.push(keyword.clone());
            }
        }
        vocabulary
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Term frequency of every vocabulary term in the item's keywords.
///
/// The denominator is the full keyword length, empty tokens included. An item
/// without keywords gets 0 for every term.
pub fn term_frequencies(item: &Item, vocabulary: &Vocabulary) -> TermWeights {
    let len = item.keywords.len();
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for keyword in &item.keywords {
        *counts.entry(keyword.as_str()).or_insert(0) += 1;
    }
    vocabulary
        .terms()
        .iter()
        .map(|term| {
            let count = counts.get(term.as_str()).copied().unwrap_or(0);
            let tf = if len == 0 { 0.0 } else { count as f64 / len as f64 };
            (term.clone(), tf)
        })
        .collect()
}

/// `log10(N / (1 + df))` per vocabulary term, where N is the catalog's item count
/// and df the number of items containing the term at least once.
///
/// Terms present in most items get a negative weight; it is kept as is.
pub fn inverse_document_frequencies(catalog: &Catalog, vocabulary: &Vocabulary) -> TermWeights {
    let total = catalog.item_count() as f64;
    let mut df: Vec<u32> = vec![0; vocabulary.len()];
    for item in catalog.items() {
        let seen: HashSet<&str> = item.keywords.iter().map(String::as_str).collect();
        for keyword in seen {
            if let Some(id) = vocabulary.term_id(keyword) {
                df[id as usize] += 1;
            }
        }
    }
    vocabulary
        .terms()
        .iter()
        .zip(df)
        .map(|(term, df_t)| (term.clone(), (total / (1.0 + df_t as f64)).log10()))
        .collect()
}

/// Elementwise product of a TF vector with the IDF vector.
pub fn tf_idf(tf: &TermWeights, idf: &TermWeights) -> TermWeights {
    tf.iter()
        .map(|(term, tf_t)| (term.clone(), tf_t * idf.get(term).copied().unwrap_or(0.0)))
        .collect()
}

/// Vocabulary, IDF and per-item TF-IDF vectors of one catalog build.
#[derive(Debug, Clone, Default)]
pub struct TfIdfIndex {
    vocabulary: Vocabulary,
    idf: TermWeights,
    vectors: HashMap<ItemId, TermWeights>,
}

impl TfIdfIndex {
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &TermWeights {
        &self.idf
    }

    pub fn vector(&self, id: ItemId) -> Option<&TermWeights> {
        self.vectors.get(&id)
    }

    pub fn vectors(&self) -> &HashMap<ItemId, TermWeights> {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Build the TF-IDF index of a catalog whose keywords are already derived.
///
/// Vectors are keyed by item id. If ids repeat, the later item's vector wins.
pub fn build_index(catalog: &Catalog) -> TfIdfIndex {
    let vocabulary = Vocabulary::build(catalog);
    let idf = inverse_document_frequencies(catalog, &vocabulary);

    let mut vectors: HashMap<ItemId, TermWeights> = HashMap::with_capacity(catalog.item_count());
    for item in catalog.items() {
        let tf = term_frequencies(item, &vocabulary);
        if vectors.insert(item.id, tf_idf(&tf, &idf)).is_some() {
            tracing::warn!(item_id = item.id, "duplicate item id in catalog");
        }
    }

    tracing::debug!(num_items = vectors.len(), num_terms = vocabulary.len(), "built tf-idf index");
    TfIdfIndex { vocabulary, idf, vectors }
}
