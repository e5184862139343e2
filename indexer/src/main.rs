use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reco_core::persist::load_catalog;
use reco_core::recommend::ScoredItem;
use reco_core::{
    build_index, cosine_similarity, Catalog, InteractionHistory, ItemId, Recommender, RecommenderConfig, TfIdfIndex,
};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "reco-indexer")]
#[command(about = "Build and query the TF-IDF index of a product catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print a summary
    Build {
        /// Catalog path (products.json file or a directory of them)
        #[arg(long)]
        catalog: String,
        /// Also print the vocabulary in build order
        #[arg(long, default_value_t = false)]
        vocabulary: bool,
    },
    /// Score one item against every other item
    Similar {
        #[arg(long)]
        catalog: String,
        /// Item id to compare against
        #[arg(long)]
        item: ItemId,
    },
    /// Content-based recommendations for an ad-hoc view history
    Recommend {
        #[arg(long)]
        catalog: String,
        /// Viewed item ids, comma separated
        #[arg(long, value_delimiter = ',')]
        views: Vec<ItemId>,
        /// Number of recommendations (1-10)
        #[arg(long, default_value_t = 10)]
        top_k: usize,
    },
}

#[derive(Serialize)]
struct BuildSummary<'a> {
    num_items: usize,
    num_terms: usize,
    built_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    vocabulary: Option<&'a [String]>,
}

#[derive(Serialize)]
struct Scored<'a> {
    id: ItemId,
    name: &'a str,
    category: &'a str,
    score: f64,
}

impl<'a> From<ScoredItem<'a>> for Scored<'a> {
    fn from(s: ScoredItem<'a>) -> Self {
        Scored { id: s.item.id, name: &s.item.name, category: &s.item.category, score: s.score }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { catalog, vocabulary } => build(&catalog, vocabulary),
        Commands::Similar { catalog, item } => similar(&catalog, item),
        Commands::Recommend { catalog, views, top_k } => recommend(&catalog, views, top_k),
    }
}

fn load(path: &str) -> Result<(Catalog, TfIdfIndex)> {
    let catalog = load_catalog(path).with_context(|| format!("loading catalog from {path}"))?;
    let index = build_index(&catalog);
    Ok((catalog, index))
}

fn build(path: &str, with_vocabulary: bool) -> Result<()> {
    let (catalog, index) = load(path)?;
    let summary = BuildSummary {
        num_items: catalog.item_count(),
        num_terms: index.vocabulary().len(),
        built_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        vocabulary: with_vocabulary.then(|| index.vocabulary().terms()),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    tracing::info!(path, "index build complete");
    Ok(())
}

fn similar(path: &str, id: ItemId) -> Result<()> {
    let (catalog, index) = load(path)?;
    let Some(target) = index.vector(id) else {
        bail!("item {id} is not in the catalog");
    };
    let mut scored: Vec<Scored> = catalog
        .items()
        .filter(|item| item.id != id)
        .filter_map(|item| {
            let vector = index.vector(item.id)?;
            Some(Scored::from(ScoredItem { item, score: cosine_similarity(target, vector) }))
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    println!("{}", serde_json::to_string_pretty(&scored)?);
    Ok(())
}

fn recommend(path: &str, views: Vec<ItemId>, top_k: usize) -> Result<()> {
    let (catalog, index) = load(path)?;
    let recommender = Recommender::new(RecommenderConfig::with_top_k(top_k));
    let history = InteractionHistory::with_views(views);
    let scored: Vec<Scored> = recommender
        .content_based(&history, &index, &catalog)?
        .into_iter()
        .map(Scored::from)
        .collect();
    tracing::debug!(views = history.views.len(), count = scored.len(), "recommendations");
    println!("{}", serde_json::to_string_pretty(&scored)?);
    Ok(())
}
