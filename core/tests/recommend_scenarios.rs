use reco_core::{
    build_index, Catalog, Category, InteractionHistory, Item, ItemId, RecoError, Recommender, RecommenderConfig,
    Session, UserContext,
};

fn fruit_catalog() -> Catalog {
    Catalog::new(vec![Category::new("Fruit", vec![
        Item::new(1, "red apple", "sweet red fruit", "apple.png"),
        Item::new(2, "green apple", "tart green fruit", "green.png"),
        Item::new(3, "banana", "yellow sweet fruit", "banana.png"),
    ])])
}

fn large_catalog() -> Catalog {
    let colors = ["red", "green", "blue", "black", "white"];
    let kinds = ["shirt", "shoe", "hat", "sock"];
    let mut items = Vec::new();
    let mut id = 0;
    for color in colors {
        for kind in kinds {
            id += 1;
            items.push(Item::new(id, format!("{color} {kind}"), format!("a {color} cotton {kind}"), ""));
        }
    }
    Catalog::new(vec![Category::new("Clothes", items)])
}

fn ids(items: &[&Item]) -> Vec<ItemId> {
    items.iter().map(|i| i.id).collect()
}

#[test]
fn sweet_fruit_ranks_ahead_of_tart_fruit() {
    let catalog = fruit_catalog();
    let index = build_index(&catalog);
    let user = UserContext::new("alice");
    let history = InteractionHistory::with_views([1]);

    let recommender = Recommender::default();
    let scored = recommender.content_based(&history, &index, &catalog).unwrap();
    assert_eq!(scored.len(), 2);
    assert_eq!(scored[0].item.id, 3);
    assert!(scored[0].score >= scored[1].score);

    let out = recommender.recommend(Some(&user), &history, &index, &catalog).unwrap();
    assert_eq!(ids(&out), vec![3, 2]);
}

#[test]
fn empty_catalog_yields_nothing() {
    let catalog = Catalog::default();
    let index = build_index(&catalog);
    assert!(index.vocabulary().is_empty());
    let user = UserContext::new("alice");
    let out = Recommender::default()
        .recommend(Some(&user), &InteractionHistory::with_views([1, 2]), &index, &catalog)
        .unwrap();
    assert!(out.is_empty());
}

#[test]
fn new_user_without_views_gets_nothing() {
    let catalog = fruit_catalog();
    let index = build_index(&catalog);
    let user = UserContext::new("alice");
    let mut history = InteractionHistory::default();
    history.buys.push(1);
    history.searches.push("apple".into());
    let out = Recommender::default().recommend(Some(&user), &history, &index, &catalog).unwrap();
    assert!(out.is_empty());
}

#[test]
fn output_is_capped_and_excludes_viewed_items() {
    let catalog = large_catalog();
    let index = build_index(&catalog);
    let user = UserContext::new("alice");
    let history = InteractionHistory::with_views([1, 6, 6]);
    let out = Recommender::default().recommend(Some(&user), &history, &index, &catalog).unwrap();
    assert_eq!(out.len(), 10);
    assert!(out.iter().all(|i| i.id != 1 && i.id != 6));

    let small = Recommender::new(RecommenderConfig::with_top_k(3));
    let out = small.recommend(Some(&user), &history, &index, &catalog).unwrap();
    assert_eq!(out.len(), 3);
}

#[test]
fn same_color_items_lead_the_ranking() {
    let catalog = large_catalog();
    let index = build_index(&catalog);
    // Item 1 is the red shirt; items 2..=4 are the other red clothes.
    let history = InteractionHistory::with_views([1]);
    let scored = Recommender::default().content_based(&history, &index, &catalog).unwrap();
    let mut top: Vec<ItemId> = scored.iter().take(3).map(|s| s.item.id).collect();
    top.sort();
    assert_eq!(top, vec![2, 3, 4]);
}

#[test]
fn ranking_is_deterministic_across_builds() {
    let catalog = large_catalog();
    let history = InteractionHistory::with_views([3, 7]);
    let first: Vec<ItemId> = Recommender::default()
        .content_based(&history, &build_index(&catalog), &catalog)
        .unwrap()
        .iter()
        .map(|s| s.item.id)
        .collect();
    for _ in 0..5 {
        let again: Vec<ItemId> = Recommender::default()
            .content_based(&history, &build_index(&catalog), &catalog)
            .unwrap()
            .iter()
            .map(|s| s.item.id)
            .collect();
        assert_eq!(first, again);
    }
}

#[test]
fn session_drives_a_page_load() {
    let mut session = Session::new(Some(UserContext::new("alice")), RecommenderConfig::default());
    let history = InteractionHistory::with_views([1]);
    assert!(matches!(session.recommend(&history), Err(RecoError::CatalogNotLoaded)));

    session.load_catalog(fruit_catalog());
    let out = session.recommend(&history).unwrap();
    assert_eq!(ids(&out), vec![3, 2]);

    let anonymous = {
        let mut s = Session::new(None, RecommenderConfig::default());
        s.load_catalog(fruit_catalog());
        s
    };
    assert!(anonymous.recommend(&history).unwrap().is_empty());
}
