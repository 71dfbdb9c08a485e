mod support;

use search_core::models::{Match, SearchOutcome};
use search_core::search::{QueryPipeline, TOP_K};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use support::{record, FixedModeration, ScriptedStore, TableEmbedder};

fn m(text: &str, prediction: &str) -> Match {
    Match {
        text: text.to_string(),
        prediction: prediction.to_string(),
    }
}

#[tokio::test]
async fn safe_query_returns_matches_in_store_order() {
    let moderation = Arc::new(FixedModeration::safe());
    let embedder = Arc::new(TableEmbedder::new(&[], &[1.0, 0.0, 0.0]));
    let store = Arc::new(ScriptedStore::returning(vec![
        record("1", "a", "positive"),
        record("2", "b", "negative"),
    ]));
    let pipeline = QueryPipeline::new(moderation.clone(), embedder.clone(), store.clone());

    let outcome = pipeline.run("how was the product?").await.unwrap();

    assert_eq!(
        outcome,
        SearchOutcome {
            is_safe: true,
            category: String::new(),
            matches: vec![m("a", "positive"), m("b", "negative")],
        }
    );
    assert_eq!(moderation.calls(), 1);
    assert_eq!(embedder.calls(), 1);
    assert_eq!(store.queries(), 1);
    assert_eq!(store.last_k.load(Ordering::SeqCst), TOP_K);
}

#[tokio::test]
async fn flagged_query_skips_embedding_and_store() {
    let moderation = Arc::new(FixedModeration::flagging(&["violence"]));
    let embedder = Arc::new(TableEmbedder::new(&[], &[1.0, 0.0, 0.0]));
    let store = Arc::new(ScriptedStore::returning(vec![record("1", "a", "positive")]));
    let pipeline = QueryPipeline::new(moderation.clone(), embedder.clone(), store.clone());

    let outcome = pipeline.run("something violent").await.unwrap();

    assert_eq!(
        outcome,
        SearchOutcome {
            is_safe: false,
            category: "violence".to_string(),
            matches: vec![],
        }
    );
    assert_eq!(embedder.calls(), 0);
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn flagged_without_category_proceeds_as_safe() {
    let moderation = Arc::new(FixedModeration::with(true, &[]));
    let embedder = Arc::new(TableEmbedder::new(&[], &[1.0, 0.0, 0.0]));
    let store = Arc::new(ScriptedStore::returning(vec![record("1", "a", "positive")]));
    let pipeline = QueryPipeline::new(moderation, embedder.clone(), store.clone());

    let outcome = pipeline.run("ambiguous").await.unwrap();

    assert!(outcome.is_safe);
    assert_eq!(outcome.category, "");
    assert_eq!(outcome.matches, vec![m("a", "positive")]);
    assert_eq!(embedder.calls(), 1);
}

#[tokio::test]
async fn one_match_per_returned_record() {
    let records = (1..=5)
        .map(|i| record(&i.to_string(), &format!("text {}", i), "negative"))
        .collect();
    let store = Arc::new(ScriptedStore::returning(records));
    let pipeline = QueryPipeline::new(
        Arc::new(FixedModeration::safe()),
        Arc::new(TableEmbedder::new(&[], &[0.0, 1.0, 0.0])),
        store,
    );

    let outcome = pipeline.run("query").await.unwrap();

    let texts: Vec<&str> = outcome.matches.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["text 1", "text 2", "text 3", "text 4", "text 5"]);
}

#[tokio::test]
async fn embedding_failure_is_propagated() {
    let embedder = Arc::new(TableEmbedder::new(&[], &[1.0]).failing_on("query"));
    let store = Arc::new(ScriptedStore::default());
    let pipeline = QueryPipeline::new(Arc::new(FixedModeration::safe()), embedder, store.clone());

    assert!(pipeline.run("query").await.is_err());
    assert_eq!(store.queries(), 0);
}
