//! Integration tests for tabs and the engine tab list.

mod common;

use std::sync::Arc;

use common::MockFetcher;
use kestrel_browser::tab::{DEFAULT_TITLE, LOADING_TITLE};
use kestrel_browser::{BuildError, Cancellation, Engine, EngineConfig, Tab, TabId};

fn engine() -> Engine<MockFetcher> {
    let fetcher = MockFetcher::new()
        .with_page("https://a.test", "<title>A</title><p>a</p>")
        .with_page("https://b.test", "<title>B</title><p>b</p>")
        .with_page("https://c.test", "<p>untitled</p>");
    Engine::new(fetcher, EngineConfig::default())
}

#[test]
fn test_title_semantics() {
    let mut tab = Tab::new();
    assert_eq!(tab.title(), DEFAULT_TITLE);
    tab.navigate("https://a.test");
    assert!(tab.is_loading());
    assert_eq!(tab.title(), LOADING_TITLE);
    tab.fail_loading(&BuildError::Cancelled);
    assert!(!tab.is_loading());
    assert_eq!(tab.title(), DEFAULT_TITLE);
    assert_eq!(tab.error(), Some("navigation cancelled"));
}

#[test]
fn test_tab_history_navigation() {
    let mut tab = Tab::new();
    tab.navigate("https://a.test");
    tab.navigate("https://b.test");
    assert!(tab.can_go_back());
    assert!(tab.go_back());
    assert_eq!(tab.url(), "https://a.test");
    assert!(!tab.go_back());
    assert!(tab.go_forward());
    assert_eq!(tab.url(), "https://b.test");
    assert!(!tab.can_go_forward());
}

#[test]
fn test_add_and_close_tabs() {
    let engine = engine();
    assert_eq!(engine.tab_count(), 0);
    let first = engine.add_tab();
    let second = engine.add_tab();
    assert_eq!(engine.tab_ids(), vec![first, second]);

    assert!(engine.close_tab(first));
    assert!(!engine.close_tab(first));
    assert_eq!(engine.tab_ids(), vec![second]);
    assert!(engine.tab(first).is_none());
    assert_eq!(engine.tab(second).unwrap().lock().id(), second);
}

#[tokio::test]
async fn test_load_sets_content_and_title() {
    let engine = engine();
    let id = engine.add_tab();
    engine.load(id, "a.test", &Cancellation::new()).await.unwrap();

    let tab = engine.tab(id).unwrap();
    let tab = tab.lock();
    assert_eq!(tab.url(), "https://a.test");
    assert_eq!(tab.title(), "A");
    assert!(!tab.is_loading());
    assert!(tab.content().is_some());
}

#[tokio::test]
async fn test_untitled_page_shows_default_title() {
    let engine = engine();
    let id = engine.add_tab();
    engine.load(id, "https://c.test", &Cancellation::new()).await.unwrap();
    assert_eq!(engine.tab(id).unwrap().lock().title(), DEFAULT_TITLE);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_document() {
    let engine = engine();
    let id = engine.add_tab();
    let cancel = Cancellation::new();
    engine.load(id, "a.test", &cancel).await.unwrap();

    let err = engine.load(id, "missing.test", &cancel).await.unwrap_err();
    assert!(matches!(err, BuildError::FetchFailure { .. }));
    let tab = engine.tab(id).unwrap();
    let tab = tab.lock();
    assert_eq!(tab.content().and_then(|d| d.title()), Some("A"));
    assert!(tab.error().is_some());
    assert_eq!(tab.title(), "A");
}

#[tokio::test]
async fn test_invalid_address_fails_without_fetching() {
    let engine = engine();
    let id = engine.add_tab();
    let err = engine
        .load(id, "ftp://a.test", &Cancellation::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::FetchFailure { .. }));
    assert!(engine.builder().limiter().in_flight() == 0);
    assert!(engine.tab(id).unwrap().lock().history().is_empty());
}

#[tokio::test]
async fn test_back_and_forward_reload() {
    let engine = engine();
    let id = engine.add_tab();
    let cancel = Cancellation::new();
    engine.load(id, "a.test", &cancel).await.unwrap();
    engine.load(id, "b.test", &cancel).await.unwrap();

    engine.go_back(id, &cancel).await.unwrap();
    assert_eq!(engine.tab(id).unwrap().lock().title(), "A");
    engine.go_forward(id, &cancel).await.unwrap();
    assert_eq!(engine.tab(id).unwrap().lock().title(), "B");
    // Nothing ahead: a no-op.
    engine.go_forward(id, &cancel).await.unwrap();
    assert_eq!(engine.tab(id).unwrap().lock().history().len(), 2);
}

#[tokio::test]
async fn test_refresh_blank_tab_is_noop() {
    let engine = engine();
    let id = engine.add_tab();
    engine.refresh(id, &Cancellation::new()).await.unwrap();
    assert!(engine.tab(id).unwrap().lock().content().is_none());
}

#[tokio::test]
async fn test_unknown_tab() {
    let engine = engine();
    let missing = TabId(u64::MAX);
    assert!(matches!(
        engine.load(missing, "a.test", &Cancellation::new()).await,
        Err(BuildError::UnknownTab(id)) if id == missing
    ));
}

#[tokio::test]
async fn test_tabs_load_independently() {
    let engine = Arc::new(engine());
    let a = engine.add_tab();
    let b = engine.add_tab();
    let cancel = Cancellation::new();
    let (ra, rb) = tokio::join!(
        engine.load(a, "a.test", &cancel),
        engine.load(b, "b.test", &cancel)
    );
    ra.unwrap();
    rb.unwrap();
    assert_eq!(engine.tab(a).unwrap().lock().title(), "A");
    assert_eq!(engine.tab(b).unwrap().lock().title(), "B");
}
