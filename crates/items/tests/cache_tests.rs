//! Fetch-through, top-rank marking and soft-delete behavior of the item cache.

mod common;

use common::{Scripted, TestCache, story};
use readom_core::ItemView;
use readom_items::{ItemFilter, ItemLookup, ItemRepo, RemoteItem};

#[tokio::test]
async fn test_fetch_through_persists_and_serializes() {
    let t = TestCache::new().await;
    t.source.with_item(RemoteItem {
        id: 42,
        title: Some("Hi".to_string()),
        score: Some(10),
        time: Some(1_700_000_000),
        ..RemoteItem::default()
    });

    let row = t.cache.get_or_fetch(42).await.unwrap().unwrap();
    let stored = t.store.get_item(42).await.unwrap().unwrap();
    assert_eq!(stored.title.as_deref(), Some("Hi"));
    assert_eq!(
        serde_json::to_string(&ItemView::from(row)).unwrap(),
        r#"{"id":42,"title":"Hi","url":null,"by":null,"score":10,"time":1700000000}"#
    );
}

#[tokio::test]
async fn test_second_lookup_is_a_hit() {
    let t = TestCache::new().await;
    t.source.with_item(story(1, "First"));

    assert!(matches!(
        t.cache.resolve(1).await.unwrap(),
        ItemLookup::Fetched(_)
    ));
    let second = t.cache.resolve(1).await.unwrap();
    assert!(matches!(second, ItemLookup::Hit(_)));
    assert_eq!(t.source.item_fetches(), 1);

    // Repeated lookups return the same record.
    let a = t.cache.get_or_fetch(1).await.unwrap();
    let b = t.cache.get_or_fetch(1).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(t.store.count_items().await.unwrap(), 1);
}

#[tokio::test]
async fn test_missing_title_persists_nothing() {
    let t = TestCache::new().await;
    t.source.with_item(RemoteItem {
        id: 5,
        score: Some(3),
        ..RemoteItem::default()
    });

    assert_eq!(t.cache.get_or_fetch(5).await.unwrap(), None);
    assert!(t.store.get_item(5).await.unwrap().is_none());
}

#[tokio::test]
async fn test_blank_title_is_a_miss() {
    let t = TestCache::new().await;
    t.source.with_item(story(6, "   "));
    assert_eq!(t.cache.get_or_fetch(6).await.unwrap(), None);
    assert_eq!(t.store.count_items().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_local_title_refetches() {
    let t = TestCache::new().await;
    t.store.create_item(8).await.unwrap();
    t.source.with_item(story(8, "Now populated"));

    let lookup = t.cache.resolve(8).await.unwrap();
    assert_eq!(lookup.label(), "fetched");
    assert_eq!(
        lookup.into_row().unwrap().title.as_deref(),
        Some("Now populated")
    );
    assert_eq!(t.store.count_items().await.unwrap(), 1);
}

#[tokio::test]
async fn test_remote_failure_and_not_found_are_unavailable() {
    let t = TestCache::new().await;
    t.source.script(1, Scripted::Fail);
    t.source.script(2, Scripted::Missing);

    assert_eq!(t.cache.resolve(1).await.unwrap(), ItemLookup::Unavailable);
    assert_eq!(t.cache.resolve(2).await.unwrap(), ItemLookup::Unavailable);
    assert_eq!(t.store.count_items().await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleted_upstream_soft_deletes_placeholder() {
    let t = TestCache::new().await;
    t.cache.mark_top_ranked(&[9]).await.unwrap();
    t.source.with_item(RemoteItem {
        id: 9,
        deleted: Some(true),
        ..RemoteItem::default()
    });

    assert_eq!(t.cache.resolve(9).await.unwrap(), ItemLookup::Unavailable);
    let row = t.store.get_item(9).await.unwrap().unwrap();
    assert!(row.deleted);
    assert!(t.cache.list(&ItemFilter::top()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vouched_item_is_listed_again() {
    let t = TestCache::new().await;
    t.cache.mark_top_ranked(&[9]).await.unwrap();
    t.source.with_item(RemoteItem {
        dead: Some(true),
        ..story(9, "Flagged")
    });
    assert_eq!(t.cache.resolve(9).await.unwrap(), ItemLookup::Unavailable);
    assert!(t.cache.list(&ItemFilter::top()).await.unwrap().is_empty());

    t.source.with_item(story(9, "Vouched"));
    let lookup = t.cache.resolve(9).await.unwrap();
    assert_eq!(lookup.label(), "fetched");

    let top = t.cache.list(&ItemFilter::top()).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].title.as_deref(), Some("Vouched"));
    assert!(!top[0].deleted);
    assert_eq!(t.cache.resolve(9).await.unwrap().label(), "hit");
}

#[tokio::test]
async fn test_dead_item_without_local_row_writes_nothing() {
    let t = TestCache::new().await;
    t.source.with_item(RemoteItem {
        dead: Some(true),
        ..story(11, "Flagged")
    });
    assert_eq!(t.cache.resolve(11).await.unwrap(), ItemLookup::Unavailable);
    assert!(t.store.get_item(11).await.unwrap().is_none());
}

#[tokio::test]
async fn test_mark_top_ranked_is_monotonic() {
    let t = TestCache::new().await;
    assert_eq!(t.cache.mark_top_ranked(&[3, 1, 2]).await.unwrap(), 3);
    let first: Vec<_> = t
        .cache
        .list(&ItemFilter::top())
        .await
        .unwrap()
        .into_iter()
        .map(|row| (row.id, row.top_at))
        .collect();
    assert_eq!(first.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(first.iter().all(|(_, top_at)| top_at.is_some()));

    assert_eq!(t.cache.mark_top_ranked(&[2, 3, 4]).await.unwrap(), 1);
    let second = t.cache.list(&ItemFilter::top()).await.unwrap();
    assert_eq!(second.len(), 4);
    for (id, top_at) in first {
        let row = second.iter().find(|row| row.id == id).unwrap();
        assert_eq!(row.top_at, top_at);
    }
}

#[tokio::test]
async fn test_mark_top_keeps_fetched_fields() {
    let t = TestCache::new().await;
    t.source.with_item(story(12, "Kept"));
    t.cache.get_or_fetch(12).await.unwrap();
    t.cache.mark_top_ranked(&[12]).await.unwrap();

    let row = t.store.get_item(12).await.unwrap().unwrap();
    assert!(row.is_top);
    assert_eq!(row.title.as_deref(), Some("Kept"));
}
