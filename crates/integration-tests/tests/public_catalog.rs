//! Integration tests for the public catalog fetchers and their caching.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use cafecraft_client::cart::{CartStore, ProductInput};
use cafecraft_client::storage::MemoryStorage;
use cafecraft_client::{ApiError, PublicCatalog};
use cafecraft_core::{Price, ProductId};
use cafecraft_integration_tests::harness;

/// Per-route hit counters so tests can observe cache behavior.
#[derive(Default)]
struct Hits {
    site: AtomicUsize,
    menu: AtomicUsize,
    sitemap: AtomicUsize,
}

fn backend() -> (Router, Arc<Hits>) {
    let hits = Arc::new(Hits::default());

    let router = Router::new()
        .route(
            "/sites/site/public/{slug}/",
            get({
                let hits = Arc::clone(&hits);
                move |Path(slug): Path<String>| {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.site.fetch_add(1, Ordering::SeqCst);
                        Json(json!({
                            "id": 1,
                            "slug": slug,
                            "name": "Demo Cafe",
                            "settings": {"primary_color": "#7b3f00"},
                        }))
                    }
                }
            }),
        )
        .route(
            "/menu/public-data/{slug}/",
            get({
                let hits = Arc::clone(&hits);
                move |Path(_slug): Path<String>| {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.menu.fetch_add(1, Ordering::SeqCst);
                        Json(json!({
                            "categories": [{"id": 1, "name": "Hot drinks", "order": 0}],
                            "products": [
                                {"id": 11, "title": "Espresso", "price": 50_000,
                                 "category": 1, "image": "/media/espresso.jpg"},
                                {"id": 12, "title": "Cheesecake", "price": 120_000},
                            ],
                        }))
                    }
                }
            }),
        )
        .route(
            "/sites/site/sitemap/",
            get({
                let hits = Arc::clone(&hits);
                move || {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.sitemap.fetch_add(1, Ordering::SeqCst);
                        Json(json!([
                            {"slug": "demo-cafe", "updated_at": "2026-05-01T10:30:00Z"},
                            {"slug": "second-branch", "updated_at": "2026-06-12T08:00:00Z"},
                        ]))
                    }
                }
            }),
        );

    (router, hits)
}

#[tokio::test]
async fn test_public_site_is_served_from_cache_within_ttl() {
    let (router, hits) = backend();
    let harness = harness(router).await;
    let catalog = PublicCatalog::new(harness.api.clone());

    let first = catalog.site("demo-cafe").await.unwrap();
    assert_eq!(first.name.as_deref(), Some("Demo Cafe"));

    let second = catalog.site("demo-cafe").await.unwrap();
    assert_eq!(second.slug, "demo-cafe");

    assert_eq!(hits.site.load(Ordering::SeqCst), 1);

    // Different slugs are cached independently
    catalog.site("second-branch").await.unwrap();
    assert_eq!(hits.site.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_site_forces_refetch() {
    let (router, hits) = backend();
    let harness = harness(router).await;
    let catalog = PublicCatalog::new(harness.api.clone());

    catalog.site("demo-cafe").await.unwrap();
    catalog.invalidate_site("demo-cafe").await;
    catalog.site("demo-cafe").await.unwrap();

    assert_eq!(hits.site.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_menu_is_cached() {
    let (router, hits) = backend();
    let harness = harness(router).await;
    let catalog = PublicCatalog::new(harness.api.clone());

    let menu = catalog.menu("demo-cafe").await.unwrap();
    assert_eq!(menu.categories.len(), 1);
    assert_eq!(menu.products.len(), 2);

    catalog.menu("demo-cafe").await.unwrap();
    assert_eq!(hits.menu.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sitemap_is_never_cached() {
    let (router, hits) = backend();
    let harness = harness(router).await;
    let catalog = PublicCatalog::new(harness.api.clone());

    let entries = catalog.sitemap().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries.first().unwrap().slug, "demo-cafe");

    catalog.sitemap().await.unwrap();
    assert_eq!(hits.sitemap.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_route_surfaces_request_failure() {
    // A backend with no routes at all: 404 with no JSON error body
    let harness = harness(Router::new()).await;
    let catalog = PublicCatalog::new(harness.api.clone());

    let err = catalog.sitemap().await.unwrap_err();
    assert!(matches!(err, ApiError::RequestFailed { status: 404, .. }));
}

#[tokio::test]
async fn test_menu_to_cart_ordering_flow() {
    let (router, _) = backend();
    let harness = harness(router).await;
    let catalog = PublicCatalog::new(harness.api.clone());
    let cart = CartStore::new(Arc::new(MemoryStorage::new()));

    let menu = catalog.menu("demo-cafe").await.unwrap();
    let espresso = menu
        .products
        .iter()
        .find(|product| product.id == ProductId::new(11))
        .unwrap();

    cart.add_item(&ProductInput::from(espresso));
    cart.add_item(&ProductInput::from(espresso));

    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.total_price(), Price::from(100_000));
    assert_eq!(
        cart.items().first().unwrap().image.as_deref(),
        Some("/media/espresso.jpg")
    );
}
