//! Read-only fetchers for public site data.
//!
//! The customer-facing pages and the sitemap generator consume these; none
//! of them mutate anything, so responses for a given slug are cached for a
//! short TTL. The sitemap is never cached - it is fetched once per
//! generation run and must be fresh.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use cafecraft_core::{Price, ProductId, SiteId};

use crate::api::ApiClient;
use crate::cart::ProductInput;
use crate::error::ApiError;

/// How long public site/menu responses are served from cache.
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Public projection of a site record, as served to anonymous visitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicSite {
    /// Stable identifier.
    pub id: SiteId,
    /// URL-facing identifier.
    pub slug: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form display configuration.
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

/// A menu category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    /// Display position within the menu.
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A menu product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Owning category id, if the product is categorized.
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl From<&MenuProduct> for ProductInput {
    fn from(product: &MenuProduct) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

/// The public menu payload: categories and products for one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuData {
    #[serde(default)]
    pub categories: Vec<MenuCategory>,
    #[serde(default)]
    pub products: Vec<MenuProduct>,
}

/// One published site, for sitemap generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub slug: String,
    pub updated_at: DateTime<Utc>,
}

const fn default_true() -> bool {
    true
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Site(Box<PublicSite>),
    Menu(Box<MenuData>),
}

/// Client for the public, read-only site data.
///
/// Site and menu responses are cached for 5 minutes; the cache is shared
/// across clones.
#[derive(Clone)]
pub struct PublicCatalog {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl PublicCatalog {
    /// Create a catalog over an API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self { api, cache }
    }

    /// Get the public projection of a site by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the site does not exist or the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn site(&self, slug: &str) -> Result<PublicSite, ApiError> {
        let cache_key = format!("public-site:{slug}");

        if let Some(CacheValue::Site(site)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for public site");
            return Ok(*site);
        }

        let site = self
            .api
            .get_json::<PublicSite>(&format!("/sites/site/public/{slug}/"))
            .await?;

        self.cache
            .insert(cache_key, CacheValue::Site(Box::new(site.clone())))
            .await;

        Ok(site)
    }

    /// Get the public menu (categories and products) for a site.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn menu(&self, slug: &str) -> Result<MenuData, ApiError> {
        let cache_key = format!("menu:{slug}");

        if let Some(CacheValue::Menu(menu)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for menu");
            return Ok(*menu);
        }

        let menu = self
            .api
            .get_json::<MenuData>(&format!("/menu/public-data/{slug}/"))
            .await?;

        self.cache
            .insert(cache_key, CacheValue::Menu(Box::new(menu.clone())))
            .await;

        Ok(menu)
    }

    /// List every published site for sitemap generation. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn sitemap(&self) -> Result<Vec<SitemapEntry>, ApiError> {
        self.api
            .get_json::<Vec<SitemapEntry>>("/sites/site/sitemap/")
            .await
    }

    /// Invalidate cached data for one site.
    pub async fn invalidate_site(&self, slug: &str) {
        self.cache.invalidate(&format!("public-site:{slug}")).await;
        self.cache.invalidate(&format!("menu:{slug}")).await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
