use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use spdlog::{debug, warn};

use crate::backend::ContentSource;
use crate::config::{Backend, Cache};
use crate::content_cache::{ContentCache, Expire};
use crate::model::wire::{decode_categories, decode_post, decode_post_page, decode_posts, decode_tags};
use crate::model::{Category, Post, PostPage, Tag};

const USER_AGENT: &str = concat!("newsroom/", env!("CARGO_PKG_VERSION"));

struct Ttl {
    categories: Option<Expire>,
    tags: Option<Expire>,
    posts: Option<Expire>,
    post: Option<Expire>,
    category_posts: Option<Expire>,
}

pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    ttl: Ttl,
    cache: ContentCache<Value>,
}

impl BackendClient {
    pub fn new(backend: &Backend, cache: &Cache) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(backend.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Error creating backend HTTP client")?;

        let ttl = Ttl {
            categories: Expire::from_secs(cache.categories_ttl_secs),
            tags: Expire::from_secs(cache.tags_ttl_secs),
            posts: Expire::from_secs(cache.posts_ttl_secs),
            post: Expire::from_secs(cache.post_ttl_secs),
            category_posts: Expire::from_secs(cache.category_posts_ttl_secs),
        };
        let caching = [ttl.categories, ttl.tags, ttl.posts, ttl.post, ttl.category_posts]
            .iter()
            .any(|t| t.is_some());

        Ok(BackendClient {
            client,
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            ttl,
            cache: if caching { ContentCache::new() } else { ContentCache::non_caching() },
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, expire: Option<Expire>) -> Result<Arc<Value>> {
        if expire.is_some() {
            if let Some(cached) = self.cache.get(path) {
                debug!("Backend cache hit for {}", path);
                return Ok(cached);
            }
        }

        let url = self.url(path);
        let response = self.client.get(&url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .with_context(|| format!("Error requesting {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Backend answered {} for {}", status, url);
        }

        let value: Value = response.json()
            .await
            .with_context(|| format!("Invalid JSON payload from {}", url))?;

        Ok(match expire {
            Some(expire) => {
                self.cache.purge_expired();
                debug!("Backend cache holds {} entries", self.cache.len());
                self.cache.add(path, value, expire)
            }
            None => Arc::new(value),
        })
    }

    pub async fn get_text(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        let response = self.client.get(&url)
            .send()
            .await
            .with_context(|| format!("Error requesting {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Backend answered {} for {}", status, url);
        }

        response.text()
            .await
            .with_context(|| format!("Error reading body from {}", url))
    }

    pub async fn robots_txt(&self) -> Option<String> {
        match self.get_text("/robots.txt").await {
            Ok(txt) => Some(txt),
            Err(e) => {
                warn!("Failed to fetch robots.txt: {:#}", e);
                None
            }
        }
    }
}

impl ContentSource for BackendClient {
    async fn categories(&self) -> Vec<Category> {
        match self.get_json("/categories", self.ttl.categories).await {
            Ok(value) => decode_categories(&value),
            Err(e) => {
                warn!("Failed to fetch categories: {:#}", e);
                vec![]
            }
        }
    }

    async fn tags(&self) -> Vec<Tag> {
        match self.get_json("/tags", self.ttl.tags).await {
            Ok(value) => decode_tags(&value),
            Err(e) => {
                warn!("Failed to fetch tags: {:#}", e);
                vec![]
            }
        }
    }

    async fn posts(&self, page: u32, limit: u32) -> Option<PostPage> {
        let path = format!("/posts?page={}&limit={}", page, limit);
        match self.get_json(&path, self.ttl.posts).await {
            Ok(value) => Some(decode_post_page(&value)),
            Err(e) => {
                warn!("Failed to fetch posts page {}: {:#}", page, e);
                None
            }
        }
    }

    async fn post_by_slug(&self, slug: &str) -> Option<Post> {
        let path = format!("/posts/slug/{}", slug);
        match self.get_json(&path, self.ttl.post).await {
            Ok(value) => decode_post(&value),
            Err(e) => {
                debug!("Failed to fetch post {}: {:#}", slug, e);
                None
            }
        }
    }

    async fn posts_by_category(&self, slug: &str) -> Vec<Post> {
        let path = format!("/posts/by-category/{}", slug);
        match self.get_json(&path, self.ttl.category_posts).await {
            Ok(value) => decode_posts(&value),
            Err(e) => {
                warn!("Failed to fetch posts of category {}: {:#}", slug, e);
                vec![]
            }
        }
    }
}
