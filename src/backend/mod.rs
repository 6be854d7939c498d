use crate::model::{Category, Post, PostPage, Tag};

pub mod client;

pub use client::BackendClient;

/// Read access to the content backend.
///
/// Implementations never fail: an upstream problem is logged and surfaces as an
/// empty list or `None`, and callers render an empty / not-found state from it.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    async fn categories(&self) -> Vec<Category>;

    async fn tags(&self) -> Vec<Tag>;

    /// `None` when the page could not be fetched at all.
    async fn posts(&self, page: u32, limit: u32) -> Option<PostPage>;

    async fn post_by_slug(&self, slug: &str) -> Option<Post>;

    async fn posts_by_category(&self, slug: &str) -> Vec<Post>;
}
