use spdlog::debug;

use crate::backend::ContentSource;
use crate::model::{Category, Post};

/// What a bare `/{slug}` URL resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum SlugMatch {
    Category(Category),
    Post(Post),
    NotFound,
}

/// Top-level category owning `slug`. Subcategories are never matched here.
pub fn match_category<'a>(categories: &'a [Category], slug: &str) -> Option<&'a Category> {
    categories.iter()
        .filter(|c| c.is_top_level())
        .find(|c| c.slug == slug)
}

/// Categories take precedence over posts: a post sharing its slug with a
/// top-level category cannot be reached through this path.
pub async fn classify<S: ContentSource>(source: &S, slug: &str) -> SlugMatch {
    let categories = source.categories().await;
    if let Some(category) = match_category(&categories, slug) {
        return SlugMatch::Category(category.clone());
    }

    match source.post_by_slug(slug).await {
        Some(post) if post.is_published() => SlugMatch::Post(post),
        Some(_) => {
            debug!("Post {} exists but is not published", slug);
            SlugMatch::NotFound
        }
        None => SlugMatch::NotFound,
    }
}
