//! Collects everything one page needs from the backend.
//!
//! Independent reads are issued together. A failed read has already been
//! logged by the source and shows up here as an empty list or `None`.

use spdlog::{debug, info};

use crate::augment::{augment, HeadingEntry};
use crate::backend::ContentSource;
use crate::classifier::match_category;
use crate::config::Config;
use crate::feed::{AppendOutcome, PostFeed};
use crate::layout::is_excluded;
use crate::model::{find_category, Category, Post, Tag};
use crate::related::{latest_news, related_posts, RelatedContext, LATEST_NEWS};

pub struct CategoryData {
    pub category: Category,
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

pub struct NavEntry {
    pub category: Category,
    pub active: bool,
}

pub struct PostData {
    pub post: Post,
    pub body: String,
    pub outline: Vec<HeadingEntry>,
    pub related: Vec<Post>,
    pub latest: Vec<Post>,
    pub header_context: Option<String>,
    pub navigation: Vec<NavEntry>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

pub struct FrontData {
    pub feed: PostFeed,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

/// Top-level category `slug` with its published, illustrated direct members.
pub async fn assemble_category<S: ContentSource>(source: &S, slug: &str) -> Option<CategoryData> {
    let (categories, posts, tags) = tokio::join!(
        source.categories(),
        source.posts_by_category(slug),
        source.tags(),
    );

    let category = match match_category(&categories, slug) {
        Some(category) => category.clone(),
        None => {
            debug!("No top-level category {}", slug);
            return None;
        }
    };

    let posts: Vec<Post> = posts.into_iter()
        .filter(|p| p.is_published() && p.in_category(&category.id))
        .filter(|p| p.has_images())
        .collect();

    Some(CategoryData {
        category,
        posts,
        categories,
        tags,
    })
}

/// Category and subcategory the post is shown under, from its first category.
pub fn navigation_context<'a>(post: &Post, categories: &'a [Category]) -> (Option<&'a Category>, Option<&'a Category>) {
    let Some(first) = post.categories.first().and_then(|r| find_category(categories, r.id())) else {
        return (None, None);
    };

    match first.parent_id {
        Some(ref parent_id) => (find_category(categories, parent_id), Some(first)),
        None => (Some(first), None),
    }
}

pub fn header_context(post: &Post, category: Option<&Category>, subcategory: Option<&Category>) -> Option<String> {
    match (category, subcategory) {
        (Some(category), Some(subcategory)) => Some(format!("{} / {}", category.name, subcategory.name)),
        (Some(category), None) => Some(category.name.clone()),
        (None, Some(subcategory)) => Some(subcategory.name.clone()),
        (None, None) => post.categories.iter()
            .find_map(|r| r.name())
            .map(|name| name.to_string()),
    }
}

/// Top-level categories; a category is active when the post belongs to it or
/// to one of its children.
pub fn category_navigation(post: &Post, categories: &[Category]) -> Vec<NavEntry> {
    categories.iter()
        .filter(|c| c.is_top_level())
        .map(|category| {
            let active = post.in_category(&category.id) || categories.iter()
                .filter(|child| child.parent_id.as_deref() == Some(category.id.as_str()))
                .any(|child| post.in_category(&child.id));
            NavEntry {
                category: category.clone(),
                active,
            }
        })
        .collect()
}

pub async fn assemble_post<S: ContentSource>(source: &S, post: Post, config: &Config) -> PostData {
    let (corpus, categories, tags) = tokio::join!(
        source.posts(1, config.backend.corpus_limit),
        source.categories(),
        source.tags(),
    );
    let corpus: Vec<Post> = corpus.map(|page| page.posts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| p.is_published())
        .collect();

    let (category, subcategory) = navigation_context(&post, &categories);
    let context = RelatedContext {
        category: category.map(|c| c.id.clone()),
        subcategory: subcategory.map(|c| c.id.clone()),
    };
    let header_context = header_context(&post, category, subcategory);

    let related = related_posts(&post, &corpus, &context);
    let augmented = augment(&post.content, &related);
    let related: Vec<Post> = related.into_iter().cloned().collect();
    let latest: Vec<Post> = latest_news(&corpus, LATEST_NEWS).into_iter().cloned().collect();
    let navigation = category_navigation(&post, &categories);

    PostData {
        post,
        body: augmented.html,
        outline: augmented.outline,
        related,
        latest,
        header_context,
        navigation,
        categories,
        tags,
    }
}

/// Loads feed pages `1..=pages` in order, stopping early when the backend
/// runs out of pages or a page cannot be fetched.
pub async fn assemble_front<S: ContentSource>(source: &S, pages: u32, config: &Config) -> FrontData {
    let limit = config.backend.page_limit;
    let mut feed = PostFeed::empty();

    let (first, categories, tags) = tokio::join!(
        source.posts(feed.next_page(), limit),
        source.categories(),
        source.tags(),
    );

    let mut next = first;
    while let Some(page) = next.take() {
        if let AppendOutcome::Stale { expected, received } = feed.append(page) {
            info!("Backend returned page {} instead of {}", received, expected);
            break;
        }
        if !feed.has_more() || feed.pagination().current_page >= pages {
            break;
        }
        next = source.posts(feed.next_page(), limit).await;
    }

    FrontData {
        feed,
        categories,
        tags,
    }
}

/// Posts eligible for the front page: published, illustrated and outside the
/// excluded categories.
pub fn visible_posts<'a>(posts: &'a [Post], categories: &[Category], config: &Config) -> Vec<&'a Post> {
    posts.iter()
        .filter(|p| p.is_published() && p.has_images())
        .filter(|p| !is_excluded(p, categories, &config.layout))
        .collect()
}
