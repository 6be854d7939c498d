use crate::config::Layout;
use crate::model::{Category, Post, Reference, Tag};

pub const MIN_QUERY_LEN: usize = 2;

/// Display names of the post's categories, skipping excluded ones.
pub fn category_names<'a>(post: &'a Post, categories: &'a [Category], layout: &Layout) -> Vec<&'a str> {
    post.categories.iter()
        .filter_map(|reference| match categories.iter().find(|c| c.id == reference.id()) {
            Some(category) if layout.is_excluded_slug(&category.slug) => None,
            Some(category) => Some(category.name.as_str()),
            None => match reference.slug() {
                Some(slug) if layout.is_excluded_slug(slug) => None,
                _ => reference.name(),
            },
        })
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn tag_names<'a>(post: &'a Post, tags: &'a [Tag]) -> Vec<&'a str> {
    post.tags.iter()
        .filter_map(|reference: &'a Reference| tags.iter()
            .find(|t| t.id == reference.id())
            .map(|t| t.name.as_str())
            .or_else(|| reference.name()))
        .filter(|name| !name.is_empty())
        .collect()
}

fn title_score(title: &str, term: &str) -> u32 {
    let mut score = 0;
    if title == term {
        score += 3;
    }
    if title.starts_with(term) {
        score += 2;
    }
    if title.contains(term) {
        score += 1;
    }
    score
}

/// Filters `posts` by `query` and ranks them by title relevance.
///
/// Returns `None` when the query is too short to search with, in which case
/// the caller shows the unfiltered list.
pub fn search<'a>(posts: impl IntoIterator<Item = &'a Post>, query: &str, categories: &[Category], tags: &[Tag], layout: &Layout) -> Option<Vec<&'a Post>> {
    let term = query.trim().to_lowercase();
    if term.chars().count() < MIN_QUERY_LEN {
        return None;
    }

    let words: Vec<&str> = term.split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .collect();

    let mut found: Vec<(u32, &Post)> = posts.into_iter()
        .filter(|post| {
            let searchable = format!("{} {} {} {} {}",
                                     post.title,
                                     post.content,
                                     post.excerpt.as_deref().unwrap_or(""),
                                     category_names(post, categories, layout).join(" "),
                                     tag_names(post, tags).join(" ")).to_lowercase();
            words.iter().all(|w| searchable.contains(w))
        })
        .map(|post| (title_score(&post.title.to_lowercase(), &term), post))
        .collect();

    found.sort_by(|a, b| b.0.cmp(&a.0));
    Some(found.into_iter().map(|(_, post)| post).collect())
}
