//! Lenient decoding of backend payloads.
//!
//! The backend is not consistent about envelopes (`[...]`, `{ data }`,
//! `{ categories }`), id fields (`_id` or `id`) or relation shapes (id string or
//! populated object). Everything here degrades to "skip the item" or "empty
//! container" instead of failing the whole payload.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{Category, Pagination, Post, PostId, PostPage, PostStatus, Reference, SeoFields, Tag};
use crate::text_utils::parse_timestamp;

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawPost {
    #[serde(rename = "_id")]
    mongo_id: Option<Value>,
    id: Option<Value>,
    title: Option<String>,
    content: Option<String>,
    slug: Option<String>,
    status: Option<String>,
    category_ids: Option<Vec<Value>>,
    tag_ids: Option<Vec<Value>>,
    author_id: Option<Value>,
    created_at: Option<String>,
    published_at: Option<String>,
    updated_at: Option<String>,
    excerpt: Option<String>,
    #[serde(rename = "featured_image")]
    featured_image: Option<String>,
    #[serde(rename = "image_urls")]
    image_urls: Option<Vec<Value>>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_keywords: Option<String>,
    meta_image: Option<String>,
    og_title: Option<String>,
    og_description: Option<String>,
    twitter_card: Option<String>,
    twitter_title: Option<String>,
    twitter_description: Option<String>,
    twitter_image: Option<String>,
    canonical_url: Option<String>,
    focus_keyword: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawPagination {
    current_page: Option<u32>,
    total_pages: Option<u32>,
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn object_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.get("_id")
            .and_then(scalar_to_string)
            .or_else(|| map.get("id").and_then(scalar_to_string)),
        other => scalar_to_string(other),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn decode_reference(value: &Value) -> Option<Reference> {
    match value {
        Value::Object(_) => {
            let id = object_id(value)?;
            Some(Reference::Embedded {
                id,
                name: string_field(value, "name"),
                slug: string_field(value, "slug"),
                parent_id: value.get("parentId").and_then(object_id),
            })
        }
        other => scalar_to_string(other).map(Reference::Id),
    }
}

fn decode_references(values: Option<Vec<Value>>) -> Vec<Reference> {
    values.unwrap_or_default()
        .iter()
        .filter_map(decode_reference)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn post_from_raw(raw: RawPost) -> Option<Post> {
    let id = raw.mongo_id.as_ref()
        .and_then(object_id)
        .or_else(|| raw.id.as_ref().and_then(object_id))?;

    let status = match raw.status.as_deref() {
        Some("published") => PostStatus::Published,
        _ => PostStatus::Draft,
    };

    let image_urls = raw.image_urls.unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Some(Post {
        id: PostId(id),
        title: raw.title.unwrap_or_default(),
        content: raw.content.unwrap_or_default(),
        slug: raw.slug.unwrap_or_default(),
        status,
        categories: decode_references(raw.category_ids),
        tags: decode_references(raw.tag_ids),
        author: raw.author_id.as_ref().and_then(decode_reference),
        created_at: raw.created_at.as_deref().and_then(parse_timestamp),
        published_at: raw.published_at.as_deref().and_then(parse_timestamp),
        updated_at: raw.updated_at.as_deref().and_then(parse_timestamp),
        excerpt: non_empty(raw.excerpt),
        featured_image: non_empty(raw.featured_image),
        image_urls,
        seo: SeoFields {
            meta_title: non_empty(raw.meta_title),
            meta_description: non_empty(raw.meta_description),
            meta_keywords: non_empty(raw.meta_keywords),
            meta_image: non_empty(raw.meta_image),
            og_title: non_empty(raw.og_title),
            og_description: non_empty(raw.og_description),
            twitter_card: non_empty(raw.twitter_card),
            twitter_title: non_empty(raw.twitter_title),
            twitter_description: non_empty(raw.twitter_description),
            twitter_image: non_empty(raw.twitter_image),
            canonical_url: non_empty(raw.canonical_url),
            focus_keyword: non_empty(raw.focus_keyword),
        },
    })
}

/// Returns the list held by `value`, looking through the envelope keys when the
/// payload is an object.
fn unwrap_list<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => keys.iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_array()))
            .map(|items| items.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    }
}

pub fn decode_post(value: &Value) -> Option<Post> {
    let value = match value.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    };
    if !value.is_object() {
        return None;
    }
    let raw: RawPost = serde_json::from_value(value.clone()).ok()?;
    post_from_raw(raw)
}

pub fn decode_posts(value: &Value) -> Vec<Post> {
    unwrap_list(value, &["data", "posts"])
        .iter()
        .filter_map(decode_post)
        .collect()
}

pub fn decode_post_page(value: &Value) -> PostPage {
    let posts = decode_posts(value);
    let raw: RawPagination = value.get("pagination")
        .and_then(|p| serde_json::from_value(p.clone()).ok())
        .unwrap_or_default();

    let current_page = raw.current_page.unwrap_or(1).max(1);
    let total_pages = raw.total_pages.unwrap_or(current_page).max(current_page);

    PostPage {
        posts,
        pagination: Pagination {
            current_page,
            total_pages,
        },
    }
}

fn decode_category(value: &Value) -> Option<Category> {
    let id = object_id(value)?;
    Some(Category {
        id,
        name: string_field(value, "name").unwrap_or_default(),
        slug: string_field(value, "slug")?,
        parent_id: value.get("parentId").and_then(object_id),
    })
}

pub fn decode_categories(value: &Value) -> Vec<Category> {
    unwrap_list(value, &["data", "categories"])
        .iter()
        .filter(|v| v.is_object())
        .filter_map(decode_category)
        .collect()
}

pub fn decode_tags(value: &Value) -> Vec<Tag> {
    unwrap_list(value, &["data", "tags"])
        .iter()
        .filter(|v| v.is_object())
        .filter_map(|v| {
            Some(Tag {
                id: object_id(v)?,
                name: string_field(v, "name").unwrap_or_default(),
            })
        })
        .collect()
}
