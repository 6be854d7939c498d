use chrono::{DateTime, TimeZone, Utc};

use crate::backend::ContentSource;
use crate::model::{Category, Pagination, Post, PostId, PostPage, PostStatus, Reference, SeoFields, Tag};

pub const POST_LIST_JSON: &str = r#"{
  "data": [
    {
      "_id": "p1",
      "title": "Floods hit the northern coast",
      "content": "<p>Heavy rain caused floods.</p>",
      "slug": "floods-hit-the-northern-coast",
      "status": "published",
      "categoryIds": [
        { "_id": "c1", "name": "News", "slug": "news", "parentId": null },
        "c2"
      ],
      "tagIds": ["t1"],
      "authorId": { "_id": "u1", "name": "Jo Writer" },
      "createdAt": "2024-05-01T08:00:00.000Z",
      "publishedAt": "2024-05-01T10:00:00.000Z",
      "image_urls": ["/uploads/a.jpg"],
      "metaTitle": "Meta title"
    },
    {
      "id": "p2",
      "title": "Draft about the budget",
      "content": "<p>Not ready.</p>",
      "slug": "draft-about-the-budget",
      "status": "draft",
      "categoryIds": ["c1"],
      "createdAt": "2024-04-30 09:15:00"
    },
    {
      "title": "Entry without identifier",
      "status": "published"
    }
  ],
  "pagination": { "currentPage": 1, "totalPages": 3 }
}"#;

pub fn date(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

pub fn category(id: &str, slug: &str, parent_id: Option<&str>) -> Category {
    Category {
        id: id.to_string(),
        name: slug.to_uppercase(),
        slug: slug.to_string(),
        parent_id: parent_id.map(|p| p.to_string()),
    }
}

pub fn tag(id: &str, name: &str) -> Tag {
    Tag {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// Published post with one image, in the given categories.
pub fn post(id: &str, categories: &[&str], published_day: Option<u32>) -> Post {
    Post {
        id: PostId(id.to_string()),
        title: format!("Title {}", id),
        content: format!("<p>Body of {}</p>", id),
        slug: format!("slug-{}", id),
        status: PostStatus::Published,
        categories: categories.iter().map(|c| Reference::Id(c.to_string())).collect(),
        tags: vec![],
        author: None,
        created_at: None,
        published_at: published_day.map(date),
        updated_at: None,
        excerpt: None,
        featured_image: None,
        image_urls: vec![format!("/uploads/{}.jpg", id)],
        seo: SeoFields::default(),
    }
}

/// In-memory backend used by the async tests.
#[derive(Default)]
pub struct StaticSource {
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub posts: Vec<Post>,
    pub page_size: usize,
    pub fail_posts: bool,
}

impl StaticSource {
    pub fn new(categories: Vec<Category>, tags: Vec<Tag>, posts: Vec<Post>) -> Self {
        StaticSource {
            categories,
            tags,
            posts,
            page_size: 10,
            fail_posts: false,
        }
    }
}

impl ContentSource for StaticSource {
    async fn categories(&self) -> Vec<Category> {
        self.categories.clone()
    }

    async fn tags(&self) -> Vec<Tag> {
        self.tags.clone()
    }

    async fn posts(&self, page: u32, limit: u32) -> Option<PostPage> {
        if self.fail_posts {
            return None;
        }
        let limit = (limit as usize).min(self.page_size.max(1));
        let total_pages = self.posts.len().div_ceil(limit).max(1) as u32;
        let start = (page.saturating_sub(1) as usize) * limit;
        let posts = self.posts.iter().skip(start).take(limit).cloned().collect();
        Some(PostPage {
            posts,
            pagination: Pagination {
                current_page: page,
                total_pages,
            },
        })
    }

    async fn post_by_slug(&self, slug: &str) -> Option<Post> {
        self.posts.iter().find(|p| p.slug == slug).cloned()
    }

    async fn posts_by_category(&self, slug: &str) -> Vec<Post> {
        let Some(category) = self.categories.iter().find(|c| c.slug == slug) else {
            return vec![];
        };
        self.posts.iter()
            .filter(|p| p.in_category(&category.id))
            .cloned()
            .collect()
    }
}
