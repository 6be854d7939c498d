use chrono::{DateTime, Utc};

pub mod wire;

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct PostId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Draft,
    Published,
}

/// Categories, tags and authors arrive either as a bare id or as the embedded
/// document, depending on whether the backend populated the relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    Id(String),
    Embedded {
        id: String,
        name: Option<String>,
        slug: Option<String>,
        parent_id: Option<String>,
    },
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Id(id) => id,
            Reference::Embedded { id, .. } => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Reference::Id(_) => None,
            Reference::Embedded { name, .. } => name.as_deref(),
        }
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            Reference::Id(_) => None,
            Reference::Embedded { slug, .. } => slug.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeoFields {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub meta_image: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub twitter_card: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
    pub canonical_url: Option<String>,
    pub focus_keyword: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub status: PostStatus,
    pub categories: Vec<Reference>,
    pub tags: Vec<Reference>,
    pub author: Option<Reference>,
    pub created_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub image_urls: Vec<String>,
    pub seo: SeoFields,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Publication date, or creation date for posts that never recorded one.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.created_at)
    }

    pub fn has_images(&self) -> bool {
        !self.image_urls.is_empty()
    }

    pub fn in_category(&self, category_id: &str) -> bool {
        self.categories.iter().any(|c| c.id() == category_id)
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.name())
    }

    pub fn display_title(&self) -> &str {
        self.seo.meta_title.as_deref().unwrap_or(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<String>,
}

impl Category {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            current_page: 1,
            total_pages: 1,
        }
    }
}

/// One page of the paginated post listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

pub fn find_category<'a>(categories: &'a [Category], id: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.id == id)
}
