use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::config::{Layout, Site};
use crate::image::{image_candidates, mobile_srcset, optimized_url, resolve_image_url, ImageParams, MOBILE_SIZES};
use crate::model::{Category, Post, Tag};
use crate::search::{category_names, tag_names};
use crate::text_utils::{excerpt, format_long_date, reading_time, EXCERPT_WORDS};

pub mod category_renderer;
pub mod fragment_renderer;
pub mod front_renderer;
pub mod page_renderer;
pub mod post_renderer;

const CARD_TAGS: usize = 2;

pub(crate) fn parse_template<'a>(source: &'a str, name: &str) -> io::Result<Template<'a>> {
    match Template::new(source) {
        Ok(template) => Ok(template),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", name, e))),
    }
}

#[derive(ramhorns::Content)]
pub struct TagView {
    pub name: String,
}

#[derive(ramhorns::Content)]
pub struct NavView {
    pub name: String,
    pub link: String,
    pub active: bool,
}

/// Everything a template needs to show one post as a teaser.
#[derive(ramhorns::Content)]
pub struct CardView {
    pub title: String,
    pub link: String,
    pub excerpt: String,
    pub image: String,
    pub has_image: bool,
    /// Remaining image candidates, `|` separated, for client-side fallback.
    pub fallbacks: String,
    pub srcset: String,
    pub sizes: String,
    pub has_srcset: bool,
    pub date: String,
    pub iso_date: String,
    pub reading_time: u32,
    pub category: String,
    pub has_category: bool,
    pub tags: Vec<TagView>,
}

/// Per-request rendering inputs shared by every page.
pub struct ViewContext<'a> {
    pub site: &'a Site,
    pub layout: &'a Layout,
    pub categories: &'a [Category],
    pub tags: &'a [Tag],
    pub mobile: bool,
}

impl ViewContext<'_> {
    pub fn card(&self, post: &Post) -> CardView {
        let base = &self.site.image_base_url;
        let mut candidates = match post.image_urls.first() {
            Some(first) => {
                let primary = resolve_image_url(first, base);
                let mut all = vec![primary.clone()];
                all.extend(image_candidates(post, base).into_iter().filter(|c| *c != primary));
                all
            }
            None => image_candidates(post, base),
        };

        let (image, fallbacks) = if candidates.is_empty() {
            (String::new(), String::new())
        } else {
            let image = candidates.remove(0);
            (image, candidates.join("|"))
        };

        let (image, srcset) = if self.mobile && !image.is_empty() {
            let params = ImageParams::for_device(true, None, None);
            (optimized_url(&image, &params), mobile_srcset(&image, None, None))
        } else {
            (image, String::new())
        };

        let category = category_names(post, self.categories, self.layout)
            .first()
            .map(|name| name.to_string())
            .unwrap_or_default();
        let tags = tag_names(post, self.tags).into_iter()
            .take(CARD_TAGS)
            .map(|name| TagView { name: name.to_string() })
            .collect();

        let recency = post.recency();

        CardView {
            title: post.title.clone(),
            link: format!("/{}", post.slug),
            excerpt: post.excerpt.clone().unwrap_or_else(|| excerpt(&post.content, EXCERPT_WORDS)),
            has_image: !image.is_empty(),
            image,
            fallbacks,
            has_srcset: !srcset.is_empty(),
            sizes: if srcset.is_empty() { String::new() } else { MOBILE_SIZES.to_string() },
            srcset,
            date: recency.as_ref().map(format_long_date).unwrap_or_default(),
            iso_date: recency.map(|d| d.to_rfc3339()).unwrap_or_default(),
            reading_time: reading_time(&post.content),
            has_category: !category.is_empty(),
            category,
            tags,
        }
    }

    pub fn cards<'p>(&self, posts: impl IntoIterator<Item = &'p Post>) -> Vec<CardView> {
        posts.into_iter().map(|p| self.card(p)).collect()
    }

    /// Top-level categories for the site header; `active` marks the one shown.
    pub fn navigation(&self, active_id: Option<&str>) -> Vec<NavView> {
        self.categories.iter()
            .filter(|c| c.is_top_level())
            .map(|c| NavView {
                name: c.name.clone(),
                link: format!("/{}", c.slug),
                active: Some(c.id.as_str()) == active_id,
            })
            .collect()
    }
}
