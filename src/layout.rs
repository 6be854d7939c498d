//! Magazine layout of a flat post list.
//!
//! Everything here is index arithmetic over slices: no item is copied, and every
//! function that consumes a range returns the cursor where the next one starts.

use crate::config::Layout;
use crate::model::{Category, Post, Tag};

/// Slots of the three feature columns: left 1+3, center 1+2, right 1+3.
pub const FEATURE_SLOTS: usize = 11;

const TOP_REVIEWS: usize = 3;
const POPULAR: usize = 4;
const TOPIC_COLUMNS: usize = 4;
const TOPIC_SIZE: usize = 3;
const BUCKETED: usize = TOP_REVIEWS + POPULAR + TOPIC_COLUMNS * TOPIC_SIZE;

fn window<T>(items: &[T], start: usize, len: usize) -> &[T] {
    let start = start.min(items.len());
    let end = start.saturating_add(len).min(items.len());
    &items[start..end]
}

#[derive(Debug, PartialEq)]
pub struct Section<'a, T> {
    pub start: usize,
    /// Hero followed by the secondary items.
    pub lead: &'a [T],
    pub carousel: &'a [T],
    /// Look-ahead headlines. They overlap the carousel and possibly the next
    /// section, so the same item can show twice on a page.
    pub sidebar: &'a [T],
}

impl<'a, T> Section<'a, T> {
    pub fn hero(&self) -> Option<&'a T> {
        self.lead.first()
    }

    pub fn secondary(&self) -> &'a [T] {
        self.lead.get(1..).unwrap_or(&[])
    }
}

pub fn take_section<'a, T>(items: &'a [T], cursor: usize, layout: &Layout) -> (Section<'a, T>, usize) {
    let lead = window(items, cursor, layout.chunk_size);
    let after_lead = cursor + layout.chunk_size;
    let carousel = window(items, after_lead, layout.slider_size);
    let sidebar = window(items, after_lead, layout.sidebar_size);
    let next = (after_lead + layout.slider_size).min(items.len().max(cursor));

    (Section { start: cursor, lead, carousel, sidebar }, next)
}

pub fn chunk_sections<'a, T>(items: &'a [T], layout: &Layout) -> Vec<Section<'a, T>> {
    let mut sections = vec![];
    if layout.chunk_size + layout.slider_size == 0 {
        return sections;
    }

    let mut cursor = 0;
    while cursor < items.len() {
        let (section, next) = take_section(items, cursor, layout);
        sections.push(section);
        cursor = next;
    }
    sections
}

#[derive(Debug, PartialEq)]
pub struct FeatureColumns<'a, T> {
    pub left_large: Option<&'a T>,
    pub left_small: &'a [T],
    pub center_xl: Option<&'a T>,
    pub center_small: &'a [T],
    pub right_large: Option<&'a T>,
    pub right_small: &'a [T],
}

/// Fills the feature columns from `start`; short input leaves trailing slots
/// empty.
pub fn feature_columns<T>(items: &[T], start: usize) -> (FeatureColumns<'_, T>, usize) {
    let slots = window(items, start, FEATURE_SLOTS);
    let columns = FeatureColumns {
        left_large: slots.first(),
        left_small: window(slots, 1, 3),
        center_xl: slots.get(4),
        center_small: window(slots, 5, 2),
        right_large: slots.get(7),
        right_small: window(slots, 8, 3),
    };
    (columns, start.min(items.len()) + slots.len())
}

#[derive(Debug, PartialEq)]
pub struct OverflowBuckets<'a, T> {
    pub top_reviews: &'a [T],
    pub popular: &'a [T],
    pub topics: Vec<&'a [T]>,
    pub more: &'a [T],
}

pub fn overflow_buckets<T>(rest: &[T]) -> OverflowBuckets<'_, T> {
    let topics = (0..TOPIC_COLUMNS)
        .map(|i| window(rest, TOP_REVIEWS + POPULAR + i * TOPIC_SIZE, TOPIC_SIZE))
        .collect();
    let more = if rest.len() > BUCKETED { &rest[BUCKETED..] } else { &[] };

    OverflowBuckets {
        top_reviews: window(rest, 0, TOP_REVIEWS),
        popular: window(rest, TOP_REVIEWS, POPULAR),
        topics,
        more,
    }
}

pub struct FrontPage<'a, T> {
    pub hero: Option<&'a T>,
    pub secondary: &'a [T],
    pub sidebar: &'a [T],
    pub carousel: &'a [T],
    pub columns: FeatureColumns<'a, T>,
    /// Everything after the feature columns.
    pub overflow: &'a [T],
    /// The `more` bucket of the overflow, chunked like the top of the page.
    /// Section starts are offsets into that bucket.
    pub sections: Vec<Section<'a, T>>,
}

impl<'a, T> FrontPage<'a, T> {
    pub fn buckets(&self) -> OverflowBuckets<'a, T> {
        overflow_buckets(self.overflow)
    }
}

pub fn partition<'a, T>(items: &'a [T], layout: &Layout) -> FrontPage<'a, T> {
    let (first, cursor) = take_section(items, 0, layout);
    let (columns, cursor) = feature_columns(items, cursor);
    let overflow = &items[cursor..];

    FrontPage {
        hero: first.hero(),
        secondary: first.secondary(),
        sidebar: first.sidebar,
        carousel: first.carousel,
        columns,
        overflow,
        sections: chunk_sections(overflow_buckets(overflow).more, layout),
    }
}

/// Whether any category of `post` resolves to an excluded slug, either through
/// the category list or through the embedded reference.
pub fn is_excluded(post: &Post, categories: &[Category], layout: &Layout) -> bool {
    post.categories.iter().any(|reference| {
        let slug = categories.iter()
            .find(|c| c.id == reference.id())
            .map(|c| c.slug.as_str())
            .or_else(|| reference.slug());
        slug.is_some_and(|slug| layout.is_excluded_slug(slug))
    })
}

pub struct CategoryPanel<'a> {
    pub category: &'a Category,
    pub posts: Vec<&'a Post>,
}

/// Up to `panel_count` category blocks built from `posts`. The preferred
/// category leads when it has posts; categories without posts are skipped.
pub fn category_panels<'a>(posts: &[&'a Post], categories: &'a [Category], layout: &Layout) -> Vec<CategoryPanel<'a>> {
    let preferred = layout.preferred_category_slug.as_deref();
    let ordered = categories.iter()
        .filter(|c| Some(c.slug.as_str()) == preferred)
        .chain(categories.iter().filter(|c| Some(c.slug.as_str()) != preferred));

    ordered
        .filter(|c| !layout.is_excluded_slug(&c.slug))
        .filter_map(|category| {
            let members: Vec<&'a Post> = posts.iter()
                .copied()
                .filter(|p| p.in_category(&category.id))
                .take(layout.panel_size)
                .collect();
            if members.is_empty() {
                None
            } else {
                Some(CategoryPanel { category, posts: members })
            }
        })
        .take(layout.panel_count)
        .collect()
}

pub fn trending_tags<'a>(tags: &'a [Tag], layout: &Layout) -> Vec<&'a Tag> {
    tags.iter()
        .filter(|t| !layout.excluded_tag_names.contains(&t.name.to_lowercase()))
        .take(layout.trending_tag_count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::{category, post, tag};

    fn numbers(count: usize) -> Vec<usize> {
        (0..count).collect()
    }

    #[test]
    fn test_seven_items() {
        let items = numbers(7);
        let front = partition(&items, &Layout::default());
        assert_eq!(front.hero, Some(&0));
        assert_eq!(front.secondary, &[1, 2]);
        assert_eq!(front.carousel, &[3, 4, 5, 6]);
        assert_eq!(front.sidebar, &[3, 4, 5, 6]);
        assert_eq!(front.columns.left_large, None);
        assert!(front.overflow.is_empty());
        assert!(front.buckets().top_reviews.is_empty());
        assert!(front.sections.is_empty());
    }

    #[test]
    fn test_twenty_five_items() {
        let items = numbers(25);
        let front = partition(&items, &Layout::default());
        let columns = &front.columns;
        assert_eq!(columns.left_large, Some(&7));
        assert_eq!(columns.left_small, &[8, 9, 10]);
        assert_eq!(columns.center_xl, Some(&11));
        assert_eq!(columns.center_small, &[12, 13]);
        assert_eq!(columns.right_large, Some(&14));
        assert_eq!(columns.right_small, &[15, 16, 17]);
        assert_eq!(front.overflow, &[18, 19, 20, 21, 22, 23, 24]);
        let buckets = front.buckets();
        assert_eq!(buckets.top_reviews, &[18, 19, 20]);
        assert_eq!(buckets.popular, &[21, 22, 23, 24]);
        assert!(buckets.topics.iter().all(|t| t.is_empty()));
        assert!(buckets.more.is_empty());
        assert!(front.sections.is_empty());
    }

    #[test]
    fn test_more_bucket_is_sectioned() {
        let items = numbers(45);
        let front = partition(&items, &Layout::default());
        assert_eq!(front.overflow, &items[18..]);
        assert_eq!(front.buckets().more, &items[37..]);

        assert_eq!(front.sections.len(), 2);
        assert_eq!(front.sections[0].start, 0);
        assert_eq!(front.sections[0].hero(), Some(&37));
        assert_eq!(front.sections[0].secondary(), &[38, 39]);
        assert_eq!(front.sections[0].carousel, &[40, 41, 42, 43]);
        assert_eq!(front.sections[1].start, 7);
        assert_eq!(front.sections[1].hero(), Some(&44));
        assert!(front.sections[1].carousel.is_empty());
    }

    #[test]
    fn test_partition_is_deterministic() {
        for count in [0, 1, 6, 7, 18, 30, 45] {
            let items = numbers(count);
            let a = partition(&items, &Layout::default());
            let b = partition(&items, &Layout::default());
            assert_eq!(a.hero, b.hero);
            assert_eq!(a.secondary, b.secondary);
            assert_eq!(a.carousel, b.carousel);
            assert_eq!(a.columns, b.columns);
            assert_eq!(a.overflow, b.overflow);
            assert_eq!(a.buckets(), b.buckets());
            assert_eq!(a.sections, b.sections);
        }
    }

    #[test]
    fn test_empty_and_short_input() {
        let items: Vec<usize> = vec![];
        let front = partition(&items, &Layout::default());
        assert_eq!(front.hero, None);
        assert!(front.secondary.is_empty());
        assert!(front.sections.is_empty());

        let items = numbers(1);
        let front = partition(&items, &Layout::default());
        assert_eq!(front.hero, Some(&0));
        assert!(front.secondary.is_empty());
        assert!(front.carousel.is_empty());

        let items = numbers(6);
        let front = partition(&items, &Layout::default());
        assert_eq!(front.carousel, &[3, 4, 5]);
        assert_eq!(front.columns.left_large, None);
    }

    #[test]
    fn test_overflow_more_bucket() {
        let rest = numbers(30);
        let buckets = overflow_buckets(&rest);
        assert_eq!(buckets.topics, vec![&rest[7..10], &rest[10..13], &rest[13..16], &rest[16..19]]);
        assert_eq!(buckets.more, &rest[19..]);

        let rest = numbers(19);
        assert!(overflow_buckets(&rest).more.is_empty());
    }

    #[test]
    fn test_chunk_sections() {
        let items = numbers(18);
        let sections = chunk_sections(&items, &Layout::default());
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].start, 7);
        assert_eq!(sections[1].lead, &[7, 8, 9]);
        assert_eq!(sections[1].sidebar, &[10, 11, 12, 13]);
        assert_eq!(sections[2].lead, &[14, 15, 16]);
        assert_eq!(sections[2].carousel, &[17]);
    }

    #[test]
    fn test_sidebar_overlaps_following_items() {
        let layout = Layout { slider_size: 2, ..Layout::default() };
        let items = numbers(12);
        let (section, next) = take_section(&items, 0, &layout);
        assert_eq!(next, 5);
        assert_eq!(section.sidebar, &[3, 4, 5, 6]);
        let (following, _) = take_section(&items, next, &layout);
        assert_eq!(following.hero(), Some(&5));
    }

    #[test]
    fn test_is_excluded() {
        let layout = Layout {
            excluded_category_slugs: ["divertissement".to_string()].into_iter().collect(),
            ..Layout::default()
        };
        let categories = vec![category("c1", "news", None), category("c9", "divertissement", None)];
        assert!(!is_excluded(&post("a", &["c1"], None), &categories, &layout));
        assert!(is_excluded(&post("b", &["c1", "c9"], None), &categories, &layout));

        let mut embedded = post("c", &[], None);
        embedded.categories = vec![crate::model::Reference::Embedded {
            id: "unknown".to_string(),
            name: None,
            slug: Some("divertissement".to_string()),
            parent_id: None,
        }];
        assert!(is_excluded(&embedded, &categories, &layout));
    }

    #[test]
    fn test_category_panels() {
        let layout = Layout {
            excluded_category_slugs: ["divertissement".to_string()].into_iter().collect(),
            preferred_category_slug: Some("actualites".to_string()),
            panel_size: 2,
            ..Layout::default()
        };
        let categories = vec![
            category("c1", "sport", None),
            category("c2", "divertissement", None),
            category("c3", "empty", None),
            category("c4", "actualites", None),
            category("c5", "culture", None),
            category("c6", "science", None),
        ];
        let posts = vec![
            post("a", &["c1"], None),
            post("b", &["c2"], None),
            post("c", &["c4"], None),
            post("d", &["c4"], None),
            post("e", &["c4"], None),
            post("f", &["c5"], None),
            post("g", &["c6"], None),
        ];
        let posts: Vec<&Post> = posts.iter().collect();
        let panels = category_panels(&posts, &categories, &layout);
        let slugs: Vec<&str> = panels.iter().map(|p| p.category.slug.as_str()).collect();
        assert_eq!(slugs, vec!["actualites", "sport", "culture"]);
        let first: Vec<&str> = panels[0].posts.iter().map(|p| p.id.0.as_str()).collect();
        assert_eq!(first, vec!["c", "d"]);
    }

    #[test]
    fn test_trending_tags() {
        let layout = Layout {
            excluded_tag_names: ["romeo".to_string()].into_iter().collect(),
            ..Layout::default()
        };
        let tags = vec![tag("1", "Romeo"), tag("2", "Climate"), tag("3", "Budget"), tag("4", "Rugby"), tag("5", "Cinema")];
        let names: Vec<&str> = trending_tags(&tags, &layout).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Climate", "Budget", "Rugby"]);
    }
}
