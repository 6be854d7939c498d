use std::cmp::Ordering;

use crate::model::Post;

pub const MAX_RELATED: usize = 5;
pub const LATEST_NEWS: usize = 8;

/// Navigation context of the post being rendered, as category ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedContext {
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// Newest first; posts with no usable date go last.
fn by_recency(a: &&Post, b: &&Post) -> Ordering {
    match (a.recency(), b.recency()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sorted_by_recency<'a>(mut posts: Vec<&'a Post>) -> Vec<&'a Post> {
    posts.sort_by(by_recency);
    posts
}

/// Picks the candidate pool by the narrowest context that is present (not by
/// whether it yields anything), then keeps the newest `MAX_RELATED`.
pub fn related_posts<'a>(target: &Post, corpus: &'a [Post], context: &RelatedContext) -> Vec<&'a Post> {
    let others = corpus.iter()
        .filter(|p| p.is_published() && p.id != target.id);

    let pool: Vec<&Post> = match (&context.subcategory, &context.category) {
        (Some(sub), _) => others.filter(|p| p.in_category(sub)).collect(),
        (None, Some(cat)) => others.filter(|p| p.in_category(cat)).collect(),
        (None, None) => others.collect(),
    };

    let mut related = sorted_by_recency(pool);
    related.truncate(MAX_RELATED);
    related
}

pub fn latest_news(corpus: &[Post], limit: usize) -> Vec<&Post> {
    let mut latest = sorted_by_recency(corpus.iter().filter(|p| p.is_published()).collect());
    latest.truncate(limit);
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::post;

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.0.clone()).collect()
    }

    fn corpus() -> Vec<Post> {
        vec![
            post("target", &["cat", "sub"], Some(10)),
            post("s1", &["cat", "sub"], Some(1)),
            post("s2", &["sub"], Some(5)),
            post("s3", &["sub"], None),
            post("s4", &["sub"], Some(3)),
            post("s5", &["sub"], Some(8)),
            post("s6", &["sub"], Some(2)),
            post("c1", &["cat"], Some(20)),
            post("other", &["x"], Some(25)),
        ]
    }

    #[test]
    fn test_subcategory_context() {
        let corpus = corpus();
        let context = RelatedContext {
            category: Some("cat".to_string()),
            subcategory: Some("sub".to_string()),
        };
        let related = related_posts(&corpus[0], &corpus, &context);
        assert_eq!(ids(&related), vec!["s5", "s2", "s4", "s6", "s1"]);
        assert!(related.iter().all(|p| p.in_category("sub")));
    }

    #[test]
    fn test_category_context() {
        let corpus = corpus();
        let context = RelatedContext {
            category: Some("cat".to_string()),
            subcategory: None,
        };
        let related = related_posts(&corpus[0], &corpus, &context);
        assert_eq!(ids(&related), vec!["c1", "s1"]);
    }

    #[test]
    fn test_global_fallback_and_undated_last() {
        let corpus = corpus();
        let related = related_posts(&corpus[0], &corpus, &RelatedContext::default());
        assert_eq!(related.len(), MAX_RELATED);
        assert_eq!(ids(&related), vec!["other", "c1", "s5", "s2", "s4"]);
        assert!(related.iter().all(|p| p.id != corpus[0].id));
    }

    #[test]
    fn test_context_present_but_empty() {
        let corpus = corpus();
        let context = RelatedContext {
            category: Some("cat".to_string()),
            subcategory: Some("nobody".to_string()),
        };
        assert!(related_posts(&corpus[0], &corpus, &context).is_empty());
    }

    #[test]
    fn test_created_at_fallback() {
        let mut old = post("old", &["cat"], None);
        old.created_at = Some(crate::test_data::date(4));
        let corpus = vec![post("new", &["cat"], Some(6)), old, post("none", &["cat"], None)];
        let target = post("t", &["cat"], None);
        let related = related_posts(&target, &corpus, &RelatedContext::default());
        assert_eq!(ids(&related), vec!["new", "old", "none"]);
    }

    #[test]
    fn test_latest_news() {
        let corpus = corpus();
        let latest = latest_news(&corpus, LATEST_NEWS);
        assert_eq!(latest.len(), LATEST_NEWS);
        assert_eq!(ids(&latest[..3]), vec!["other", "c1", "target"]);
    }
}
