use std::io;

use ramhorns::Template;

use crate::layout::{category_panels, partition, trending_tags};
use crate::model::{Pagination, Post};
use crate::view::{parse_template, CardView, NavView, TagView, ViewContext};

#[derive(ramhorns::Content)]
struct ColumnsView {
    left_large: Option<CardView>,
    left_small: Vec<CardView>,
    center_xl: Option<CardView>,
    center_small: Vec<CardView>,
    right_large: Option<CardView>,
    right_small: Vec<CardView>,
}

#[derive(ramhorns::Content)]
struct PanelView {
    name: String,
    link: String,
    lead: Option<CardView>,
    posts: Vec<CardView>,
}

#[derive(ramhorns::Content)]
struct TopicView {
    posts: Vec<CardView>,
}

#[derive(ramhorns::Content)]
struct SectionView {
    anchor: usize,
    hero: Option<CardView>,
    secondary: Vec<CardView>,
    carousel: Vec<CardView>,
}

#[derive(ramhorns::Content)]
struct FrontPageView<'a> {
    site_name: &'a str,
    base_url: &'a str,
    critical_css: &'a str,
    has_critical_css: bool,
    navigation: Vec<NavView>,
    trending: Vec<TagView>,
    searching: bool,
    query: &'a str,
    results: Vec<CardView>,
    no_results: bool,
    hero: Option<CardView>,
    secondary: Vec<CardView>,
    sidebar: Vec<CardView>,
    carousel: Vec<CardView>,
    columns: ColumnsView,
    panels: Vec<PanelView>,
    top_reviews: Vec<CardView>,
    popular: Vec<CardView>,
    topics: Vec<TopicView>,
    more_sections: Vec<SectionView>,
    has_more: bool,
    next_page: u32,
}

/// Search outcome shown instead of the magazine layout.
pub struct SearchResults<'a> {
    pub query: &'a str,
    pub posts: Vec<&'a Post>,
}

pub struct FrontRenderer<'a> {
    pub template: Template<'a>,
}

impl FrontRenderer<'_> {
    pub fn new(index_tpl_src: &str) -> io::Result<FrontRenderer> {
        Ok(FrontRenderer {
            template: parse_template(index_tpl_src, "front page")?,
        })
    }

    pub fn render(&self,
                  context: &ViewContext,
                  posts: &[&Post],
                  pagination: Pagination,
                  search: Option<SearchResults>,
                  critical_css: Option<&str>) -> String {
        let front = partition(posts, context.layout);
        let card = |p: &&Post| context.card(p);
        let cards = |items: &[&Post]| items.iter().map(card).collect::<Vec<_>>();

        let columns = ColumnsView {
            left_large: front.columns.left_large.map(card),
            left_small: cards(front.columns.left_small),
            center_xl: front.columns.center_xl.map(card),
            center_small: cards(front.columns.center_small),
            right_large: front.columns.right_large.map(card),
            right_small: cards(front.columns.right_small),
        };

        let buckets = front.buckets();
        let more_sections = front.sections.iter()
            .map(|section| SectionView {
                anchor: section.start,
                hero: section.hero().map(card),
                secondary: cards(section.secondary()),
                carousel: cards(section.carousel),
            })
            .collect();

        let panels = category_panels(posts, context.categories, context.layout)
            .into_iter()
            .map(|panel| PanelView {
                name: panel.category.name.clone(),
                link: format!("/{}", panel.category.slug),
                lead: panel.posts.first().map(card),
                posts: panel.posts.iter().skip(1).map(card).collect(),
            })
            .collect();

        let trending = trending_tags(context.tags, context.layout)
            .into_iter()
            .map(|t| TagView { name: t.name.clone() })
            .collect();

        let (searching, query, results) = match search {
            Some(search) => (true, search.query, context.cards(search.posts)),
            None => (false, "", vec![]),
        };

        let critical_css = critical_css.unwrap_or("");

        self.template.render(&FrontPageView {
            site_name: &context.site.name,
            base_url: &context.site.base_url,
            critical_css,
            has_critical_css: !critical_css.is_empty(),
            navigation: context.navigation(None),
            trending,
            searching,
            query,
            no_results: searching && results.is_empty(),
            results,
            hero: front.hero.map(card),
            secondary: cards(front.secondary),
            sidebar: cards(front.sidebar),
            carousel: cards(front.carousel),
            columns,
            panels,
            top_reviews: cards(buckets.top_reviews),
            popular: cards(buckets.popular),
            topics: buckets.topics.iter().map(|&t| TopicView { posts: cards(t) }).collect(),
            more_sections,
            has_more: pagination.current_page < pagination.total_pages,
            next_page: pagination.current_page + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, Site};
    use crate::test_data::{category, post, tag};

    const TEMPLATE: &str = "HERO=[{{#hero}}{{title}}{{/hero}}]\
SECONDARY=[{{#secondary}}({{title}}){{/secondary}}]\
CAROUSEL=[{{#carousel}}({{title}}){{/carousel}}]\
LEFT=[{{#columns}}{{#left_large}}{{title}}{{/left_large}}{{/columns}}]\
PANELS=[{{#panels}}({{name}}:{{#lead}}{{title}}{{/lead}}){{/panels}}]\
TRENDING=[{{#trending}}({{name}}){{/trending}}]\
SEARCH=[{{#searching}}{{query}}:{{#results}}({{title}}){{/results}}{{#no_results}}none{{/no_results}}{{/searching}}]\
CSS=[{{#has_critical_css}}{{{critical_css}}}{{/has_critical_css}}]\
POPULAR=[{{#popular}}({{title}}){{/popular}}]\
SECTIONS=[{{#more_sections}}({{anchor}}:{{#hero}}{{title}}{{/hero}}/{{#carousel}}{{title}},{{/carousel}}){{/more_sections}}]\
MORE=[{{#has_more}}{{next_page}}{{/has_more}}]";

    fn site() -> Site {
        Site {
            name: "Spread The Word".to_string(),
            base_url: "https://example.org".to_string(),
            image_base_url: "https://cdn.example.org".to_string(),
        }
    }

    #[test]
    fn test_render_front() {
        let site = site();
        let layout = Layout::default();
        let categories = vec![category("c1", "sport", None)];
        let tags = vec![tag("t1", "Climate")];
        let context = ViewContext { site: &site, layout: &layout, categories: &categories, tags: &tags, mobile: false };

        let all: Vec<Post> = (0..8).map(|i| post(&format!("p{}", i), &["c1"], None)).collect();
        let posts: Vec<&Post> = all.iter().collect();
        let renderer = FrontRenderer::new(TEMPLATE).unwrap();
        let html = renderer.render(&context, &posts, Pagination { current_page: 1, total_pages: 2 }, None, Some("body{}"));

        assert!(html.contains("HERO=[Title p0]"));
        assert!(html.contains("SECONDARY=[(Title p1)(Title p2)]"));
        assert!(html.contains("CAROUSEL=[(Title p3)(Title p4)(Title p5)(Title p6)]"));
        assert!(html.contains("LEFT=[Title p7]"));
        assert!(html.contains("PANELS=[(SPORT:Title p0)]"));
        assert!(html.contains("TRENDING=[(Climate)]"));
        assert!(html.contains("SEARCH=[]"));
        assert!(html.contains("CSS=[body{}]"));
        assert!(html.contains("MORE=[2]"));
        assert!(html.contains("SECTIONS=[]"));
    }

    #[test]
    fn test_render_more_sections() {
        let site = site();
        let layout = Layout::default();
        let context = ViewContext { site: &site, layout: &layout, categories: &[], tags: &[], mobile: false };

        let all: Vec<Post> = (0..46).map(|i| post(&format!("p{}", i), &[], None)).collect();
        let posts: Vec<&Post> = all.iter().collect();
        let renderer = FrontRenderer::new(TEMPLATE).unwrap();
        let html = renderer.render(&context, &posts, Pagination::default(), None, None);

        assert!(html.contains("POPULAR=[(Title p21)(Title p22)(Title p23)(Title p24)]"));
        assert!(html.contains("SECTIONS=[(0:Title p37/Title p40,Title p41,Title p42,Title p43,)(7:Title p44/)]"),
                "unexpected sections in {}", html);
    }

    #[test]
    fn test_render_search() {
        let site = site();
        let layout = Layout::default();
        let context = ViewContext { site: &site, layout: &layout, categories: &[], tags: &[], mobile: false };
        let renderer = FrontRenderer::new(TEMPLATE).unwrap();

        let found = post("a", &[], None);
        let html = renderer.render(&context, &[], Pagination::default(),
                                   Some(SearchResults { query: "rugby", posts: vec![&found] }), None);
        assert!(html.contains("SEARCH=[rugby:(Title a)]"));
        assert!(html.contains("MORE=[]"));

        let html = renderer.render(&context, &[], Pagination::default(),
                                   Some(SearchResults { query: "rugby", posts: vec![] }), None);
        assert!(html.contains("SEARCH=[rugby:none]"));
    }
}
