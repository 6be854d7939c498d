use std::io;

use ramhorns::Template;

use crate::assembler::PostData;
use crate::search::tag_names;
use crate::text_utils::{format_date_time, format_long_date, reading_time};
use crate::view::{parse_template, CardView, NavView, TagView, ViewContext};

#[derive(ramhorns::Content)]
struct OutlineView<'a> {
    id: &'a str,
    text: &'a str,
    subsection: bool,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    site_name: &'a str,
    base_url: &'a str,
    critical_css: &'a str,
    has_critical_css: bool,
    navigation: Vec<NavView>,
    id: &'a str,
    slug: &'a str,
    page_title: &'a str,
    post_title: &'a str,
    header_context: &'a str,
    has_header_context: bool,
    author: &'a str,
    has_author: bool,
    date: String,
    time: String,
    long_date: String,
    reading_time: u32,
    tags: Vec<TagView>,
    image: Option<CardView>,
    post_content: &'a str,
    outline: Vec<OutlineView<'a>>,
    has_outline: bool,
    related: Vec<CardView>,
    latest: Vec<CardView>,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        Ok(PostRenderer {
            template: parse_template(view_tpl_src, "post view")?,
        })
    }

    pub fn render(&self, context: &ViewContext, data: &PostData, critical_css: Option<&str>) -> String {
        let post = &data.post;
        let (date, time, long_date) = match post.recency() {
            Some(recency) => {
                let (date, time) = format_date_time(&recency);
                (date, time, format_long_date(&recency))
            }
            None => (String::new(), String::new(), String::new()),
        };

        let navigation = data.navigation.iter()
            .map(|entry| NavView {
                name: entry.category.name.clone(),
                link: format!("/{}", entry.category.slug),
                active: entry.active,
            })
            .collect();

        let tags = tag_names(post, context.tags).into_iter()
            .map(|name| TagView { name: name.to_string() })
            .collect();

        let outline: Vec<OutlineView> = data.outline.iter()
            .map(|entry| OutlineView {
                id: &entry.id,
                text: &entry.text,
                subsection: entry.level > 2,
            })
            .collect();

        let card = context.card(post);
        let image = if card.has_image { Some(card) } else { None };

        let header_context = data.header_context.as_deref().unwrap_or("");
        let author = post.author_name().unwrap_or("");
        let critical_css = critical_css.unwrap_or("");

        self.template.render(&ViewItem {
            site_name: &context.site.name,
            base_url: &context.site.base_url,
            critical_css,
            has_critical_css: !critical_css.is_empty(),
            navigation,
            id: &post.id.0,
            slug: &post.slug,
            page_title: post.display_title(),
            post_title: &post.title,
            header_context,
            has_header_context: !header_context.is_empty(),
            author,
            has_author: !author.is_empty(),
            date,
            time,
            long_date,
            reading_time: reading_time(&post.content),
            tags,
            image,
            post_content: &data.body,
            has_outline: !outline.is_empty(),
            outline,
            related: context.cards(&data.related),
            latest: context.cards(&data.latest),
        })
    }
}
