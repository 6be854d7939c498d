use std::io;

use ramhorns::Template;

use crate::layout::trending_tags;
use crate::model::{Category, Post};
use crate::paginator::Paginator;
use crate::view::{parse_template, CardView, NavView, TagView, ViewContext};

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: u32,
    link: String,
}

#[derive(ramhorns::Content)]
struct CategoryPageView<'a> {
    site_name: &'a str,
    base_url: &'a str,
    navigation: Vec<NavView>,
    trending: Vec<TagView>,
    category_name: &'a str,
    category_link: String,
    lead: Option<CardView>,
    posts: Vec<CardView>,
    empty: bool,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
}

pub struct CategoryRenderer<'a> {
    pub template: Template<'a>,
    pub page_size: u32,
}

impl CategoryRenderer<'_> {
    pub fn new(category_tpl_src: &str, page_size: u32) -> io::Result<CategoryRenderer> {
        Ok(CategoryRenderer {
            template: parse_template(category_tpl_src, "category")?,
            page_size,
        })
    }

    /// Renders page `cur_page` of the category listing; an out-of-range page
    /// shows the first one.
    pub fn render(&self, context: &ViewContext, category: &Category, posts: &[Post], cur_page: u32) -> String {
        let paginator = Paginator::from(posts, self.page_size);
        let cur_page = paginator.clamp_page(cur_page);
        let page: &[Post] = paginator.get_page(cur_page).unwrap_or(&[]);

        let mut cards = context.cards(page);
        let lead = if cards.is_empty() { None } else { Some(cards.remove(0)) };

        let link = format!("/{}", category.slug);
        let page_list = (1..=paginator.page_count())
            .map(|number| ViewPagination {
                current: number == cur_page,
                number,
                link: format!("{}?page={}", link, number),
            })
            .collect();

        let trending = trending_tags(context.tags, context.layout)
            .into_iter()
            .map(|t| TagView { name: t.name.clone() })
            .collect();

        self.template.render(&CategoryPageView {
            site_name: &context.site.name,
            base_url: &context.site.base_url,
            navigation: context.navigation(Some(&category.id)),
            trending,
            category_name: &category.name,
            category_link: link,
            empty: lead.is_none(),
            lead,
            posts: cards,
            page_list,
            show_pagination: paginator.page_count() > 1,
        })
    }
}
