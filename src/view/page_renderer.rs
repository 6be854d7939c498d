use std::io;

use lazy_static::lazy_static;
use ramhorns::Template;
use regex::Regex;

use crate::view::{parse_template, NavView, ViewContext};

lazy_static! {
    static ref TITLE_REGEX: Regex = Regex::new(r"(?s)<h[12][^>]*>(?P<title>.+?)</h[12]>").unwrap();
}

#[derive(ramhorns::Content)]
struct PageView<'a> {
    site_name: &'a str,
    base_url: &'a str,
    navigation: Vec<NavView>,
    title: &'a str,
    content: &'a str,
}

/// First h1/h2 of a static page, used as its title.
pub fn page_title(html: &str) -> Option<&str> {
    TITLE_REGEX.captures(html)
        .and_then(|caps| caps.name("title"))
        .map(|m| m.as_str().trim())
}

/// Static informational pages and the not-found page.
pub struct PageRenderer<'a> {
    pub template: Template<'a>,
}

impl PageRenderer<'_> {
    pub fn new(page_tpl_src: &str) -> io::Result<PageRenderer> {
        Ok(PageRenderer {
            template: parse_template(page_tpl_src, "page")?,
        })
    }

    pub fn render(&self, context: &ViewContext, title: &str, content: &str) -> String {
        self.template.render(&PageView {
            site_name: &context.site.name,
            base_url: &context.site.base_url,
            navigation: context.navigation(None),
            title,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, Site};

    #[test]
    fn test_page_title() {
        assert_eq!(page_title("<section><h1 class=\"big\"> About us </h1><p>x</p></section>"), Some("About us"));
        assert_eq!(page_title("<h2>Privacy</h2><h1>Later</h1>"), Some("Privacy"));
        assert_eq!(page_title("<p>No heading</p>"), None);
    }

    #[test]
    fn test_render_page() {
        let site = Site {
            name: "Spread The Word".to_string(),
            base_url: "https://example.org".to_string(),
            image_base_url: "https://cdn.example.org".to_string(),
        };
        let layout = Layout::default();
        let context = ViewContext { site: &site, layout: &layout, categories: &[], tags: &[], mobile: false };
        let renderer = PageRenderer::new("<title>{{title}} | {{site_name}}</title>{{{content}}}").unwrap();
        let html = renderer.render(&context, "About & us", "<p>Hello</p>");
        assert_eq!(html, "<title>About &amp; us | Spread The Word</title><p>Hello</p>");
    }
}
