use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::augment::HeadingEntry;
use crate::model::Post;

const TOC_TEMPLATE: &str = r##"<div id="toc-dynamic-container" class="table-of-contents"><p class="toc-title">Table of Contents</p><ul>{{#entries}}<li class="toc-level-{{level}}"><a href="#{{id}}">{{text}}</a></li>{{/entries}}</ul></div>"##;

const CALLOUT_TEMPLATE: &str = r#"<div class="related-post-container-{{index}}"><div class="related-post"><span class="related-post-dot"></span><a href="{{link}}">{{title}}</a></div></div>"#;

#[derive(ramhorns::Content)]
struct TocEntry<'a> {
    id: &'a str,
    text: &'a str,
    level: u8,
}

#[derive(ramhorns::Content)]
struct Toc<'a> {
    entries: Vec<TocEntry<'a>>,
}

#[derive(ramhorns::Content)]
struct Callout<'a> {
    index: usize,
    link: String,
    title: &'a str,
}

fn parse(source: &'static str, name: &str) -> io::Result<Template<'static>> {
    Template::new(source)
        .map_err(|e| io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", name, e)))
}

pub fn render_toc(outline: &[HeadingEntry]) -> io::Result<String> {
    let template = parse(TOC_TEMPLATE, "table of contents")?;
    let entries = outline.iter()
        .map(|h| TocEntry { id: &h.id, text: &h.text, level: h.level })
        .collect();
    Ok(template.render(&Toc { entries }))
}

/// Inline link to a related post; `index` is the related post's rank.
pub fn render_callout(index: usize, post: &Post) -> io::Result<String> {
    let template = parse(CALLOUT_TEMPLATE, "related post")?;
    Ok(template.render(&Callout {
        index,
        link: format!("/{}", post.slug),
        title: &post.title,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::post;

    #[test]
    fn test_render_toc() {
        let outline = vec![
            HeadingEntry { id: "intro".to_string(), text: "Intro".to_string(), level: 2 },
            HeadingEntry { id: "q-a".to_string(), text: "Q & A".to_string(), level: 3 },
        ];
        let html = render_toc(&outline).unwrap();
        assert!(html.starts_with(r#"<div id="toc-dynamic-container""#));
        assert!(html.contains(r##"<li class="toc-level-2"><a href="#intro">Intro</a></li>"##));
        assert!(html.contains(r##"<a href="#q-a">Q &amp; A</a>"##));
    }

    #[test]
    fn test_render_callout() {
        let mut related = post("r1", &[], None);
        related.title = "<Budget> vote".to_string();
        let html = render_callout(1, &related).unwrap();
        assert!(html.contains(r#"class="related-post-container-1""#));
        assert!(html.contains(r#"<a href="/slug-r1">&lt;Budget&gt; vote</a>"#));
    }
}
