//! Post body augmentation: heading anchors, table of contents and related-post
//! callouts, computed as a transform from one HTML string to another.
//!
//! Every injected block is wrapped in marker comments so that a previous
//! augmentation can be reverted before injecting again.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;
use spdlog::warn;

use crate::html_tags::{paragraph_ends, remove_attribute, scan_tags, TagKind};
use crate::model::Post;
use crate::view::fragment_renderer::{render_callout, render_toc};

const MARK_START: &str = "<!--newsroom:augment-->";
const MARK_END: &str = "<!--/newsroom:augment-->";

pub const MAX_CALLOUTS: usize = 3;
const MIN_PARAGRAPHS: usize = 3;
const FIRST_CALLOUT_PARAGRAPH: usize = 2;
const CALLOUT_STRIDE: usize = 3;

lazy_static! {
    static ref MARKED_REGEX: Regex = Regex::new(r"(?s)<!--newsroom:augment-->.*?<!--/newsroom:augment-->").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_SLUG_REGEX: Regex = Regex::new(r"[^a-z0-9_-]").unwrap();
    static ref HYPHENS_REGEX: Regex = Regex::new(r"-{2,}").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadingEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

#[derive(Debug)]
pub struct Augmented {
    pub html: String,
    pub outline: Vec<HeadingEntry>,
}

pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let dashed = WHITESPACE_REGEX.replace_all(&lower, "-");
    let cleaned = NON_SLUG_REGEX.replace_all(&dashed, "");
    let collapsed = HYPHENS_REGEX.replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}

fn heading_text(inner_html: &str) -> String {
    let fragment = Html::parse_fragment(inner_html);
    let text: String = fragment.root_element().text().collect();
    WHITESPACE_REGEX.replace_all(text.trim(), " ").to_string()
}

/// Gives every h2/h3 an `id` derived from its text, replacing any id it had.
/// Two headings with the same text end up with the same id. A heading that is
/// never closed is left as is.
pub fn assign_heading_ids(html: &str) -> (String, Vec<HeadingEntry>) {
    let tags = scan_tags(html);
    let mut outline = vec![];
    let mut out = String::with_capacity(html.len());
    let mut copied = 0;

    let mut i = 0;
    while i < tags.len() {
        let open = &tags[i];
        let level: u8 = match (open.kind, open.name.as_str()) {
            (TagKind::Start, "h2") => 2,
            (TagKind::Start, "h3") => 3,
            _ => {
                i += 1;
                continue;
            }
        };
        let Some(close_at) = tags[i + 1..].iter()
            .position(|t| t.is_end("h2") || t.is_end("h3"))
            .map(|p| i + 1 + p) else {
            break;
        };
        let close = &tags[close_at];

        let attrs = remove_attribute(open.attrs(html), "id");
        let inner = &html[open.end..close.start];
        let text = heading_text(inner);
        let id = slugify(&text);

        out.push_str(&html[copied..open.start]);
        out.push_str(&format!("<h{}{} id=\"{}\">{}</h{}>", level, attrs, id, inner, level));
        copied = close.end;
        outline.push(HeadingEntry { id, text, level });

        i = close_at + 1;
    }
    out.push_str(&html[copied..]);

    (out, outline)
}

pub fn strip_augmentation(html: &str) -> String {
    MARKED_REGEX.replace_all(html, "").into_owned()
}

fn marked(fragment: String) -> String {
    format!("{}{}{}", MARK_START, fragment, MARK_END)
}

/// Paragraph indices receiving a callout, one per related post.
pub fn callout_positions(paragraph_count: usize, related_count: usize) -> Vec<usize> {
    if paragraph_count < MIN_PARAGRAPHS {
        return vec![];
    }
    (0..related_count.min(MAX_CALLOUTS))
        .map(|i| FIRST_CALLOUT_PARAGRAPH + i * CALLOUT_STRIDE)
        .filter(|&p| p < paragraph_count)
        .collect()
}

/// Full augmentation of a post body. Idempotent: a body that was already
/// augmented is reverted first.
pub fn augment(html: &str, related: &[&Post]) -> Augmented {
    let clean = strip_augmentation(html);
    let (mut html, outline) = assign_heading_ids(&clean);

    let tags = scan_tags(&html);
    let mut insertions: Vec<(usize, String)> = vec![];

    if !outline.is_empty() {
        if let Some(img) = tags.iter().find(|t| t.is_start("img")) {
            match render_toc(&outline) {
                Ok(toc) => insertions.push((img.end, marked(toc))),
                Err(e) => warn!("Skipping table of contents: {}", e),
            }
        }
    }

    let ends = paragraph_ends(&html, &tags);
    for (rank, position) in callout_positions(ends.len(), related.len()).into_iter().enumerate() {
        match render_callout(rank, related[rank]) {
            Ok(callout) => insertions.push((ends[position], marked(callout))),
            Err(e) => warn!("Skipping related post callout: {}", e),
        }
    }

    insertions.sort_by(|a, b| b.0.cmp(&a.0));
    for (offset, fragment) in insertions {
        html.insert_str(offset, &fragment);
    }

    Augmented { html, outline }
}
