//! Tag positions in an HTML string.
//!
//! Post bodies are augmented in place, so the transform needs byte offsets into
//! the original markup rather than a re-serialized tree. The scanner follows the
//! tokenizer rules that matter for that: comments, doctypes and processing
//! instructions hold no tags, a `>` inside a quoted attribute value does not end
//! the tag, and `script` / `style` bodies are raw text.

/// Elements whose start tag closes an open paragraph.
const PARAGRAPH_CLOSERS: [&str; 29] = [
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    pub kind: TagKind,
    /// Lowercase element name.
    pub name: String,
    /// Offset of the `<`.
    pub start: usize,
    /// Offset right after the `>`.
    pub end: usize,
    /// Offset where the attribute text starts, right after the name.
    pub attrs_start: usize,
}

impl TagSpan {
    pub fn is_start(&self, name: &str) -> bool {
        self.kind == TagKind::Start && self.name == name
    }

    pub fn is_end(&self, name: &str) -> bool {
        self.kind == TagKind::End && self.name == name
    }

    /// Raw attribute text, without the closing `>` or a self-closing `/`.
    pub fn attrs<'a>(&self, html: &'a str) -> &'a str {
        let inner = &html[self.attrs_start..self.end.saturating_sub(1).max(self.attrs_start)];
        inner.strip_suffix('/').unwrap_or(inner)
    }
}

/// Offset right after the `>` closing a tag whose attributes start at `from`.
fn tag_end(html: &str, from: usize) -> usize {
    let mut quote: Option<u8> = None;
    let mut after_equals = false;

    for (offset, &b) in html.as_bytes()[from..].iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'>' => return from + offset + 1,
            b'"' | b'\'' if after_equals => quote = Some(b),
            b'=' => {
                after_equals = true;
                continue;
            }
            b if b.is_ascii_whitespace() => continue,
            _ => {}
        }
        after_equals = false;
    }
    html.len()
}

fn skip_past(html: &str, from: usize, pattern: &str) -> usize {
    match html[from..].find(pattern) {
        Some(found) => from + found + pattern.len(),
        None => html.len(),
    }
}

pub fn scan_tags(html: &str) -> Vec<TagSpan> {
    let bytes = html.as_bytes();
    let mut tags = vec![];
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }

        let rest = &html[pos..];
        if rest.starts_with("<!--") {
            pos = skip_past(html, pos + 4, "-->");
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            pos = skip_past(html, pos, ">");
            continue;
        }

        let tag_start = pos;
        let (kind, name_start) = if rest.starts_with("</") {
            (TagKind::End, pos + 2)
        } else {
            (TagKind::Start, pos + 1)
        };
        let name_len = bytes[name_start.min(bytes.len())..].iter()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
        if name_len == 0 || !bytes[name_start].is_ascii_alphabetic() {
            // A literal `<` in text.
            pos += 1;
            continue;
        }

        let attrs_start = name_start + name_len;
        let end = tag_end(html, attrs_start);
        let name = html[name_start..attrs_start].to_ascii_lowercase();

        pos = if kind == TagKind::Start && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let closing = format!("</{}", name);
            match html[end..].to_ascii_lowercase().find(&closing) {
                Some(found) => end + found,
                None => html.len(),
            }
        } else {
            end
        };

        tags.push(TagSpan { kind, name, start: tag_start, end, attrs_start });
    }
    tags
}

/// Offset where each paragraph ends: after its `</p>`, or where an element that
/// implicitly closes it begins, or at the end of the document.
pub fn paragraph_ends(html: &str, tags: &[TagSpan]) -> Vec<usize> {
    tags.iter().enumerate()
        .filter(|(_, tag)| tag.is_start("p"))
        .map(|(i, _)| {
            tags[i + 1..].iter()
                .find_map(|tag| match tag.kind {
                    TagKind::End if tag.name == "p" => Some(tag.end),
                    TagKind::Start if PARAGRAPH_CLOSERS.contains(&tag.name.as_str()) => Some(tag.start),
                    TagKind::End if tag.name != "p" && PARAGRAPH_CLOSERS.contains(&tag.name.as_str()) => Some(tag.start),
                    _ => None,
                })
                .unwrap_or(html.len())
        })
        .collect()
}

/// Byte ranges of each attribute inside `attrs`, with its lowercase name.
pub fn attribute_spans(attrs: &str) -> Vec<(usize, usize, String)> {
    let bytes = attrs.as_bytes();
    let mut spans = vec![];
    let mut pos = 0;

    let skip_ws = |mut p: usize| {
        while p < bytes.len() && bytes[p].is_ascii_whitespace() {
            p += 1;
        }
        p
    };

    loop {
        let start = pos;
        pos = skip_ws(pos);
        if pos >= bytes.len() {
            break;
        }

        let name_start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'=' && bytes[pos] != b'/' {
            pos += 1;
        }
        if pos == name_start {
            // Stray `/` or `=`.
            pos += 1;
            continue;
        }
        let name = attrs[name_start..pos].to_ascii_lowercase();

        let after_name = skip_ws(pos);
        if after_name < bytes.len() && bytes[after_name] == b'=' {
            pos = skip_ws(after_name + 1);
            match bytes.get(pos) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    pos = match attrs[pos + 1..].find(q as char) {
                        Some(found) => pos + 1 + found + 1,
                        None => bytes.len(),
                    };
                }
                _ => {
                    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                        pos += 1;
                    }
                }
            }
        }

        spans.push((start, pos, name));
    }
    spans
}

/// `attrs` without the named attribute, keeping everything else verbatim.
pub fn remove_attribute(attrs: &str, name: &str) -> String {
    let mut kept = String::with_capacity(attrs.len());
    let mut last = 0;
    for (start, end, attr) in attribute_spans(attrs) {
        if attr == name {
            kept.push_str(&attrs[last..start]);
            last = end;
        }
    }
    kept.push_str(&attrs[last..]);
    kept
}
