use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::model::Post;

lazy_static! {
    static ref MOBILE_UA_REGEX: Regex = Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini").unwrap();
    static ref IMG_SRC_REGEX: Regex = Regex::new(r#"(?i)<img[^>]+src=["']([^"'>]+)["']"#).unwrap();
}

pub const MOBILE_SRCSET_WIDTHS: [u32; 4] = [320, 480, 640, 800];
pub const MOBILE_SIZES: &str = "(max-width: 480px) 400px, (max-width: 640px) 600px, (max-width: 768px) 750px, 800px";

const DESKTOP_QUALITY: u32 = 75;
const MOBILE_QUALITY: u32 = 60;
const MOBILE_MAX_WIDTH: u32 = 800;
const MOBILE_MAX_HEIGHT: u32 = 600;
const SRCSET_BASE_WIDTH: u32 = 800;
const SRCSET_BASE_HEIGHT: u32 = 400;

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    MOBILE_UA_REGEX.is_match(user_agent)
}

/// Absolute URL for an image path coming from the backend.
pub fn resolve_image_url(path: &str, image_base_url: &str) -> String {
    if path.starts_with("http") {
        return path.to_string();
    }
    let separator = if path.starts_with('/') { "" } else { "/" };
    format!("{}{}{}", image_base_url, separator, path)
}

pub fn first_content_image(html: &str) -> Option<&str> {
    IMG_SRC_REGEX.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Candidate images of a post, best first, without duplicates: SEO image,
/// featured image, uploaded images, then the first image of the body.
pub fn image_candidates(post: &Post, image_base_url: &str) -> Vec<String> {
    let mut candidates: Vec<String> = vec![];
    let sources = post.seo.meta_image.iter()
        .chain(post.featured_image.iter())
        .map(|s| s.as_str())
        .chain(post.image_urls.iter().map(|s| s.as_str()))
        .chain(first_content_image(&post.content));

    for source in sources {
        let url = resolve_image_url(source, image_base_url);
        if !candidates.contains(&url) {
            candidates.push(url);
        }
    }
    candidates
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: u32,
    pub format: &'static str,
}

impl ImageParams {
    pub fn for_device(mobile: bool, width: Option<u32>, height: Option<u32>) -> Self {
        if !mobile {
            return ImageParams { width, height, quality: DESKTOP_QUALITY, format: "webp" };
        }
        ImageParams {
            width: Some(width.unwrap_or(MOBILE_MAX_WIDTH).min(MOBILE_MAX_WIDTH)),
            height: Some(height.unwrap_or(MOBILE_MAX_HEIGHT).min(MOBILE_MAX_HEIGHT)),
            quality: MOBILE_QUALITY,
            format: "webp",
        }
    }
}

fn is_transforming_cdn(src: &str) -> bool {
    if !src.starts_with("http") {
        return false;
    }
    Url::parse(src).ok()
        .and_then(|url| url.host_str().map(|h| h.contains("amazonaws.com") || h.contains("cloudfront")))
        .unwrap_or(false)
}

/// Adds resize parameters for CDNs that understand them; other URLs are
/// returned untouched.
pub fn optimized_url(src: &str, params: &ImageParams) -> String {
    if !is_transforming_cdn(src) {
        return src.to_string();
    }

    let mut query: Vec<(&str, String)> = vec![];
    if let Some(w) = params.width {
        query.push(("w", w.to_string()));
    }
    if let Some(h) = params.height {
        query.push(("h", h.to_string()));
    }
    query.push(("q", params.quality.to_string()));
    query.push(("f", params.format.to_string()));

    let encoded = match serde_urlencoded::to_string(&query) {
        Ok(encoded) => encoded,
        Err(_) => return src.to_string(),
    };
    let separator = if src.contains('?') { '&' } else { '?' };
    format!("{}{}{}", src, separator, encoded)
}

/// Width-descriptor srcset for mobile devices, keeping the aspect ratio of
/// `width` x `height`.
pub fn mobile_srcset(src: &str, width: Option<u32>, height: Option<u32>) -> String {
    let base_width = width.unwrap_or(SRCSET_BASE_WIDTH).max(1) as f64;
    let base_height = height.unwrap_or(SRCSET_BASE_HEIGHT) as f64;

    MOBILE_SRCSET_WIDTHS.iter()
        .map(|&w| {
            let h = (base_height * (w as f64 / base_width)).round() as u32;
            let params = ImageParams { width: Some(w), height: Some(h), quality: MOBILE_QUALITY, format: "webp" };
            format!("{} {}w", optimized_url(src, &params), w)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
