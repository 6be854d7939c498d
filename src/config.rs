use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Site {
    pub name: String,
    /// Public URL of the site, without trailing slash.
    pub base_url: String,
    /// Prefix for relative image paths coming from the backend.
    pub image_base_url: String,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub pages_dir: PathBuf,
}

fn default_timeout_secs() -> u64 { 10 }
fn default_corpus_limit() -> u32 { 100 }
fn default_page_limit() -> u32 { 20 }

#[derive(Deserialize)]
pub struct Backend {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How many posts are loaded as the corpus for related / latest lists.
    #[serde(default = "default_corpus_limit")]
    pub corpus_limit: u32,
    /// Page size of the front page feed.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Cache {
    pub categories_ttl_secs: u64,
    pub tags_ttl_secs: u64,
    pub posts_ttl_secs: u64,
    pub post_ttl_secs: u64,
    pub category_posts_ttl_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Cache {
            categories_ttl_secs: 300,
            tags_ttl_secs: 600,
            posts_ttl_secs: 300,
            post_ttl_secs: 600,
            category_posts_ttl_secs: 180,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Layout {
    pub chunk_size: usize,
    pub slider_size: usize,
    pub sidebar_size: usize,
    pub panel_count: usize,
    pub panel_size: usize,
    pub category_page_size: u32,
    pub excluded_category_slugs: HashSet<String>,
    pub preferred_category_slug: Option<String>,
    pub excluded_tag_names: HashSet<String>,
    pub trending_tag_count: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            chunk_size: 3,
            slider_size: 4,
            sidebar_size: 4,
            panel_count: 3,
            panel_size: 5,
            category_page_size: 12,
            excluded_category_slugs: HashSet::new(),
            preferred_category_slug: None,
            excluded_tag_names: HashSet::new(),
            trending_tag_count: 3,
        }
    }
}

impl Layout {
    pub fn is_excluded_slug(&self, slug: &str) -> bool {
        self.excluded_category_slugs.contains(slug)
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Feed {
    /// Upper bound for `?page=N` on the front page.
    pub max_pages: u32,
}

impl Default for Feed {
    fn default() -> Self {
        Feed { max_pages: 10 }
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    pub backend: Backend,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub feed: Feed,
    pub server: Server,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
    match exe_dir {
        Some(exe_dir) => PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())),
        None => path,
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
        pages_dir: parse_path(cfg.paths.pages_dir),
    };
    cfg.site.base_url = cfg.site.base_url.trim_end_matches('/').to_string();
    cfg.backend.base_url = cfg.backend.base_url.trim_end_matches('/').to_string();

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[site]
name = "Spread The Word"
base_url = "https://example.org/"
image_base_url = "https://cdn.example.org"

[paths]
template_dir = "res/template"
public_dir = "res/public"
pages_dir = "res/pages"

[backend]
base_url = "https://api.example.org/api/"

[server]
address = "0.0.0.0"
port = 8001
"#;

    #[test]
    fn test_defaults() {
        let cfg = parse_config(MINIMAL).unwrap();
        assert_eq!(cfg.site.base_url, "https://example.org");
        assert_eq!(cfg.backend.base_url, "https://api.example.org/api");
        assert_eq!(cfg.backend.timeout_secs, 10);
        assert_eq!(cfg.backend.page_limit, 20);
        assert_eq!(cfg.cache.categories_ttl_secs, 300);
        assert_eq!(cfg.cache.category_posts_ttl_secs, 180);
        assert_eq!(cfg.layout.chunk_size, 3);
        assert_eq!(cfg.layout.slider_size, 4);
        assert!(cfg.layout.excluded_category_slugs.is_empty());
        assert_eq!(cfg.feed.max_pages, 10);
        assert!(cfg.log.is_none());
    }

    #[test]
    fn test_layout_section() {
        let content = format!("{}\n{}", MINIMAL, r#"
[layout]
excluded_category_slugs = ["divertissement"]
preferred_category_slug = "actualites"
excluded_tag_names = ["romeo"]
"#);
        let cfg = parse_config(&content).unwrap();
        assert!(cfg.layout.is_excluded_slug("divertissement"));
        assert!(!cfg.layout.is_excluded_slug("sport"));
        assert_eq!(cfg.layout.preferred_category_slug.as_deref(), Some("actualites"));
        assert_eq!(cfg.layout.sidebar_size, 4);
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[site]\nname = 1").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_sample_config_parses() {
        let cfg = parse_config(include_str!("../res/newsroom.toml")).unwrap();
        assert_eq!(cfg.server.port, 8001);
    }
}
