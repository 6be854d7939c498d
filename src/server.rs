use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use lazy_static::lazy_static;
use ntex::http::header;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use regex::Regex;
use spdlog::{error, info, warn};

use crate::assembler::{assemble_category, assemble_front, assemble_post, visible_posts};
use crate::backend::{BackendClient, ContentSource};
use crate::classifier::{classify, SlugMatch};
use crate::config::Config;
use crate::image::is_mobile_user_agent;
use crate::model::{Category, Tag};
use crate::query_string::QueryString;
use crate::search::search;
use crate::view::category_renderer::CategoryRenderer;
use crate::view::front_renderer::{FrontRenderer, SearchResults};
use crate::view::page_renderer::{page_title, PageRenderer};
use crate::view::post_renderer::PostRenderer;
use crate::view::{parse_template, ViewContext};

lazy_static! {
    static ref SLUG_REGEX: Regex = Regex::new(r"^[\w-]+$").unwrap();
}

const CRITICAL_CSS_FILE: &str = "critical.css";
const PAGE_EXTENSION: &str = "html";
const NOT_FOUND_TITLE: &str = "Page not found";

struct Templates {
    index: String,
    category: String,
    post: String,
    page: String,
    not_found: String,
}

struct AppState {
    config: Config,
    backend: BackendClient,
    page_links: HashMap<String, PathBuf>,
    templates: Templates,
    critical_css: Option<String>,
}

impl AppState {
    fn context<'a>(&'a self, req: &HttpRequest, categories: &'a [Category], tags: &'a [Tag]) -> ViewContext<'a> {
        ViewContext {
            site: &self.config.site,
            layout: &self.config.layout,
            categories,
            tags,
            mobile: is_mobile(req),
        }
    }

    /// Inlined only for mobile user agents.
    fn critical_css(&self, context: &ViewContext) -> Option<&str> {
        if context.mobile {
            self.critical_css.as_deref()
        } else {
            None
        }
    }
}

fn is_mobile(req: &HttpRequest) -> bool {
    req.headers().get(header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(is_mobile_user_agent)
        .unwrap_or(false)
}

fn query_string(req: &HttpRequest) -> QueryString {
    QueryString::from(req.uri().query().unwrap_or(""))
}

fn html_response(rendered: String) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

fn error_response(err: io::Error) -> web::HttpResponse {
    error!("Error rendering page: {}", err);
    web::HttpResponse::InternalServerError()
        .body(format!("Error rendering page: {}", err))
}

fn not_found(state: &AppState, context: &ViewContext) -> web::HttpResponse {
    match PageRenderer::new(&state.templates.not_found) {
        Ok(renderer) => web::HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(renderer.render(context, NOT_FOUND_TITLE, "")),
        Err(e) => error_response(e),
    }
}

// Begin: Redirect region --------
#[web::get("/page/{page}")]
async fn page_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", format!("/page/{}/", path.into_inner()))
        .content_type("text/html; charset=utf-8")
        .finish()
}

#[web::get("/{slug}/")]
async fn slug_with_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", format!("/{}", path.into_inner()))
        .content_type("text/html; charset=utf-8")
        .finish()
}
// End: Redirect region --------

fn render_static_page(state: &AppState, context: &ViewContext, page_path: &Path) -> io::Result<String> {
    let content = match fs::read_to_string(page_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error reading page {}: {}", page_path.display(), e))),
    };
    let title = page_title(&content).unwrap_or(&state.config.site.name).to_string();
    let renderer = PageRenderer::new(&state.templates.page)?;
    Ok(renderer.render(context, &title, &content))
}

#[web::get("/page/{page}/")]
async fn page(req: HttpRequest, page_name: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let page_name = page_name.into_inner();
    let (categories, tags) = tokio::join!(state.backend.categories(), state.backend.tags());
    let context = state.context(&req, &categories, &tags);

    let Some(page_path) = state.page_links.get(&page_name) else {
        return not_found(&state, &context);
    };

    match render_static_page(&state, &context, page_path) {
        Ok(rendered) => html_response(rendered),
        Err(e) => error_response(e),
    }
}

#[web::get("/robots.txt")]
async fn robots(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    match state.backend.robots_txt().await {
        Some(body) => web::HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .header("Cache-Control", "public, max-age=86400")
            .body(body),
        None => web::HttpResponse::InternalServerError()
            .content_type("text/plain; charset=utf-8")
            .body("Error fetching robots.txt"),
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

#[web::get("/")]
async fn index(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let config = &state.config;
    let qs = query_string(&req);
    let pages = qs.get_page().min(config.feed.max_pages.max(1));

    let front = assemble_front(&state.backend, pages, config).await;
    let context = state.context(&req, &front.categories, &front.tags);
    let visible = visible_posts(front.feed.posts(), &front.categories, config);

    let results = qs.get_query().and_then(|query| {
        search(visible.iter().copied(), query, &front.categories, &front.tags, &config.layout)
            .map(|posts| SearchResults { query, posts })
    });

    match FrontRenderer::new(&state.templates.index) {
        Ok(renderer) => html_response(renderer.render(&context,
                                                      &visible,
                                                      front.feed.pagination(),
                                                      results,
                                                      state.critical_css(&context))),
        Err(e) => error_response(e),
    }
}

#[web::get("/{slug}")]
async fn slug_page(req: HttpRequest, path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let slug = path.into_inner();

    if let Some(page_path) = state.page_links.get(&slug) {
        let (categories, tags) = tokio::join!(state.backend.categories(), state.backend.tags());
        let context = state.context(&req, &categories, &tags);
        return match render_static_page(&state, &context, page_path) {
            Ok(rendered) => html_response(rendered),
            Err(e) => error_response(e),
        };
    }

    let matched = if SLUG_REGEX.is_match(&slug) {
        classify(&state.backend, &slug).await
    } else {
        SlugMatch::NotFound
    };

    match matched {
        SlugMatch::Category(category) => {
            let Some(data) = assemble_category(&state.backend, &category.slug).await else {
                return not_found_with_navigation(&state, &req).await;
            };
            let context = state.context(&req, &data.categories, &data.tags);
            let cur_page = query_string(&req).get_page();
            match CategoryRenderer::new(&state.templates.category, state.config.layout.category_page_size) {
                Ok(renderer) => html_response(renderer.render(&context, &data.category, &data.posts, cur_page)),
                Err(e) => error_response(e),
            }
        }
        SlugMatch::Post(post) => {
            let data = assemble_post(&state.backend, post, &state.config).await;
            let context = state.context(&req, &data.categories, &data.tags);
            match PostRenderer::new(&state.templates.post) {
                Ok(renderer) => html_response(renderer.render(&context, &data, state.critical_css(&context))),
                Err(e) => error_response(e),
            }
        }
        SlugMatch::NotFound => {
            info!("No category or post for slug {}", slug);
            not_found_with_navigation(&state, &req).await
        }
    }
}

async fn not_found_with_navigation(state: &AppState, req: &HttpRequest) -> web::HttpResponse {
    let categories = state.backend.categories().await;
    let context = state.context(req, &categories, &[]);
    not_found(state, &context)
}

fn read_template(template_dir: &Path, file_name: &str) -> io::Result<String> {
    let template_path = template_dir.join(file_name);
    let source = match fs::read_to_string(&template_path) {
        Ok(source) => source,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error reading template {}: {}", template_path.display(), e))),
    };
    parse_template(&source, file_name)?;
    Ok(source)
}

fn load_templates(template_dir: &Path) -> io::Result<Templates> {
    Ok(Templates {
        index: read_template(template_dir, "index.tpl")?,
        category: read_template(template_dir, "category.tpl")?,
        post: read_template(template_dir, "post.tpl")?,
        page: read_template(template_dir, "page.tpl")?,
        not_found: read_template(template_dir, "not_found.tpl")?,
    })
}

/// Static pages by name: `about.html` is served as `/about` and `/page/about/`.
pub fn list_pages(pages_dir: &Path) -> io::Result<HashMap<String, PathBuf>> {
    let mut page_links = HashMap::new();
    if !pages_dir.is_dir() {
        warn!("Pages directory {} not found. No static pages will be served", pages_dir.display());
        return Ok(page_links);
    }

    for entry in fs::read_dir(pages_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(PAGE_EXTENSION) {
            continue;
        }
        if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
            page_links.insert(name.to_string(), path.clone());
        }
    }
    Ok(page_links)
}

fn read_critical_css(public_dir: &Path) -> Option<String> {
    let css_path = public_dir.join(CRITICAL_CSS_FILE);
    match fs::read_to_string(&css_path) {
        Ok(css) if !css.trim().is_empty() => Some(css),
        Ok(_) => None,
        Err(e) => {
            info!("No critical CSS loaded from {}: {}", css_path.display(), e);
            None
        }
    }
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let templates = load_templates(&config.paths.template_dir)?;
    let page_links = list_pages(&config.paths.pages_dir)?;
    for page_name in page_links.keys() {
        info!("Page: {}", page_name);
    }

    let backend = match BackendClient::new(&config.backend, &config.cache) {
        Ok(backend) => backend,
        Err(e) => return Err(io::Error::new(ErrorKind::Other, format!("{:#}", e))),
    };
    let critical_css = read_critical_css(&config.paths.public_dir);

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        config,
        backend,
        page_links,
        templates,
        critical_css,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(robots)
            .service(public_files)
            .service(page)
            .service(page_wo_slash)
            .service(slug_page)
            .service(slug_with_slash)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
