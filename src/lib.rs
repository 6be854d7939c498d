pub mod config;
pub mod logger;
pub mod server;
pub mod backend;
pub mod model;
mod content_cache;
mod text_utils;
mod classifier;
mod assembler;
mod layout;
mod related;
mod augment;
mod html_tags;
mod feed;
mod search;
mod image;
mod paginator;
mod query_string;
mod view;
#[cfg(test)]
mod test_data;
