use std::collections::HashSet;

use spdlog::debug;

use crate::model::{Pagination, Post, PostId, PostPage};

#[derive(Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Number of posts that were new to the feed.
    Appended(usize),
    Stale { expected: u32, received: u32 },
}

/// Accumulated post list behind "load more". Pages must arrive in order; the
/// page cursor never moves backwards.
#[derive(Debug)]
pub struct PostFeed {
    posts: Vec<Post>,
    seen: HashSet<PostId>,
    current_page: u32,
    total_pages: u32,
}

impl PostFeed {
    pub fn empty() -> Self {
        PostFeed {
            posts: vec![],
            seen: HashSet::new(),
            current_page: 0,
            total_pages: 1,
        }
    }

    pub fn next_page(&self) -> u32 {
        self.current_page + 1
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn append(&mut self, page: PostPage) -> AppendOutcome {
        let expected = self.next_page();
        let received = page.pagination.current_page;
        if received != expected {
            debug!("Discarding feed page {} while expecting {}", received, expected);
            return AppendOutcome::Stale { expected, received };
        }

        let before = self.posts.len();
        for post in page.posts {
            if self.seen.insert(post.id.clone()) {
                self.posts.push(post);
            }
        }

        self.current_page = received;
        self.total_pages = page.pagination.total_pages.max(received);
        AppendOutcome::Appended(self.posts.len() - before)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}
