use std::collections::HashMap;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get_page(&self) -> u32 {
        self.items.get("page")
            .and_then(|val| val.trim().parse().ok())
            .filter(|&val: &u32| val > 0)
            .unwrap_or(1)
    }

    /// Search terms, `None` when absent or blank.
    pub fn get_query(&self) -> Option<&str> {
        self.items.get("q")
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
    }
}
