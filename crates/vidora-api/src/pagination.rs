use serde::Deserialize;

use vidora_core::{Engine, PageRequest};

/// `page` / `limit` as raw strings. Anything unparsable falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn request(&self, engine: &Engine) -> PageRequest {
        engine.page_request(parse_num(&self.page), parse_num(&self.limit))
    }
}

fn parse_num(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(|s| s.trim().parse().ok())
}
