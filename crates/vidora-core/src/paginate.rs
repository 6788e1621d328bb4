use vidora_types::api::Page;

use crate::config::CoreConfig;

/// A normalized page/limit pair. Always `page >= 1` and
/// `1 <= limit <= max_page_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Page below 1 becomes 1, a missing or non-positive limit becomes the
    /// default, and an oversized one is clamped.
    pub fn new(page: Option<i64>, limit: Option<i64>, config: &CoreConfig) -> Self {
        let max = config.max_page_limit.max(1);
        let page = page.filter(|p| *p >= 1).map_or(1, |p| p as u64);
        let limit = limit
            .filter(|l| *l >= 1)
            .map_or(config.default_page_limit, |l| l as u64)
            .clamp(1, max);
        Self { page, limit }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn skip(&self) -> usize {
        usize::try_from((self.page - 1).saturating_mul(self.limit)).unwrap_or(usize::MAX)
    }
}

/// Cut one page out of a fully filtered, sorted and joined sequence.
///
/// Exact-size sources are skipped with `nth`, so rows before the page are
/// never materialized. Other sources are counted in a single pass.
pub fn paginate<I>(seq: I, req: PageRequest) -> Page<I::Item>
where
    I: Iterator,
{
    let skip = req.skip();
    let take = usize::try_from(req.limit).unwrap_or(usize::MAX);

    let (lower, upper) = seq.size_hint();
    let (items, total) = if upper == Some(lower) {
        let items: Vec<_> = seq.skip(skip).take(take).collect();
        (items, lower as u64)
    } else {
        let mut items = Vec::new();
        let mut total: u64 = 0;
        for (idx, item) in seq.enumerate() {
            if idx >= skip && items.len() < take {
                items.push(item);
            }
            total += 1;
        }
        (items, total)
    };

    let total_pages = total.div_ceil(req.limit);
    Page {
        items,
        total_items: total,
        total_pages,
        current_page: req.page,
        limit: req.limit,
        has_next: req.page < total_pages,
        has_prev: req.page > 1,
    }
}
