//! Feed algorithms: cursor pagination assembly and trending ranking.
//!
//! Both are pure functions over rows a repository has already fetched;
//! nothing here touches the store or holds state between calls.

mod pagination;
mod trending;

pub use pagination::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page, clamp_limit, paginate};
pub use trending::{TRENDING_WINDOW_DAYS, rank_trending, trending_score, window_start};
