// src/fetch/mod.rs

pub mod page;
pub mod snapshot;

pub use page::{build_client, fetch_page, FetchConfig, FetchedPage, FARSIDE_BTC_URL};
pub use snapshot::save_snapshot;
