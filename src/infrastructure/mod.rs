//! Infrastructure layer - storage, page scraping and notifications

pub mod storage;
pub mod scraper;
pub mod notify;
