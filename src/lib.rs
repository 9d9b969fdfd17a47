// Library interface for dokkan_scraper
// The binary and the integration tests both go through these modules

pub mod api;
pub mod config;
pub mod crawler;
pub mod dom;
pub mod error;
pub mod extract;
pub mod harvest;
pub mod http_client;
pub mod models;
pub mod store;
pub mod text;

pub use error::{Result, ScrapeError};
pub use extract::{extract_character, extract_character_page};
pub use harvest::{harvest, harvest_page};
pub use models::{Character, Transformation, SENTINEL};
