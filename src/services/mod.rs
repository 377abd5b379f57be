//! 服务模块

pub mod ask;
pub mod cache;
pub mod fetcher;
pub mod source;

pub use ask::{AskOutcome, AskService, create_ask_service};
pub use cache::{CacheStats, DirectoryCache};
pub use fetcher::{DirectoryFetcher, FetchOutcome, create_directory_fetcher};
pub use source::{HttpMessageSource, MessageSource, StaticMessageSource, create_message_source};
