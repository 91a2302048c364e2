pub mod companion_client;
pub mod crawl_error;
pub mod crawler;
pub mod droid;
pub mod frontier;
pub mod page;
pub mod pagination;

pub use companion_client::*;
pub use crawl_error::*;
pub use crawler::*;
pub use droid::*;
pub use frontier::*;
pub use page::*;
pub use pagination::*;
