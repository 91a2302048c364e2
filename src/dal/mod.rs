pub mod dataset_db;

pub use dataset_db::*;
