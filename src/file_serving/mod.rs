pub mod handlers;
pub mod listing;
pub mod path_utils;
pub mod static_files;

pub use handlers::{GzipHandler, Served};
pub use static_files::StaticHandler;
