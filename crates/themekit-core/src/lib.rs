pub mod backup;
pub mod config;
pub mod error;
pub mod io;
pub mod lock;
pub mod mapping;
pub mod paths;
pub mod rebuild;
pub mod render;
pub mod rewrite;
pub mod scanner;
pub mod store;
pub mod taxonomy;
pub mod theme;

pub use error::{Result, ThemeError};
