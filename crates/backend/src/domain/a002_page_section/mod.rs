pub mod error;
pub mod render;
pub mod repository;
pub mod service;

pub use error::PageSectionError;
