pub mod aggregate;
pub mod snapshot;

pub use aggregate::{Category, CategoryDto};
pub use snapshot::CatalogSnapshot;
