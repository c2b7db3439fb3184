pub mod loader;
pub mod reshape;
pub mod row;
pub mod validate;

pub use loader::{ContentLoader, ContentSource, LoadOutcome, RetryPolicy};
pub use reshape::{link_key, ContentScope, ContentTree, LinkTypes};
pub use row::{ContentRow, ContentType, LinkType};
