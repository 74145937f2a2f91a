//! Trait definitions for Favro operations.
//!
//! Each entity type implements the traits it supports, encapsulating
//! endpoint differences in the implementations.

mod delete;
mod get;
mod list;
mod update;

pub use delete::Delete;
pub use get::Get;
pub use list::List;
pub use update::Update;

/// Percent-encode an id for use as a path segment.
pub(crate) fn entity_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id))
}
