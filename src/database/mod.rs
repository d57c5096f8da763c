pub mod manager;
pub mod models;
pub mod query_builder;
pub mod record;
pub mod repository;
pub mod resource;

pub use manager::{DatabaseError, DatabaseManager};
pub use record::{Record, RecordError, RecordUpdate, SqlValue};
pub use repository::Repository;
pub use resource::{Access, Resource, ResourceDescriptor, Scope};
