pub mod extract;

pub use extract::{ApiJson, QueryParams, RecordId};
