//! Persistence boundary
//!
//! The relational store itself lives outside this crate; this module defines
//! the record shape it receives and the sink trait that delivers it.

mod record;
mod sink;

pub use record::{hash_content, parse_embedding, DocumentRecord};
pub use sink::{DocumentSink, JsonLinesSink, MemorySink};
