//! Core of calindex: an in-memory, date-indexed view over iCalendar files.
//!
//! - `ics` decodes files into raw-preserving documents and encodes events
//! - `store` loads calendar files, answers date queries and writes changes back
//! - `query` searches by name and date range

pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod index;
pub mod query;
pub mod source;
pub mod store;
pub mod time;

pub use config::StoreConfig;
pub use error::{CalIndexError, CalIndexResult};
pub use event::{Event, EventRecord};
pub use index::EventIndex;
pub use query::{SearchRequest, search_by_name, search_in_range};
pub use source::Source;
pub use store::Store;
