//! A fixed-bucket separate-chaining hash table.
//!
//! ```
//! use nodict::Table;
//!
//! let mut table = Table::new();
//! table.add("Zeppo", 54);
//! table.add("Zeppo", 56);
//! assert_eq!(table.get("Zeppo"), Ok(&56));
//! assert_eq!(table.len(), 1);
//! ```

mod entry;
mod error;
mod hash;
mod map;

pub use entry::Entry;
pub use error::{Error, KeyNotFound, Result};
pub use hash::DefaultHashBuilder;
pub use map::{Bucket, Table, DEFAULT_BUCKET_COUNT};
