//! Durable roster and assignment history for Rota.
//!
//! ```text
//! HistoryStore (owns one rusqlite::Connection)
//! ├── students     roster entries + hidden flag
//! └── assignments  immutable (main, assistant, date) events
//! ```
//!
//! The store exposes raw aggregates (last activity, last pairing) and hands
//! them back ordered by [`rota_types::ranking`].

mod error;
mod history_store;
mod sqlite_util;

pub use error::StoreError;
pub use history_store::HistoryStore;
