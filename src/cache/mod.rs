//! Persistent library cache
//!
//! Resolved libraries are stored one file per (alias, major):
//!
//! ```text
//! {cache_root}/
//! ├── foo/
//! │   ├── 1.2.3.sh
//! │   └── 2.5.0.sh
//! └── bar/
//!     └── 3.2.1.sh
//! ```
//!
//! Entries are only ever added on a miss; an existing entry is never
//! refreshed behind the user's back. `shmgr cache clear` drops entries so
//! the next load queries providers again.
//!
//! Writes go through a hidden temp file plus rename, so two shmgr processes
//! resolving the same library at once both observe either nothing or a
//! complete file.

mod store;

pub use store::{format_bytes, CacheEntry, CacheEntryInfo, LibraryCache, LIBRARY_EXT};
