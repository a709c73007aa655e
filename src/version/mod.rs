//! Version model
//!
//! [`LibVersion`] is the full `MAJOR.MINOR.PATCH` version a provider offers.
//! [`LibraryRequest`] is a parsed `alias:version` token, where the version pins one
//! major and sets a minimum minor/patch inside it ([`VersionFloor`]).

mod request;
mod semver;

pub use request::{validate_alias, LibraryRequest, VersionFloor};
pub use semver::LibVersion;
