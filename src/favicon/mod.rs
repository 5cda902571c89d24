//! Favicon fingerprinting.
//!
//! - [`hash`]: canonical base-64 encoding and MurmurHash3, the part that has
//!   to agree bit for bit with the search indexes.
//! - [`resolver`]: turns a URL or file into icon bytes (page → declared icon →
//!   `/favicon.ico`), recording every request made.
//! - [`markup`]: `<link rel="icon">` lookup in HTML.
//! - [`fetch`]: the HTTP transport behind the resolver.

pub mod fetch;
pub mod hash;
pub mod markup;
pub mod resolver;
