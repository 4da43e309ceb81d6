//! Constants describing the import syntax being scanned and the defaults used
//! when no explicit configuration is given.
//!
//! ## Statement shape
//!
//! An import statement starts with [`USE_KEYWORD`] at column zero and ends at the
//! first [`TERMINATOR`] outside of a line comment. Paths inside it are separated
//! by [`PATH_SEPARATOR`] and may contain `{...}` groups.

/// Keyword (including the trailing space) that introduces an import statement
pub const USE_KEYWORD: &str = "use ";

/// Character that ends an import statement
pub const TERMINATOR: char = ';';

/// Token separating path segments
pub const PATH_SEPARATOR: &str = "::";

/// Marker that starts a line comment
pub const LINE_COMMENT: &str = "//";

/// Upper bound on worklist steps spent expanding a single statement
pub const MAX_EXPANSION_STEPS: usize = 4096;

/// Module prefixes watched when no watchlist is configured, in match order
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "std::env",
    "std::fs",
    "std::net",
    "std::os",
    "std::path",
    "std::process",
];

/// File extensions scanned when none are configured
pub const SOURCE_EXTENSIONS: &[&str] = &["rs"];
