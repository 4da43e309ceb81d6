//! Core parsing for usewatch.
//!
//! This crate turns raw source text into watched imports, in three steps:
//! - Reassembling `use` statements that span several lines
//! - Expanding `{...}` groups into fully-qualified paths
//! - Classifying each path against an ordered watchlist of module prefixes
//!
//! Nothing here touches the filesystem or decides how problems are reported;
//! malformed statements come back as [`ParseError`] values.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use usewatch_core::{Watchlist, expand_statement, statements};
//!
//! let watchlist = Watchlist::default();
//! let source = "use std::{\n    fs, // filesystem access\n    net,\n};\n";
//!
//! for stmt in statements(Path::new("src/lib.rs"), source) {
//!     let Ok(expansion) = expand_statement(&stmt.text) else { continue };
//!     for path in &expansion.paths {
//!         if let Some(hit) = watchlist.classify(path) {
//!             println!("{} -> {}", path, hit.entry);
//!         }
//!     }
//! }
//! ```

mod classifier;
mod constants;
mod error;
mod parser;
mod statement;
mod types;

// Re-export public API
pub use classifier::{Classification, Watchlist};
pub use constants::{DEFAULT_WATCHLIST, MAX_EXPANSION_STEPS, SOURCE_EXTENSIONS};
pub use error::ParseError;
pub use parser::expand_statement;
pub use statement::{Statements, statements};
pub use types::{Expansion, ImportPath, RawStatement, WatchEntry};
