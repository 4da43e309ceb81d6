use log::trace;

use crate::{
    constants::DEFAULT_WATCHLIST,
    types::{ImportPath, WatchEntry},
};

/// Ordered list of watched module prefixes.
///
/// Order matters: when a path matches several entries the first one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    entries: Vec<WatchEntry>,
}

/// Outcome of classifying a path that matched at least one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    pub entry: &'a WatchEntry,
    /// Later entries that also matched
    pub also_matched: Vec<&'a WatchEntry>,
}

impl Classification<'_> {
    pub fn is_ambiguous(&self) -> bool {
        !self.also_matched.is_empty()
    }
}

impl Watchlist {
    /// Build a watchlist from prefix patterns, skipping blank ones.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = patterns
            .into_iter()
            .filter(|p| !p.as_ref().trim().is_empty())
            .map(|p| WatchEntry::new(p.as_ref()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the first entry whose prefix matches `path`, if any.
    pub fn classify(&self, path: &ImportPath) -> Option<Classification<'_>> {
        let mut matching = self.entries.iter().filter(|e| e.matches(path));
        let entry = matching.next()?;
        let also_matched: Vec<&WatchEntry> = matching.collect();
        trace!("Path '{}' matched '{}' ({} more)", path, entry, also_matched.len());
        Some(Classification { entry, also_matched })
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::new(DEFAULT_WATCHLIST)
    }
}
