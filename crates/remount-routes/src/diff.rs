//! Route table diffing across reload generations.

use indexmap::IndexSet;

use crate::extract::RouteSnapshot;

/// Entries added and removed between two snapshots, keyed by `METHOD PATH`.
///
/// Both sets keep the order entries appear in their snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub added: IndexSet<String>,
    pub removed: IndexSet<String>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn is_added(&self, key: &str) -> bool {
        self.added.contains(key)
    }
}

/// How a freshly mounted route table should be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// No earlier successful mount: print everything.
    Full,
    /// Changes since the last successful mount (possibly none).
    Delta(Delta),
}

/// Compute the delta from `previous` to `current`.
pub fn diff(previous: &RouteSnapshot, current: &RouteSnapshot) -> Delta {
    let before: IndexSet<String> = previous.keys().collect();
    let after: IndexSet<String> = current.keys().collect();

    Delta {
        added: after.difference(&before).cloned().collect(),
        removed: before.difference(&after).cloned().collect(),
    }
}

/// Like [`diff`], but distinguishes the first-ever listing.
pub fn compare(previous: Option<&RouteSnapshot>, current: &RouteSnapshot) -> Listing {
    match previous {
        None => Listing::Full,
        Some(previous) => Listing::Delta(diff(previous, current)),
    }
}
