//! Per-page view state for a fetched collection.

use crate::filter::Filter;

/// Entities addressable by their remote id.
pub trait Keyed {
    fn key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Freshness {
    #[default]
    Loading,
    Fresh,
    /// A mutation was applied locally; the server copy should be refetched.
    Stale,
    Failed,
}

/// A page's copy of a remote collection, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    entries: Vec<T>,
    freshness: Freshness,
    error: Option<String>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            freshness: Freshness::Loading,
            error: None,
        }
    }
}

impl<T: Keyed> Listing<T> {
    pub fn begin_load(&mut self) {
        self.freshness = Freshness::Loading;
    }

    /// Settle a fetch. A failed fetch leaves no rows behind.
    pub fn finish_load(&mut self, result: Result<Vec<T>, String>) {
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.freshness = Freshness::Fresh;
                self.error = None;
            }
            Err(message) => {
                self.entries.clear();
                self.freshness = Freshness::Failed;
                self.error = Some(message);
            }
        }
    }

    /// Insert or replace by key, keeping the original position of replaced rows.
    pub fn upsert(&mut self, entry: T) {
        match self.position(entry.key()) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
        self.mark_stale();
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let index = self.position(key)?;
        self.mark_stale();
        Some(self.entries.remove(index))
    }

    /// Edit one row in place. Returns false when the key is unknown.
    pub fn patch(&mut self, key: &str, edit: impl FnOnce(&mut T)) -> bool {
        match self.position(key) {
            Some(index) => {
                edit(&mut self.entries[index]);
                self.mark_stale();
                true
            }
            None => false,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == key)
    }
}

impl<T> Listing<T> {
    pub fn mark_stale(&mut self) {
        if self.freshness == Freshness::Fresh {
            self.freshness = Freshness::Stale;
        }
    }

    /// Record a failed action. Rows are left untouched.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn filtered(&self, filter: &impl Filter<T>) -> Vec<&T> {
        filter.apply(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn is_loading(&self) -> bool {
        self.freshness == Freshness::Loading
    }

    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(&'static str, u32);

    impl Keyed for Row {
        fn key(&self) -> &str {
            self.0
        }
    }

    fn loaded() -> Listing<Row> {
        let mut listing = Listing::default();
        listing.finish_load(Ok(vec![Row("a", 1), Row("b", 2), Row("c", 3)]));
        listing
    }

    #[test]
    fn successful_fetch_renders_every_row() {
        let listing = loaded();
        assert_eq!(listing.len(), 3);
        assert_eq!(listing.freshness(), Freshness::Fresh);
        assert_eq!(listing.error(), None);
    }

    #[test]
    fn failed_fetch_shows_error_and_no_rows() {
        let mut listing = loaded();
        listing.begin_load();
        listing.finish_load(Err("Failed to load".into()));

        assert!(listing.is_empty());
        assert_eq!(listing.error(), Some("Failed to load"));
        assert_eq!(listing.freshness(), Freshness::Failed);
    }

    #[test]
    fn remove_touches_exactly_one_row() {
        let mut listing = loaded();
        let removed = listing.remove("b");

        assert_eq!(removed, Some(Row("b", 2)));
        assert_eq!(listing.entries(), &[Row("a", 1), Row("c", 3)]);
        assert!(listing.is_stale());
    }

    #[test]
    fn remove_unknown_key_changes_nothing() {
        let mut listing = loaded();
        assert_eq!(listing.remove("zz"), None);
        assert_eq!(listing.len(), 3);
        assert!(!listing.is_stale());
    }

    #[test]
    fn upsert_replaces_in_place_or_appends() {
        let mut listing = loaded();
        listing.upsert(Row("b", 20));
        listing.upsert(Row("d", 4));

        assert_eq!(
            listing.entries(),
            &[Row("a", 1), Row("b", 20), Row("c", 3), Row("d", 4)]
        );
    }

    #[test]
    fn patch_and_error_leave_other_rows_alone() {
        let mut listing = loaded();
        assert!(listing.patch("c", |row| row.1 = 30));
        listing.set_error("server said no");

        assert_eq!(listing.entries(), &[Row("a", 1), Row("b", 2), Row("c", 30)]);
        assert_eq!(listing.error(), Some("server said no"));
    }

    #[test]
    fn refetch_clears_staleness_and_error() {
        let mut listing = loaded();
        listing.remove("a");
        listing.set_error("oops");
        listing.begin_load();
        assert!(listing.is_loading());

        listing.finish_load(Ok(vec![Row("b", 2)]));
        assert_eq!(listing.freshness(), Freshness::Fresh);
        assert_eq!(listing.error(), None);
    }
}
