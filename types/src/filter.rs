//! Client-side list filtering.
//!
//! Filters are plain values evaluated against an already-fetched collection.
//! They never touch the network and hold no state beyond their own fields.

/// A predicate over list rows.
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }

    /// Rows must satisfy both `self` and `other`.
    fn and<F>(self, other: F) -> Both<Self, F>
    where
        Self: Sized,
        F: Filter<T>,
    {
        Both(self, other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Both<A, B>(pub A, pub B);

impl<T, A: Filter<T>, B: Filter<T>> Filter<T> for Both<A, B> {
    fn matches(&self, item: &T) -> bool {
        self.0.matches(item) && self.1.matches(item)
    }
}

impl<T, F> Filter<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, item: &T) -> bool {
        self(item)
    }
}

/// Exact-match dropdown selection. `All` places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }
}

impl<T> From<Option<T>> for Choice<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Choice::All, Choice::Only)
    }
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True when `needle` occurs in any of `fields`.
pub fn any_contains<'a>(fields: impl IntoIterator<Item = &'a str>, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty()
        || fields
            .into_iter()
            .any(|field| contains_ignore_case(field, needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_ignores_case_and_padding() {
        assert!(contains_ignore_case("Community Garden", "garden"));
        assert!(contains_ignore_case("Community Garden", "  GARDEN "));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Community Garden", "park"));
    }

    #[test]
    fn choice_all_admits_everything() {
        assert!(Choice::<u8>::All.admits(&3));
        assert!(Choice::Only(3).admits(&3));
        assert!(!Choice::Only(3).admits(&4));
    }

    #[test]
    fn closures_compose() {
        let even = |n: &u32| n % 2 == 0;
        let big = |n: &u32| *n > 10;
        let items: Vec<u32> = vec![2, 11, 12, 13, 14];

        let both = Filter::<u32>::and(even, big);
        assert_eq!(Filter::<u32>::apply(&both, &items), vec![&12, &14]);
    }
}
