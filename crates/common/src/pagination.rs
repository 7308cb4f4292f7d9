//! Offset pagination shared by the gateway (bounds checks) and the server (windowing).

use serde::Deserialize;

/// `from` is a zero-based offset, `size` the window length.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub from: i64,
    pub size: i64,
}

impl Default for Pagination {
    fn default() -> Self { Self { from: 0, size: 10 } }
}

impl Pagination {
    /// Build from optional query values, falling back to defaults.
    pub fn from_query(from: Option<i64>, size: Option<i64>) -> Self {
        let d = Self::default();
        Self { from: from.unwrap_or(d.from), size: size.unwrap_or(d.size) }
    }

    /// The window asked for, or `None` when neither bound was given so the
    /// caller returns the whole list.
    pub fn requested(from: Option<i64>, size: Option<i64>) -> Option<Self> {
        (from.is_some() || size.is_some()).then(|| Self::from_query(from, size))
    }

    /// `from` must be non-negative and `size` strictly positive.
    pub fn validate(&self) -> Result<(), String> {
        if self.from < 0 {
            return Err(format!("from must be >= 0, got {}", self.from));
        }
        if self.size <= 0 {
            return Err(format!("size must be > 0, got {}", self.size));
        }
        Ok(())
    }

    /// Cut the window out of an already-sorted list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let from = self.from.max(0) as usize;
        let size = self.size.max(0) as usize;
        items.into_iter().skip(from).take(size).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn defaults_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.from, 0);
        assert_eq!(d.size, 10);
        assert_eq!(Pagination::from_query(None, Some(3)), Pagination { from: 0, size: 3 });
    }

    #[test]
    fn requested_only_when_a_bound_is_given() {
        assert_eq!(Pagination::requested(None, None), None);
        assert_eq!(Pagination::requested(Some(4), None), Some(Pagination { from: 4, size: 10 }));
        assert_eq!(Pagination::requested(None, Some(2)), Some(Pagination { from: 0, size: 2 }));
    }

    #[test]
    fn validate_rejects_out_of_bounds() {
        assert!(Pagination { from: -1, size: 10 }.validate().is_err());
        assert!(Pagination { from: 0, size: 0 }.validate().is_err());
        assert!(Pagination { from: 5, size: 1 }.validate().is_ok());
    }

    #[test]
    fn apply_cuts_window() {
        let items: Vec<i32> = (0..10).collect();
        assert_eq!(Pagination { from: 2, size: 3 }.apply(items.clone()), vec![2, 3, 4]);
        assert_eq!(Pagination { from: 8, size: 5 }.apply(items.clone()), vec![8, 9]);
        assert!(Pagination { from: 20, size: 5 }.apply(items).is_empty());
    }
}
