//! Pagination utilities for songlib-catalog
//!
//! One `Window` type serves both song listings (rows per page) and lyric
//! pages (verses per page).

use songlib_common::{Error, Result};
use std::ops::Range;

/// Validated 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Items per page
    pub size: i64,
}

impl Window {
    /// Build a window, rejecting page < 1, size < 1 or an offset past `i64::MAX`
    ///
    /// # Examples
    /// ```
    /// use songlib_catalog::pagination::Window;
    ///
    /// let w = Window::new(3, 5).unwrap();
    /// assert_eq!(w.offset(), 10);
    /// assert!(Window::new(0, 5).is_err());
    /// ```
    pub fn new(page: i64, size: i64) -> Result<Self> {
        if page < 1 {
            return Err(Error::InvalidInput(format!(
                "page must be >= 1, got {}",
                page
            )));
        }
        if size < 1 {
            return Err(Error::InvalidInput(format!(
                "page size must be >= 1, got {}",
                size
            )));
        }
        (page - 1).checked_mul(size).ok_or_else(|| {
            Error::InvalidInput(format!(
                "page {} with size {} is out of range",
                page, size
            ))
        })?;
        Ok(Self { page, size })
    }

    /// Offset for SQL LIMIT/OFFSET query
    ///
    /// Cannot overflow: `new` rejects windows whose offset does not fit.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }

    /// Index range of this window over `len` items
    ///
    /// `None` when the window starts at or past the end. The last window
    /// may be shorter than `size`.
    pub fn range(&self, len: usize) -> Option<Range<usize>> {
        let start = usize::try_from(self.offset()).ok()?;
        if start >= len {
            return None;
        }
        let end = start.saturating_add(self.size as usize).min(len);
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_first_page() {
        let w = Window::new(1, 5).unwrap();
        assert_eq!(w.offset(), 0);
    }

    #[test]
    fn test_offset_later_page() {
        let w = Window::new(4, 25).unwrap();
        assert_eq!(w.offset(), 75);
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(Window::new(0, 5).is_err());
        assert!(Window::new(-2, 5).is_err());
        assert!(Window::new(1, 0).is_err());
    }

    #[test]
    fn test_rejects_offset_overflow() {
        assert!(Window::new(i64::MAX, 2).is_err());
        assert!(Window::new(i64::MAX / 2 + 2, 2).is_err());
        // Largest page whose offset still fits
        let w = Window::new(i64::MAX / 2 + 1, 2).unwrap();
        assert_eq!(w.offset(), i64::MAX - 1);
        assert_eq!(Window::new(i64::MAX, 1).unwrap().offset(), i64::MAX - 1);
    }

    #[test]
    fn test_range_far_page_is_none() {
        let w = Window::new(i64::MAX, 1).unwrap();
        assert_eq!(w.range(3), None);
    }

    #[test]
    fn test_range_full_and_partial() {
        assert_eq!(Window::new(1, 2).unwrap().range(5), Some(0..2));
        assert_eq!(Window::new(3, 2).unwrap().range(5), Some(4..5));
    }

    #[test]
    fn test_range_out_of_bounds() {
        assert_eq!(Window::new(4, 2).unwrap().range(6), None);
        assert_eq!(Window::new(1, 1).unwrap().range(0), None);
    }
}
