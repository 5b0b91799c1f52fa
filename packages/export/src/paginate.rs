//! Fixed-size page slicing.

/// Splits `items` into consecutive pages of `page_size`.
///
/// Page `k` holds positions `k * page_size` up to, but excluding,
/// `(k + 1) * page_size`; only the last page may be shorter. An empty input
/// yields no pages.
///
/// # Panics
///
/// Panics if `page_size` is zero.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Vec<Vec<T>> {
    assert!(page_size > 0, "page size must be positive, got {page_size}");
    items.chunks(page_size).map(<[T]>::to_vec).collect()
}
