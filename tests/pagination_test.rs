use freehub_backend::models::{MAX_PAGE_SIZE, Pagination, PaginationQuery};

fn query(page: Option<u64>, limit: Option<u64>) -> PaginationQuery {
    PaginationQuery { page, limit }
}

#[test]
fn test_defaults() {
    let q = query(None, None);
    assert_eq!(q.page(), 1);
    assert_eq!(q.limit(), 10);
    assert_eq!(q.offset(), 0);
}

#[test]
fn test_page_and_limit_are_clamped() {
    assert_eq!(query(Some(0), None).page(), 1);
    assert_eq!(query(None, Some(0)).limit(), 1);
    assert_eq!(query(None, Some(10_000)).limit(), MAX_PAGE_SIZE);
}

#[test]
fn test_offset_skips_previous_pages() {
    assert_eq!(query(Some(3), Some(10)).offset(), 20);
    assert_eq!(query(Some(2), Some(25)).offset(), 25);
}

#[test]
fn test_offset_of_huge_page_stays_within_bigint() {
    assert_eq!(query(Some(u64::MAX), Some(10)).offset(), i64::MAX as u64);
    assert_eq!(query(Some(u64::MAX), None).offset(), i64::MAX as u64);
}

#[test]
fn test_page_count_rounds_up() {
    assert_eq!(Pagination::new(3, 10, 25).pages, 3);
    assert_eq!(Pagination::new(1, 10, 30).pages, 3);
    assert_eq!(Pagination::new(1, 10, 0).pages, 0);
    assert_eq!(Pagination::new(1, 10, 1).pages, 1);
}
