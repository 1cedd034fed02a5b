use chronicle::pagination::{PageInfo, PageQuery};

fn query(page: Option<i64>, limit: Option<i64>) -> PageQuery {
    PageQuery { page, limit }
}

#[test]
fn test_defaults_apply_when_unset() {
    let p = query(None, None).resolve();
    assert_eq!(p.page, 1);
    assert_eq!(p.limit, 10);
    assert_eq!(p.offset(), 0);
}

#[test]
fn test_page_floor_is_one() {
    assert_eq!(query(Some(0), None).resolve().page, 1);
    assert_eq!(query(Some(-5), None).resolve().page, 1);
}

#[test]
fn test_limit_clamped_to_bounds() {
    assert_eq!(query(None, Some(0)).resolve().limit, 1);
    assert_eq!(query(None, Some(-1)).resolve().limit, 1);
    assert_eq!(query(None, Some(100)).resolve().limit, 100);
    assert_eq!(query(None, Some(10_000)).resolve().limit, 100);
}

#[test]
fn test_offset_is_zero_based() {
    let p = query(Some(3), Some(25)).resolve();
    assert_eq!(p.offset(), 50);
}

#[test]
fn test_pages_round_up() {
    let p = query(Some(1), Some(10)).resolve();
    assert_eq!(PageInfo::new(p, 0).pages, 0);
    assert_eq!(PageInfo::new(p, 1).pages, 1);
    assert_eq!(PageInfo::new(p, 10).pages, 1);
    assert_eq!(PageInfo::new(p, 11).pages, 2);
    assert_eq!(PageInfo::new(p, 95).pages, 10);
}

#[test]
fn test_summary_echoes_requested_page_past_the_end() {
    // A window beyond the data is a valid, empty page.
    let p = query(Some(40), Some(10)).resolve();
    let info = PageInfo::new(p, 25);
    assert_eq!(info.current, 40);
    assert_eq!(info.pages, 3);
    assert_eq!(info.total, 25);
}

#[test]
fn test_total_carried_through() {
    let p = query(Some(2), Some(5)).resolve();
    let info = PageInfo::new(p, 13);
    assert_eq!(info.current, 2);
    assert_eq!(info.pages, 3);
    assert_eq!(info.total, 13);
}
