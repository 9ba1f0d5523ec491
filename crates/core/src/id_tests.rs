use super::*;

crate::define_id! {
    pub struct TestId("tst-");
}

#[test]
fn round_trips_through_display_and_from_string() {
    let id = TestId::new();
    let again = TestId::from_string(id.to_string());
    assert_eq!(id, again);
    assert!(id.as_str().starts_with("tst-"));
}

#[test]
fn ids_are_unique() {
    let a = TestId::new();
    let b = TestId::new();
    assert_ne!(a, b);
}

#[test]
fn idbuf_truncates_hash_to_active_bytes() {
    let a = IdBuf::new("abc");
    let b = IdBuf::new("abc");
    assert_eq!(a, b);
}
