//! Tests for the whitelist key layout

use crate::domain::entities::token::TokenKind;
use crate::repositories::whitelist::KeyLayout;

#[test]
fn test_default_layout() {
    let layout = KeyLayout::default();
    assert_eq!(layout.prefix(), "api:token");
    assert_eq!(
        layout.entry_key(7, TokenKind::Access, "abc"),
        "api:token:7:access:abc"
    );
}

#[test]
fn test_trailing_separator_dropped() {
    let layout = KeyLayout::new("svc:wl:");
    assert_eq!(
        layout.entry_key(1, TokenKind::Refresh, "x"),
        "svc:wl:1:refresh:x"
    );
}

#[test]
fn test_user_pattern_does_not_match_other_users() {
    let layout = KeyLayout::default();
    assert_eq!(layout.user_pattern(1), "api:token:1:*");

    let other = layout.entry_key(12, TokenKind::Access, "t");
    assert!(!other.starts_with(&layout.user_prefix(1)));
}
