//! Database-free checks of the hierarchy rules, validation, tokens and passwords.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use base_api::auth::jwt::{decode_token, encode_token, Claims};
use base_api::auth::password;
use base_api::auth::policy::{self, Decision, DenyReason, ListingScope};
use base_api::models::{Role, User};
use base_api::rate_limit::LoginRateLimiter;
use base_api::validation::{is_hex_color, is_valid_email, Validator};

fn user(role: Role, created_by_id: Option<Uuid>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        name: "Test".to_string(),
        email: format!("{}@test.com", Uuid::now_v7().simple()),
        password_hash: String::new(),
        role,
        is_active: true,
        created_by_id,
        created_at: now,
        updated_at: now,
    }
}

// ── Hierarchy ───────────────────────────────────────────────────

#[test]
fn root_may_modify_anyone() {
    let root = user(Role::Admin, None);
    let sub = user(Role::Admin, Some(root.id));
    let other_root = user(Role::Admin, None);
    let grandchild = user(Role::User, Some(sub.id));

    assert_eq!(policy::can_modify(&root, &sub), Decision::Allow);
    assert_eq!(policy::can_modify(&root, &other_root), Decision::Allow);
    assert_eq!(policy::can_modify(&root, &grandchild), Decision::Allow);
    assert_eq!(policy::can_modify(&root, &root), Decision::Allow);
}

#[test]
fn sub_admin_is_limited_to_own_creations() {
    let root = user(Role::Admin, None);
    let sub = user(Role::Admin, Some(root.id));
    let own = user(Role::User, Some(sub.id));
    let foreign = user(Role::User, Some(root.id));

    assert!(policy::can_modify(&sub, &own).is_allowed());
    assert_eq!(
        policy::can_modify(&sub, &foreign),
        Decision::Deny(DenyReason::NotCreatedByActor)
    );
    assert_eq!(
        policy::can_modify(&sub, &sub),
        Decision::Deny(DenyReason::NotCreatedByActor)
    );
}

#[test]
fn creator_is_protected_before_other_rules() {
    let root = user(Role::Admin, None);
    let sub = user(Role::Admin, Some(root.id));

    assert_eq!(
        policy::can_modify(&sub, &root),
        Decision::Deny(DenyReason::TargetIsCreator)
    );
}

#[test]
fn ancestors_beyond_creator_are_covered_by_ownership_rule() {
    let root = user(Role::Admin, None);
    let sub = user(Role::Admin, Some(root.id));
    let subsub = user(Role::Admin, Some(sub.id));

    assert_eq!(
        policy::can_modify(&subsub, &root),
        Decision::Deny(DenyReason::NotCreatedByActor)
    );
}

#[test]
fn denial_maps_to_forbidden() {
    let root = user(Role::Admin, None);
    let sub = user(Role::Admin, Some(root.id));

    let err = policy::can_modify(&sub, &root).into_result().unwrap_err();
    assert!(matches!(err, base_api::error::AppError::Forbidden(_)));
    assert!(policy::can_modify(&root, &sub).into_result().is_ok());
}

#[test]
fn listing_scope_follows_hierarchy() {
    let root = user(Role::Admin, None);
    let sub = user(Role::Admin, Some(root.id));
    let own = user(Role::User, Some(sub.id));

    assert_eq!(policy::listing_scope(&root), ListingScope::AllExcept(root.id));
    assert_eq!(policy::listing_scope(&sub), ListingScope::CreatedBy(sub.id));

    let root_scope = policy::listing_scope(&root);
    assert!(!root_scope.includes(&root));
    assert!(root_scope.includes(&sub));
    assert!(root_scope.includes(&own));

    let sub_scope = policy::listing_scope(&sub);
    assert!(sub_scope.includes(&own));
    assert!(!sub_scope.includes(&root));
    assert!(!sub_scope.includes(&sub));
}

#[test]
fn only_root_admin_manages_settings() {
    let root = user(Role::Admin, None);
    let sub = user(Role::Admin, Some(root.id));
    let self_registered = user(Role::User, None);

    assert!(policy::can_manage_settings(&root).is_allowed());
    assert_eq!(
        policy::can_manage_settings(&sub),
        Decision::Deny(DenyReason::NotRootAdmin)
    );
    assert!(!policy::can_manage_settings(&self_registered).is_allowed());
}

// ── Validation ──────────────────────────────────────────────────

#[test]
fn hex_colors() {
    assert!(is_hex_color("#3B82F6"));
    assert!(is_hex_color("#abcdef"));
    assert!(!is_hex_color("3B82F6"));
    assert!(!is_hex_color("#3B82F"));
    assert!(!is_hex_color("#3B82F6A"));
    assert!(!is_hex_color("#GGGGGG"));
}

#[test]
fn emails() {
    assert!(is_valid_email("a@b.co"));
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("no-at-sign.com"));
    assert!(!is_valid_email("two words@x.com"));
}

#[test]
fn validator_collects_every_error() {
    let mut v = Validator::new();
    v.required("Name", "")
        .length("Password", "abc", 6, 100)
        .hex_color("Color", "red")
        .check(false, "Passwords do not match");
    assert_eq!(v.errors().len(), 4);
    assert!(v.finish().is_err());

    let mut ok = Validator::new();
    ok.required("Name", "Ana").length("Name", "Ana", 3, 200);
    assert!(ok.finish().is_ok());
}

#[test]
fn length_counts_characters_not_bytes() {
    let mut v = Validator::new();
    v.length("Name", "Zoë", 3, 3);
    assert!(v.finish().is_ok());
}

// ── Tokens ──────────────────────────────────────────────────────

#[test]
fn token_carries_user_claims() {
    let config = common::test_jwt_config();
    let admin = user(Role::Admin, None);

    let claims = Claims::for_user(&admin, &config);
    let token = encode_token(&claims, &config).unwrap();
    let decoded = decode_token(&token, &config).unwrap();

    assert_eq!(decoded.sub, admin.id);
    assert_eq!(decoded.email, admin.email);
    assert_eq!(decoded.role, Role::Admin);
    assert_eq!(decoded.jti, claims.jti);
    assert_eq!(decoded.exp - decoded.iat, 60 * 60);
}

#[test]
fn token_ids_are_unique() {
    let config = common::test_jwt_config();
    let u = user(Role::User, None);

    let a = Claims::for_user(&u, &config);
    let b = Claims::for_user(&u, &config);
    assert_ne!(a.jti, b.jti);
}

#[test]
fn token_rejected_with_wrong_secret_or_audience() {
    let config = common::test_jwt_config();
    let u = user(Role::User, None);
    let token = encode_token(&Claims::for_user(&u, &config), &config).unwrap();

    let mut other_secret = config.clone();
    other_secret.secret = "a-completely-different-secret".to_string();
    assert!(decode_token(&token, &other_secret).is_err());

    let mut other_audience = config.clone();
    other_audience.audience = "someone-else".to_string();
    assert!(decode_token(&token, &other_audience).is_err());
}

#[test]
fn expired_token_is_rejected() {
    let config = common::test_jwt_config();
    let u = user(Role::User, None);

    let mut claims = Claims::for_user(&u, &config);
    claims.exp = Utc::now().timestamp() - 5;
    let token = encode_token(&claims, &config).unwrap();

    assert!(decode_token(&token, &config).is_err());
}

// ── Passwords ───────────────────────────────────────────────────

#[test]
fn password_hash_verifies_only_the_original() {
    let hash = password::hash("correct horse").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(password::verify("correct horse", &hash).unwrap());
    assert!(!password::verify("battery staple", &hash).unwrap());
    assert!(password::verify("correct horse", "not-a-phc-string").is_err());
    assert!(!password::verify_dummy("anything"));
}

// ── Login limiter ───────────────────────────────────────────────

#[test]
fn limiter_blocks_after_max_attempts() {
    let limiter = LoginRateLimiter::new(3, Duration::from_secs(60));

    for _ in 0..3 {
        assert!(limiter.try_acquire("User@Test.com").is_ok());
    }

    let retry_after = limiter.try_acquire("USER@test.com").unwrap_err();
    assert!(retry_after <= 60);
    assert!(limiter.try_acquire("other@test.com").is_ok());

    limiter.reset("user@test.com");
    assert!(limiter.try_acquire("user@test.com").is_ok());
}

#[test]
fn limiter_reserves_atomically_across_threads() {
    let limiter = Arc::new(LoginRateLimiter::new(5, Duration::from_secs(60)));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            std::thread::spawn(move || limiter.try_acquire("racer@test.com").is_ok())
        })
        .collect();

    let granted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(granted, 5);
}

#[test]
fn limiter_window_expires() {
    let limiter = LoginRateLimiter::new(1, Duration::from_millis(10));
    assert!(limiter.try_acquire("a@test.com").is_ok());
    assert!(limiter.try_acquire("a@test.com").is_err());

    std::thread::sleep(Duration::from_millis(20));
    assert!(limiter.try_acquire("a@test.com").is_ok());

    std::thread::sleep(Duration::from_millis(20));
    limiter.cleanup();
    assert!(limiter.is_empty());
}

#[test]
fn limiter_keeps_one_entry_per_email() {
    let limiter = LoginRateLimiter::default();
    for i in 0..50 {
        let _ = limiter.try_acquire(&format!("user{i}@test.com"));
        let _ = limiter.try_acquire(&format!("USER{i}@test.com"));
    }
    assert_eq!(limiter.len(), 50);
}
