use std::sync::{Arc, Mutex};

use futures::executor::block_on;

use super::test_helpers::{FakeAuthService, sample_user};
use super::*;
use crate::state::notifications::Notification;
use crate::util::scheduler::ManualScheduler;

fn toasts() -> NotificationStore {
    NotificationStore::new(Arc::new(ManualScheduler::new()))
}

fn messages(items: &[Notification]) -> Vec<String> {
    items.iter().map(|n| n.message.clone()).collect()
}

// =============================================================
// AuthState
// =============================================================

#[test]
fn auth_state_default_no_user() {
    let state = AuthState::default();
    assert!(state.user.is_none());
    assert!(!state.is_authenticating);
}

#[test]
fn resuming_state_is_authenticating() {
    let state = AuthState::resuming();
    assert!(state.user.is_none());
    assert!(state.is_authenticating);
}

#[test]
fn authenticating_keeps_identity() {
    let state = AuthState::signed_in(sample_user("u1")).authenticating();
    assert!(state.is_authenticating);
    assert_eq!(state.user.map(|u| u.id), Some("u1".to_owned()));
}

#[test]
fn auth_failure_displays_reason() {
    assert_eq!(AuthFailure::new("Incorrect password").to_string(), "Incorrect password");
}

// =============================================================
// resume_session
// =============================================================

#[test]
fn resume_session_publishes_user() {
    let service = FakeAuthService::accepting(sample_user("u1"));
    let published = Mutex::new(Vec::new());
    block_on(resume_session(&service, |s| published.lock().unwrap().push(s)));

    let published = published.into_inner().unwrap();
    assert_eq!(published, vec![AuthState::signed_in(sample_user("u1"))]);
}

#[test]
fn resume_session_without_session_is_anonymous() {
    let service = FakeAuthService::rejecting("nope");
    let published = Mutex::new(Vec::new());
    block_on(resume_session(&service, |s| published.lock().unwrap().push(s)));

    assert_eq!(published.into_inner().unwrap(), vec![AuthState::anonymous()]);
}

// =============================================================
// sign_out
// =============================================================

#[test]
fn sign_out_brackets_call_with_authenticating_state() {
    let service = FakeAuthService::accepting(sample_user("u1"));
    let store = toasts();
    let published = Mutex::new(Vec::new());
    let current = AuthState::signed_in(sample_user("u1"));

    block_on(sign_out(&service, current, &store, |s| published.lock().unwrap().push(s)));

    let published = published.into_inner().unwrap();
    assert_eq!(published.len(), 2);
    assert!(published[0].is_authenticating);
    assert_eq!(published[1], AuthState::anonymous());
    assert_eq!(service.calls(), vec!["logout"]);
    assert_eq!(
        messages(&store.snapshot()),
        vec!["Logging out...", "You have been logged out successfully"]
    );
}

#[test]
fn sign_out_failure_still_drops_identity_and_reports_once() {
    let service = FakeAuthService::rejecting("network down");
    let store = toasts();
    let published = Mutex::new(Vec::new());

    block_on(sign_out(
        &service,
        AuthState::signed_in(sample_user("u1")),
        &store,
        |s| published.lock().unwrap().push(s),
    ));

    assert_eq!(published.into_inner().unwrap().last(), Some(&AuthState::anonymous()));
    let errors = store
        .snapshot()
        .into_iter()
        .filter(|n| n.kind == crate::state::notifications::NotificationKind::Error)
        .count();
    assert_eq!(errors, 1);
}
