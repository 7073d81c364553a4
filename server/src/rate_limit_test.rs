use std::net::Ipv4Addr;

use super::*;

fn ip(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
}

#[test]
fn login_allows_five_per_window() {
    let rl = RateLimiter::default();
    let now = Instant::now();

    for i in 0..5 {
        assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(1), now).is_ok(), "attempt {i} should pass");
    }
    assert_eq!(
        rl.check_and_record_at(RateLimitedMethod::Login, ip(1), now),
        Err(RateLimitError::Exceeded { action: "login", limit: 5, retry_after_secs: 60 })
    );
}

#[test]
fn create_user_allows_three_per_window() {
    let rl = RateLimiter::default();
    let now = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at(RateLimitedMethod::CreateUser, ip(1), now).unwrap();
    }
    assert!(matches!(
        rl.check_and_record_at(RateLimitedMethod::CreateUser, ip(1), now),
        Err(RateLimitError::Exceeded { action: "account creation", limit: 3, .. })
    ));
}

#[test]
fn methods_are_counted_separately() {
    let rl = RateLimiter::default();
    let now = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at(RateLimitedMethod::CreateUser, ip(1), now).unwrap();
    }
    assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(1), now).is_ok());
}

#[test]
fn clients_are_counted_separately() {
    let rl = RateLimiter::default();
    let now = Instant::now();

    for _ in 0..5 {
        rl.check_and_record_at(RateLimitedMethod::Login, ip(1), now).unwrap();
    }
    assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(1), now).is_err());
    assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(2), now).is_ok());
}

#[test]
fn window_expiry_allows_new_attempts() {
    let rl = RateLimiter::default();
    let start = Instant::now();

    for _ in 0..5 {
        rl.check_and_record_at(RateLimitedMethod::Login, ip(1), start).unwrap();
    }
    assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(1), start + Duration::from_secs(59)).is_err());
    assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(1), start + Duration::from_secs(60)).is_ok());
}

#[test]
fn window_slides_per_attempt() {
    let rl = RateLimiter::default();
    let start = Instant::now();

    for i in 0..5 {
        rl.check_and_record_at(RateLimitedMethod::Login, ip(1), start + Duration::from_secs(i * 10)).unwrap();
    }
    // The first attempt ages out at 60 s, the second only at 70 s.
    let at_60 = start + Duration::from_secs(60);
    assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(1), at_60).is_ok());
    assert_eq!(
        rl.check_and_record_at(RateLimitedMethod::Login, ip(1), at_60),
        Err(RateLimitError::Exceeded { action: "login", limit: 5, retry_after_secs: 10 })
    );
}

#[test]
fn rejected_attempts_are_not_recorded() {
    let config = RateLimitConfig { login_limit: 1, ..RateLimitConfig::default() };
    let rl = RateLimiter::new(config);
    let start = Instant::now();

    rl.check_and_record_at(RateLimitedMethod::Login, ip(1), start).unwrap();
    for s in 1..30 {
        assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(1), start + Duration::from_secs(s)).is_err());
    }
    assert!(rl.check_and_record_at(RateLimitedMethod::Login, ip(1), start + Duration::from_secs(60)).is_ok());
}

#[test]
fn error_message_is_readable() {
    let err = RateLimitError::Exceeded { action: "login", limit: 5, retry_after_secs: 42 };
    assert_eq!(err.to_string(), "Too many login attempts. Please wait 42 seconds and try again.");
}

#[test]
fn idle_clients_are_swept() {
    let rl = RateLimiter::default();
    let start = Instant::now();

    for i in 0..SWEEP_THRESHOLD {
        let client = IpAddr::V4(Ipv4Addr::from(u32::try_from(i).unwrap()));
        rl.check_and_record_at(RateLimitedMethod::Login, client, start).unwrap();
    }
    assert_eq!(rl.tracked_clients(), SWEEP_THRESHOLD);

    rl.check_and_record_at(RateLimitedMethod::Login, ip(1), start + Duration::from_secs(120)).unwrap();
    assert_eq!(rl.tracked_clients(), 1);
}

#[test]
fn method_names_match_rules() {
    assert_eq!(RateLimitedMethod::Login.name(), "login");
    assert_eq!(RateLimitedMethod::CreateUser.name(), "createUser");
}
