//! Model checking protokol session dengan loom.
//!
//! Usage:
//!   RUSTFLAGS="--cfg loom" cargo test --release --test loom_test

#![cfg(loom)]

use tandem::{PinningStrategy, Session, SessionConfig, WaitPolicy};

fn config(capacity: usize) -> SessionConfig {
    SessionConfig::new(capacity)
        .with_pinning(PinningStrategy::Disabled)
        .with_wait_policy(WaitPolicy::BusySpin)
}

fn model(f: impl Fn() + Sync + Send + 'static) {
    let mut builder = loom::model::Builder::new();
    builder.preemption_bound = Some(2);
    builder.check(f);
}

#[test]
fn loom_session_capacity_one() {
    model(|| {
        let mut session = Session::with_config(&[3u32, 4], config(1)).unwrap();
        assert_eq!(session.destroy().unwrap(), vec![3, 4]);
    });
}

#[test]
fn loom_session_wraps_ring() {
    model(|| {
        let mut session = Session::with_config(&[1u32, 2, 3], config(2)).unwrap();
        assert_eq!(session.destroy().unwrap(), vec![1, 2, 3]);
    });
}

#[test]
fn loom_session_dropped_before_start() {
    model(|| {
        let session = Session::spawn(&[9u32], config(1)).unwrap();
        drop(session);
    });
}
