//! Runtime checks for the smoothing core invariants.
//!
//! Violations are fatal: a history that silently loses recency order corrupts every later frame.
//! This module must remain tiny and dependency-free.

#[cold]
#[inline(never)]
fn violation(msg: &'static str) -> ! {
    panic!("CORE INVARIANT VIOLATION: {msg}");
}

/// Panic if a required invariant is false.
#[inline]
pub fn require(cond: bool, msg: &'static str) {
    if !cond {
        violation(msg);
    }
}

/// Panic if an impossible state transition happens.
#[inline]
pub fn bad_state(msg: &'static str) -> ! {
    violation(msg)
}
