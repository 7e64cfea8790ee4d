//! Prometheus counters for the custody core.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

/// Audit events dropped because the store append failed.
///
/// Audit writes are best-effort with respect to the primary operation: the
/// failure never reaches the caller's response, so this counter is the only
/// place those drops become visible.
pub static AUDIT_WRITE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "custody_audit_write_failures_total",
        "Audit events dropped because the store append failed"
    )
    .expect("register custody_audit_write_failures_total")
});
