//! Integration test harness.

mod helpers;

mod analytics_test;
mod batching_test;
mod compliance_test;
mod delivery_test;
mod preference_test;
