//! Core business logic - framework-agnostic mess management operations.
//!
//! Every module here takes a database connection and returns structured data;
//! nothing in `core` knows about HTTP. The api layer wires these functions to
//! routes and maps errors to status codes.

/// Shared expense tracking and approval
pub mod expense;
/// Market (grocery) duty rotation and approval state machine
pub mod market;
/// Daily meal and guest-meal tracking
pub mod meal;
/// Member management and historical key resolution
pub mod member;
/// Notifications (targeted and broadcast)
pub mod notification;
/// Monthly aggregation and the settlement ledger
pub mod summary;
