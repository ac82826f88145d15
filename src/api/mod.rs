//! Router Module Index
//!
//! Splits the HTTP surface by concern. Both groups are open to anonymous clients: access
//! control in this service is the navigation guard's decision, not a property of the endpoints.

/// Route table lookup and navigation resolution.
pub mod navigation;

/// Session flag status and lifecycle.
pub mod session;
