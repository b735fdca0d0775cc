//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for payment statuses, field names, and staff names
pub mod autocomplete;
