//! Database row structs.
//!
//! Rows mirror table columns one to one; conversion into domain types from
//! `roster_core` happens in the store layer.

pub mod player;
