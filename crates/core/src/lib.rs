//! Player roster domain logic.
//!
//! Holds the player model with its validation and level derivation, the
//! filter composer used by list/count queries, the [`store::PlayerStore`]
//! persistence seam and the [`service::PlayerService`] that ties them
//! together. No HTTP or SQL types live here.

pub mod error;
pub mod filter;
pub mod player;
pub mod service;
pub mod store;
pub mod types;
