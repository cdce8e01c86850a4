//! Persisted dashboard data that is independent of the embedding protocol.

pub mod layout;
