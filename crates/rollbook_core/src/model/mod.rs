//! Domain models shared across repositories and services.

pub mod person;
pub mod record;
