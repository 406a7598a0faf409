//! Use-case services orchestrating repositories.

pub mod attendance_service;
pub mod roster_service;
