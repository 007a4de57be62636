//! Route handlers organized by resource

pub mod entity;
pub mod health;
pub mod patients;
