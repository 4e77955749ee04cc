//! API handlers module

pub mod articles;
pub mod health;
pub mod ideas;
pub mod jobs;
pub mod publish;
