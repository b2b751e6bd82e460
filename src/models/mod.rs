//! Data models
//!
//! Rust structs representing database entities.

mod body_profile;
mod diet;
mod diet_food;

pub use body_profile::BodyProfile;
pub use diet::{load_daily_aggregate, Diet, DietCreate, DietUpdate};
pub use diet_food::DietFood;
