//! Database operations for recipes and their tags and ingredients.
//!
//! Every function takes the owning user's id explicitly; rows belonging to
//! other users are treated as nonexistent.

pub mod labels;
pub mod recipes;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

/// Trim names and drop repeats, keeping first-seen order.
pub fn dedup_names(names: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| seen.insert(*n))
        .collect()
}
