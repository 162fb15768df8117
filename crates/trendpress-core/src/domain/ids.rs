//! Domain identifiers (strongly-typed IDs).
//!
//! Every record the pipeline persists is keyed by a store-assigned integer
//! (an autoincrement row id in SQLite, a counter in memory). `Id<T>` wraps that
//! integer with a phantom marker so a `TaskId` can never be passed where a
//! `PostId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Marker trait for each ID type.
///
/// Provides the prefix used by `Display` ("task-", "post-", ...).
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic ID type.
///
/// `T` is only a compile-time tag; `Id<T>` has the same size as `i64`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: i64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Raw value as stored in the database.
    pub fn get(&self) -> i64 {
        self.value
    }
}

impl<T: IdMarker> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

/// Accepts both the bare number (`12`) and the display form (`task-12`).
impl<T: IdMarker> FromStr for Id<T> {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(T::prefix()).unwrap_or(s);
        raw.trim().parse::<i64>().map(Self::new)
    }
}

// ========================================
// Marker types
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Post {}

impl IdMarker for Post {
    fn prefix() -> &'static str {
        "post-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {}

impl IdMarker for Category {
    fn prefix() -> &'static str {
        "category-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {}

impl IdMarker for Provider {
    fn prefix() -> &'static str {
        "provider-"
    }
}

/// Identifier of a pipeline task.
pub type TaskId = Id<Task>;

/// Identifier of a generated post.
pub type PostId = Id<Post>;

/// Identifier of a category.
pub type CategoryId = Id<Category>;

/// Identifier of a stored AI provider configuration.
pub type ProviderId = Id<Provider>;
