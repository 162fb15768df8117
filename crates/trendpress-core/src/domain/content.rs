//! Content model: posts and categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, PostId};

/// Colors assigned to newly created categories.
pub const CATEGORY_PALETTE: [&str; 7] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#06B6D4",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
}

/// Stored post. The pipeline only ever creates drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category_id: CategoryId,
    pub source_url: Option<String>,
    pub meta_description: Option<String>,
    pub featured_image: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category_id: CategoryId,
    pub source_url: Option<String>,
    pub meta_description: Option<String>,
}

impl Post {
    /// Materialize a draft from insert data.
    pub fn draft(id: PostId, new: NewPost, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            slug: new.slug,
            content: new.content,
            category_id: new.category_id,
            source_url: new.source_url,
            meta_description: new.meta_description,
            featured_image: None,
            is_published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Category {
    pub fn new(id: CategoryId, new: NewCategory, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            slug: new.slug,
            description: new.description,
            color: new.color,
            is_active: true,
            created_at: now,
        }
    }
}
