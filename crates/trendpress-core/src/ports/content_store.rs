//! ContentStore port - posts and categories.

use async_trait::async_trait;

use crate::domain::{Category, NewCategory, NewPost, Post, PostId, StoreError};

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Exact-name lookup.
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError>;

    /// `StoreError::Conflict` when the name is taken.
    async fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError>;

    /// Inserts a draft. `StoreError::Conflict` when the slug is taken.
    async fn insert_post(&self, new: NewPost) -> Result<Post, StoreError>;

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    /// Newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;

    async fn post_count(&self) -> Result<u64, StoreError>;
}
