//! Category lookup/creation and unique post slugs.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::domain::slug::numbered;
use crate::domain::{CATEGORY_PALETTE, Category, NewCategory, StoreError, slugify};
use crate::ports::ContentStore;

fn random_color() -> String {
    CATEGORY_PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CATEGORY_PALETTE[0])
        .to_string()
}

/// Resolves categories by topic name and allocates post slugs.
#[derive(Clone)]
pub struct CategoryResolver {
    content: Arc<dyn ContentStore>,
}

impl CategoryResolver {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }

    /// Find the category named `name`, creating it if absent.
    ///
    /// A concurrent insert of the same name surfaces as a conflict; the row
    /// that won is returned instead.
    pub async fn get_or_create(&self, name: &str) -> Result<Category, StoreError> {
        if let Some(existing) = self.content.find_category_by_name(name).await? {
            return Ok(existing);
        }

        let new = NewCategory {
            name: name.to_string(),
            slug: slugify(name),
            description: Some(format!("Articles about {name}")),
            color: random_color(),
        };
        match self.content.insert_category(new).await {
            Ok(category) => {
                info!(category_id = %category.id, name, "category created");
                Ok(category)
            }
            Err(StoreError::Conflict(reason)) => self
                .content
                .find_category_by_name(name)
                .await?
                .ok_or(StoreError::Conflict(reason)),
            Err(e) => Err(e),
        }
    }

    /// First free slug among `s`, `s-1`, `s-2`, ... for `title`.
    pub async fn unique_slug(&self, title: &str) -> Result<String, StoreError> {
        let base = slugify(title);
        let mut n = 0;
        loop {
            let candidate = numbered(&base, n);
            if !self.content.slug_exists(&candidate).await? {
                if n > 0 {
                    debug!(slug = %candidate, "slug suffixed");
                }
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPost;
    use crate::impls::InMemoryStore;

    fn resolver() -> (Arc<InMemoryStore>, CategoryResolver) {
        let store = Arc::new(InMemoryStore::new());
        let resolver = CategoryResolver::new(store.clone());
        (store, resolver)
    }

    #[tokio::test]
    async fn creates_category_once() {
        let (store, resolver) = resolver();
        let first = resolver.get_or_create("Cloud Computing").await.unwrap();
        let again = resolver.get_or_create("Cloud Computing").await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(first.slug, "cloud-computing");
        assert_eq!(first.description.as_deref(), Some("Articles about Cloud Computing"));
        assert!(CATEGORY_PALETTE.contains(&first.color.as_str()));
        assert!(first.is_active);
        assert_eq!(store.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn slug_collisions_get_numbered() {
        let (store, resolver) = resolver();
        let category = resolver.get_or_create("AI").await.unwrap();
        assert_eq!(resolver.unique_slug("Hello World").await.unwrap(), "hello-world");

        for slug in ["hello-world", "hello-world-1"] {
            store
                .insert_post(NewPost {
                    title: "Hello World".into(),
                    slug: slug.into(),
                    content: "<p></p>".into(),
                    category_id: category.id,
                    source_url: None,
                    meta_description: None,
                })
                .await
                .unwrap();
        }
        assert_eq!(resolver.unique_slug("Hello World").await.unwrap(), "hello-world-2");
    }
}
