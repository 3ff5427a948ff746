use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::PostDbModel;
use crate::persist::{read_json_with_tmp_fallback, write_json_atomic};

/// Row-level access to the post table.
#[async_trait]
pub trait PostDao: Send + Sync {
    async fn get_all_posts(&self) -> Result<Vec<PostDbModel>, StoreError>;

    async fn get_all_owned_posts(&self, username: &str) -> Result<Vec<PostDbModel>, StoreError>;

    /// Distinct subreddit labels in first-seen order.
    async fn get_all_subreddits(&self) -> Result<Vec<String>, StoreError>;

    /// Assigns the next id when `post.id` is `None`; replaces a row with the same id.
    async fn insert(&self, post: PostDbModel) -> Result<(), StoreError>;

    async fn insert_all(&self, posts: Vec<PostDbModel>) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}

/// Post table kept in memory and, when opened from a file, mirrored to JSON.
#[derive(Debug, Clone)]
pub struct JsonPostDao {
    inner: Arc<RwLock<Vec<PostDbModel>>>,
    path: Option<PathBuf>,
}

impl JsonPostDao {
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
            path: None,
        }
    }

    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let rows: Vec<PostDbModel> = match read_json_with_tmp_fallback(&path).await {
            Ok(Some(rows)) => rows,
            Ok(None) => {
                debug!(path = %path.display(), "no post store yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "post store unreadable, starting empty");
                Vec::new()
            }
        };
        debug!(rows = rows.len(), path = %path.display(), "loaded post store");
        Self {
            inner: Arc::new(RwLock::new(rows)),
            path: Some(path),
        }
    }

    /// Applies `change` to a copy of the rows and swaps it in only once the
    /// copy is persisted, so a failed write leaves the table untouched.
    async fn commit<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<PostDbModel>) + Send,
    {
        let mut rows = self.inner.write().await;
        let mut next = rows.clone();
        change(&mut next);
        self.persist(&next).await?;
        *rows = next;
        Ok(())
    }

    async fn persist(&self, rows: &[PostDbModel]) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => write_json_atomic(path, rows).await,
            None => {
                debug!("post store is in-memory only; skipping persist");
                Ok(())
            }
        }
    }
}

fn upsert(rows: &mut Vec<PostDbModel>, mut post: PostDbModel) {
    match post.id {
        Some(id) => {
            if let Some(existing) = rows.iter_mut().find(|row| row.id == Some(id)) {
                *existing = post;
                return;
            }
        }
        None => {
            let next = rows.iter().filter_map(|row| row.id).max().unwrap_or(0) + 1;
            post.id = Some(next);
        }
    }
    rows.push(post);
}

#[async_trait]
impl PostDao for JsonPostDao {
    async fn get_all_posts(&self) -> Result<Vec<PostDbModel>, StoreError> {
        Ok(self.inner.read().await.clone())
    }

    async fn get_all_owned_posts(&self, username: &str) -> Result<Vec<PostDbModel>, StoreError> {
        let rows = self.inner.read().await;
        Ok(rows
            .iter()
            .filter(|row| row.username == username)
            .cloned()
            .collect())
    }

    async fn get_all_subreddits(&self) -> Result<Vec<String>, StoreError> {
        let rows = self.inner.read().await;
        let mut labels: Vec<String> = Vec::new();
        for row in rows.iter() {
            if !labels.contains(&row.subreddit) {
                labels.push(row.subreddit.clone());
            }
        }
        Ok(labels)
    }

    async fn insert(&self, post: PostDbModel) -> Result<(), StoreError> {
        self.commit(|rows| upsert(rows, post)).await
    }

    async fn insert_all(&self, posts: Vec<PostDbModel>) -> Result<(), StoreError> {
        self.commit(|rows| {
            for post in posts {
                upsert(rows, post);
            }
        })
        .await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.commit(Vec::clear).await
    }
}
