use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{BroadcastCache, CacheReader};
use crate::dao::PostDao;
use crate::error::StoreError;
use crate::mapper::DbMapper;
use crate::models::{PostDbModel, PostModel};

/// Username whose posts make up the "owned posts" cache by default.
pub const OWNER_USERNAME: &str = "johndoe";

#[async_trait]
pub trait Repository: Send + Sync {
    fn all_posts(&self) -> CacheReader<Vec<PostModel>>;

    fn all_owned_posts(&self) -> CacheReader<Vec<PostModel>>;

    /// Distinct subreddits, narrowed to those containing `filter` when it is non-empty.
    async fn all_subreddits(&self, filter: &str) -> Result<Vec<String>, StoreError>;

    async fn insert(&self, post: PostModel) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}

/// Outcome of the start-up task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    pub seeded: usize,
    pub loaded: usize,
}

/// Handle on the repository's start-up task.
#[derive(Debug)]
pub struct InitHandle {
    join: JoinHandle<Result<InitReport, StoreError>>,
}

impl InitHandle {
    pub async fn wait(self) -> Result<InitReport, StoreError> {
        self.join.await?
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub fn abort(&self) {
        self.join.abort();
    }
}

pub struct PostRepository {
    dao: Arc<dyn PostDao>,
    mapper: Arc<dyn DbMapper>,
    owner: String,
    all_posts: BroadcastCache<Vec<PostModel>>,
    owned_posts: BroadcastCache<Vec<PostModel>>,
    // Held across "store write + cache refresh" so refreshes never interleave.
    write_lock: Mutex<()>,
}

impl PostRepository {
    /// Builds the repository and spawns its start-up task: seed the store when
    /// it is empty, then populate both caches. Must be called inside a runtime.
    pub fn start(
        dao: Arc<dyn PostDao>,
        mapper: Arc<dyn DbMapper>,
        owner: impl Into<String>,
    ) -> (Arc<Self>, InitHandle) {
        let repository = Arc::new(Self {
            dao,
            mapper,
            owner: owner.into(),
            all_posts: BroadcastCache::new(),
            owned_posts: BroadcastCache::new(),
            write_lock: Mutex::new(()),
        });

        let task_repo = repository.clone();
        let join = tokio::spawn(async move {
            let result = task_repo.init_database().await;
            if let Err(err) = &result {
                warn!(error = %err, "post repository start-up failed");
            }
            result
        });

        (repository, InitHandle { join })
    }

    async fn init_database(&self) -> Result<InitReport, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut seeded = 0;
        if self.dao.get_all_posts().await?.is_empty() {
            let defaults = PostDbModel::default_posts();
            seeded = defaults.len();
            self.dao.insert_all(defaults).await?;
            info!(rows = seeded, "seeded empty post store");
        }
        let loaded = self.refresh().await?;
        Ok(InitReport { seeded, loaded })
    }

    /// Recomputes both caches from storage. Returns the number of posts.
    async fn refresh(&self) -> Result<usize, StoreError> {
        let all: Vec<PostModel> = self
            .dao
            .get_all_posts()
            .await?
            .iter()
            .map(|row| self.mapper.map_post(row))
            .collect();
        let owned: Vec<PostModel> = self
            .dao
            .get_all_owned_posts(&self.owner)
            .await?
            .iter()
            .map(|row| self.mapper.map_post(row))
            .collect();

        let count = all.len();
        debug!(all = count, owned = owned.len(), "refreshing post caches");
        self.all_posts.publish(all);
        self.owned_posts.publish(owned);
        Ok(count)
    }
}

#[async_trait]
impl Repository for PostRepository {
    fn all_posts(&self) -> CacheReader<Vec<PostModel>> {
        self.all_posts.subscribe()
    }

    fn all_owned_posts(&self) -> CacheReader<Vec<PostModel>> {
        self.owned_posts.subscribe()
    }

    async fn all_subreddits(&self, filter: &str) -> Result<Vec<String>, StoreError> {
        let subreddits = self.dao.get_all_subreddits().await?;
        if filter.is_empty() {
            return Ok(subreddits);
        }
        Ok(subreddits
            .into_iter()
            .filter(|label| label.contains(filter))
            .collect())
    }

    async fn insert(&self, post: PostModel) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.dao.insert(self.mapper.map_db_post(&post)).await?;
        self.refresh().await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.dao.delete_all().await?;
        self.refresh().await?;
        Ok(())
    }
}
