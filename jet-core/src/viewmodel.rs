use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::debug;

use crate::cache::{BroadcastCache, CacheReader};
use crate::communities::community_ids;
use crate::error::StoreError;
use crate::models::PostModel;
use crate::preferences::{PreferenceStore, Preferences};
use crate::repository::Repository;
use crate::tasks::TaskGroup;

/// UI-facing state for the posts, communities and new-post screens.
pub struct MainViewModel {
    repository: Arc<dyn Repository>,
    preferences: PreferenceStore,
    subreddits: Arc<BroadcastCache<Vec<String>>>,
    selected_community: watch::Sender<Option<String>>,
    /// Newest issued search. Results are compared and published under this lock.
    search_generation: Arc<Mutex<u64>>,
    tasks: TaskGroup,
}

impl MainViewModel {
    pub fn new(
        repository: Arc<dyn Repository>,
        preferences: PreferenceStore,
        runtime: Handle,
    ) -> Self {
        let (selected_community, _rx) = watch::channel(None);
        Self {
            repository,
            preferences,
            subreddits: Arc::new(BroadcastCache::new()),
            selected_community,
            search_generation: Arc::new(Mutex::new(0)),
            tasks: TaskGroup::new(runtime),
        }
    }

    pub fn all_posts(&self) -> CacheReader<Vec<PostModel>> {
        self.repository.all_posts()
    }

    pub fn my_posts(&self) -> CacheReader<Vec<PostModel>> {
        self.repository.all_owned_posts()
    }

    pub fn subreddits(&self) -> CacheReader<Vec<String>> {
        self.subreddits.subscribe()
    }

    pub fn subreddits_toggle(&self) -> ToggleWatch {
        ToggleWatch {
            prefs: self.preferences.data(),
        }
    }

    pub fn selected_community(&self) -> Option<String> {
        self.selected_community.borrow().clone()
    }

    pub fn select_community(&self, community: Option<String>) {
        self.selected_community.send_replace(community);
    }

    /// Publishes the matching subreddits. A result is dropped when a newer
    /// search was issued before it completed.
    pub fn search_communities(&self, text: impl Into<String>) {
        let text = text.into();
        let generation = {
            let mut latest = lock_generation(&self.search_generation);
            *latest += 1;
            *latest
        };
        let latest = self.search_generation.clone();
        let repository = self.repository.clone();
        let slot = self.subreddits.clone();
        self.tasks.spawn("search_communities", async move {
            let found = repository.all_subreddits(&text).await?;
            let newest = lock_generation(&latest);
            if *newest == generation {
                slot.publish(found);
            } else {
                debug!(query = %text, "dropping stale community search result");
            }
            drop(newest);
            Ok(())
        });
    }

    /// Inserts `post` under the selected community, or `""` when none is selected.
    pub fn save_post(&self, post: PostModel) {
        let subreddit = self.selected_community().unwrap_or_default();
        let repository = self.repository.clone();
        self.tasks.spawn("save_post", async move {
            repository
                .insert(PostModel { subreddit, ..post })
                .await
        });
    }

    pub fn toggle_subreddit(&self, value: bool, subreddit_id: i32) {
        let preferences = self.preferences.clone();
        self.tasks.spawn("toggle_subreddit", async move {
            preferences.edit(subreddit_id.to_string(), value).await
        });
    }

    pub fn delete_all_posts(&self) {
        let repository = self.repository.clone();
        self.tasks
            .spawn("delete_all_posts", async move { repository.delete_all().await });
    }

    /// Waits for every action launched so far.
    pub async fn wait_idle(&self) -> Result<(), StoreError> {
        self.tasks.wait_idle().await
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn shutdown(&self) {
        self.tasks.shutdown();
    }
}

impl Drop for MainViewModel {
    fn drop(&mut self) {
        self.tasks.shutdown();
    }
}

/// Toggle map derived from the preference store over the known community ids.
#[derive(Debug, Clone)]
pub struct ToggleWatch {
    prefs: watch::Receiver<Preferences>,
}

impl ToggleWatch {
    pub fn current(&mut self) -> HashMap<i32, bool> {
        derive_toggles(&self.prefs.borrow_and_update())
    }

    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&HashMap<i32, bool>) -> bool,
    ) -> Option<HashMap<i32, bool>> {
        let prefs = self
            .prefs
            .wait_for(|prefs| predicate(&derive_toggles(prefs)))
            .await
            .ok()?;
        Some(derive_toggles(&prefs))
    }
}

fn lock_generation(generation: &Mutex<u64>) -> MutexGuard<'_, u64> {
    generation.lock().unwrap_or_else(PoisonError::into_inner)
}

fn derive_toggles(prefs: &Preferences) -> HashMap<i32, bool> {
    community_ids()
        .map(|id| (id, prefs.get(&id.to_string()).unwrap_or(false)))
        .collect()
}
