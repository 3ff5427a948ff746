use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jet_core::{
    DbMapperImpl, JsonPostDao, PostDao, PostDbModel, PostModel, PostRepository, Repository,
    Snapshot, StoreError, OWNER_USERNAME,
};

async fn started_repository(dao: JsonPostDao) -> Arc<PostRepository> {
    let (repository, init) = PostRepository::start(
        Arc::new(dao),
        Arc::new(DbMapperImpl::new(OWNER_USERNAME)),
        OWNER_USERNAME,
    );
    init.wait().await.expect("start-up");
    repository
}

#[tokio::test]
async fn empty_store_is_seeded_and_published() {
    let dao = JsonPostDao::in_memory();
    let (repository, init) = PostRepository::start(
        Arc::new(dao.clone()),
        Arc::new(DbMapperImpl::new(OWNER_USERNAME)),
        OWNER_USERNAME,
    );
    let mut all = repository.all_posts();

    let report = init.wait().await.unwrap();
    let defaults = PostDbModel::default_posts();
    assert_eq!(report.seeded, defaults.len());
    assert_eq!(report.loaded, defaults.len());

    let posts = tokio::time::timeout(Duration::from_secs(2), all.wait_ready())
        .await
        .expect("timed out")
        .expect("cache dropped");
    assert_eq!(posts.len(), defaults.len());

    let owned = repository.all_owned_posts().latest().into_ready().unwrap();
    let expected_owned = defaults.iter().filter(|p| p.username == OWNER_USERNAME).count();
    assert_eq!(owned.len(), expected_owned);
    assert!(owned.iter().all(|p| p.username == OWNER_USERNAME));
}

#[tokio::test]
async fn non_empty_store_is_not_reseeded() {
    let dao = JsonPostDao::in_memory();
    dao.insert(PostDbModel::default_posts().remove(0)).await.unwrap();

    let (repository, init) = PostRepository::start(
        Arc::new(dao),
        Arc::new(DbMapperImpl::new(OWNER_USERNAME)),
        OWNER_USERNAME,
    );
    let report = init.wait().await.unwrap();
    assert_eq!(report.seeded, 0);
    assert_eq!(report.loaded, 1);
    assert_eq!(repository.all_posts().latest().into_ready().unwrap().len(), 1);
}

#[tokio::test]
async fn insert_refreshes_both_caches() {
    let repository = started_repository(JsonPostDao::in_memory()).await;
    let before = repository.all_posts().latest().into_ready().unwrap().len();
    let owned_before = repository.all_owned_posts().latest().into_ready().unwrap().len();

    let mut mine = PostModel::text_post("Mine", "written by the owner");
    mine.subreddit = "rust".into();
    repository.insert(mine).await.unwrap();

    let mut theirs = PostModel::text_post("Theirs", "someone else");
    theirs.username = "stranger".into();
    repository.insert(theirs).await.unwrap();

    let all = repository.all_posts().latest().into_ready().unwrap();
    let owned = repository.all_owned_posts().latest().into_ready().unwrap();
    assert_eq!(all.len(), before + 2);
    assert_eq!(owned.len(), owned_before + 1);
    assert!(all.iter().any(|p| p.title == "Mine" && p.username == OWNER_USERNAME));
    assert!(all.iter().any(|p| p.title == "Theirs"));
    assert!(owned.iter().any(|p| p.title == "Mine"));
    assert!(!owned.iter().any(|p| p.title == "Theirs"));
}

#[tokio::test]
async fn delete_all_publishes_empty_not_pending() {
    let repository = started_repository(JsonPostDao::in_memory()).await;
    repository.delete_all().await.unwrap();

    assert_eq!(repository.all_posts().latest(), Snapshot::Ready(Vec::new()));
    assert_eq!(repository.all_owned_posts().latest(), Snapshot::Ready(Vec::new()));
    assert!(repository.all_subreddits("").await.unwrap().is_empty());
}

#[tokio::test]
async fn subreddit_filter_is_a_substring_subset() {
    let repository = started_repository(JsonPostDao::in_memory()).await;
    let all = repository.all_subreddits("").await.unwrap();
    assert!(!all.is_empty());
    assert_eq!(all, repository.all_subreddits("").await.unwrap());

    for filter in ["android", "dev", "o", "zzz", "Android"] {
        let expected: Vec<String> = all.iter().filter(|s| s.contains(filter)).cloned().collect();
        assert_eq!(repository.all_subreddits(filter).await.unwrap(), expected, "filter {filter:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_insert_and_delete_leave_consistent_caches() {
    let dao = JsonPostDao::in_memory();
    let repository = started_repository(dao.clone()).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let repo = repository.clone();
        handles.push(tokio::spawn(async move {
            if i % 4 == 0 {
                repo.delete_all().await
            } else {
                repo.insert(PostModel::text_post(format!("post {i}"), "")).await
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let cached: Vec<String> = repository
        .all_posts()
        .latest()
        .into_ready()
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    let stored: Vec<String> = dao
        .get_all_posts()
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.title)
        .collect();
    assert_eq!(cached, stored);
    assert!(cached.iter().all(|t| t.starts_with("post ")));
}

struct FailingDao;

#[async_trait]
impl PostDao for FailingDao {
    async fn get_all_posts(&self) -> Result<Vec<PostDbModel>, StoreError> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk unavailable").into())
    }

    async fn get_all_owned_posts(&self, _username: &str) -> Result<Vec<PostDbModel>, StoreError> {
        self.get_all_posts().await
    }

    async fn get_all_subreddits(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _post: PostDbModel) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_all(&self, _posts: Vec<PostDbModel>) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn start_up_failure_is_observable() {
    let (repository, init) = PostRepository::start(
        Arc::new(FailingDao),
        Arc::new(DbMapperImpl::new(OWNER_USERNAME)),
        OWNER_USERNAME,
    );
    assert!(matches!(init.wait().await, Err(StoreError::Io(_))));
    assert_eq!(repository.all_posts().latest(), Snapshot::Pending);
    assert_eq!(repository.all_owned_posts().latest(), Snapshot::Pending);
}
