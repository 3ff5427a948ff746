use std::sync::Arc;

use jet_core::{
    DbMapperImpl, JsonPostDao, PostDao, PostDbModel, PostModel, PostRepository, Repository,
    OWNER_USERNAME,
};

async fn open(dir: &std::path::Path) -> (JsonPostDao, Arc<PostRepository>) {
    let dao = JsonPostDao::load_from(dir.join("posts.json")).await;
    let (repository, init) = PostRepository::start(
        Arc::new(dao.clone()),
        Arc::new(DbMapperImpl::new(OWNER_USERNAME)),
        OWNER_USERNAME,
    );
    init.wait().await.expect("start-up");
    (dao, repository)
}

#[tokio::test]
async fn seeded_and_inserted_posts_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();

    let (_dao, repository) = open(dir.path()).await;
    repository
        .insert(PostModel::text_post("Persisted", "still here"))
        .await
        .unwrap();
    drop(repository);

    let (dao, repository) = open(dir.path()).await;
    let rows = dao.get_all_posts().await.unwrap();
    assert_eq!(rows.len(), PostDbModel::default_posts().len() + 1);
    let owned = repository.all_owned_posts().latest().into_ready().unwrap();
    assert!(owned.iter().any(|p| p.title == "Persisted"));
}

#[tokio::test]
async fn deleted_store_is_reseeded_on_next_start() {
    let dir = tempfile::TempDir::new().unwrap();

    let (_dao, repository) = open(dir.path()).await;
    repository.delete_all().await.unwrap();
    drop(repository);

    let (dao, _repository) = open(dir.path()).await;
    assert_eq!(
        dao.get_all_posts().await.unwrap().len(),
        PostDbModel::default_posts().len()
    );
}

#[tokio::test]
async fn corrupt_store_falls_back_to_tmp_copy() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    tokio::fs::write(&path, b"{ this is not json ").await.unwrap();

    let row = PostDbModel::default_posts().remove(1);
    let bytes = serde_json::to_vec(&vec![row.clone()]).unwrap();
    tokio::fs::write(dir.path().join("posts.json.tmp"), bytes).await.unwrap();

    let dao = JsonPostDao::load_from(&path).await;
    let rows = dao.get_all_posts().await.unwrap();
    assert_eq!(rows, vec![row]);
}

#[tokio::test]
async fn failed_write_keeps_store_and_caches_in_step() {
    let dir = tempfile::TempDir::new().unwrap();
    let (dao, repository) = open(dir.path()).await;
    let before = repository.all_posts().latest();

    let path = dir.path().join("posts.json");
    tokio::fs::remove_file(&path).await.unwrap();
    tokio::fs::create_dir_all(path.join("blocker")).await.unwrap();

    assert!(repository
        .insert(PostModel::text_post("Ghost", "never written"))
        .await
        .is_err());
    assert!(repository.delete_all().await.is_err());

    let rows = dao.get_all_posts().await.unwrap();
    assert_eq!(rows.len(), PostDbModel::default_posts().len());
    assert!(rows.iter().all(|row| row.title != "Ghost"));
    assert_eq!(repository.all_posts().latest(), before);
    let owned = repository.all_owned_posts().latest().into_ready().unwrap();
    assert!(owned.iter().all(|post| post.title != "Ghost"));
}

#[tokio::test]
async fn corrupt_store_without_tmp_copy_starts_empty_and_reseeds() {
    let dir = tempfile::TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("posts.json"), b"[{ broken")
        .await
        .unwrap();

    let (dao, _repository) = open(dir.path()).await;
    assert_eq!(
        dao.get_all_posts().await.unwrap().len(),
        PostDbModel::default_posts().len()
    );
}
