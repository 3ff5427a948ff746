pub mod cache;
pub mod communities;
pub mod config;
pub mod dao;
pub mod error;
pub mod mapper;
pub mod models;
mod persist;
pub mod preferences;
pub mod repository;
pub mod tasks;
pub mod viewmodel;

pub use cache::{BroadcastCache, CacheReader, Snapshot};
pub use communities::{Community, COMMUNITIES};
pub use config::{AppConfig, WindowConfig};
pub use dao::{JsonPostDao, PostDao};
pub use error::StoreError;
pub use mapper::{DbMapper, DbMapperImpl};
pub use models::{ColorModel, PostDbModel, PostModel, PostType};
pub use preferences::{PreferenceStore, Preferences};
pub use repository::{InitHandle, InitReport, PostRepository, Repository, OWNER_USERNAME};
pub use tasks::TaskGroup;
pub use viewmodel::{MainViewModel, ToggleWatch};
