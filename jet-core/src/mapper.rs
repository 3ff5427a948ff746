use chrono::{DateTime, Utc};

use crate::models::{PostDbModel, PostModel};

/// Converts between persisted rows and display models.
pub trait DbMapper: Send + Sync {
    fn map_post(&self, row: &PostDbModel) -> PostModel;

    fn map_db_post(&self, post: &PostModel) -> PostDbModel;
}

#[derive(Debug, Clone)]
pub struct DbMapperImpl {
    owner: String,
}

impl DbMapperImpl {
    /// `owner` is stamped on new rows whose post has no username.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }
}

impl DbMapper for DbMapperImpl {
    fn map_post(&self, row: &PostDbModel) -> PostModel {
        PostModel {
            username: row.username.clone(),
            subreddit: row.subreddit.clone(),
            title: row.title.clone(),
            text: row.text.clone(),
            likes: format_count(row.likes),
            comments: format_count(row.comments),
            post_type: row.post_type,
            posted_time: format_posted_time(row.date_posted, Utc::now()),
            image: row.image.clone(),
        }
    }

    fn map_db_post(&self, post: &PostModel) -> PostDbModel {
        let username = if post.username.is_empty() {
            self.owner.clone()
        } else {
            post.username.clone()
        };
        PostDbModel {
            id: None,
            username,
            subreddit: post.subreddit.clone(),
            title: post.title.clone(),
            text: post.text.clone(),
            likes: 0,
            comments: 0,
            post_type: post.post_type,
            date_posted: Utc::now(),
            is_saved: false,
            image: post.image.clone(),
        }
    }
}

/// `950` -> `"950"`, `5614` -> `"5.6k"`, `2_400_000` -> `"2.4m"`.
pub fn format_count(value: u32) -> String {
    match value {
        0..=999 => value.to_string(),
        1_000..=999_999 => format!("{:.1}k", f64::from(value) / 1_000.0),
        _ => format!("{:.1}m", f64::from(value) / 1_000_000.0),
    }
}

/// Short relative age label, e.g. `"now"`, `"12m"`, `"5h"`, `"3d"`.
pub fn format_posted_time(posted: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(posted);
    if age.num_minutes() < 1 {
        "now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h", age.num_hours())
    } else {
        format!("{}d", age.num_days())
    }
}
