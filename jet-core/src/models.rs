use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ColorModel {
    pub name: String,
    pub hex: String,
}

impl ColorModel {
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }

    /// The fixed palette offered by the color picker, `Default` (white) first.
    pub fn presets() -> Vec<ColorModel> {
        const PALETTE: [(&str, &str); 14] = [
            ("White", "#FFFFFF"),
            ("Red", "#E57373"),
            ("Pink", "#F06292"),
            ("Purple", "#CE93D8"),
            ("Blue", "#2196F3"),
            ("Cyan", "#00ACC1"),
            ("Teal", "#26A69A"),
            ("Green", "#4CAF50"),
            ("Light Green", "#8BC34A"),
            ("Lime", "#CDDC39"),
            ("Yellow", "#FFEB3B"),
            ("Orange", "#FF9800"),
            ("Brown", "#BCAAA4"),
            ("Gray", "#9E9E9E"),
        ];
        PALETTE
            .iter()
            .map(|(name, hex)| ColorModel::new(*name, *hex))
            .collect()
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn rgb(&self) -> Result<[u8; 3], StoreError> {
        let digits = self.hex.strip_prefix('#').unwrap_or(&self.hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(StoreError::InvalidColor(self.hex.clone()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| StoreError::InvalidColor(self.hex.clone()))
        };
        Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
    }
}

impl Default for ColorModel {
    fn default() -> Self {
        Self::new("White", "#FFFFFF")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PostModel {
    pub username: String,
    pub subreddit: String,
    pub title: String,
    pub text: String,
    pub likes: String,
    pub comments: String,
    pub post_type: PostType,
    pub posted_time: String,
    pub image: Option<String>,
}

impl PostModel {
    pub fn text_post(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            post_type: PostType::Text,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDbModel {
    pub id: Option<i64>,
    pub username: String,
    pub subreddit: String,
    pub title: String,
    pub text: String,
    pub likes: u32,
    pub comments: u32,
    pub post_type: PostType,
    pub date_posted: DateTime<Utc>,
    pub is_saved: bool,
    pub image: Option<String>,
}

impl PostDbModel {
    /// Rows inserted the first time the post store is found empty.
    pub fn default_posts() -> Vec<PostDbModel> {
        let now = Utc::now();
        let row = |id: i64,
                   username: &str,
                   subreddit: &str,
                   title: &str,
                   text: &str,
                   likes: u32,
                   comments: u32,
                   image: Option<&str>,
                   hours_ago: i64| PostDbModel {
            id: Some(id),
            username: username.to_owned(),
            subreddit: subreddit.to_owned(),
            title: title.to_owned(),
            text: text.to_owned(),
            likes,
            comments,
            post_type: if image.is_some() {
                PostType::Image
            } else {
                PostType::Text
            },
            date_posted: now - Duration::hours(hours_ago),
            is_saved: false,
            image: image.map(str::to_owned),
        };

        vec![
            row(1, "raywenderlich", "androiddev", "Check out this new book about Jetpack Compose from raywenderlich.com!", "Check out this new book about Jetpack Compose from raywenderlich.com!", 5614, 523, None, 4),
            row(2, "pro_dev", "digitalnomad", "Digital nomad life", "Working from a different city every month", 4000, 153, Some("post_image_1"), 6),
            row(3, "johndoe", "androiddev", "Compose state hoisting", "How do you decide where to hoist state?", 1236, 98, None, 1),
            row(4, "johndoe", "rust", "Ownership finally clicked", "Borrowing rules make sense once you draw the lifetimes", 950, 41, None, 12),
            row(5, "compose_fan", "kotlin", "Coroutines vs. threads", "What do you pick for background work?", 2400, 327, None, 20),
            row(6, "pixel_art", "programming", "My workspace", "Finally finished the setup", 8800, 612, Some("post_image_2"), 30),
            row(7, "johndoe", "programming", "Favourite keyboard shortcuts?", "Share the ones you use every day", 310, 87, None, 40),
            row(8, "learner42", "android", "First app published", "It only took three rewrites", 120, 15, None, 52),
        ]
    }
}
