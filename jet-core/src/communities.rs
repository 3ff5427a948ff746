/// A community the user can follow from the communities screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Community {
    pub id: i32,
    pub name: &'static str,
}

/// Known communities; toggle state is derived over exactly these ids.
pub const COMMUNITIES: &[Community] = &[
    Community { id: 1, name: "android" },
    Community { id: 2, name: "androiddev" },
    Community { id: 3, name: "androidapps" },
    Community { id: 4, name: "kotlin" },
    Community { id: 5, name: "programming" },
    Community { id: 6, name: "rust" },
    Community { id: 7, name: "digitalnomad" },
];

pub fn community_ids() -> impl Iterator<Item = i32> {
    COMMUNITIES.iter().map(|c| c.id)
}
