use serde::{Deserialize, Serialize};

/// A year/category index discovered on the root page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub link: String,
}

/// A content item on a category page; `link` is its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_category: Option<String>,
}

/// A node at the quality, file or server level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantEntry {
    pub name: String,
    pub link: String,
}

impl VariantEntry {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
        }
    }
}

/// Poster and synopsis of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub poster: Option<String>,
    pub desc: Option<String>,
}

/// Everything read from one fetch of a listing detail page
#[derive(Debug, Clone, Default)]
pub struct DetailPage {
    pub variants: Vec<VariantEntry>,
    pub metadata: MetadataRecord,
}
