//! Corpus Data Types
//!
//! A post is a frontmatter block (the searchable metadata) followed by a free-form body.

use serde::{Deserialize, Serialize};

/// Metadata block at the top of a post file.
///
/// Keys missing from the file default to empty values; keys this service does not know
/// about (dates, images, drafts...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// A single post held by the `DocumentStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Public path of the post. Empty when the loader has no URL scheme for it.
    pub url: String,
    pub frontmatter: Frontmatter,
    /// Body text following the frontmatter block.
    pub content: String,
}

impl Document {
    pub fn new(
        url: impl Into<String>,
        frontmatter: Frontmatter,
        content: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            frontmatter,
            content: content.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.frontmatter.title
    }

    pub fn description(&self) -> &str {
        &self.frontmatter.description
    }

    pub fn topics(&self) -> &[String] {
        &self.frontmatter.topics
    }
}
