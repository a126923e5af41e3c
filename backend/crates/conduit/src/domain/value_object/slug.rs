//! Slug Value Object
//!
//! URL identifier of an article, derived from its title.

use derive_more::Display;
use serde::Serialize;

use crate::error::{ConduitError, ConduitResult};

/// Article slug
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from an article title
    ///
    /// Fails when the title has no letters or digits to keep.
    pub fn from_title(title: &str) -> ConduitResult<Self> {
        let slug = ::slug::slugify(title);
        if slug.is_empty() {
            return Err(ConduitError::invalid(
                "title",
                "must contain at least one letter or digit",
            ));
        }
        Ok(Self(slug))
    }

    /// Wrap a slug taken from a request path or the database
    pub fn from_db(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_title() {
        let slug = Slug::from_title("How to Train Your Dragon").unwrap();
        assert_eq!(slug.as_str(), "how-to-train-your-dragon");
    }

    #[test]
    fn test_punctuation_only_title() {
        assert!(Slug::from_title("!!! ???").is_err());
    }
}
