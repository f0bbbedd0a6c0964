//! Static demo catalog of movie reviews backing the search endpoint

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub reviews: Vec<String>,
}

/// Title to reviews table with loose, case-insensitive title matching
#[derive(Debug, Clone, Default)]
pub struct ReviewCatalog {
    entries: Vec<CatalogEntry>,
}

impl ReviewCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The built-in demo table
    pub fn demo() -> Self {
        let entry = |title: &str, reviews: &[&str]| CatalogEntry {
            title: title.to_string(),
            reviews: reviews.iter().map(|r| r.to_string()).collect(),
        };

        Self::new(vec![
            entry(
                "inception",
                &[
                    "This is an amazing movie with mind-bending plot and excellent cinematography",
                    "Absolutely fantastic! One of the best sci-fi films ever made",
                    "Great storytelling and incredible performances by the cast",
                    "Mind-blowing special effects and a complex but engaging storyline",
                    "Brilliant direction and outstanding visual effects",
                ],
            ),
            entry(
                "the dark knight",
                &[
                    "Outstanding performance by Heath Ledger, absolutely brilliant movie",
                    "One of the greatest superhero films ever made",
                    "Incredible action sequences and compelling narrative",
                    "Masterpiece of cinema with phenomenal acting",
                    "Absolutely fantastic film with great plot",
                ],
            ),
            entry(
                "the room",
                &[
                    "Terrible movie, one of the worst I have ever seen",
                    "Awful acting and horrible dialogue, waste of time",
                    "Bad plot and poor direction, very disappointing",
                    "Terrible screenplay and awful performances",
                    "Horrible movie, not worth watching",
                ],
            ),
            entry(
                "batman forever",
                &[
                    "Bad movie with poor acting and ridiculous plot",
                    "Terrible direction and awful dialogue",
                    "Disappointing and boring, waste of time",
                    "Horrible screenplay, not recommended",
                    "Bad film overall with weak performances",
                ],
            ),
        ])
    }

    /// First entry whose title contains the query or is contained in it,
    /// ignoring case and surrounding whitespace
    pub fn find(&self, query: &str) -> Option<&CatalogEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| {
            let title = entry.title.to_lowercase();
            title.contains(&query) || query.contains(&title)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_size() {
        let catalog = ReviewCatalog::demo();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_exact_title_any_case() {
        let catalog = ReviewCatalog::demo();
        let entry = catalog.find("Inception").unwrap();
        assert_eq!(entry.title, "inception");
        assert_eq!(entry.reviews.len(), 5);
    }

    #[test]
    fn test_query_containing_title() {
        let catalog = ReviewCatalog::demo();
        assert_eq!(
            catalog.find("The Dark Knight (2008)").unwrap().title,
            "the dark knight"
        );
    }

    #[test]
    fn test_partial_title() {
        let catalog = ReviewCatalog::demo();
        assert_eq!(catalog.find("batman").unwrap().title, "batman forever");
    }

    #[test]
    fn test_first_match_wins() {
        let catalog = ReviewCatalog::demo();
        assert_eq!(catalog.find("the").unwrap().title, "the dark knight");
    }

    #[test]
    fn test_unknown_and_blank_queries() {
        let catalog = ReviewCatalog::demo();
        assert!(catalog.find("Unknown Movie XYZ").is_none());
        assert!(catalog.find("   ").is_none());
    }
}
