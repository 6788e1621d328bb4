//! Free-text ranking for video lists. Search never removes rows, it only
//! orders them.

use std::cmp::Ordering;
use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "how", "i", "in",
    "is", "it", "me", "my", "of", "on", "or", "so", "that", "the", "this", "to", "was", "we",
    "what", "when", "where", "who", "why", "will", "with", "you", "your",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Lowercased alphanumeric words of `text`.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Distinct non-stopword terms of a search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    terms: Vec<String>,
}

impl SearchTerms {
    /// `None` when the query has nothing to rank by.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut seen = HashSet::new();
        let terms: Vec<String> = tokenize(raw)
            .filter(|w| !is_stopword(w))
            .filter(|w| seen.insert(w.clone()))
            .collect();

        if terms.is_empty() {
            None
        } else {
            Some(Self { terms })
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn score(&self, title: &str, description: &str) -> Relevance {
        Relevance {
            title: self.matches_in(title),
            description: self.matches_in(description),
        }
    }

    fn matches_in(&self, text: &str) -> usize {
        let words: HashSet<String> = tokenize(text).collect();
        self.terms.iter().filter(|t| words.contains(*t)).count()
    }
}

/// Title matches dominate; description matches break ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relevance {
    pub title: usize,
    pub description: usize,
}

impl Ord for Relevance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.title
            .cmp(&other.title)
            .then(self.description.cmp(&other.description))
    }
}

impl PartialOrd for Relevance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_stopwords_and_duplicates() {
        let terms = SearchTerms::parse("The cat, the CAT and a video!").unwrap();
        assert_eq!(terms.terms(), &["cat".to_string(), "video".to_string()]);
        assert!(SearchTerms::parse("the and of").is_none());
        assert!(SearchTerms::parse("   ").is_none());
    }

    #[test]
    fn test_score_counts_distinct_terms() {
        let terms = SearchTerms::parse("cat video").unwrap();
        let both = terms.score("My Cat Video", "");
        let neither = terms.score("Dog tricks", "a cat appears");
        assert_eq!(both.title, 2);
        assert_eq!(neither.title, 0);
        assert_eq!(neither.description, 1);
        assert!(both > neither);
    }

    #[test]
    fn test_description_breaks_ties() {
        let a = Relevance {
            title: 1,
            description: 0,
        };
        let b = Relevance {
            title: 1,
            description: 2,
        };
        let c = Relevance {
            title: 2,
            description: 0,
        };
        assert!(b > a);
        assert!(c > b);
    }
}
