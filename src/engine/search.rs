use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::hierarchy::NodeId;

/// Case-insensitive substring filter over display names.
///
/// An empty (or all-whitespace) query matches everything, so nothing is dimmed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFilter {
    query: String,
    needle: String,
}

impl SearchFilter {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_owned(),
            needle: query.trim().to_lowercase(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.needle.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        !self.is_active() || text.to_lowercase().contains(&self.needle)
    }

    /// Matching candidates, best fuzzy score first, ties broken by handle.
    pub fn ranked<'a, I>(&self, candidates: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = (NodeId, &'a str)>,
    {
        if !self.is_active() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default().ignore_case();
        let mut scored = candidates
            .into_iter()
            .filter(|(_, text)| self.matches(text))
            .map(|(id, text)| {
                let score = matcher.fuzzy_match(text, &self.needle).unwrap_or(0);
                (score, id)
            })
            .collect::<Vec<_>>();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, id)| id).collect()
    }
}
