//! Hall of Howls
//!
//! Read-only archive of past rants with search and the four listing orders.
//! There is no write path; the archive ships with a bundled set of examples.

use std::cmp::Reverse;

use tracing::debug;

use crate::archive::Rant;
use crate::simulation::StageResult;
use crate::types::RantSort;

const BUNDLED_RANTS: &str = include_str!("../../data/hall_of_howls.json");

/// Suggestions offered while the search box is empty
pub const SEARCH_SUGGESTIONS: [&str; 12] = [
    "shopping cart",
    "pineapple pizza",
    "cereal soup",
    "socks sandals",
    "hot dog taco",
    "milk first",
    "toilet paper",
    "standing desk",
    "gif pronunciation",
    "cold pizza",
    "small talk",
    "comic sans",
];

/// Archive of past rants
#[derive(Debug, Clone, Default)]
pub struct HallOfHowls {
    rants: Vec<Rant>,
}

impl HallOfHowls {
    /// Archive holding the given rants
    pub fn new(rants: Vec<Rant>) -> Self {
        Self { rants }
    }

    /// Archive of the bundled example rants
    pub fn with_examples() -> StageResult<Self> {
        Self::from_json(BUNDLED_RANTS)
    }

    /// Parse an archive from a JSON array of rants
    pub fn from_json(json: &str) -> StageResult<Self> {
        let rants: Vec<Rant> = serde_json::from_str(json)?;
        debug!("Loaded {} archived rants", rants.len());
        Ok(Self::new(rants))
    }

    /// Every archived rant in storage order
    pub fn rants(&self) -> &[Rant] {
        &self.rants
    }

    /// Number of archived rants
    pub fn len(&self) -> usize {
        self.rants.len()
    }

    /// Whether the archive is empty
    pub fn is_empty(&self) -> bool {
        self.rants.is_empty()
    }

    /// Rants whose nickname, text or transcript contains `term`, ignoring case
    pub fn search(&self, term: &str) -> Vec<&Rant> {
        let needle = term.trim().to_lowercase();
        self.rants.iter().filter(|r| r.matches(&needle)).collect()
    }

    /// Every rant in the given order
    pub fn sorted(&self, sort: RantSort) -> Vec<&Rant> {
        let mut rants: Vec<&Rant> = self.rants.iter().collect();
        sort_rants(&mut rants, sort);
        rants
    }

    /// Search then sort
    pub fn query(&self, term: Option<&str>, sort: RantSort) -> Vec<&Rant> {
        let mut rants = self.search(term.unwrap_or(""));
        sort_rants(&mut rants, sort);
        rants
    }

    /// Search suggestions that still have at least one match
    pub fn suggestions(&self) -> Vec<&'static str> {
        SEARCH_SUGGESTIONS
            .iter()
            .copied()
            .filter(|s| s.split_whitespace().any(|word| !self.search(word).is_empty()))
            .collect()
    }
}

/// Stable sort by the listing order, biggest first
pub fn sort_rants(rants: &mut [&Rant], sort: RantSort) {
    match sort {
        RantSort::Recent => rants.sort_by_key(|r| Reverse(r.created_at)),
        RantSort::Popular => rants.sort_by_key(|r| Reverse(r.reactions.plus_one)),
        RantSort::Longest => rants.sort_by_key(|r| Reverse(r.duration)),
        RantSort::Controversial => rants.sort_by_key(|r| Reverse(r.reactions.controversy_score())),
    }
}
