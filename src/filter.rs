use std::collections::BTreeSet;
use std::sync::Arc;

use crate::state::{League, LeagueList};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against the league name.
    pub search_term: String,
    /// Exact sport to keep; `None` (or an empty string) keeps every sport.
    pub selected_sport: Option<String>,
}

impl FilterCriteria {
    pub fn new(search_term: impl Into<String>, selected_sport: Option<&str>) -> Self {
        Self {
            search_term: search_term.into(),
            selected_sport: selected_sport.map(|s| s.to_string()),
        }
    }

    pub fn sport(&self) -> Option<&str> {
        self.selected_sport.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.sport().is_none()
    }
}

/// Distinct sports in ascending byte order.
pub fn derive_sport_set(leagues: &[League]) -> Vec<String> {
    leagues
        .iter()
        .map(|league| league.sport.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Leagues matching both the search term and the sport, in input order.
pub fn apply_filter<'a>(leagues: &'a [League], criteria: &FilterCriteria) -> Vec<&'a League> {
    let needle = criteria.search_term.to_lowercase();
    let sport = criteria.sport();
    leagues
        .iter()
        .filter(|league| needle.is_empty() || league.name.to_lowercase().contains(&needle))
        .filter(|league| sport.is_none_or(|s| league.sport == s))
        .collect()
}

/// Sport set cached against the identity of the list it came from.
#[derive(Debug, Default)]
pub struct SportSetMemo {
    source: Option<LeagueList>,
    sports: Vec<String>,
    recomputes: usize,
}

impl SportSetMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, list: &LeagueList) -> &[String] {
        let same = self
            .source
            .as_ref()
            .is_some_and(|prev| Arc::ptr_eq(prev, list));
        if !same {
            self.sports = derive_sport_set(list);
            self.source = Some(Arc::clone(list));
            self.recomputes += 1;
        }
        &self.sports
    }

    pub fn sports(&self) -> &[String] {
        &self.sports
    }

    pub fn recomputes(&self) -> usize {
        self.recomputes
    }
}
