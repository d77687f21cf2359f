//! In-app routes.
//!
//! Paths look like browser URLs: `/home` and `/league/:id?name=&sport=`.
//! The detail route carries the league's display name and sport so the
//! detail screen can render them without reaching back into the list.

use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::form_urlencoded;

use crate::state::League;

pub const HOME_PATH: &str = "/home";
pub const UNKNOWN_LEAGUE: &str = "Unknown League";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    League {
        id: String,
        name: Option<String>,
        sport: Option<String>,
    },
    NotFound(String),
}

impl Route {
    /// Parses an app path. `/` redirects to the home list.
    pub fn parse(raw: &str) -> Route {
        let raw = raw.trim();
        let without_fragment = raw.split('#').next().unwrap_or_default();
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };

        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] | ["home"] => Route::Home,
            ["league", id] => {
                let id = percent_decode_str(id).decode_utf8_lossy().into_owned();
                let mut name = None;
                let mut sport = None;
                for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                    match key.as_ref() {
                        "name" if name.is_none() => name = Some(value.into_owned()),
                        "sport" if sport.is_none() => sport = Some(value.into_owned()),
                        _ => {}
                    }
                }
                Route::League { id, name, sport }
            }
            _ => Route::NotFound(raw.to_string()),
        }
    }

    pub fn league_detail(league: &League) -> Route {
        Route::League {
            id: league.id.clone(),
            name: Some(league.name.clone()),
            sport: Some(league.sport.clone()),
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::League { id, name, sport } => {
                let mut path = format!("/league/{}", utf8_percent_encode(id, NON_ALPHANUMERIC));
                let mut query = form_urlencoded::Serializer::new(String::new());
                if let Some(name) = name {
                    query.append_pair("name", name);
                }
                if let Some(sport) = sport {
                    query.append_pair("sport", sport);
                }
                let query = query.finish();
                if !query.is_empty() {
                    path.push('?');
                    path.push_str(&query);
                }
                path
            }
            Route::NotFound(path) => path.clone(),
        }
    }
}

/// Display fields for the detail screen, with the defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueHeading {
    pub id: String,
    pub name: String,
    pub sport: String,
}

impl LeagueHeading {
    pub fn new(id: &str, name: Option<&str>, sport: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name
                .filter(|n| !n.is_empty())
                .unwrap_or(UNKNOWN_LEAGUE)
                .to_string(),
            sport: sport.unwrap_or_default().to_string(),
        }
    }
}
