use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use crate::error::FetchError;
use crate::league_fetch::LeagueSource;
use crate::state::{League, Season};

/// Offline source with a fixed set of leagues, for running without an API.
pub struct DemoSource {
    leagues: Vec<League>,
    seasons: HashMap<String, Season>,
    latency: Duration,
}

impl DemoSource {
    pub fn new() -> Self {
        Self {
            leagues: seed_leagues(),
            seasons: seed_seasons(),
            latency: Duration::from_millis(300),
        }
    }

    pub fn with_data(leagues: Vec<League>, seasons: HashMap<String, Season>) -> Self {
        Self {
            leagues,
            seasons,
            latency: Duration::ZERO,
        }
    }

    fn wait(&self) {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LeagueSource for DemoSource {
    fn fetch_league_list(&self) -> Result<Vec<League>, FetchError> {
        self.wait();
        Ok(self.leagues.clone())
    }

    fn fetch_league_seasons(&self, league_id: &str) -> Result<Option<Season>, FetchError> {
        if league_id.trim().is_empty() {
            return Err(FetchError::InvalidRequest("league id is empty".to_string()));
        }
        self.wait();
        Ok(self.seasons.get(league_id).cloned())
    }

    fn check_badge(&self, url: &str) -> Result<(), FetchError> {
        if url.starts_with("https://") {
            Ok(())
        } else {
            Err(FetchError::Http {
                status: 404,
                message: "Not Found".to_string(),
            })
        }
    }
}

fn league(id: &str, name: &str, sport: &str, alternate: &str) -> League {
    League {
        id: id.to_string(),
        name: name.to_string(),
        sport: sport.to_string(),
        alternate_name: alternate.to_string(),
    }
}

fn season(id: &str, label: &str, badge: &str) -> Season {
    Season {
        id: id.to_string(),
        label: label.to_string(),
        badge_url: badge.to_string(),
    }
}

pub fn seed_leagues() -> Vec<League> {
    vec![
        league("4328", "English Premier League", "Soccer", "Premier League, EPL"),
        league("4329", "English League Championship", "Soccer", "Championship"),
        league("4331", "German Bundesliga", "Soccer", "Bundesliga"),
        league("4332", "Italian Serie A", "Soccer", "Serie A"),
        league("4334", "French Ligue 1", "Soccer", "Ligue 1 Uber Eats"),
        league("4335", "Spanish La Liga", "Soccer", "LaLiga"),
        league("4370", "Formula 1", "Motorsport", "F1"),
        league("4380", "NHL", "Ice Hockey", "National Hockey League"),
        league("4387", "NBA", "Basketball", "National Basketball Association"),
        league("4391", "NFL", "American Football", "National Football League"),
        league("4424", "MLB", "Baseball", "Major League Baseball"),
        league("4464", "ATP World Tour", "Tennis", ""),
        league("4443", "UFC", "Fighting", "Ultimate Fighting Championship"),
        league("4414", "English Premiership Rugby", "Rugby", "Gallagher Premiership"),
    ]
}

fn seed_seasons() -> HashMap<String, Season> {
    const BADGES: &str = "https://r2.thesportsdb.com/images/media/league/badge";
    [
        (
            "4328",
            season("1", "2024-2025", &format!("{BADGES}/i6o0kh1549879062.png")),
        ),
        (
            "4331",
            season("2", "2024-2025", &format!("{BADGES}/teqh1b1679952008.png")),
        ),
        ("4370", season("3", "2024", "")),
        (
            "4387",
            season("4", "2024-2025", &format!("{BADGES}/frdjqy1536585083.png")),
        ),
        ("4391", season("5", "2024", "http://badges.invalid/nfl.png")),
    ]
    .into_iter()
    .map(|(id, season)| (id.to_string(), season))
    .collect()
}
