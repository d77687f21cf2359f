use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::FetchError;
use crate::state::{League, Season};

/// Where leagues and seasons come from. The worker thread owns one of these.
pub trait LeagueSource: Send {
    fn fetch_league_list(&self) -> Result<Vec<League>, FetchError>;

    /// First season of the league, or `None` when the league has none.
    fn fetch_league_seasons(&self, league_id: &str) -> Result<Option<Season>, FetchError>;

    /// Checks that a badge image can actually be loaded.
    fn check_badge(&self, url: &str) -> Result<(), FetchError>;
}

pub struct SportsDbClient {
    client: &'static Client,
    leagues_url: String,
    seasons_base: String,
}

impl SportsDbClient {
    pub fn new(client: &'static Client, leagues_url: &str, seasons_base: &str) -> Self {
        Self {
            client,
            leagues_url: leagues_url.to_string(),
            seasons_base: seasons_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn seasons_url(&self, league_id: &str) -> String {
        seasons_url(&self.seasons_base, league_id)
    }

    fn get_body(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {url}");
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FetchError::http(status, &body));
        }
        Ok(resp.text()?)
    }
}

impl LeagueSource for SportsDbClient {
    fn fetch_league_list(&self) -> Result<Vec<League>, FetchError> {
        let body = self.get_body(&self.leagues_url)?;
        parse_leagues_json(&body)
    }

    fn fetch_league_seasons(&self, league_id: &str) -> Result<Option<Season>, FetchError> {
        if league_id.trim().is_empty() {
            return Err(FetchError::InvalidRequest("league id is empty".to_string()));
        }
        let body = self.get_body(&self.seasons_url(league_id))?;
        parse_seasons_json(&body)
    }

    fn check_badge(&self, url: &str) -> Result<(), FetchError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::http(status, ""));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.is_empty() && !content_type.starts_with("image/") {
            return Err(FetchError::Decode(format!(
                "badge is not an image ({content_type})"
            )));
        }
        Ok(())
    }
}

pub fn seasons_url(base: &str, league_id: &str) -> String {
    let id: String = url::form_urlencoded::byte_serialize(league_id.as_bytes()).collect();
    format!(
        "{}/search_all_seasons.php?badge=1&id={id}",
        base.trim_end_matches('/')
    )
}

#[derive(Debug, Deserialize)]
struct LeaguesResponse {
    #[serde(default)]
    leagues: Option<Vec<LeagueRow>>,
}

#[derive(Debug, Deserialize)]
struct LeagueRow {
    #[serde(rename = "idLeague", default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(rename = "strLeague", default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(rename = "strSport", default, deserialize_with = "lenient_string")]
    sport: String,
    #[serde(
        rename = "strLeagueAlternate",
        default,
        deserialize_with = "lenient_string"
    )]
    alternate_name: String,
}

#[derive(Debug, Deserialize)]
struct SeasonsResponse {
    #[serde(default)]
    seasons: Option<Vec<SeasonRow>>,
}

#[derive(Debug, Deserialize)]
struct SeasonRow {
    #[serde(rename = "idSeason", default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(rename = "strSeason", default, deserialize_with = "lenient_string")]
    label: String,
    #[serde(rename = "strBadge", default, deserialize_with = "lenient_string")]
    badge: String,
}

// The API sends ids as strings, but nulls and bare numbers show up too.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

pub fn parse_leagues_json(raw: &str) -> Result<Vec<League>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: LeaguesResponse = serde_json::from_str(trimmed)?;
    Ok(data
        .leagues
        .unwrap_or_default()
        .into_iter()
        .map(|row| League {
            id: row.id,
            name: row.name,
            sport: row.sport,
            alternate_name: row.alternate_name,
        })
        .collect())
}

pub fn parse_seasons_json(raw: &str) -> Result<Option<Season>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let data: SeasonsResponse = serde_json::from_str(trimmed)?;
    Ok(data
        .seasons
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|row| Season {
            id: row.id,
            label: row.label,
            badge_url: row.badge,
        }))
}
