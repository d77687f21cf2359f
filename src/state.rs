use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::config::Settings;
use crate::error::FetchError;
use crate::query_cache::{
    FetchTicket, QueryCache, QueryKey, QueryOptions, QueryState, Subscription,
};
use crate::route::Route;
use crate::views::home::HomeView;
use crate::views::league::DetailView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    pub id: String,
    pub name: String,
    pub sport: String,
    pub alternate_name: String,
}

/// The fetched list, shared with every view that renders it. Refetches
/// replace the whole `Arc`, so pointer identity tells "same list" apart.
pub type LeagueList = Arc<Vec<League>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub id: String,
    pub label: String,
    pub badge_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStatus {
    Checking,
    Loaded,
    Broken,
}

#[derive(Debug)]
pub enum View {
    Home(HomeView),
    League(DetailView),
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCommand {
    Query(FetchTicket),
    CheckBadge { url: String },
}

#[derive(Debug, Clone)]
pub enum Delta {
    LeaguesLoaded {
        ticket: FetchTicket,
        result: Result<Vec<League>, FetchError>,
    },
    SeasonLoaded {
        ticket: FetchTicket,
        result: Result<Option<Season>, FetchError>,
    },
    BadgeChecked {
        url: String,
        ok: bool,
    },
    Log(String),
}

#[derive(Debug)]
pub struct AppState {
    pub route: Route,
    pub view: View,
    pub leagues: QueryCache<LeagueList>,
    pub seasons: QueryCache<Option<Season>>,
    pub badges: HashMap<String, BadgeStatus>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    /// Text of the "go to path" prompt while it is open.
    pub route_prompt: Option<String>,
    subscription: Option<Subscription>,
}

impl AppState {
    pub fn new() -> Self {
        let settings = Settings::default();
        Self::with_options(settings.leagues_cache, settings.seasons_cache)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_options(settings.leagues_cache, settings.seasons_cache)
    }

    pub fn with_options(leagues: QueryOptions, seasons: QueryOptions) -> Self {
        Self {
            route: Route::Home,
            view: View::Home(HomeView::new()),
            leagues: QueryCache::new(leagues),
            seasons: QueryCache::new(seasons),
            badges: HashMap::new(),
            logs: VecDeque::new(),
            help_overlay: false,
            route_prompt: None,
            subscription: None,
        }
    }

    pub fn navigate(&mut self, path: &str, now: Instant) -> Vec<FetchCommand> {
        self.open(Route::parse(path), now)
    }

    /// Unmounts the current view and mounts the one for `route`.
    pub fn open(&mut self, route: Route, now: Instant) -> Vec<FetchCommand> {
        if let Some(sub) = self.subscription.take() {
            debug!("unsubscribing {}", sub.key());
            if matches!(sub.key(), QueryKey::Leagues) {
                self.leagues.unsubscribe(sub, now);
            } else {
                self.seasons.unsubscribe(sub, now);
            }
        }
        info!("navigate {}", route.to_path());

        let mut commands = Vec::new();
        self.view = match &route {
            Route::Home => {
                let (sub, ticket) = self.leagues.subscribe(QueryKey::Leagues, now);
                self.subscription = Some(sub);
                commands.extend(ticket.map(FetchCommand::Query));
                let mut home = HomeView::new();
                if let Some(list) = self.leagues.state(&QueryKey::Leagues).data {
                    home.sync(&list);
                }
                View::Home(home)
            }
            Route::League { id, name, sport } => {
                let detail = DetailView::new(id, name.as_deref(), sport.as_deref());
                let (sub, ticket) = self.seasons.subscribe(detail.key(), now);
                self.subscription = Some(sub);
                commands.extend(ticket.map(FetchCommand::Query));
                View::League(detail)
            }
            Route::NotFound(path) => View::NotFound(path.clone()),
        };
        self.route = route;
        commands.extend(self.check_current_badge());
        commands
    }

    /// The key the mounted view observes, if any.
    pub fn current_key(&self) -> Option<&QueryKey> {
        self.subscription.as_ref().map(Subscription::key)
    }

    /// Periodic housekeeping: stale refetch for the mounted view and eviction
    /// of idle entries.
    pub fn tick(&mut self, now: Instant) -> Vec<FetchCommand> {
        let mut commands = Vec::new();
        if let Some(key) = self.current_key().cloned() {
            let ticket = match key {
                QueryKey::Leagues => self.leagues.refresh_if_stale(&key, now),
                QueryKey::LeagueSeasons(_) => self.seasons.refresh_if_stale(&key, now),
            };
            commands.extend(ticket.map(FetchCommand::Query));
        }
        let evicted = self.leagues.collect_garbage(now) + self.seasons.collect_garbage(now);
        if evicted > 0 {
            debug!("evicted {evicted} idle cache entries");
            self.prune_badges();
        }
        commands
    }

    /// Manual refetch of whatever the mounted view shows.
    pub fn refresh(&mut self, now: Instant) -> Vec<FetchCommand> {
        let Some(key) = self.current_key().cloned() else {
            return Vec::new();
        };
        let ticket = match key {
            QueryKey::Leagues => self.leagues.invalidate(&key, now),
            QueryKey::LeagueSeasons(_) => self.seasons.invalidate(&key, now),
        };
        match ticket {
            Some(ticket) => {
                self.push_log(format!("[INFO] Refreshing {}", ticket.key));
                vec![FetchCommand::Query(ticket)]
            }
            None => {
                self.push_log("[INFO] Request already in flight");
                Vec::new()
            }
        }
    }

    pub fn leagues_state(&self) -> QueryState<LeagueList> {
        self.leagues.state(&QueryKey::Leagues)
    }

    pub fn season_state(&self, key: &QueryKey) -> QueryState<Option<Season>> {
        self.seasons.state(key)
    }

    pub fn home_mut(&mut self) -> Option<&mut HomeView> {
        match &mut self.view {
            View::Home(home) => Some(home),
            _ => None,
        }
    }

    pub fn select_next(&mut self) {
        let list = self.leagues_state().data.unwrap_or_default();
        if let Some(home) = self.home_mut() {
            home.select_next(&list);
        }
    }

    pub fn select_prev(&mut self) {
        let list = self.leagues_state().data.unwrap_or_default();
        if let Some(home) = self.home_mut() {
            home.select_prev(&list);
        }
    }

    /// Opens the detail route of the highlighted row.
    pub fn open_selected(&mut self, now: Instant) -> Vec<FetchCommand> {
        let list = self.leagues_state().data.unwrap_or_default();
        let route = match &self.view {
            View::Home(home) => home.selected_league(&list).map(Route::league_detail),
            _ => None,
        };
        match route {
            Some(route) => self.open(route, now),
            None => Vec::new(),
        }
    }

    fn check_current_badge(&mut self) -> Option<FetchCommand> {
        let View::League(detail) = &self.view else {
            return None;
        };
        let season = self.seasons.state(&detail.key()).data.flatten()?;
        self.request_badge_check(&season.badge_url)
    }

    /// Broken badges are checked again; checking or loaded ones are not.
    fn request_badge_check(&mut self, url: &str) -> Option<FetchCommand> {
        if url.is_empty()
            || matches!(
                self.badges.get(url),
                Some(BadgeStatus::Checking | BadgeStatus::Loaded)
            )
        {
            return None;
        }
        self.badges.insert(url.to_string(), BadgeStatus::Checking);
        Some(FetchCommand::CheckBadge {
            url: url.to_string(),
        })
    }

    /// Drops badge statuses whose season is no longer cached.
    fn prune_badges(&mut self) {
        let live: HashSet<&str> = self
            .seasons
            .cached()
            .flatten()
            .map(|season| season.badge_url.as_str())
            .collect();
        self.badges.retain(|url, _| live.contains(url.as_str()));
    }

    pub fn badge_status(&self, url: &str) -> Option<BadgeStatus> {
        self.badges.get(url).copied()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds a worker result into the state. May ask for follow-up work.
pub fn apply_delta(state: &mut AppState, delta: Delta, now: Instant) -> Vec<FetchCommand> {
    match delta {
        Delta::LeaguesLoaded { ticket, result } => {
            let count = result.as_ref().map(Vec::len).ok();
            if let Err(err) = &result {
                warn!("leagues fetch failed: {err}");
                state.push_log(format!("[WARN] Leagues fetch error: {err}"));
            }
            let applied = state
                .leagues
                .resolve(&ticket, result.map(Arc::new), now);
            if applied {
                if let Some(count) = count {
                    state.push_log(format!("[INFO] Loaded {count} leagues"));
                }
                if let Some(list) = state.leagues_state().data
                    && let Some(home) = state.home_mut()
                {
                    home.sync(&list);
                }
            }
            Vec::new()
        }
        Delta::SeasonLoaded { ticket, result } => {
            if let Err(err) = &result {
                warn!("{} fetch failed: {err}", ticket.key);
                state.push_log(format!("[WARN] Season fetch error: {err}"));
            }
            let badge = result
                .as_ref()
                .ok()
                .and_then(|season| season.as_ref())
                .map(|season| season.badge_url.clone());
            let applied = state.seasons.resolve(&ticket, result, now);
            // Unmounted views check when they are opened again.
            let mounted = state.current_key() == Some(&ticket.key);
            match badge {
                Some(url) if applied && mounted => {
                    state.request_badge_check(&url).into_iter().collect()
                }
                _ => Vec::new(),
            }
        }
        Delta::BadgeChecked { url, ok } => {
            if !ok {
                state.push_log(format!("[WARN] Badge image failed to load: {url}"));
            }
            // Statuses pruned while the check ran stay dropped.
            if let Some(status) = state.badges.get_mut(&url) {
                *status = if ok {
                    BadgeStatus::Loaded
                } else {
                    BadgeStatus::Broken
                };
            }
            Vec::new()
        }
        Delta::Log(msg) => {
            state.push_log(msg);
            Vec::new()
        }
    }
}
