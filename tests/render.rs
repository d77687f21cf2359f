use std::sync::Arc;
use std::time::Instant;

use leagues_terminal::error::FetchError;
use leagues_terminal::query_cache::{QueryState, QueryStatus};
use leagues_terminal::route::Route;
use leagues_terminal::state::{BadgeStatus, League, LeagueList, Season};
use leagues_terminal::table::{
    Body, ColumnLayout, EMPTY_PLACEHOLDER, Header, Row, Table, TableError,
};
use leagues_terminal::views::home::{self, HomeView};
use leagues_terminal::views::league::{self, DetailView};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

const BADGE: &str = "https://badges.test/epl.png";

fn make_league(id: &str, name: &str, sport: &str, alternate: &str) -> League {
    League {
        id: id.to_string(),
        name: name.to_string(),
        sport: sport.to_string(),
        alternate_name: alternate.to_string(),
    }
}

fn sample() -> LeagueList {
    Arc::new(vec![
        make_league("1", "English Premier League", "Soccer", "EPL"),
        make_league("2", "NBA", "Basketball", ""),
    ])
}

fn state_with<T>(data: Option<T>, error: Option<FetchError>, is_fetching: bool) -> QueryState<T> {
    let status = match (&data, &error) {
        (_, Some(_)) => QueryStatus::Error,
        (Some(_), None) => QueryStatus::Success,
        (None, None) if is_fetching => QueryStatus::Loading,
        (None, None) => QueryStatus::Idle,
    };
    QueryState {
        status,
        data,
        error,
        is_fetching,
        fetched_at: Some(Instant::now()),
    }
}

fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.y..area.y + area.height)
        .map(|y| {
            (area.x..area.x + area.width)
                .map(|x| buf.get(x, y).symbol())
                .collect::<String>()
        })
        .collect()
}

fn screen_text(buf: &Buffer) -> String {
    buffer_lines(buf).join("\n")
}

type Hit = (String, u16, Option<Route>);

fn render_home(view: &HomeView, query: &QueryState<LeagueList>) -> (String, Vec<Hit>) {
    let mut terminal = Terminal::new(TestBackend::new(100, 20)).expect("terminal");
    let mut hits = Vec::new();
    terminal
        .draw(|frame| {
            let area = frame.size();
            hits = home::render(frame, area, view, query);
        })
        .expect("draw");
    let hits = hits
        .into_iter()
        .map(|hit| (hit.key, hit.area.y, hit.action))
        .collect();
    (screen_text(terminal.backend().buffer()), hits)
}

fn render_detail(
    view: &DetailView,
    query: &QueryState<Option<Season>>,
    badge: Option<BadgeStatus>,
) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
    terminal
        .draw(|frame| {
            let area = frame.size();
            league::render(frame, area, view, query, badge);
        })
        .expect("draw");
    screen_text(terminal.backend().buffer())
}

#[test]
fn home_lists_leagues_in_order_with_click_routes() {
    let list = sample();
    let mut view = HomeView::new();
    view.sync(&list);
    let (screen, hits) = render_home(&view, &state_with(Some(list.clone()), None, false));

    assert!(screen.contains(home::HOME_TITLE));
    assert!(screen.contains("LEAGUE ALTERNATE"));
    assert!(screen.contains("Leagues (2)"));
    let epl = screen.find("English Premier League").expect("first row drawn");
    let nba = screen.find("NBA").expect("second row drawn");
    assert!(epl < nba);

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0, "1");
    assert_eq!(hits[1].0, "2");
    assert_eq!(hits[1].1, hits[0].1 + 1);
    assert_eq!(hits[0].2, Some(Route::league_detail(&list[0])));
}

#[test]
fn home_shows_loading_then_error() {
    let view = HomeView::new();
    let (screen, hits) = render_home(&view, &state_with(None, None, true));
    assert!(screen.contains(home::LOADING_TEXT));
    assert!(hits.is_empty());

    let err = FetchError::Http {
        status: 503,
        message: "Service Unavailable".to_string(),
    };
    let (screen, _) = render_home(&view, &state_with(None, Some(err), false));
    assert!(screen.contains("Error: HTTP error! status: 503"));
    assert!(!screen.contains(home::LOADING_TEXT));
}

#[test]
fn home_filter_with_no_match_shows_placeholder() {
    let list = sample();
    let mut view = HomeView::new();
    view.sync(&list);
    view.set_search("curling");
    let (screen, hits) = render_home(&view, &state_with(Some(list), None, false));
    assert!(screen.contains(EMPTY_PLACEHOLDER));
    assert!(screen.contains("Leagues (0 of 2)"));
    assert!(hits.is_empty());
}

#[test]
fn home_sport_filter_narrows_rows() {
    let list = sample();
    let mut view = HomeView::new();
    view.sync(&list);
    view.select_sport(Some("Basketball"));
    let (screen, hits) = render_home(&view, &state_with(Some(list), None, false));
    assert!(!screen.contains("English Premier League"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, "2");
}

#[test]
fn detail_without_season_says_so() {
    let view = DetailView::new("4328", Some("English Premier League"), Some("Soccer"));
    let screen = render_detail(&view, &state_with(Some(None), None, false), None);
    assert!(screen.contains(league::NO_SEASON_TEXT));
    assert!(screen.contains("English Premier League"));
    assert!(screen.contains("Soccer"));
}

#[test]
fn detail_with_empty_badge_shows_placeholder() {
    let view = DetailView::new("4370", Some("Formula 1"), None);
    let season = Season {
        id: "3".to_string(),
        label: "2024".to_string(),
        badge_url: String::new(),
    };
    let screen = render_detail(&view, &state_with(Some(Some(season)), None, false), None);
    assert!(screen.contains(league::NO_BADGE_TEXT));
}

#[test]
fn detail_shows_badge_until_it_breaks() {
    let view = DetailView::new("4328", Some("English Premier League"), Some("Soccer"));
    let season = Season {
        id: "1".to_string(),
        label: "2024-2025".to_string(),
        badge_url: BADGE.to_string(),
    };
    let query = state_with(Some(Some(season)), None, false);

    let screen = render_detail(&view, &query, Some(BadgeStatus::Loaded));
    assert!(screen.contains(BADGE));
    assert!(screen.contains("English Premier League badge"));

    let screen = render_detail(&view, &query, Some(BadgeStatus::Broken));
    assert!(!screen.contains(BADGE));
    assert!(!screen.contains("English Premier League badge"));
    assert!(!screen.contains(league::NO_BADGE_TEXT));
}

#[test]
fn detail_loading_and_error_states() {
    let view = DetailView::new("9", None, None);
    let screen = render_detail(&view, &state_with(None, None, true), None);
    assert!(screen.contains(league::LOADING_TEXT));

    let screen = render_detail(
        &view,
        &state_with(None, Some(FetchError::network("connection refused")), false),
        None,
    );
    assert!(screen.contains("Error: network error: connection refused"));
    assert!(screen.contains(league::BACK_TO_HOME));
}

#[test]
fn table_rejects_mismatched_rows_and_duplicate_keys() {
    let mut buf = Buffer::empty(Rect::new(0, 0, 40, 5));
    let area = buf.area;
    let table = Table::new(ColumnLayout::equal(2));
    let header = Header::new(["A", "B"]);
    let items = ["x", "y"];

    let short = Body::new(&items, |item: &&str| Row::<()>::new(*item, [*item]));
    assert_eq!(
        table.render(&mut buf, area, &header, &short),
        Err(TableError::ColumnMismatch {
            component: "Row",
            expected: 2,
            found: 1,
        })
    );

    let same_key = Body::new(&items, |item: &&str| Row::<()>::new("k", [*item, *item]));
    assert_eq!(
        table.render(&mut buf, area, &header, &same_key),
        Err(TableError::DuplicateKey("k".to_string()))
    );

    let wide_header = Header::new(["A", "B", "C"]);
    let ok = Body::new(&items, |item: &&str| Row::<()>::new(*item, [*item, *item]));
    assert!(matches!(
        table.render(&mut buf, area, &wide_header, &ok),
        Err(TableError::ColumnMismatch {
            component: "Header",
            ..
        })
    ));
}

#[test]
fn table_renders_uppercase_header_and_placeholder() {
    let mut buf = Buffer::empty(Rect::new(0, 0, 60, 4));
    let area = buf.area;
    let table = Table::new(ColumnLayout::equal(2));
    let header = Header::new(["League", "Sport"]);
    let empty: [League; 0] = [];
    let body = Body::new(&empty, |l: &League| {
        Row::<()>::new(l.id.clone(), [l.name.clone(), l.sport.clone()])
    });
    let hits = table.render(&mut buf, area, &header, &body).expect("render");
    assert!(hits.is_empty());

    let lines = buffer_lines(&buf);
    assert!(lines[0].starts_with("LEAGUE"));
    assert!(lines[0].contains("SPORT"));
    assert!(lines[1].starts_with(EMPTY_PLACEHOLDER));
}

#[test]
fn retry_in_flight_still_shows_the_error_on_both_screens() {
    let err = FetchError::Http {
        status: 502,
        message: "Bad Gateway".to_string(),
    };
    let (screen, hits) = render_home(&HomeView::new(), &state_with(None, Some(err.clone()), true));
    assert!(screen.contains("Error: HTTP error! status: 502"));
    assert!(!screen.contains(home::LOADING_TEXT));
    assert!(hits.is_empty());

    let view = DetailView::new("9", None, None);
    let query = state_with(None, Some(err), true);
    assert_eq!(
        league::detail_panel(&query, None),
        league::DetailPanel::Error("HTTP error! status: 502".to_string())
    );
    let screen = render_detail(&view, &query, None);
    assert!(screen.contains("Error: HTTP error! status: 502"));
    assert!(!screen.contains(league::LOADING_TEXT));
}
