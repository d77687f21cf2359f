use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::filter::{FilterCriteria, SportSetMemo, apply_filter};
use crate::query_cache::QueryState;
use crate::route::Route;
use crate::state::{League, LeagueList};
use crate::table::{Body, ColumnLayout, Header, Row, RowHit, Table};
use crate::views::centered_rect;

pub const HOME_TITLE: &str = "Welcome to the League Listing Home Page";
pub const ALL_SPORTS: &str = "All sports";
pub const LOADING_TEXT: &str = "Loading leagues...";
const SEARCH_PLACEHOLDER: &str = "Search leagues... (/)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeFocus {
    #[default]
    Table,
    Search,
    SportPicker {
        cursor: usize,
    },
}

/// List screen state. Created fresh every time the list is mounted.
#[derive(Debug, Default)]
pub struct HomeView {
    pub criteria: FilterCriteria,
    pub focus: HomeFocus,
    selected: Option<String>,
    sports: SportSetMemo,
}

impl HomeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, list: &LeagueList) {
        self.sports.sync(list);
    }

    pub fn sports(&self) -> &[String] {
        self.sports.sports()
    }

    /// Entries of the sport dropdown, "all" first.
    pub fn sport_options(&self) -> Vec<String> {
        std::iter::once(ALL_SPORTS.to_string())
            .chain(self.sports().iter().cloned())
            .collect()
    }

    pub fn visible<'a>(&self, leagues: &'a [League]) -> Vec<&'a League> {
        apply_filter(leagues, &self.criteria)
    }

    fn selected_index(&self, visible: &[&League]) -> Option<usize> {
        if visible.is_empty() {
            return None;
        }
        let pos = self
            .selected
            .as_deref()
            .and_then(|key| visible.iter().position(|l| l.id == key));
        Some(pos.unwrap_or(0))
    }

    /// The highlighted league. Falls back to the first visible row when the
    /// previous selection was filtered out.
    pub fn selected_league<'a>(&self, leagues: &'a [League]) -> Option<&'a League> {
        let visible = self.visible(leagues);
        let idx = self.selected_index(&visible)?;
        visible.get(idx).copied()
    }

    pub fn select(&mut self, key: &str) {
        self.selected = Some(key.to_string());
    }

    pub fn select_next(&mut self, leagues: &[League]) {
        let visible = self.visible(leagues);
        let Some(idx) = self.selected_index(&visible) else {
            self.selected = None;
            return;
        };
        let next = (idx + 1) % visible.len();
        self.selected = Some(visible[next].id.clone());
    }

    pub fn select_prev(&mut self, leagues: &[League]) {
        let visible = self.visible(leagues);
        let Some(idx) = self.selected_index(&visible) else {
            self.selected = None;
            return;
        };
        let prev = if idx == 0 { visible.len() - 1 } else { idx - 1 };
        self.selected = Some(visible[prev].id.clone());
    }

    pub fn focus_search(&mut self) {
        self.focus = HomeFocus::Search;
    }

    pub fn push_search(&mut self, c: char) {
        self.criteria.search_term.push(c);
    }

    pub fn pop_search(&mut self) {
        self.criteria.search_term.pop();
    }

    pub fn set_search(&mut self, term: &str) {
        self.criteria.search_term = term.to_string();
    }

    pub fn leave_search(&mut self) {
        self.focus = HomeFocus::Table;
    }

    pub fn open_sport_picker(&mut self) {
        let cursor = self
            .criteria
            .sport()
            .and_then(|sport| self.sports().iter().position(|s| s == sport))
            .map(|pos| pos + 1)
            .unwrap_or(0);
        self.focus = HomeFocus::SportPicker { cursor };
    }

    pub fn move_picker(&mut self, step: isize) {
        let HomeFocus::SportPicker { cursor } = self.focus else {
            return;
        };
        let len = self.sports().len() as isize + 1;
        let next = (cursor as isize + step).rem_euclid(len) as usize;
        self.focus = HomeFocus::SportPicker { cursor: next };
    }

    pub fn confirm_picker(&mut self) {
        let HomeFocus::SportPicker { cursor } = self.focus else {
            return;
        };
        self.criteria.selected_sport = match cursor {
            0 => None,
            n => self.sports().get(n - 1).cloned(),
        };
        self.focus = HomeFocus::Table;
    }

    pub fn select_sport(&mut self, sport: Option<&str>) {
        self.criteria.selected_sport = sport.map(str::to_string);
    }

    pub fn cancel_picker(&mut self) {
        self.focus = HomeFocus::Table;
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
    }
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    view: &HomeView,
    query: &QueryState<LeagueList>,
) -> Vec<RowHit<Route>> {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    let title = Paragraph::new(HOME_TITLE).style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(title, sections[0]);
    render_filter_bar(frame, sections[1], view);

    let hits = render_list(frame, sections[2], view, query);

    if let HomeFocus::SportPicker { cursor } = view.focus {
        render_sport_picker(frame, area, view, cursor);
    }
    hits
}

fn render_filter_bar(frame: &mut Frame, area: Rect, view: &HomeView) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let focused = Style::default().fg(Color::Yellow);
    let search_block = Block::default()
        .title("Search")
        .borders(Borders::ALL)
        .border_style(if view.focus == HomeFocus::Search {
            focused
        } else {
            Style::default()
        });
    let search = if view.focus == HomeFocus::Search {
        Paragraph::new(format!("{}▏", view.criteria.search_term))
    } else if view.criteria.search_term.is_empty() {
        Paragraph::new(SEARCH_PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(view.criteria.search_term.as_str())
    };
    frame.render_widget(search.block(search_block), cols[0]);

    let sport_block = Block::default()
        .title("Sport (s)")
        .borders(Borders::ALL)
        .border_style(if matches!(view.focus, HomeFocus::SportPicker { .. }) {
            focused
        } else {
            Style::default()
        });
    let sport = Paragraph::new(view.criteria.sport().unwrap_or(ALL_SPORTS)).block(sport_block);
    frame.render_widget(sport, cols[1]);
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    view: &HomeView,
    query: &QueryState<LeagueList>,
) -> Vec<RowHit<Route>> {
    if let Some(err) = &query.error {
        let text = format!("Error: {err}\nPress r to retry");
        let error = Paragraph::new(text).style(Style::default().fg(Color::Red));
        frame.render_widget(error, area);
        return Vec::new();
    }

    let Some(list) = &query.data else {
        let loading = Paragraph::new(LOADING_TEXT).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, area);
        return Vec::new();
    };

    let visible = view.visible(list);
    let title = if view.criteria.is_empty() {
        format!("Leagues ({})", list.len())
    } else {
        format!("Leagues ({} of {})", visible.len(), list.len())
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let selected_key = view
        .selected_index(&visible)
        .map(|idx| visible[idx].id.as_str());
    let table = Table::new(ColumnLayout::equal(3));
    let header = Header::new(["League", "Sport", "League Alternate"]);
    let body = Body::new(&visible, |league: &&League| {
        Row::new(
            league.id.clone(),
            [
                league.name.clone(),
                league.sport.clone(),
                league.alternate_name.clone(),
            ],
        )
        .on_click(Route::league_detail(league))
    })
    .selected(selected_key);

    match table.render(frame.buffer_mut(), inner, &header, &body) {
        Ok(hits) => hits,
        Err(err) => {
            let error = Paragraph::new(format!("Table error: {err}"))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(error, inner);
            Vec::new()
        }
    }
}

fn render_sport_picker(frame: &mut Frame, area: Rect, view: &HomeView, cursor: usize) {
    let popup = centered_rect(40, 60, area);
    frame.render_widget(Clear, popup);

    let lines = view
        .sport_options()
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let prefix = if idx == cursor { "> " } else { "  " };
            format!("{prefix}{option}")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let picker = Paragraph::new(lines).block(
        Block::default()
            .title("Sport (Enter select, Esc cancel)")
            .borders(Borders::ALL),
    );
    frame.render_widget(picker, popup);
}
