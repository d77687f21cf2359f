use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::query_cache::{QueryKey, QueryState};
use crate::route::LeagueHeading;
use crate::state::{BadgeStatus, Season};

pub const LOADING_TEXT: &str = "Loading league details...";
pub const NO_SEASON_TEXT: &str = "No badge available for this league.";
pub const NO_BADGE_TEXT: &str = "No Badge Available";
pub const BACK_TO_HOME: &str = "Back to Home";
pub const BACK_TO_LEAGUES: &str = "← Back to Leagues";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub heading: LeagueHeading,
}

impl DetailView {
    pub fn new(id: &str, name: Option<&str>, sport: Option<&str>) -> Self {
        Self {
            heading: LeagueHeading::new(id, name, sport),
        }
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::LeagueSeasons(self.heading.id.clone())
    }
}

/// What the detail screen shows, decided before any drawing happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPanel {
    Loading,
    Error(String),
    Loaded(BadgePanel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgePanel {
    /// The league has no season data at all.
    NoSeason,
    /// A season exists but carries no badge.
    NoBadge,
    Image { url: String, season: String },
    /// The badge image failed to load; nothing is drawn in its place.
    Hidden,
}

pub fn detail_panel(
    query: &QueryState<Option<Season>>,
    badge: Option<BadgeStatus>,
) -> DetailPanel {
    if let Some(err) = &query.error {
        return DetailPanel::Error(err.to_string());
    }
    if query.is_loading() {
        return DetailPanel::Loading;
    }
    let Some(season) = query.data.as_ref().and_then(|s| s.as_ref()) else {
        return DetailPanel::Loaded(BadgePanel::NoSeason);
    };
    if season.badge_url.is_empty() {
        return DetailPanel::Loaded(BadgePanel::NoBadge);
    }
    if badge == Some(BadgeStatus::Broken) {
        return DetailPanel::Loaded(BadgePanel::Hidden);
    }
    DetailPanel::Loaded(BadgePanel::Image {
        url: season.badge_url.clone(),
        season: season.label.clone(),
    })
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    view: &DetailView,
    query: &QueryState<Option<Season>>,
    badge: Option<BadgeStatus>,
) {
    match detail_panel(query, badge) {
        DetailPanel::Loading => {
            let loading = Paragraph::new(LOADING_TEXT).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, area);
        }
        DetailPanel::Error(message) => {
            let text = vec![
                Line::styled(format!("Error: {message}"), Style::default().fg(Color::Red)),
                Line::raw(""),
                Line::styled(
                    format!("[ {BACK_TO_HOME} ]  (b / Esc)"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), area);
        }
        DetailPanel::Loaded(panel) => render_loaded(frame, area, view, panel),
    }
}

fn render_loaded(frame: &mut Frame, area: Rect, view: &DetailView, panel: BadgePanel) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    let back = Paragraph::new(format!("{BACK_TO_LEAGUES}  (b / Esc)"))
        .style(Style::default().fg(Color::Red));
    frame.render_widget(back, rows[0]);

    let mut heading = vec![Line::styled(
        view.heading.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if !view.heading.sport.is_empty() {
        heading.push(Line::styled(
            view.heading.sport.clone(),
            Style::default().fg(Color::Gray),
        ));
    }
    frame.render_widget(Paragraph::new(heading).alignment(Alignment::Center), rows[1]);

    let badge_area = centered_column(rows[2], 48, 6);
    match panel {
        BadgePanel::NoSeason => {
            let text = Paragraph::new(NO_SEASON_TEXT).alignment(Alignment::Center);
            frame.render_widget(text, rows[2]);
        }
        BadgePanel::NoBadge => {
            let placeholder = Paragraph::new(NO_BADGE_TEXT)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(placeholder, badge_area);
        }
        BadgePanel::Image { url, season } => {
            let mut lines = vec![Line::raw(url)];
            if !season.is_empty() {
                lines.push(Line::styled(
                    format!("Season {season}"),
                    Style::default().fg(Color::Gray),
                ));
            }
            let image = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .title(format!("{} badge", view.heading.name))
                        .borders(Borders::ALL),
                );
            frame.render_widget(image, badge_area);
        }
        BadgePanel::Hidden => {}
    }
}

fn centered_column(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height,
    }
}
