//! Generic grid rendering with one column layout shared by header and rows.
//!
//! A [`Table`] owns the layout. While it renders it hands a [`TableScope`] to
//! the header and to every row; the scope has no public constructor, so a
//! header or row can only be drawn from inside a table. Rows are keyed by the
//! caller (a stable id, never the row position) and may carry an action value
//! that is handed back through [`RowHit`] when the row is clicked.

use std::collections::HashSet;
use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};

pub const EMPTY_PLACEHOLDER: &str = "No data to show at the moment!";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("{component} has {found} cells but the table has {expected} columns")]
    ColumnMismatch {
        component: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("duplicate row key {0:?}")]
    DuplicateKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    constraints: Vec<Constraint>,
    spacing: u16,
}

impl ColumnLayout {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self {
            constraints,
            spacing: 2,
        }
    }

    /// `n` columns of equal width.
    pub fn equal(n: usize) -> Self {
        let n = n.max(1) as u32;
        Self::new((0..n).map(|_| Constraint::Ratio(1, n)).collect())
    }

    pub fn columns(&self) -> usize {
        self.constraints.len()
    }
}

/// The layout in force while a table renders.
#[derive(Debug)]
pub struct TableScope<'t> {
    layout: &'t ColumnLayout,
}

impl TableScope<'_> {
    pub fn columns(&self) -> usize {
        self.layout.columns()
    }

    fn split(&self, area: Rect) -> Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints(self.layout.constraints.clone())
            .spacing(self.layout.spacing)
            .split(area)
    }

    fn check(&self, component: &'static str, found: usize) -> Result<(), TableError> {
        if found != self.columns() {
            return Err(TableError::ColumnMismatch {
                component,
                expected: self.columns(),
                found,
            });
        }
        Ok(())
    }

    fn draw_cells(&self, buf: &mut Buffer, area: Rect, cells: &[String], style: Style) {
        buf.set_style(area, style);
        for (cell, col) in cells.iter().zip(self.split(area).iter()) {
            if col.width == 0 {
                continue;
            }
            buf.set_stringn(col.x, col.y, cell, col.width as usize, style);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    cells: Vec<String>,
}

impl Header {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    pub fn render(
        &self,
        scope: &TableScope<'_>,
        buf: &mut Buffer,
        area: Rect,
    ) -> Result<(), TableError> {
        scope.check("Header", self.cells.len())?;
        let style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD);
        let upper: Vec<String> = self.cells.iter().map(|c| c.to_uppercase()).collect();
        scope.draw_cells(buf, area, &upper, style);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<A> {
    key: String,
    cells: Vec<String>,
    action: Option<A>,
}

impl<A> Row<A> {
    pub fn new<I, S>(key: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            cells: cells.into_iter().map(Into::into).collect(),
            action: None,
        }
    }

    /// Value handed back when this row is clicked or activated.
    pub fn on_click(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }

    pub fn render(
        &self,
        scope: &TableScope<'_>,
        buf: &mut Buffer,
        area: Rect,
        style: Style,
    ) -> Result<(), TableError> {
        scope.check("Row", self.cells.len())?;
        scope.draw_cells(buf, area, &self.cells, style);
        Ok(())
    }
}

pub struct Body<'a, T, A> {
    items: &'a [T],
    render_item: Box<dyn Fn(&T) -> Row<A> + 'a>,
    selected: Option<&'a str>,
}

impl<'a, T, A> Body<'a, T, A> {
    pub fn new(items: &'a [T], render_item: impl Fn(&T) -> Row<A> + 'a) -> Self {
        Self {
            items,
            render_item: Box::new(render_item),
            selected: None,
        }
    }

    /// Highlights the row with this key.
    pub fn selected(mut self, key: Option<&'a str>) -> Self {
        self.selected = key;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Builds every row in input order, rejecting duplicate keys.
    pub fn rows(&self) -> Result<Vec<Row<A>>, TableError> {
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(self.items.len());
        for item in self.items {
            let row = (self.render_item)(item);
            if !seen.insert(row.key.clone()) {
                return Err(TableError::DuplicateKey(row.key));
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

/// Screen area of a rendered row and the action it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHit<A> {
    pub key: String,
    pub area: Rect,
    pub action: Option<A>,
}

pub fn hit_test<A>(hits: &[RowHit<A>], column: u16, row: u16) -> Option<&RowHit<A>> {
    hits.iter().find(|hit| {
        column >= hit.area.x
            && column < hit.area.x.saturating_add(hit.area.width)
            && row >= hit.area.y
            && row < hit.area.y.saturating_add(hit.area.height)
    })
}

pub struct Table {
    layout: ColumnLayout,
}

impl Table {
    pub fn new(layout: ColumnLayout) -> Self {
        Self { layout }
    }

    /// Draws the header on the first line of `area` and the body below it.
    /// Returns the hit areas of the rows that were visible.
    pub fn render<T, A: Clone>(
        &self,
        buf: &mut Buffer,
        area: Rect,
        header: &Header,
        body: &Body<'_, T, A>,
    ) -> Result<Vec<RowHit<A>>, TableError> {
        let scope = TableScope {
            layout: &self.layout,
        };
        if area.height == 0 || area.width == 0 {
            return Ok(Vec::new());
        }

        let header_area = Rect { height: 1, ..area };
        header.render(&scope, buf, header_area)?;

        let body_area = Rect {
            y: area.y + 1,
            height: area.height - 1,
            ..area
        };
        if body.is_empty() {
            if body_area.height > 0 {
                let style = Style::default().fg(Color::DarkGray);
                buf.set_stringn(
                    body_area.x,
                    body_area.y,
                    EMPTY_PLACEHOLDER,
                    body_area.width as usize,
                    style,
                );
            }
            return Ok(Vec::new());
        }

        let rows = body.rows()?;
        let selected_idx = body
            .selected
            .and_then(|key| rows.iter().position(|row| row.key == key))
            .unwrap_or(0);
        let visible = body_area.height as usize;
        let (start, end) = visible_range(selected_idx, rows.len(), visible);

        let mut hits = Vec::with_capacity(end - start);
        for (i, idx) in (start..end).enumerate() {
            let row = &rows[idx];
            let row_area = Rect {
                y: body_area.y + i as u16,
                height: 1,
                ..body_area
            };
            let style = if body.selected == Some(row.key.as_str()) {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else if idx % 2 == 0 {
                Style::default().bg(Color::Indexed(235))
            } else {
                Style::default()
            };
            row.render(&scope, buf, row_area, style)?;
            hits.push(RowHit {
                key: row.key.clone(),
                area: row_area,
                action: row.action.clone(),
            });
        }
        Ok(hits)
    }
}

pub fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}
