//! TUI rendering — orchestrates all panes.

pub mod record_form;
pub mod record_table;

use chrono::Local;
use pariwar_core::store::RecordStore;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::{
  app::{App, Screen},
  notify::Level,
};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: RecordStore + 'static>(f: &mut Frame, app: &App<S>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app.list.records().len());
  record_table::draw(f, rows[1], &app.list);
  if let Some(form) = &app.form {
    record_form::draw(f, centered(rows[1], 64, 17), form);
  }
  draw_status(f, rows[2], app);
}

/// A `width` × `height` rectangle centred in `area`, clipped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, count: usize) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    format!(" pariwar ({count})  [n] new  [e] edit  [d] delete  [r] refresh  [q] quit"),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::Gray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: RecordStore + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match app.screen() {
    Screen::RecordList if app.confirm_delete.is_some() => {
      ("DELETE", "Delete the selected record?  y confirm  any other key cancel")
    }
    Screen::RecordList => (
      "LIST",
      "↑↓/jk navigate  n new  Enter/e edit  d delete  r refresh  q quit",
    ),
    Screen::RecordForm => (
      "FORM",
      "Tab/↓ next  Shift-Tab/↑ previous  Enter save  Esc cancel",
    ),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let message_span = match app.notices.visible() {
    Some(notice) => {
      let color = match notice.level {
        Level::Success => Color::Green,
        Level::Error => Color::Red,
      };
      Span::styled(
        format!("  {}", notice.message),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
      )
    }
    None => Span::styled(
      format!("  {hints}"),
      Style::default().fg(Color::DarkGray),
    ),
  };

  let line = Line::from(vec![mode_span, message_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
