//! Record table — the main pane.

use pariwar_core::record::{Field, Record};
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::list::{ListState, RecordList};

/// Render the record table into `area`.
pub fn draw(f: &mut Frame, area: Rect, list: &RecordList) {
  let title = match list.state() {
    ListState::Loading => " Records (loading…) ".to_string(),
    ListState::Error(_) => format!(" Records ({}, stale) ", list.records().len()),
    _ => format!(" Records ({}) ", list.records().len()),
  };
  let border = match list.state() {
    ListState::Error(_) => Color::Red,
    _ => Color::DarkGray,
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  if list.records().is_empty() {
    let text = match list.state() {
      ListState::Loading => Line::from("Loading records…"),
      ListState::Error(e) => Line::from(Span::styled(
        format!("Could not load records: {e}. Press r to retry."),
        Style::default().fg(Color::Red),
      )),
      _ => Line::from("No records yet. Press n to add one."),
    };
    f.render_widget(
      Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  let header = Row::new(Field::all().map(|field| Cell::from(field.label())))
    .style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    );

  let rows = list.records().iter().map(row);

  let widths = Field::all().map(|field| match field {
    Field::SerialNumber => Constraint::Length(10),
    Field::Name => Constraint::Min(12),
    _ => Constraint::Min(8),
  });

  let mut state = TableState::default().with_selected(Some(list.cursor()));

  f.render_stateful_widget(
    Table::new(rows, widths)
      .header(header)
      .block(block)
      .column_spacing(1)
      .row_highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    area,
    &mut state,
  );
}

fn row(record: &Record) -> Row<'_> {
  Row::new(Field::all().map(|field| Cell::from(record.fields.get(field))))
}
