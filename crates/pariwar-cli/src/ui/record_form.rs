//! Record form overlay.

use pariwar_core::record::Field;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use crate::form::RecordForm;

/// Render `form` as a modal box over `area`.
pub fn draw(f: &mut Frame, area: Rect, form: &RecordForm) {
  let title = if form.is_submitting() {
    format!(" {} (saving…) ", form.title())
  } else {
    format!(" {} ", form.title())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  let mut lines: Vec<Line> = Field::all()
    .map(|field| {
      let focused = field == form.focus();
      let marker = if field.is_required() { "*" } else { " " };

      let label_style = if focused {
        Style::default()
          .fg(Color::Yellow)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::Cyan)
      };

      let value = form.fields().get(field);
      let value = if focused {
        format!("{value}_")
      } else {
        value.to_string()
      };

      Line::from(vec![
        Span::styled(format!("{marker}{:<22}", field.label()), label_style),
        Span::raw(value),
      ])
    })
    .collect();

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    format!("* required   {}", form.focus().native_label()),
    Style::default().fg(Color::DarkGray),
  )));

  f.render_widget(Clear, area);
  f.render_widget(Paragraph::new(lines).block(block), area);
}
