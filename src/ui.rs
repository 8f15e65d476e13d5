use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::controller::{Controller, InputMode};
use crate::domain::{HELP_TEXT, Notification, Severity};
use crate::model::{RenderInstruction, SortIndicator};
use crate::record::Status;
use crate::selection::SelectAllState;

pub const STATUSLINE_HEIGHT: u16 = 1;
pub const INPUTLINE_HEIGHT: u16 = 1;

/// Draws render instructions. Holds the one piece of state the engine does
/// not own: the notification currently on screen.
#[derive(Default)]
pub struct TableUI {
    notification: Option<(Notification, Instant)>,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    /// Drops the notification once its duration has passed.
    pub fn expire_notification(&mut self, now: Instant) {
        if let Some((notification, shown)) = &self.notification
            && now.duration_since(*shown) >= notification.duration
        {
            self.notification = None;
        }
    }

    pub fn draw(&mut self, render: &RenderInstruction, keys: &Controller, frame: &mut Frame) {
        let [table_area, bulk_area, status_area, input_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(u16::from(render.show_bulk_actions)),
            Constraint::Length(STATUSLINE_HEIGHT),
            Constraint::Length(INPUTLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.draw_table(render, keys, frame, table_area);
        if render.show_bulk_actions {
            frame.render_widget(bulk_bar(render), bulk_area);
        }
        frame.render_widget(self.status_line(render), status_area);
        frame.render_widget(input_line(render, keys), input_area);

        match keys.mode() {
            InputMode::Help => popup(frame, " Help ", HELP_TEXT, 90, 14),
            InputMode::ConfirmDelete => popup(
                frame,
                " Confirm ",
                &format!(
                    "Delete {} selected records? This cannot be undone. [y/n]",
                    render.selection.selected
                ),
                50,
                5,
            ),
            _ => {}
        }
    }

    fn draw_table(&self, render: &RenderInstruction, keys: &Controller, frame: &mut Frame, area: Rect) {
        let select_all = match render.selection.select_all {
            SelectAllState::Checked => "[x]",
            SelectAllState::Indeterminate => "[-]",
            SelectAllState::Unchecked => "[ ]",
        };
        let mut header = vec![Cell::from(select_all)];
        header.extend(render.sort.iter().enumerate().map(|(idx, (field, indicator))| {
            let arrow = match indicator {
                SortIndicator::Ascending => " ▲",
                SortIndicator::Descending => " ▼",
                SortIndicator::Unsorted => "",
            };
            let cell = Cell::from(format!("{} {}{}", idx + 1, field, arrow));
            if *indicator == SortIndicator::Unsorted {
                cell
            } else {
                cell.style(Style::default().add_modifier(Modifier::UNDERLINED))
            }
        }));

        let rows = render.rows.iter().map(|row| {
            let record = &row.record;
            let status_style = match record.status {
                Status::Active => Style::default().fg(Color::Green),
                Status::Inactive => Style::default().fg(Color::DarkGray),
            };
            Row::new(vec![
                Cell::from(if row.selected { "[x]" } else { "[ ]" }),
                Cell::from(record.name.clone()),
                Cell::from(record.email.clone()),
                Cell::from(record.role.as_str()),
                Cell::from(record.status.as_str()).style(status_style),
                Cell::from(record.last_login.clone()),
                Cell::from(format_currency(record.revenue)),
            ])
        });

        let widths = [
            Constraint::Length(3),
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(13),
            Constraint::Length(12),
        ];

        let mut title = format!(" Users · {} ", render.result_info());
        if render.filter_badge > 0 {
            title.push_str(&format!("· filters ({}) ", render.filter_badge));
        }
        let block = Block::bordered()
            .title(Line::from(title.bold()).centered())
            .border_set(border::THICK);

        let table = Table::new(rows, widths)
            .header(Row::new(header).style(Style::default().bold()))
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if !render.rows.is_empty() {
            state.select(Some(keys.cursor()));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn status_line(&self, render: &RenderInstruction) -> Paragraph<'_> {
        let page = &render.page;
        let mut spans = vec![
            Span::from(format!(
                " {} · page {}/{} · {} per page ",
                page.range_label(),
                page.current_page,
                page.total_pages,
                page.page_size
            )),
        ];
        if let Some((notification, _)) = &self.notification {
            let color = match notification.severity {
                Severity::Info => Color::Blue,
                Severity::Success => Color::Green,
                Severity::Warning => Color::Yellow,
                Severity::Error => Color::Red,
            };
            spans.push(Span::styled(format!(" {} ", notification.message), Style::default().fg(color)));
        }
        Paragraph::new(Line::from(spans))
    }
}

fn bulk_bar(render: &RenderInstruction) -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        format!(" {} selected ", render.selection.selected).black().on_yellow(),
        " t".blue().bold(),
        " toggle status ".into(),
        "e".blue().bold(),
        " export ".into(),
        "y".blue().bold(),
        " copy ".into(),
        "d".blue().bold(),
        " delete ".into(),
        "x".blue().bold(),
        " clear".into(),
    ]))
}

fn input_line<'a>(render: &'a RenderInstruction, keys: &'a Controller) -> Paragraph<'a> {
    let prompt = match keys.mode() {
        InputMode::Search => "/",
        InputMode::Filter => "filter: ",
        InputMode::PageJump => "page: ",
        _ => {
            let hint = if render.search_term.is_empty() {
                " <?> help  </> search  <f> filter  <q> quit".to_string()
            } else {
                format!(" search: \"{}\"  <?> help", render.search_term)
            };
            return Paragraph::new(hint.dark_gray());
        }
    };
    let input = keys.input();
    Paragraph::new(Line::from(vec![
        prompt.yellow().bold(),
        Span::from(input.input.clone()),
        "▏".yellow(),
    ]))
}

fn popup(frame: &mut Frame, title: &str, text: &str, width: u16, height: u16) {
    let area = centered(frame.area(), width, height);
    let block = Block::bordered()
        .title(Line::from(title.to_string().bold()).centered())
        .border_set(border::THICK);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text.to_string()).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

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

/// `12500.0` -> `$12,500`, cents only when present.
pub fn format_currency(amount: f64) -> String {
    let total_cents = (amount * 100.0).round() as u64;
    let (whole, cents) = (total_cents / 100, total_cents % 100);
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if cents > 0 {
        format!("${grouped}.{cents:02}")
    } else {
        format!("${grouped}")
    }
}
