use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent};
use tracing::{trace, warn};

use crate::domain::{Message, TabError, TableConfig};
use crate::export::ExportScope;
use crate::filter::{FilterCriteria, FilterForm};
use crate::inputter::{InputResult, Inputter};
use crate::model::RenderInstruction;
use crate::paginate::PageTarget;
use crate::record::{Role, Status};
use crate::selection::SelectAllState;
use crate::sort::SortField;

/// What the front-end should do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Table(Message),
    CopySelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Filter,
    PageJump,
    ConfirmDelete,
    Help,
}

/// Maps key events to commands, holding the purely visual state (cursor row,
/// active input line) that the table engine does not care about.
pub struct Controller {
    event_poll_time: u64,
    config: TableConfig,
    mode: InputMode,
    cursor: usize,
    input: Inputter,
    last_input: InputResult,
}

impl Controller {
    pub fn new(cfg: &TableConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
            config: cfg.clone(),
            mode: InputMode::Normal,
            cursor: 0,
            input: Inputter::default(),
            last_input: InputResult::default(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input(&self) -> &InputResult {
        &self.last_input
    }

    /// Keeps the cursor on an existing row after the page content changed.
    pub fn clamp_cursor(&mut self, rows: usize) {
        self.cursor = std::cmp::min(self.cursor, rows.saturating_sub(1));
    }

    pub fn handle_event(&mut self, render: &RenderInstruction) -> Result<Option<Command>, TabError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(key, render));
        }
        Ok(None)
    }

    pub fn handle_key(&mut self, key: KeyEvent, render: &RenderInstruction) -> Option<Command> {
        let command = match self.mode {
            InputMode::Normal => self.normal_key(key, render),
            InputMode::Search | InputMode::Filter | InputMode::PageJump => self.input_key(key),
            InputMode::ConfirmDelete => self.confirm_key(key),
            InputMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                    self.mode = InputMode::Normal;
                }
                None
            }
        };
        trace!("Mapped: {key:?} => {command:?}");
        command
    }

    fn normal_key(&mut self, key: KeyEvent, render: &RenderInstruction) -> Option<Command> {
        let table = |message| Some(Command::Table(message));
        match key.code {
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Char('?') => {
                self.mode = InputMode::Help;
                None
            }
            KeyCode::Char('/') => self.start_input(InputMode::Search, &render.search_term),
            KeyCode::Char('f') => {
                let current = format_filter_expression(&render.criteria);
                self.start_input(InputMode::Filter, &current)
            }
            KeyCode::Char('p') => self.start_input(InputMode::PageJump, ""),
            KeyCode::Char('c') => table(Message::FiltersCleared),
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = std::cmp::min(self.cursor + 1, render.rows.len().saturating_sub(1));
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Left | KeyCode::Char('h') => table(Message::PageChanged(PageTarget::Previous)),
            KeyCode::Right | KeyCode::Char('l') => table(Message::PageChanged(PageTarget::Next)),
            KeyCode::Char('g') => table(Message::PageChanged(PageTarget::First)),
            KeyCode::Char('G') => table(Message::PageChanged(PageTarget::Last)),
            KeyCode::Char('+') => table(Message::PageSizeChanged(
                self.config.step_page_size(render.page.page_size, true),
            )),
            KeyCode::Char('-') => table(Message::PageSizeChanged(
                self.config.step_page_size(render.page.page_size, false),
            )),
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                table(Message::SortClicked(SortField::ALL[idx]))
            }
            KeyCode::Char(' ') => render
                .rows
                .get(self.cursor)
                .and_then(|row| table(Message::RowSelectionToggled(row.record.id, !row.selected))),
            KeyCode::Char('a') => table(Message::SelectAllToggled(
                render.selection.select_all != SelectAllState::Checked,
            )),
            KeyCode::Char('x') => table(Message::SelectionCleared),
            KeyCode::Char('t') => table(Message::BulkStatusToggleRequested),
            KeyCode::Char('e') => table(Message::BulkExportRequested(ExportScope::Selection)),
            KeyCode::Char('E') => table(Message::BulkExportRequested(ExportScope::All)),
            KeyCode::Char('y') => Some(Command::CopySelection),
            KeyCode::Char('d') => {
                if render.selection.selected > 0 {
                    self.mode = InputMode::ConfirmDelete;
                    None
                } else {
                    // Nothing to confirm, the engine only reports the empty selection
                    table(Message::BulkDeleteRequested(true))
                }
            }
            _ => None,
        }
    }

    fn start_input(&mut self, mode: InputMode, current: &str) -> Option<Command> {
        self.mode = mode;
        self.input.clear();
        self.input.set(current);
        self.last_input = self.input.get();
        None
    }

    fn input_key(&mut self, key: KeyEvent) -> Option<Command> {
        self.last_input = self.input.read(key);
        let result = self.last_input.clone();
        if result.finished {
            let mode = self.mode;
            self.mode = InputMode::Normal;
            self.cursor = 0;
            return match mode {
                InputMode::Search if result.changed => {
                    Some(Command::Table(Message::SearchChanged(result.input)))
                }
                InputMode::Filter if !result.canceled => {
                    let form = parse_filter_expression(&result.input);
                    Some(Command::Table(Message::FiltersApplied(form.to_criteria())))
                }
                InputMode::PageJump if !result.canceled => match result.input.trim().parse::<usize>() {
                    Ok(n) => Some(Command::Table(Message::PageChanged(PageTarget::Number(n)))),
                    Err(_) => None,
                },
                _ => None,
            };
        }
        // Search runs on every keystroke
        if self.mode == InputMode::Search && result.changed {
            self.cursor = 0;
            return Some(Command::Table(Message::SearchChanged(result.input)));
        }
        None
    }

    fn confirm_key(&mut self, key: KeyEvent) -> Option<Command> {
        let confirmed = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return None,
        };
        self.mode = InputMode::Normal;
        Some(Command::Table(Message::BulkDeleteRequested(confirmed)))
    }
}

/// Parses a filter line such as `role=admin,user status=active min=100 max=900`.
/// Unknown keys and values are ignored.
pub fn parse_filter_expression(expression: &str) -> FilterForm {
    let mut form = FilterForm::default();
    for token in expression.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            warn!("Ignoring filter token \"{token}\"");
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "role" | "roles" => form
                .roles
                .extend(value.split(',').filter_map(|v| v.parse::<Role>().ok())),
            "status" | "statuses" => form
                .statuses
                .extend(value.split(',').filter_map(|v| v.parse::<Status>().ok())),
            "min" => form.min_revenue = value.to_string(),
            "max" => form.max_revenue = value.to_string(),
            _ => warn!("Ignoring filter key \"{key}\""),
        }
    }
    form
}

pub fn format_filter_expression(criteria: &FilterCriteria) -> String {
    let mut parts = Vec::new();
    if !criteria.roles.is_empty() {
        let roles: Vec<String> = criteria.roles.iter().map(|r| r.as_str().to_lowercase()).collect();
        parts.push(format!("role={}", roles.join(",")));
    }
    if !criteria.statuses.is_empty() {
        let statuses: Vec<String> = criteria
            .statuses
            .iter()
            .map(|s| s.as_str().to_lowercase())
            .collect();
        parts.push(format!("status={}", statuses.join(",")));
    }
    if let Some(min) = criteria.min_revenue {
        parts.push(format!("min={min}"));
    }
    if let Some(max) = criteria.max_revenue {
        parts.push(format!("max={max}"));
    }
    parts.join(" ")
}
