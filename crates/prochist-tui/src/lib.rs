// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use prochist_app::{ColumnKey, ColumnSortState, HistoryTable, InstanceRecord};
use prochist_rest::DownloadOutcome;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const SORT_ASC_MARK: &str = " ↑";
const SORT_DESC_MARK: &str = " ↓";

/// Seam between the table shell and its data/download backend. The CLI
/// wires a REST runtime in; tests substitute doubles.
pub trait AppRuntime {
    fn load_instances(&mut self) -> Result<Vec<InstanceRecord>>;

    /// One full resolution attempt; never fails outward.
    fn resolve_download(&mut self, instance_id: &str) -> DownloadOutcome;

    /// Runs a resolution and posts the outcome as an internal event. The
    /// default is synchronous; network-backed runtimes override this to run
    /// each attempt on its own thread.
    fn spawn_download(
        &mut self,
        request_id: u64,
        instance_id: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = self.resolve_download(instance_id);
        tx.send(InternalEvent::DownloadFinished {
            request_id,
            outcome,
        })
        .context("send download outcome")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    DownloadFinished { request_id: u64, outcome: DownloadOutcome },
}

#[derive(Debug, Default)]
pub struct ViewData {
    pub table: HistoryTable,
    pub selected_row: usize,
    pub selected_col: usize,
    pub status_line: Option<String>,
    pub status_token: u64,
    pub next_request_id: u64,
}

impl ViewData {
    pub fn selected_column(&self) -> ColumnKey {
        ColumnKey::ALL[self.selected_col.min(ColumnKey::ALL.len() - 1)]
    }

    fn clamp_cursor(&mut self) {
        let rows = self.table.row_count();
        if rows == 0 {
            self.selected_row = 0;
        } else if self.selected_row >= rows {
            self.selected_row = rows - 1;
        }
        if self.selected_col >= ColumnKey::ALL.len() {
            self.selected_col = ColumnKey::ALL.len() - 1;
        }
    }
}

pub fn run_app<R: AppRuntime>(runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    reload_instances(runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(&mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::DownloadFinished { outcome, .. } => {
                emit_status(view_data, tx, outcome.message());
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn reload_instances<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.load_instances() {
        Ok(instances) => {
            let count = instances.len();
            view_data.table.replace_records(instances);
            view_data.clamp_cursor();
            emit_status(view_data, internal_tx, format!("loaded {count} instances"));
        }
        Err(error) => {
            emit_status(view_data, internal_tx, format!("load failed: {error:#}"));
        }
    }
}

/// Returns true when the app should quit.
pub fn handle_key_event<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('j') | KeyCode::Down => move_row(view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_row(view_data, -1),
        KeyCode::Char('h') | KeyCode::Left => move_column(view_data, -1),
        KeyCode::Char('l') | KeyCode::Right => move_column(view_data, 1),
        KeyCode::Char('s') => {
            let status = view_data.table.toggle_sort(view_data.selected_column());
            view_data.clamp_cursor();
            emit_status(view_data, internal_tx, status.message());
        }
        KeyCode::Char('u') => {
            let status = view_data.table.clear_sort();
            emit_status(view_data, internal_tx, status.message());
        }
        KeyCode::Char('r') => reload_instances(runtime, view_data, internal_tx),
        KeyCode::Char('d') | KeyCode::Enter => start_download(runtime, view_data, internal_tx),
        _ => {}
    }

    false
}

fn move_row(view_data: &mut ViewData, delta: isize) {
    let rows = view_data.table.row_count();
    if rows == 0 {
        return;
    }
    let current = view_data.selected_row as isize;
    let next = (current + delta).clamp(0, rows as isize - 1);
    view_data.selected_row = next as usize;
}

fn move_column(view_data: &mut ViewData, delta: isize) {
    let columns = ColumnKey::ALL.len() as isize;
    let current = view_data.selected_col as isize;
    view_data.selected_col = (current + delta).clamp(0, columns - 1) as usize;
}

/// Starts one independent, fire-and-forget resolution attempt for the
/// selected row. Stale completions still render their outcome message.
fn start_download<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let rows = view_data.table.visible_rows();
    let Some(row) = rows.get(view_data.selected_row) else {
        emit_status(view_data, internal_tx, "no row selected");
        return;
    };
    let instance_id = row.id.clone();

    view_data.next_request_id = view_data.next_request_id.wrapping_add(1);
    let request_id = view_data.next_request_id;
    if let Err(error) = runtime.spawn_download(request_id, &instance_id, internal_tx.clone()) {
        emit_status(view_data, internal_tx, format!("download failed: {error:#}"));
        return;
    }
    emit_status(view_data, internal_tx, format!("resolving {instance_id}"));
}

pub fn header_label(table: &HistoryTable, column: ColumnKey) -> String {
    let mut label = column.label().to_owned();
    match table.column_state(column) {
        ColumnSortState::Ascending => label.push_str(SORT_ASC_MARK),
        ColumnSortState::Descending => label.push_str(SORT_DESC_MARK),
        ColumnSortState::Unsorted => {}
    }
    label
}

fn render(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let title = Paragraph::new(format!(
        "process history  r:{}  [s]ort [u]nsort [d]ownload [r]eload [q]uit",
        view_data.table.row_count()
    ))
    .block(Block::default().title("prochist").borders(Borders::ALL));
    frame.render_widget(title, layout[0]);

    render_table(frame, layout[1], view_data);

    let status = view_data.status_line.clone().unwrap_or_default();
    let status_widget = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let widths = vec![Constraint::Min(10); ColumnKey::ALL.len()];

    let header_cells = ColumnKey::ALL.iter().map(|column| {
        Cell::from(header_label(&view_data.table, *column)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = view_data
        .table
        .visible_rows()
        .into_iter()
        .enumerate()
        .map(|(row_index, row)| {
            let selected_row = row_index == view_data.selected_row;
            let cells = ColumnKey::ALL.iter().enumerate().map(|(col_index, column)| {
                let mut style = Style::default();
                if selected_row {
                    style = style.bg(Color::DarkGray);
                }
                if selected_row && col_index == view_data.selected_col {
                    style = Style::default().fg(Color::Black).bg(Color::Cyan);
                }
                Cell::from(row.cell_text(*column)).style(style)
            });
            Row::new(cells.collect::<Vec<_>>())
        })
        .collect::<Vec<_>>();

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("instances"));
    frame.render_widget(table, area);
}
