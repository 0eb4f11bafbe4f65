// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use orderdesk_app::{
    DeskEvent, DeskState, FieldEdit, FieldKey, OrderRequest, RESULT_COLUMNS, Reply, Trigger,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

const LABEL_WIDTH: usize = 16;
const RESULTS_PAGE_ROWS: usize = 10;

pub trait OrderRuntime {
    fn execute(&mut self, request: &OrderRequest) -> Reply;

    // Runs inline unless overridden.
    fn spawn_request(
        &mut self,
        request_id: u64,
        request: OrderRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let reply = self.execute(&request);
        tx.send(InternalEvent::Completed { request_id, reply })
            .map_err(|_| anyhow::anyhow!("order event channel closed"))?;
        Ok(())
    }

    fn describe(&self) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    Completed { request_id: u64, reply: Reply },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    focus: usize,
    results_scroll: usize,
}

impl ViewData {
    fn focused(&self) -> FieldKey {
        FieldKey::ALL[self.focus % FieldKey::ALL.len()]
    }

    fn move_focus(&mut self, delta: isize) {
        let len = FieldKey::ALL.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }
}

pub fn run_app<R: OrderRuntime>(state: &mut DeskState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let title = runtime.describe();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data, &title)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut DeskState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::Completed { request_id, reply } => {
                let events = state.complete(request_id, reply);
                if events
                    .iter()
                    .any(|event| matches!(event, DeskEvent::ResultsRendered { .. }))
                {
                    view_data.results_scroll = 0;
                }
            }
        }
    }
}

fn handle_key_event<R: OrderRuntime>(
    state: &mut DeskState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c') if control => return true,
        KeyCode::Char('u') if control => {
            state.edit(view_data.focused(), FieldEdit::Replace(String::new()));
        }
        KeyCode::Char(ch) if !control => {
            state.edit(view_data.focused(), FieldEdit::Insert(ch));
        }
        KeyCode::Backspace => {
            state.edit(view_data.focused(), FieldEdit::Backspace);
        }
        KeyCode::Tab | KeyCode::Down | KeyCode::Enter => view_data.move_focus(1),
        KeyCode::BackTab | KeyCode::Up => view_data.move_focus(-1),
        KeyCode::PageDown => {
            let max = state.results.len().saturating_sub(1);
            view_data.results_scroll = (view_data.results_scroll + RESULTS_PAGE_ROWS).min(max);
        }
        KeyCode::PageUp => {
            view_data.results_scroll = view_data.results_scroll.saturating_sub(RESULTS_PAGE_ROWS);
        }
        KeyCode::F(number) => {
            if let Some(trigger) = trigger_for_function_key(number) {
                fire(state, runtime, internal_tx, trigger);
            }
        }
        _ => {}
    }
    false
}

fn trigger_for_function_key(number: u8) -> Option<Trigger> {
    match number {
        2 => Some(Trigger::Create),
        3 => Some(Trigger::Retrieve),
        4 => Some(Trigger::Update),
        5 => Some(Trigger::Delete),
        6 => Some(Trigger::Search),
        7 => Some(Trigger::Ship),
        8 => Some(Trigger::Clear),
        _ => None,
    }
}

fn fire<R: OrderRuntime>(
    state: &mut DeskState,
    runtime: &mut R,
    internal_tx: &Sender<InternalEvent>,
    trigger: Trigger,
) {
    for event in state.trigger(trigger) {
        let DeskEvent::RequestStarted {
            request_id,
            request,
        } = event
        else {
            continue;
        };
        if let Err(error) = runtime.spawn_request(request_id, request, internal_tx.clone()) {
            let error = format!("{error:#}");
            tracing::warn!(request_id, %error, "failed to start order request");
            state.complete(request_id, Reply::Unreachable { error });
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &DeskState, view_data: &ViewData, title: &str) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FieldKey::ALL.len() as u16 + 2),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_form(frame, layout[0], state, view_data, title);

    let message = Paragraph::new(state.feedback.message().unwrap_or_default())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(message_title(state)),
        );
    frame.render_widget(message, layout[1]);

    render_results(frame, layout[2], state, view_data);

    let hints = Paragraph::new(key_hints()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, layout[3]);
}

fn render_form(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &DeskState,
    view_data: &ViewData,
    title: &str,
) {
    let focused = view_data.focused();
    let lines = FieldKey::ALL
        .into_iter()
        .map(|key| {
            let is_focused = key == focused;
            let label_style = if is_focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let mut value = state.form.field(key).to_owned();
            if is_focused {
                value.push('_');
            }
            Line::from(vec![
                Span::styled(format!("{:<LABEL_WIDTH$}", key.label()), label_style),
                Span::raw(value),
            ])
        })
        .collect::<Vec<_>>();

    let block_title = if title.is_empty() {
        "orderdesk".to_owned()
    } else {
        format!("orderdesk {title}")
    };
    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(block_title));
    frame.render_widget(form, area);
}

fn render_results(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &DeskState,
    view_data: &ViewData,
) {
    let header = Row::new(RESULT_COLUMNS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let rows = state
        .results
        .rows()
        .iter()
        .skip(view_data.results_scroll)
        .map(|row| Row::new(row.cells.iter().map(|cell| Cell::from(cell.as_str()))));
    let widths = [
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(11),
        Constraint::Min(16),
        Constraint::Length(16),
    ];
    let title = format!("results ({})", state.results.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

fn message_title(state: &DeskState) -> String {
    match state.in_flight() {
        Some(in_flight) => format!("message | {}...", in_flight.operation.label()),
        None => "message".to_owned(),
    }
}

fn key_hints() -> &'static str {
    "tab/shift+tab field | F2 create F3 retrieve F4 update F5 delete F6 search F7 ship F8 clear | pgup/pgdn | ctrl+u | ctrl+q"
}
