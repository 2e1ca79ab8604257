// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use sitrep_app::{
    CommitOutcome, DetailTab, EditField, EditOverlay, FieldFilter, FieldWidget, Incident,
    IncidentId, IncidentPatch, OverlayMode, Permission, SessionCommand, SessionEvent, SessionState,
    User, UserId, kind_options, status_options,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const BRIEF_EXCERPT_CHARS: usize = 100;
const INPUT_CURSOR: &str = "▏";
const DEFAULT_STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Outcome of one update round-trip as the runtime saw it. `accepted`
/// carries the service's own verdict; transport failures never build a
/// receipt and surface as errors instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    pub accepted: bool,
    pub message: String,
    pub record: Option<Incident>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitEvent {
    Completed {
        request_id: u64,
        receipt: CommitReceipt,
    },
    Failed {
        request_id: u64,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Commit(CommitEvent),
}

/// Data seam between the session and whatever backs it. The default
/// `spawn_commit` runs the update inline and reports through the internal
/// channel; runtimes that want real concurrency override it.
pub trait SessionRuntime {
    fn fetch_incidents(&mut self) -> Result<Vec<Incident>>;
    fn fetch_users(&mut self) -> Result<Vec<User>>;
    fn update_incident(
        &mut self,
        incident: &IncidentId,
        patch: &IncidentPatch,
    ) -> Result<CommitReceipt>;
    fn spawn_commit(
        &mut self,
        request_id: u64,
        incident: &IncidentId,
        patch: &IncidentPatch,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let event = match self.update_incident(incident, patch) {
            Ok(receipt) => InternalEvent::Commit(CommitEvent::Completed {
                request_id,
                receipt,
            }),
            Err(error) => InternalEvent::Commit(CommitEvent::Failed {
                request_id,
                error: error.to_string(),
            }),
        };
        tx.send(event)
            .map_err(|_| anyhow::anyhow!("commit event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTarget {
    Search,
    AgentFilter,
    Field(EditField),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InputUiState {
    target: InputTarget,
    buffer: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    list_cursor: usize,
    field_cursor: usize,
    agent_cursor: usize,
    agent_filter: String,
    input: Option<InputUiState>,
    help_visible: bool,
    status_token: u64,
    status_clear_after: Duration,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            list_cursor: 0,
            field_cursor: 0,
            agent_cursor: 0,
            agent_filter: String::new(),
            input: None,
            help_visible: false,
            status_token: 0,
            status_clear_after: DEFAULT_STATUS_CLEAR_AFTER,
        }
    }
}

pub fn run_app<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    status_clear_after: Duration,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        status_clear_after,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_session_data(state, runtime) {
        state.dispatch(SessionCommand::SetStatus(format!("load failed: {error}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
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

fn refresh_session_data<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
) -> Result<()> {
    let incidents = runtime.fetch_incidents()?;
    let users = runtime.fetch_users()?;
    state.dispatch(SessionCommand::ReplaceRecords(incidents));
    state.dispatch(SessionCommand::ReplaceUsers(users));
    Ok(())
}

fn process_internal_events(
    state: &mut SessionState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(SessionCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Commit(event) => handle_commit_event(state, view_data, tx, event),
        }
    }
}

fn handle_commit_event(
    state: &mut SessionState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    event: CommitEvent,
) {
    let (request_id, outcome) = match event {
        CommitEvent::Completed {
            request_id,
            receipt,
        } if receipt.accepted => (
            request_id,
            CommitOutcome::Succeeded {
                message: receipt.message,
                data: receipt.record,
            },
        ),
        CommitEvent::Completed {
            request_id,
            receipt,
        } => (
            request_id,
            CommitOutcome::Failed {
                message: receipt.message,
            },
        ),
        CommitEvent::Failed { request_id, error } => {
            (request_id, CommitOutcome::Failed { message: error })
        }
    };

    let events = state.dispatch(SessionCommand::ResolveCommit {
        request_id,
        outcome,
    });
    note_status_events(view_data, tx, &events);
    sync_cursors(state, view_data);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64, delay: Duration) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn note_status_events(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: &[SessionEvent],
) {
    if events
        .iter()
        .any(|event| matches!(event, SessionEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token, view_data.status_clear_after);
    }
}

fn dispatch_with_status<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: SessionCommand,
) {
    let mut events = state.dispatch(command);

    let requested = events.iter().find_map(|event| match event {
        SessionEvent::CommitRequested {
            request_id,
            incident_id,
            patch,
        } => Some((*request_id, incident_id.clone(), patch.clone())),
        _ => None,
    });
    if let Some((request_id, incident_id, patch)) = requested
        && let Err(error) =
            runtime.spawn_commit(request_id, &incident_id, &patch, internal_tx.clone())
    {
        events.extend(state.dispatch(SessionCommand::ResolveCommit {
            request_id,
            outcome: CommitOutcome::Failed {
                message: error.to_string(),
            },
        }));
    }

    note_status_events(view_data, internal_tx, &events);
    sync_cursors(state, view_data);
}

fn sync_cursors(state: &SessionState, view_data: &mut ViewData) {
    let rows = state.filtered().len();
    view_data.list_cursor = view_data.list_cursor.min(rows.saturating_sub(1));
    let agents = visible_agents(state, view_data).len();
    view_data.agent_cursor = view_data.agent_cursor.min(agents.saturating_sub(1));
}

fn handle_key_event<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.input.is_some() {
        handle_input_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if key.code == KeyCode::Char('?') {
        view_data.help_visible = true;
        return false;
    }

    if state.selection.current_id().is_some() {
        handle_detail_key(state, runtime, view_data, internal_tx, key);
    } else {
        handle_list_key(state, runtime, view_data, internal_tx, key);
    }
    false
}

fn handle_input_key<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(mut input) = view_data.input.take() else {
        return;
    };
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {}
        (KeyCode::Enter, _) => {
            if let InputTarget::Field(field) = input.target {
                dispatch_with_status(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::SetField(field, input.buffer),
                );
            }
        }
        (KeyCode::Backspace, _) => {
            input.buffer.pop();
            apply_live_input(state, runtime, view_data, internal_tx, &input);
            view_data.input = Some(input);
        }
        (KeyCode::Char(c), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            input.buffer.push(c);
            apply_live_input(state, runtime, view_data, internal_tx, &input);
            view_data.input = Some(input);
        }
        _ => view_data.input = Some(input),
    }
}

/// Search and the agent filter narrow on every keystroke; field edits only
/// land on Enter.
fn apply_live_input<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    input: &InputUiState,
) {
    match input.target {
        InputTarget::Search => dispatch_with_status(
            state,
            runtime,
            view_data,
            internal_tx,
            SessionCommand::SetSearch(input.buffer.clone()),
        ),
        InputTarget::AgentFilter => {
            view_data.agent_filter = input.buffer.clone();
            view_data.agent_cursor = 0;
        }
        InputTarget::Field(_) => {}
    }
}

fn handle_list_key<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
            view_data.list_cursor = view_data.list_cursor.saturating_sub(1);
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
            let last = state.filtered().len().saturating_sub(1);
            view_data.list_cursor = view_data.list_cursor.saturating_add(1).min(last);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => view_data.list_cursor = 0,
        (KeyCode::Char('G'), _) => {
            view_data.list_cursor = state.filtered().len().saturating_sub(1);
        }
        (KeyCode::Enter, _) => {
            let Some(id) = state
                .filtered()
                .get(view_data.list_cursor)
                .map(|record| record.id.clone())
            else {
                return;
            };
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::Select(id),
            );
            view_data.field_cursor = 0;
            view_data.agent_cursor = 0;
            view_data.agent_filter.clear();
        }
        (KeyCode::Char('/'), KeyModifiers::NONE) => {
            view_data.input = Some(InputUiState {
                target: InputTarget::Search,
                buffer: state.criteria.search.clone(),
            });
        }
        (KeyCode::Char('t'), KeyModifiers::NONE) => {
            let next =
                next_filter_option(&kind_options(state.store.records()), &state.criteria.kind);
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetKindFilter(next),
            );
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            let next =
                next_filter_option(&status_options(state.store.records()), &state.criteria.status);
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetStatusFilter(next),
            );
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetSearch(String::new()),
            );
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetKindFilter(FieldFilter::All),
            );
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetStatusFilter(FieldFilter::All),
            );
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            let command = match refresh_session_data(state, runtime) {
                Ok(()) => SessionCommand::SetStatus("refreshed".to_owned()),
                Err(error) => SessionCommand::SetStatus(format!("load failed: {error}")),
            };
            dispatch_with_status(state, runtime, view_data, internal_tx, command);
        }
        _ => {}
    }
}

fn handle_detail_key<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        dispatch_with_status(
            state,
            runtime,
            view_data,
            internal_tx,
            SessionCommand::SubmitDraft,
        );
        return;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            let command = if state.overlay.as_ref().is_some_and(EditOverlay::is_editing) {
                SessionCommand::CancelEdit
            } else {
                SessionCommand::ClearSelection
            };
            dispatch_with_status(state, runtime, view_data, internal_tx, command);
        }
        (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Right, _) => {
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::NextTab,
            );
        }
        (KeyCode::BackTab, _) | (KeyCode::Left, _) => {
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::PrevTab,
            );
        }
        (KeyCode::Char(digit @ '1'..='4'), KeyModifiers::NONE) => {
            let index = digit as usize - '1' as usize;
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SwitchTab(DetailTab::ALL[index]),
            );
        }
        _ => match state.active_tab {
            DetailTab::Overview => {
                handle_overview_key(state, runtime, view_data, internal_tx, key);
            }
            DetailTab::Agents => handle_agents_key(state, runtime, view_data, internal_tx, key),
            DetailTab::Reports | DetailTab::Briefs => {}
        },
    }
}

fn handle_overview_key<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::BeginEdit,
            );
        }
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
            view_data.field_cursor = view_data
                .field_cursor
                .checked_sub(1)
                .unwrap_or(EditField::ALL.len() - 1);
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
            view_data.field_cursor = (view_data.field_cursor + 1) % EditField::ALL.len();
        }
        (KeyCode::Enter, _) => begin_field_edit(state, runtime, view_data, internal_tx),
        _ => {}
    }
}

fn begin_field_edit<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let field = EditField::ALL[view_data.field_cursor % EditField::ALL.len()];
    let Some(current) = state
        .overlay
        .as_ref()
        .filter(|overlay| overlay.is_editing())
        .map(|overlay| overlay.draft().field(field).to_owned())
    else {
        dispatch_with_status(
            state,
            runtime,
            view_data,
            internal_tx,
            SessionCommand::SetStatus("press e to edit".to_owned()),
        );
        return;
    };

    match field.widget() {
        FieldWidget::Choice(options) => {
            let next = next_choice(options, &current);
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetField(field, next.to_owned()),
            );
        }
        FieldWidget::Text | FieldWidget::TextArea | FieldWidget::Numeric => {
            view_data.input = Some(InputUiState {
                target: InputTarget::Field(field),
                buffer: current,
            });
        }
    }
}

fn next_choice(options: &'static [&'static str], current: &str) -> &'static str {
    match options.iter().position(|option| *option == current) {
        Some(index) => options[(index + 1) % options.len()],
        None => options.first().copied().unwrap_or_default(),
    }
}

fn handle_agents_key<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
            view_data.agent_cursor = view_data.agent_cursor.saturating_sub(1);
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
            let last = visible_agents(state, view_data).len().saturating_sub(1);
            view_data.agent_cursor = view_data.agent_cursor.saturating_add(1).min(last);
        }
        (KeyCode::Char('/'), KeyModifiers::NONE) => {
            view_data.input = Some(InputUiState {
                target: InputTarget::AgentFilter,
                buffer: view_data.agent_filter.clone(),
            });
        }
        (KeyCode::Char(' '), KeyModifiers::NONE) => {
            let Some(user) = selected_agent_id(state, view_data) else {
                return;
            };
            ensure_editing(state, runtime, view_data, internal_tx);
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::ToggleMember(user),
            );
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) => {
            let Some(user) = selected_agent_id(state, view_data) else {
                return;
            };
            let Some(current) = state.overlay.as_ref().and_then(|overlay| {
                overlay
                    .draft()
                    .members
                    .iter()
                    .find(|member| member.user == user)
                    .map(|member| member.permission)
            }) else {
                dispatch_with_status(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::SetStatus("not a member; space adds them first".to_owned()),
                );
                return;
            };
            let position = Permission::ALL
                .iter()
                .position(|permission| *permission == current)
                .unwrap_or(0);
            let next = Permission::ALL[(position + 1) % Permission::ALL.len()];
            ensure_editing(state, runtime, view_data, internal_tx);
            dispatch_with_status(
                state,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::SetMemberPermission(user, next),
            );
        }
        _ => {}
    }
}

/// Membership keys work straight from the viewing state; they open the
/// draft first so the change has somewhere to land.
fn ensure_editing<R: SessionRuntime>(
    state: &mut SessionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state
        .overlay
        .as_ref()
        .is_some_and(|overlay| !overlay.is_editing() && !overlay.is_committing())
    {
        dispatch_with_status(
            state,
            runtime,
            view_data,
            internal_tx,
            SessionCommand::BeginEdit,
        );
    }
}

fn next_filter_option(options: &[String], current: &FieldFilter) -> FieldFilter {
    if options.is_empty() {
        return FieldFilter::All;
    }
    let position = options
        .iter()
        .position(|option| option == current.label())
        .unwrap_or(0);
    FieldFilter::from_option(&options[(position + 1) % options.len()])
}

fn visible_agents<'a>(state: &'a SessionState, view_data: &ViewData) -> Vec<&'a User> {
    let needle = view_data.agent_filter.to_lowercase();
    state
        .users
        .iter()
        .filter(|user| {
            needle.is_empty()
                || user.display_name().to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
        })
        .collect()
}

fn selected_agent_id(state: &SessionState, view_data: &ViewData) -> Option<UserId> {
    visible_agents(state, view_data)
        .get(view_data.agent_cursor)
        .map(|user| user.id.clone())
}

fn display_title(record: &Incident) -> &str {
    if record.title.is_empty() {
        "Untitled Incident"
    } else {
        &record.title
    }
}

fn display_kind(record: &Incident) -> &str {
    if record.kind.is_empty() {
        "N/A"
    } else {
        &record.kind
    }
}

fn blank_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn date_label(record: &Incident) -> String {
    match record.created_at {
        Some(created_at) => created_at.date().to_string(),
        None => record.date.clone(),
    }
}

/// First hundred characters of a report body. Counts characters, not
/// bytes, so multibyte bodies never split a code point.
fn brief_excerpt(body: &str) -> String {
    if body.chars().count() <= BRIEF_EXCERPT_CHARS {
        return body.to_owned();
    }
    let mut excerpt: String = body.chars().take(BRIEF_EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

fn render(frame: &mut ratatui::Frame<'_>, state: &SessionState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    if state.selection.current_id().is_some() {
        let selected = DetailTab::ALL
            .iter()
            .position(|tab| *tab == state.active_tab)
            .unwrap_or(0);
        let titles = DetailTab::ALL
            .iter()
            .map(|tab| tab.label().to_owned())
            .collect::<Vec<String>>();
        let breadcrumb = match state.detail_record() {
            Some(record) => format!("sitrep / {}", display_title(record)),
            None => "sitrep".to_owned(),
        };

        let tabs = Tabs::new(titles)
            .block(Block::default().title(breadcrumb).borders(Borders::ALL))
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .select(selected);
        frame.render_widget(tabs, layout[0]);

        let body_text = match (state.active_tab, state.detail_record()) {
            (_, None) => "incident no longer available (esc returns to the list)".to_owned(),
            (DetailTab::Overview, Some(_)) => render_overview_text(state, view_data),
            (DetailTab::Reports, Some(record)) => render_reports_text(record),
            (DetailTab::Briefs, Some(record)) => render_briefs_text(record),
            (DetailTab::Agents, Some(_)) => render_agents_text(state, view_data),
        };
        let body = Paragraph::new(body_text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.active_tab.label()),
        );
        frame.render_widget(body, layout[1]);
    } else {
        let header = Paragraph::new(render_search_line(state, view_data))
            .block(Block::default().title("sitrep").borders(Borders::ALL));
        frame.render_widget(header, layout[0]);
        render_incident_table(frame, layout[1], state, view_data);
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if view_data.help_visible {
        let area = centered_rect(70, 64, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_search_line(state: &SessionState, view_data: &ViewData) -> String {
    let search = match view_data.input.as_ref() {
        Some(input) if input.target == InputTarget::Search => {
            format!("{}{INPUT_CURSOR}", input.buffer)
        }
        _ if state.criteria.search.is_empty() => "- (press /)".to_owned(),
        _ => state.criteria.search.clone(),
    };
    format!(
        "search: {search} | type: {} | status: {}",
        state.criteria.kind.label(),
        state.criteria.status.label()
    )
}

fn render_incident_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &SessionState,
    view_data: &ViewData,
) {
    let filtered = state.filtered();

    let header_cells = ["title", "type", "status", "severity", "date"]
        .into_iter()
        .map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells);

    let rows = filtered.iter().enumerate().map(|(row_index, record)| {
        let mut style = Style::default();
        if row_index == view_data.list_cursor {
            style = style.bg(Color::DarkGray);
        }
        let cells = [
            display_title(record).to_owned(),
            display_kind(record).to_owned(),
            record.status.clone(),
            record.severity.clone(),
            date_label(record),
        ]
        .into_iter()
        .map(|text| Cell::from(text).style(style));
        Row::new(cells)
    });

    let widths = vec![Constraint::Min(8); 5];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!(
                    "incidents ({}/{})",
                    filtered.len(),
                    state.store.len()
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn render_overview_text(state: &SessionState, view_data: &ViewData) -> String {
    let Some(overlay) = &state.overlay else {
        return "no incident selected".to_owned();
    };
    let source = overlay.source();
    let editing = overlay.is_editing();

    let mode_line = match overlay.mode() {
        OverlayMode::Viewing => "viewing (e edits)".to_owned(),
        OverlayMode::Editing => "editing (ctrl+s saves, esc cancels)".to_owned(),
        OverlayMode::Committing(_) => "saving changes...".to_owned(),
    };
    let mut lines = vec![
        format!("{} ({})", display_title(source), display_kind(source)),
        format!(
            "{} | {} / {} | reported {}",
            source.id.get(),
            blank_dash(&source.state),
            blank_dash(&source.local_gov),
            date_label(source),
        ),
        mode_line,
        String::new(),
    ];

    for (index, field) in EditField::ALL.iter().enumerate() {
        let marker = if editing && index == view_data.field_cursor {
            "> "
        } else {
            "  "
        };
        let value = match view_data.input.as_ref() {
            Some(input) if input.target == InputTarget::Field(*field) => {
                format!("{}{INPUT_CURSOR}", input.buffer)
            }
            _ => blank_dash(overlay.draft().field(*field)).to_owned(),
        };
        lines.push(format!("{marker}{}: {value}", field.label()));
    }

    lines.push(String::new());
    lines.push(format!("agents: {}", overlay.draft().members.len()));
    lines.join("\n")
}

fn render_reports_text(record: &Incident) -> String {
    if record.reports.is_empty() {
        return "no reports yet".to_owned();
    }
    let mut lines = Vec::with_capacity(record.reports.len() * 3);
    for (index, report) in record.reports.iter().enumerate() {
        let title = if report.title.is_empty() {
            "(untitled report)"
        } else {
            &report.title
        };
        lines.push(format!(
            "{}. {title} [{}] from {}",
            index + 1,
            blank_dash(&report.status),
            blank_dash(&report.sender),
        ));
        if !report.body.is_empty() {
            lines.push(format!("   {}", report.body));
        }
        for media in &report.media {
            let label = if media.name.is_empty() {
                &media.url
            } else {
                &media.name
            };
            lines.push(format!("   media: {label} ({})", blank_dash(&media.kind)));
        }
    }
    lines.join("\n")
}

fn render_briefs_text(record: &Incident) -> String {
    if record.reports.is_empty() {
        return "no briefs yet".to_owned();
    }
    let mut lines = Vec::with_capacity(record.reports.len() * 2);
    for report in &record.reports {
        let heading = if report.title.is_empty() {
            "(untitled report)"
        } else {
            &report.title
        };
        lines.push(format!("{heading}:"));
        lines.push(format!("  {}", brief_excerpt(&report.body)));
    }
    lines.join("\n")
}

fn render_agents_text(state: &SessionState, view_data: &ViewData) -> String {
    let Some(overlay) = &state.overlay else {
        return "no incident selected".to_owned();
    };
    let draft = overlay.draft();

    let filter_line = match view_data.input.as_ref() {
        Some(input) if input.target == InputTarget::AgentFilter => {
            format!("filter: {}{INPUT_CURSOR}", input.buffer)
        }
        _ if view_data.agent_filter.is_empty() => "filter: - (press /)".to_owned(),
        _ => format!("filter: {}", view_data.agent_filter),
    };

    let agents = visible_agents(state, view_data);
    if agents.is_empty() {
        return format!("{filter_line}\n\nno agents match");
    }

    let mut lines = Vec::with_capacity(agents.len() + 2);
    lines.push(filter_line);
    lines.push(String::new());
    for (index, user) in agents.iter().enumerate() {
        let cursor = if index == view_data.agent_cursor {
            "> "
        } else {
            "  "
        };
        let membership = match draft
            .members
            .iter()
            .find(|member| member.user == user.id)
            .map(|member| member.permission)
        {
            Some(permission) => format!("[x] {:<8}", permission.as_str()),
            None => format!("[ ] {:<8}", ""),
        };
        lines.push(format!(
            "{cursor}{membership} {} <{}>",
            user.display_name(),
            user.email
        ));
    }
    lines.join("\n")
}

fn status_text(state: &SessionState, view_data: &ViewData) -> String {
    let mode = if state.selection.current_id().is_none() {
        "LIST"
    } else {
        match &state.overlay {
            Some(overlay) if overlay.is_committing() => "SAVE",
            Some(overlay) if overlay.is_editing() => "EDIT",
            _ => "VIEW",
        }
    };

    let hints = if view_data.input.is_some() {
        "enter apply | esc close"
    } else if state.selection.current_id().is_none() {
        "j/k enter | / search | t type s status c clear | r refresh | ? help | ctrl+q"
    } else if mode == "EDIT" {
        "j/k field | enter edit | tab switch | ctrl+s save | esc cancel | ctrl+q"
    } else {
        "tab switch | e edit | esc back | ? help | ctrl+q"
    };

    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> String {
    [
        "list",
        "  j/k or arrows  move      enter  open incident",
        "  /  search titles         t  cycle type filter",
        "  s  cycle status filter   c  clear filters",
        "  r  reload from the service",
        "",
        "detail",
        "  tab/backtab  switch tab  1-4  jump to tab",
        "  e  edit     ctrl+s save  esc  cancel / back",
        "  j/k  move field cursor   enter  edit field",
        "",
        "agents",
        "  space  add/remove agent  p  cycle permission",
        "  /  filter agents",
        "",
        "ctrl+q quits; ? closes this help",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
