//! Catalogue console: data types on the left, the points of the chosen
//! type on the right, with an add form, in-place edit and a delete
//! confirmation. Every write is shown immediately and rolled back with an
//! alert if the service rejects it.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table,
    TableState,
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use refcat_core::{
    CatalogueConsole, CatalogueSource, ConsoleRow, EditDraft, LoadTicket, PendingMutation, RowKey,
};

use super::{cycle, step};
use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::sub_tabs::render_hints;
use crate::widgets::text_field::TextField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Types,
    Points,
    Add,
    Edit,
}

// ── Point form ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    SortOrder,
    Active,
}

const ADD_FIELDS: &[Field] = &[Field::Name, Field::Description, Field::SortOrder];
const EDIT_FIELDS: &[Field] = &[
    Field::Name,
    Field::Description,
    Field::SortOrder,
    Field::Active,
];

/// Shared by the add form and the edit overlay.
struct PointForm {
    fields: &'static [Field],
    focus: usize,
    name: TextField,
    description: TextField,
    sort_order: TextField,
    is_active: bool,
}

impl PointForm {
    fn new(fields: &'static [Field]) -> Self {
        Self {
            fields,
            focus: 0,
            name: TextField::new("Name"),
            description: TextField::new("Label"),
            sort_order: TextField::new("Sort order"),
            is_active: true,
        }
    }

    fn load(&mut self, draft: &EditDraft) {
        self.focus = 0;
        self.name.set_value(draft.name.clone());
        self.description.set_value(draft.description.clone());
        self.sort_order.set_value(draft.sort_order.to_string());
        self.is_active = draft.is_active;
    }

    fn reset(&mut self) {
        self.focus = 0;
        self.name.reset();
        self.description.reset();
        self.sort_order.reset();
        self.is_active = true;
    }

    fn field(&self) -> Field {
        self.fields.get(self.focus).copied().unwrap_or(Field::Name)
    }

    fn cycle(&mut self, forward: bool) {
        self.focus = cycle(self.focus, forward, self.fields.len());
    }

    /// Blank means 0.
    fn sort_order(&self) -> Result<i32, String> {
        let raw = self.sort_order.value().trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse()
            .map_err(|_| format!("Sort order must be a whole number, got '{raw}'"))
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.field() {
            Field::Name => self.name.handle_key(key),
            Field::Description => self.description.handle_key(key),
            Field::SortOrder => self.sort_order.handle_key(key),
            Field::Active if key.code == KeyCode::Char(' ') => {
                self.is_active = !self.is_active;
                true
            }
            Field::Active => false,
        }
    }

    fn height(&self) -> u16 {
        u16::try_from(self.fields.len()).unwrap_or(4) + 2
    }

    fn render(&self, frame: &mut Frame, area: Rect, title: &str) {
        let block = Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let rows = Layout::vertical(self.fields.iter().map(|_| Constraint::Length(1))).split(inner);
        for (i, (field, row)) in self.fields.iter().zip(rows.iter()).enumerate() {
            let focused = i == self.focus;
            match field {
                Field::Name => self.name.render(frame, *row, focused),
                Field::Description => self.description.render(frame, *row, focused),
                Field::SortOrder => self.sort_order.render(frame, *row, focused),
                Field::Active => {
                    let marker = if focused { "›" } else { " " };
                    let check = if self.is_active { "[x]" } else { "[ ]" };
                    let line = Line::from(vec![
                        Span::styled(format!("{marker} {:<12}", "Active"), theme::field_label(focused)),
                        Span::styled(check, theme::table_row()),
                    ]);
                    frame.render_widget(Paragraph::new(line), *row);
                }
            }
        }
    }
}

// ── Screen ──────────────────────────────────────────────────────────

pub struct ConsoleScreen<S: CatalogueSource> {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    console: CatalogueConsole<S>,
    pane: Pane,
    type_index: usize,
    table_state: TableState,
    add_form: PointForm,
    edit_form: PointForm,
    throbber_state: ThrobberState,
}

impl<S: CatalogueSource> ConsoleScreen<S> {
    pub fn new(console: CatalogueConsole<S>) -> Self {
        Self {
            focused: false,
            action_tx: None,
            console,
            pane: Pane::Types,
            type_index: 0,
            table_state: TableState::default(),
            add_form: PointForm::new(ADD_FIELDS),
            edit_form: PointForm::new(EDIT_FIELDS),
            throbber_state: ThrobberState::default(),
        }
    }

    // ── Remote work ──────────────────────────────────────────────────

    /// Run `work` against the source off the event loop and post its action.
    fn spawn<F, Fut>(&self, work: F)
    where
        F: FnOnce(Arc<S>) -> Fut,
        Fut: Future<Output = Action> + Send + 'static,
    {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let fut = work(Arc::clone(self.console.source()));
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }

    fn spawn_load_types(&self) {
        self.spawn(|source| async move { Action::TypesLoaded(source.list_types().await) });
    }

    fn spawn_load_points(&self, ticket: LoadTicket) {
        self.spawn(|source| async move {
            let result = ticket.fetch(source.as_ref()).await;
            Action::PointsLoaded { ticket, result }
        });
    }

    fn spawn_confirm(&self, pending: PendingMutation) {
        debug!(verb = pending.verb(), "console: confirming mutation");
        self.spawn(|source| async move {
            let result = pending.confirm(source.as_ref()).await;
            Action::MutationSettled { pending, result }
        });
    }

    // ── Selection ────────────────────────────────────────────────────

    fn select_type_at(&mut self, index: usize) {
        let Some(name) = self.console.types().get(index).map(|t| t.name.clone()) else {
            return;
        };
        self.type_index = index;
        self.table_state.select(None);
        let ticket = self.console.begin_select(name);
        self.spawn_load_points(ticket);
    }

    fn reload_points(&mut self) {
        if let Some(name) = self.console.selected_name().map(str::to_owned) {
            let ticket = self.console.begin_select(name);
            self.spawn_load_points(ticket);
        }
    }

    fn selected_row(&self) -> Option<&ConsoleRow> {
        self.table_state
            .selected()
            .and_then(|i| self.console.rows().get(i))
    }

    fn selected_key(&self) -> Option<RowKey> {
        self.selected_row().map(|r| r.key.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.console.rows().len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            let i = self.table_state.selected().unwrap_or(0).min(len - 1);
            self.table_state.select(Some(i));
        }
    }

    fn move_row(&mut self, delta: isize) {
        let len = self.console.rows().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(step(current, delta, len)));
    }

    fn move_type(&mut self, delta: isize) {
        let len = self.console.types().len();
        if len > 0 {
            self.type_index = step(self.type_index, delta, len);
        }
    }

    fn is_busy(&self) -> bool {
        self.console.is_loading() || self.console.in_flight() > 0
    }

    // ── Mutations ────────────────────────────────────────────────────

    fn open_add(&mut self) {
        if self.console.selected_type().is_none() {
            self.console.set_alert("Select a data type first");
            return;
        }
        self.add_form.reset();
        self.pane = Pane::Add;
    }

    fn submit_add(&mut self) {
        let sort_order = match self.add_form.sort_order() {
            Ok(n) => n,
            Err(msg) => {
                self.console.set_alert(msg);
                return;
            }
        };
        let draft = self.console.draft_mut();
        self.add_form.name.value().clone_into(&mut draft.name);
        self.add_form
            .description
            .value()
            .clone_into(&mut draft.description);
        draft.sort_order = sort_order;

        // Validation failures leave the form open; the console raised the alert.
        if let Ok(pending) = self.console.begin_add() {
            self.add_form.reset();
            self.pane = Pane::Points;
            self.table_state
                .select(Some(self.console.rows().len().saturating_sub(1)));
            self.spawn_confirm(pending);
        }
    }

    fn open_edit(&mut self) {
        let Some(key) = self.selected_key() else {
            return;
        };
        if self.console.begin_edit(&key).is_err() {
            return;
        }
        if let Some(draft) = self.console.editing() {
            self.edit_form.load(draft);
            self.pane = Pane::Edit;
        }
    }

    fn submit_edit(&mut self) {
        let sort_order = match self.edit_form.sort_order() {
            Ok(n) => n,
            Err(msg) => {
                self.console.set_alert(msg);
                return;
            }
        };
        if let Some(draft) = self.console.editing_mut() {
            self.edit_form.name.value().clone_into(&mut draft.name);
            self.edit_form
                .description
                .value()
                .clone_into(&mut draft.description);
            draft.sort_order = sort_order;
            draft.is_active = self.edit_form.is_active;
        }

        match self.console.begin_save_edit() {
            Ok(Some(pending)) => {
                self.pane = Pane::Points;
                self.spawn_confirm(pending);
            }
            Ok(None) => self.pane = Pane::Points,
            Err(_) => {
                if self.console.editing().is_none() {
                    self.pane = Pane::Points;
                }
            }
        }
    }

    fn cancel_form(&mut self) {
        if self.pane == Pane::Edit {
            self.console.cancel_edit();
        }
        self.pane = Pane::Points;
    }

    fn toggle_selected(&mut self) {
        let Some(key) = self.selected_key() else {
            return;
        };
        if let Ok(pending) = self.console.begin_toggle_active(&key) {
            self.spawn_confirm(pending);
        }
    }

    fn request_delete(&mut self) {
        if let Some(key) = self.selected_key() {
            self.console.request_delete(&key);
        }
    }

    fn confirm_delete(&mut self) {
        if let Ok(Some(pending)) = self.console.begin_confirm_delete() {
            self.clamp_selection();
            self.spawn_confirm(pending);
        }
    }

    // ── Keys ─────────────────────────────────────────────────────────

    fn handle_types_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_type(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_type(-1),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                let highlighted = self
                    .console
                    .types()
                    .get(self.type_index)
                    .map(|t| t.name.as_str());
                if highlighted.is_some() && highlighted != self.console.selected_name() {
                    self.select_type_at(self.type_index);
                }
                self.pane = Pane::Points;
            }
            KeyCode::Char('r') => self.spawn_load_types(),
            KeyCode::Char('x') => self.console.dismiss_alert(),
            _ => {}
        }
    }

    fn handle_points_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_row(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_row(-1),
            KeyCode::Char('g') => self.move_row(isize::MIN),
            KeyCode::Char('G') => self.move_row(isize::MAX),
            KeyCode::Char('h') | KeyCode::Left => self.pane = Pane::Types,
            KeyCode::Char('a') => self.open_add(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit(),
            KeyCode::Char('t') => self.toggle_selected(),
            KeyCode::Char('d') => self.request_delete(),
            KeyCode::Char('r') => self.reload_points(),
            KeyCode::Char('x') => self.console.dismiss_alert(),
            _ => {}
        }
    }

    fn active_form(&mut self) -> &mut PointForm {
        if self.pane == Pane::Edit {
            &mut self.edit_form
        } else {
            &mut self.add_form
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.cancel_form(),
            KeyCode::Enter if self.pane == Pane::Edit => self.submit_edit(),
            KeyCode::Enter => self.submit_add(),
            KeyCode::Tab | KeyCode::Down => self.active_form().cycle(true),
            KeyCode::BackTab | KeyCode::Up => self.active_form().cycle(false),
            _ => {
                self.active_form().handle_key(key);
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_types(&self, frame: &mut Frame, area: Rect) {
        let title = if self.console.types_degraded() {
            " Data Types (offline) ".to_owned()
        } else {
            format!(" Data Types ({}) ", self.console.types().len())
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_for(self.focused && self.pane == Pane::Types));

        let selected = self.console.selected_name();
        let items: Vec<ListItem> = self
            .console
            .types()
            .iter()
            .map(|t| {
                let marker = if selected == Some(t.name.as_str()) { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme::NEON_CYAN)),
                    Span::styled(t.display_name.clone(), theme::table_row()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(theme::table_selected());
        let mut state = ListState::default();
        if !self.console.types().is_empty() {
            state.select(Some(self.type_index));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_points(&self, frame: &mut Frame, area: Rect) {
        let title = match self.console.selected_type() {
            Some(t) => format!(" {} ({}) ", t.display_name, self.console.rows().len()),
            None => " Data Points ".to_owned(),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_for(self.focused && self.pane != Pane::Types));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let form_height = match self.pane {
            Pane::Add => self.add_form.height(),
            Pane::Edit => self.edit_form.height(),
            Pane::Types | Pane::Points => 0,
        };
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(form_height),
            Constraint::Length(1),
        ])
        .split(inner);

        if self.console.selected_name().is_none() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  Select a data type on the left and press Enter.",
                    theme::key_hint(),
                )),
                layout[0],
            );
        } else if self.console.is_loading() {
            let throbber = Throbber::default()
                .label("  Loading data points...")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber_state.clone());
        } else if self.console.rows().is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  No data points yet. Press a to add one.",
                    theme::key_hint(),
                )),
                layout[0],
            );
        } else {
            self.render_table(frame, layout[0]);
        }

        match self.pane {
            Pane::Add => self.add_form.render(frame, layout[1], "New data point"),
            Pane::Edit => self.edit_form.render(frame, layout[1], "Edit data point"),
            Pane::Types | Pane::Points => {}
        }

        let footer = Layout::horizontal([Constraint::Min(1), Constraint::Length(14)]).split(layout[2]);
        frame.render_widget(Paragraph::new(render_hints(self.hints())), footer[0]);
        if self.console.in_flight() > 0 {
            let throbber = Throbber::default()
                .label("Saving...")
                .style(Style::default().fg(theme::DIM_WHITE))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, footer[1], &mut self.throbber_state.clone());
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(
            ["Order", "Name", "Label", "Status"]
                .map(|h| Cell::from(h).style(theme::table_header())),
        );

        let rows: Vec<Row> = self
            .console
            .rows()
            .iter()
            .map(|row| {
                let point = &row.point;
                let (style, status) = if row.is_pending() {
                    (theme::row_pending(), "saving")
                } else if point.is_active {
                    (theme::table_row(), "active")
                } else {
                    (theme::row_inactive(), "inactive")
                };
                Row::new(vec![
                    Cell::from(point.sort_order.to_string()),
                    Cell::from(point.name.clone()),
                    Cell::from(point.label().to_owned()),
                    Cell::from(status),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Length(9),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_alert(&self, frame: &mut Frame, area: Rect) {
        let Some(alert) = self.console.alert() else {
            return;
        };
        let line = Line::from(vec![
            Span::styled(format!(" ✗ {alert}"), theme::alert()),
            Span::styled("   x ", theme::key_hint_key()),
            Span::styled("dismiss", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_delete_confirm(&self, frame: &mut Frame, area: Rect, key: &RowKey) {
        let name = self
            .console
            .row(key)
            .map_or_else(|| key.to_string(), |r| r.point.label().to_owned());

        let width = 56u16.min(area.width.saturating_sub(4));
        let height = 5u16;
        let x = area.width.saturating_sub(width) / 2;
        let y = area.height.saturating_sub(height) / 2;
        let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(Clear, dialog_area);
        let block = Block::default()
            .title(" Delete data point ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let text = vec![
            Line::from(Span::styled(
                format!("  Are you sure you want to delete '{name}'?"),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("delete    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self.pane {
            Pane::Types => &[("j/k", "move"), ("Enter", "open"), ("r", "reload")],
            Pane::Points => &[
                ("a", "add"),
                ("e", "edit"),
                ("t", "active"),
                ("d", "delete"),
                ("r", "reload"),
                ("h", "types"),
            ],
            Pane::Add => &[("Tab", "next field"), ("Enter", "add"), ("Esc", "cancel")],
            Pane::Edit => &[
                ("Tab", "next field"),
                ("Space", "active"),
                ("Enter", "save"),
                ("Esc", "cancel"),
            ],
        }
    }
}

impl<S: CatalogueSource> Component for ConsoleScreen<S> {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        self.spawn_load_types();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.console.pending_delete().is_some() {
            match key.code {
                KeyCode::Char('y' | 'Y') => self.confirm_delete(),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.console.cancel_delete(),
                _ => {}
            }
            return Ok(None);
        }

        match self.pane {
            Pane::Types => self.handle_types_key(key),
            Pane::Points => self.handle_points_key(key),
            Pane::Add | Pane::Edit => self.handle_form_key(key),
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::TypesLoaded(result) => {
                self.console.apply_types(result.clone());
                self.type_index = self
                    .type_index
                    .min(self.console.types().len().saturating_sub(1));
                if self.console.selected_name().is_none() {
                    self.select_type_at(self.type_index);
                }
            }
            Action::PointsLoaded { ticket, result } => {
                if self.console.finish_select(ticket, result.clone()) {
                    self.clamp_selection();
                }
            }
            Action::MutationSettled { pending, result } => {
                let verb = pending.verb();
                let succeeded = result.is_ok();
                self.console.settle(pending.clone(), result.clone());
                self.clamp_selection();
                if succeeded {
                    return Ok(Some(Action::Notify(Notification::success(format!(
                        "Data point {verb}d"
                    )))));
                }
            }
            Action::Tick => {
                if self.is_busy() {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let alert_height = u16::from(self.console.alert().is_some());
        let layout =
            Layout::vertical([Constraint::Length(alert_height), Constraint::Min(1)]).split(area);
        self.render_alert(frame, layout[0]);

        let panes =
            Layout::horizontal([Constraint::Length(30), Constraint::Min(20)]).split(layout[1]);
        self.render_types(frame, panes[0]);
        self.render_points(frame, panes[1]);

        if let Some(key) = self.console.pending_delete() {
            self.render_delete_confirm(frame, area, key);
        }
    }

    fn captures_input(&self) -> bool {
        matches!(self.pane, Pane::Add | Pane::Edit) || self.console.pending_delete().is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Console"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    use super::*;
    use crate::testing::MemorySource;

    type Screen = ConsoleScreen<MemorySource>;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(screen: &mut Screen, code: KeyCode) {
        screen.handle_key_event(key(code)).unwrap();
    }

    fn type_text(screen: &mut Screen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    async fn next_action(rx: &mut mpsc::UnboundedReceiver<Action>) -> Action {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    /// Feed the next action back into the screen, returning any follow-up.
    async fn pump(screen: &mut Screen, rx: &mut mpsc::UnboundedReceiver<Action>) -> Option<Action> {
        let action = next_action(rx).await;
        screen.update(&action).unwrap()
    }

    /// Mount on `source` and wait for the types and first type's points.
    async fn mounted(source: MemorySource) -> (Screen, mpsc::UnboundedReceiver<Action>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let console = CatalogueConsole::new(Arc::new(source));
        let mut screen = ConsoleScreen::new(console);
        screen.init(tx).unwrap();
        pump(&mut screen, &mut rx).await; // TypesLoaded
        pump(&mut screen, &mut rx).await; // PointsLoaded
        (screen, rx)
    }

    fn names(screen: &Screen) -> Vec<&str> {
        screen
            .console
            .rows()
            .iter()
            .map(|r| r.point.name.as_str())
            .collect()
    }

    fn rendered(screen: &Screen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[tokio::test]
    async fn mount_selects_first_type_and_lists_points() {
        let source = MemorySource::default().with_type("risk_levels", &["low", "medium", "high"]);
        let (screen, _rx) = mounted(source).await;

        assert_eq!(screen.console.selected_name(), Some("risk_levels"));
        assert_eq!(names(&screen), ["low", "medium", "high"]);
        assert_eq!(screen.table_state.selected(), Some(0));

        let text = rendered(&screen);
        assert!(text.contains("risk levels"), "{text}");
        assert!(text.contains("medium"), "{text}");
    }

    #[tokio::test]
    async fn add_form_creates_point_and_adopts_server_row() {
        let source = MemorySource::default().with_type("contact_methods", &["phone"]);
        let (mut screen, mut rx) = mounted(source).await;

        press(&mut screen, KeyCode::Enter);
        press(&mut screen, KeyCode::Char('a'));
        assert!(screen.captures_input());
        type_text(&mut screen, "sms");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "Text message");
        press(&mut screen, KeyCode::Enter);

        // Optimistic row is visible before the service answers.
        assert_eq!(names(&screen), ["phone", "sms"]);
        assert!(screen.console.rows()[1].is_pending());
        assert!(!screen.captures_input());

        let follow_up = pump(&mut screen, &mut rx).await;
        assert!(matches!(
            follow_up,
            Some(Action::Notify(ref n)) if n.message == "Data point created"
        ));
        let row = &screen.console.rows()[1];
        assert!(!row.is_pending());
        assert_eq!(row.point.id.to_string(), "srv-1");
        assert_eq!(row.point.label(), "Text message");
        assert!(row.point.is_active);
    }

    #[tokio::test]
    async fn bad_sort_order_keeps_form_open_with_alert() {
        let source = MemorySource::default().with_type("risk_levels", &["low"]);
        let (mut screen, _rx) = mounted(source).await;

        press(&mut screen, KeyCode::Enter);
        press(&mut screen, KeyCode::Char('a'));
        type_text(&mut screen, "extreme");
        press(&mut screen, KeyCode::Tab);
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "abc");
        press(&mut screen, KeyCode::Enter);

        assert!(screen.console.alert().unwrap().contains("whole number"));
        assert_eq!(names(&screen), ["low"]);
        assert_eq!(screen.pane, Pane::Add);
    }

    #[tokio::test]
    async fn delete_waits_for_confirmation() {
        let source = MemorySource::default().with_type("risk_levels", &["low", "high"]);
        let (mut screen, mut rx) = mounted(source).await;
        press(&mut screen, KeyCode::Enter);

        press(&mut screen, KeyCode::Char('d'));
        assert!(screen.captures_input());
        assert!(rendered(&screen).contains("Are you sure"));
        press(&mut screen, KeyCode::Char('n'));
        assert_eq!(names(&screen), ["low", "high"]);

        press(&mut screen, KeyCode::Char('d'));
        press(&mut screen, KeyCode::Char('y'));
        assert_eq!(names(&screen), ["high"]);

        let follow_up = pump(&mut screen, &mut rx).await;
        assert!(matches!(
            follow_up,
            Some(Action::Notify(ref n)) if n.message == "Data point deleted"
        ));
        assert_eq!(names(&screen), ["high"]);
    }

    #[tokio::test]
    async fn edit_overlay_saves_changed_fields() {
        let source = MemorySource::default().with_type("risk_levels", &["low", "high"]);
        let (mut screen, mut rx) = mounted(source).await;
        press(&mut screen, KeyCode::Enter);
        press(&mut screen, KeyCode::Char('j'));

        press(&mut screen, KeyCode::Char('e'));
        assert_eq!(screen.pane, Pane::Edit);
        assert_eq!(screen.edit_form.name.value(), "high");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "High risk");
        press(&mut screen, KeyCode::Tab);
        press(&mut screen, KeyCode::Tab);
        press(&mut screen, KeyCode::Char(' '));
        press(&mut screen, KeyCode::Enter);

        assert_eq!(screen.pane, Pane::Points);
        let row = &screen.console.rows()[1];
        assert_eq!(row.point.label(), "High risk");
        assert!(!row.point.is_active);

        pump(&mut screen, &mut rx).await;
        assert!(screen.console.alert().is_none());
        assert!(!screen.console.rows()[1].point.is_active);
    }

    #[tokio::test]
    async fn offline_service_lists_fallback_types_with_alert() {
        let (screen, _rx) = mounted(MemorySource::offline()).await;

        assert!(screen.console.types_degraded());
        assert!(!screen.console.types().is_empty());
        let alert = screen.console.alert().unwrap();
        assert!(alert.starts_with("Failed to load data"), "{alert}");
        assert!(rendered(&screen).contains("offline"));
    }
}
