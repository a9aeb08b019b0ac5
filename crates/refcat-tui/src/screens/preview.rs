//! Choice-control preview: the select and radio controls side by side for
//! one data type, fed by their own retrievals, with an event log showing
//! what a form would receive.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use refcat_core::fallback;
use refcat_core::{
    Catalogue, CatalogueSource, ChoiceControl, ChoiceEvent, ChoiceProps, ChoiceVariant,
    ChoiceView, RadioLayout,
};

use super::{cycle, step};
use crate::action::{Action, Notification, PreviewSlot};
use crate::component::Component;
use crate::data_bridge::spawn_preview_bridge;
use crate::theme;
use crate::widgets::sub_tabs::{render_hints, render_sub_tabs};

const EVENT_LOG_LEN: usize = 6;

pub struct PreviewScreen<S: CatalogueSource> {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    catalogue: Catalogue<S>,
    type_names: Vec<String>,
    type_index: usize,
    include_other: bool,
    required: bool,
    layout: RadioLayout,
    select: ChoiceControl<S>,
    radio: ChoiceControl<S>,
    focus: PreviewSlot,
    select_cursor: usize,
    radio_cursor: usize,
    editing_other: bool,
    events: Vec<String>,
    /// Degraded warning already shown for the current mount.
    warned: bool,
    bridge_cancel: CancellationToken,
    throbber_state: ThrobberState,
}

impl<S: CatalogueSource> PreviewScreen<S> {
    pub fn new(catalogue: Catalogue<S>, data_type: &str) -> Self {
        let mut type_names = vec![data_type.to_owned()];
        type_names.extend(
            fallback::names()
                .filter(|n| *n != data_type)
                .map(str::to_owned),
        );

        let (select, radio) = build_controls(&catalogue, data_type, false, false, RadioLayout::Vertical);
        Self {
            focused: false,
            action_tx: None,
            catalogue,
            type_names,
            type_index: 0,
            include_other: false,
            required: false,
            layout: RadioLayout::Vertical,
            select,
            radio,
            focus: PreviewSlot::Select,
            select_cursor: 0,
            radio_cursor: 0,
            editing_other: false,
            events: Vec::new(),
            warned: false,
            bridge_cancel: CancellationToken::new(),
            throbber_state: ThrobberState::default(),
        }
    }

    fn data_type(&self) -> &str {
        self.type_names
            .get(self.type_index)
            .map_or("", String::as_str)
    }

    /// Rebuild both controls after a prop change. Values survive unless
    /// `keep_values` is false (switching data type).
    fn remount(&mut self, keep_values: bool) {
        let (mut select, mut radio) = build_controls(
            &self.catalogue,
            self.data_type(),
            self.include_other,
            self.required,
            self.layout,
        );
        if keep_values {
            select = select.with_value(self.select.value(), self.select.other_value());
            radio = radio.with_value(self.radio.value(), self.radio.other_value());
        } else {
            self.select_cursor = 0;
            self.radio_cursor = 0;
            self.events.clear();
        }
        self.select = select;
        self.radio = radio;
        self.editing_other = false;
        self.warned = false;
        self.start_bridges();
    }

    fn start_bridges(&mut self) {
        self.bridge_cancel.cancel();
        self.bridge_cancel = CancellationToken::new();
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        spawn_preview_bridge(
            PreviewSlot::Select,
            self.select.subscribe(),
            tx.clone(),
            self.bridge_cancel.clone(),
        );
        spawn_preview_bridge(
            PreviewSlot::Radio,
            self.radio.subscribe(),
            tx,
            self.bridge_cancel.clone(),
        );
    }

    fn switch_type(&mut self, forward: bool) {
        if self.type_names.is_empty() {
            return;
        }
        self.type_index = cycle(self.type_index, forward, self.type_names.len());
        self.remount(false);
    }

    fn merge_type_names<'a>(&mut self, names: impl Iterator<Item = &'a str>) {
        for name in names {
            if !self.type_names.iter().any(|n| n == name) {
                self.type_names.push(name.to_owned());
            }
        }
    }

    fn focused_control(&mut self) -> (&mut ChoiceControl<S>, &mut usize) {
        match self.focus {
            PreviewSlot::Select => (&mut self.select, &mut self.select_cursor),
            PreviewSlot::Radio => (&mut self.radio, &mut self.radio_cursor),
        }
    }

    fn log(&mut self, event: Option<ChoiceEvent>) {
        let Some(event) = event else {
            return;
        };
        let slot = match self.focus {
            PreviewSlot::Select => "select",
            PreviewSlot::Radio => "radio",
        };
        self.events.push(format!("{slot}: {event:?}"));
        if self.events.len() > EVENT_LOG_LEN {
            self.events.remove(0);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let (control, cursor) = self.focused_control();
        let len = control.view().options.len();
        if len > 0 {
            *cursor = step(*cursor, delta, len);
        }
    }

    fn choose(&mut self) {
        let (control, cursor) = self.focused_control();
        let event = control.select_index(*cursor);
        let other = control.is_other_selected();
        self.log(event);
        self.editing_other = other;
    }

    fn clear(&mut self) {
        let (control, cursor) = self.focused_control();
        let event = control.clear();
        *cursor = 0;
        self.log(event);
        self.editing_other = false;
    }

    fn handle_other_key(&mut self, key: KeyEvent) {
        let (control, _) = self.focused_control();
        let event = match key.code {
            KeyCode::Char(c) => control.push_other_char(c),
            KeyCode::Backspace => control.pop_other_char(),
            KeyCode::Enter | KeyCode::Esc => {
                self.editing_other = false;
                return;
            }
            _ => return,
        };
        self.log(event);
    }

    fn render_control(
        &self,
        frame: &mut Frame,
        area: Rect,
        slot: PreviewSlot,
    ) {
        let (control, cursor) = match slot {
            PreviewSlot::Select => (&self.select, self.select_cursor),
            PreviewSlot::Radio => (&self.radio, self.radio_cursor),
        };
        let view = control.view();
        let focused = self.focused && self.focus == slot;
        let title = match view.variant {
            ChoiceVariant::Select => " Select ".to_owned(),
            ChoiceVariant::Radio { layout } => format!(" Radio ({layout}) "),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_for(focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(text) = view.loading_text {
            let throbber = Throbber::default()
                .label(format!(" {text}"))
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, inner, &mut self.throbber_state.clone());
            return;
        }

        let mut lines = option_lines(&view, focused.then_some(cursor));

        if view.show_other_input {
            let editing = focused && self.editing_other;
            let (text, style) = if view.other_value.is_empty() && !editing {
                (view.other_placeholder.to_owned(), theme::key_hint())
            } else {
                (view.other_value.clone(), theme::table_row())
            };
            let caret = if editing { "▏" } else { "" };
            let required = if view.other_required { " *" } else { "" };
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(format!("  Other{required}: "), theme::field_label(editing)),
                Span::styled(text, style),
                Span::styled(caret, Style::default().fg(theme::ELECTRIC_PURPLE)),
            ]));
        }

        if let Some(ref err) = view.error {
            lines.push(Line::from(Span::styled(format!("  ⚠ {err}"), theme::warning())));
        }
        if view.degraded {
            lines.push(Line::from(Span::styled(
                "  offline: built-in options",
                theme::key_hint(),
            )));
        }
        if let Err(msg) = control.validate() {
            lines.push(Line::from(Span::styled(format!("  {msg}"), theme::alert())));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn render_events(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Events ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let lines: Vec<Line> = if self.events.is_empty() {
            vec![Line::from(Span::styled(
                "  Choose an option to see the change events.",
                theme::key_hint(),
            ))]
        } else {
            self.events
                .iter()
                .map(|e| Line::from(Span::styled(format!("  {e}"), theme::table_row())))
                .collect()
        };
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn build_controls<S: CatalogueSource>(
    catalogue: &Catalogue<S>,
    data_type: &str,
    include_other: bool,
    required: bool,
    layout: RadioLayout,
) -> (ChoiceControl<S>, ChoiceControl<S>) {
    let select = catalogue.choice(
        ChoiceProps::select(data_type)
            .include_other(include_other)
            .required(required)
            .show_error(true),
    );
    let radio = catalogue.choice(
        ChoiceProps::radio(data_type, layout)
            .include_other(include_other)
            .required(required)
            .show_error(true),
    );
    (select, radio)
}

/// One line per option for vertical controls, a single line for
/// horizontal radios.
fn option_lines(view: &ChoiceView, cursor: Option<usize>) -> Vec<Line<'static>> {
    let spans_for = |i: usize| -> Vec<Span<'static>> {
        let Some(option) = view.options.get(i) else {
            return Vec::new();
        };
        let marker = match view.variant {
            ChoiceVariant::Select if option.selected => "✓ ",
            ChoiceVariant::Select => "  ",
            ChoiceVariant::Radio { .. } if option.selected => "(•) ",
            ChoiceVariant::Radio { .. } => "( ) ",
        };
        let mut style = if option.is_placeholder() {
            theme::key_hint()
        } else {
            theme::table_row()
        };
        if option.selected {
            style = style.fg(theme::NEON_CYAN);
        }
        if cursor == Some(i) {
            style = style.bg(theme::BG_HIGHLIGHT).add_modifier(Modifier::BOLD);
        }
        vec![Span::styled(format!("{marker}{}", option.label), style)]
    };

    if matches!(
        view.variant,
        ChoiceVariant::Radio {
            layout: RadioLayout::Horizontal
        }
    ) {
        let mut spans = vec![Span::raw("  ")];
        for i in 0..view.options.len() {
            spans.extend(spans_for(i));
            spans.push(Span::raw("   "));
        }
        return vec![Line::from(spans)];
    }

    (0..view.options.len())
        .map(|i| {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(spans_for(i));
            Line::from(spans)
        })
        .collect()
}

impl<S: CatalogueSource> Component for PreviewScreen<S> {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        self.start_bridges();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing_other {
            self.handle_other_key(key);
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('G') => self.move_cursor(isize::MAX),
            KeyCode::Char('g') => self.move_cursor(isize::MIN),
            KeyCode::Char('h') | KeyCode::Left => self.focus = PreviewSlot::Select,
            KeyCode::Char('l') | KeyCode::Right => self.focus = PreviewSlot::Radio,
            KeyCode::Enter | KeyCode::Char(' ') => self.choose(),
            KeyCode::Char('i') => {
                let (control, _) = self.focused_control();
                self.editing_other = control.is_other_selected();
            }
            KeyCode::Char('c') => self.clear(),
            KeyCode::Char(']') => self.switch_type(true),
            KeyCode::Char('[') => self.switch_type(false),
            KeyCode::Char('o') => {
                self.include_other = !self.include_other;
                self.remount(true);
            }
            KeyCode::Char('!') => {
                self.required = !self.required;
                self.remount(true);
            }
            KeyCode::Char('v') => {
                self.layout = match self.layout {
                    RadioLayout::Vertical => RadioLayout::Horizontal,
                    RadioLayout::Horizontal => RadioLayout::Vertical,
                };
                self.remount(true);
            }
            KeyCode::Char('r') => {
                self.select.refresh();
                self.radio.refresh();
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::TypesLoaded(Ok(types)) => {
                self.merge_type_names(types.iter().map(|t| t.name.as_str()));
            }
            Action::PreviewUpdated { snapshot, .. } => {
                let len = self.select.view().options.len();
                self.select_cursor = self.select_cursor.min(len.saturating_sub(1));
                let len = self.radio.view().options.len();
                self.radio_cursor = self.radio_cursor.min(len.saturating_sub(1));

                if snapshot.is_degraded() && !self.warned {
                    self.warned = true;
                    return Ok(Some(Action::Notify(Notification::warning(
                        "Catalogue service unavailable; showing built-in fallback options",
                    ))));
                }
            }
            Action::Tick => {
                if self.select.snapshot().is_loading() || self.radio.snapshot().is_loading() {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(u16::try_from(EVENT_LOG_LEN).unwrap_or(6) + 2),
            Constraint::Length(1),
        ])
        .split(area);

        frame.render_widget(
            Paragraph::new(render_sub_tabs(&self.type_names, self.type_index)),
            layout[0],
        );

        let flag = |on: bool| if on { "on" } else { "off" };
        let status = Line::from(vec![
            Span::styled("  value: ", theme::key_hint()),
            Span::styled(format!("{:?}", self.select.value()), theme::table_row()),
            Span::styled(" / ", theme::key_hint()),
            Span::styled(format!("{:?}", self.radio.value()), theme::table_row()),
            Span::styled("   other: ", theme::key_hint()),
            Span::styled(flag(self.include_other), theme::table_row()),
            Span::styled("   required: ", theme::key_hint()),
            Span::styled(flag(self.required), theme::table_row()),
        ]);
        frame.render_widget(Paragraph::new(status), layout[1]);

        let columns =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(layout[2]);
        self.render_control(frame, columns[0], PreviewSlot::Select);
        self.render_control(frame, columns[1], PreviewSlot::Radio);

        self.render_events(frame, layout[3]);

        let hints: &[(&str, &str)] = if self.editing_other {
            &[("type", "other text"), ("Enter", "done")]
        } else {
            &[
                ("[/]", "type"),
                ("h/l", "control"),
                ("Enter", "choose"),
                ("c", "clear"),
                ("o", "other"),
                ("!", "required"),
                ("v", "layout"),
                ("r", "refresh"),
            ]
        };
        frame.render_widget(Paragraph::new(render_hints(hints)), layout[4]);
    }

    fn captures_input(&self) -> bool {
        self.editing_other
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Preview"
    }
}

impl<S: CatalogueSource> Drop for PreviewScreen<S> {
    fn drop(&mut self) {
        self.bridge_cancel.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;
    use crate::testing::MemorySource;

    type Screen = PreviewScreen<MemorySource>;

    fn press(screen: &mut Screen, code: KeyCode) {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    async fn settled(screen: &Screen) {
        screen.select.subscribe().settled().await.unwrap();
        screen.radio.subscribe().settled().await.unwrap();
    }

    fn labels(view: &ChoiceView) -> Vec<&str> {
        view.options.iter().map(|o| o.label.as_str()).collect()
    }

    fn urgency() -> MemorySource {
        MemorySource::default().with_type("urgency_levels", &["low", "medium", "high", "critical"])
    }

    #[tokio::test]
    async fn both_controls_list_points_in_order_without_other() {
        let screen = PreviewScreen::new(Catalogue::new(urgency()), "urgency_levels");
        settled(&screen).await;

        let select = screen.select.view();
        assert_eq!(
            labels(&select),
            ["Select an option", "low", "medium", "high", "critical"]
        );
        assert!(select.options.iter().all(|o| !o.is_other()));
        assert_eq!(labels(&screen.radio.view()), ["low", "medium", "high", "critical"]);
    }

    #[tokio::test]
    async fn other_text_emits_an_event_per_keystroke() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = PreviewScreen::new(Catalogue::new(urgency()), "urgency_levels");
        screen.init(tx).unwrap();
        press(&mut screen, KeyCode::Char('o'));
        settled(&screen).await;

        press(&mut screen, KeyCode::Char('G'));
        press(&mut screen, KeyCode::Enter);
        assert!(screen.captures_input());
        press(&mut screen, KeyCode::Char('a'));
        press(&mut screen, KeyCode::Char('b'));
        press(&mut screen, KeyCode::Enter);

        assert_eq!(screen.select.value(), "other");
        assert_eq!(screen.select.other_value(), "ab");
        assert_eq!(
            screen.events,
            [
                "select: ValueChanged(\"other\")",
                "select: OtherValueChanged(\"a\")",
                "select: OtherValueChanged(\"ab\")",
            ]
        );
        assert!(!screen.captures_input());
    }

    #[tokio::test]
    async fn degraded_snapshot_warns_once_per_mount() {
        let mut screen = PreviewScreen::new(Catalogue::new(MemorySource::offline()), "risk_levels");
        settled(&screen).await;
        let snapshot = screen.select.snapshot();
        assert!(snapshot.is_degraded());
        assert_eq!(
            snapshot.data.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            fallback::get("risk_levels")
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
        );

        let action = Action::PreviewUpdated {
            slot: PreviewSlot::Select,
            snapshot,
        };
        assert!(matches!(
            screen.update(&action).unwrap(),
            Some(Action::Notify(ref n)) if n.message.contains("fallback")
        ));
        assert!(screen.update(&action).unwrap().is_none());
    }

    #[tokio::test]
    async fn switching_type_resets_values() {
        let source = urgency().with_type("contact_methods", &["phone", "email"]);
        let mut screen = PreviewScreen::new(Catalogue::new(source), "urgency_levels");
        settled(&screen).await;
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Enter);
        assert_eq!(screen.select.value(), "low");

        screen.merge_type_names(std::iter::once("contact_methods"));
        let target = screen
            .type_names
            .iter()
            .position(|n| n == "contact_methods")
            .unwrap();
        while screen.type_index != target {
            press(&mut screen, KeyCode::Char(']'));
        }
        settled(&screen).await;

        assert_eq!(screen.select.value(), "");
        assert!(screen.events.is_empty());
        assert_eq!(
            labels(&screen.radio.view()),
            ["phone", "email"]
        );
    }
}
