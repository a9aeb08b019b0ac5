// ── Choice controls ──
//
// Renderer-agnostic state for the two catalogue-driven form controls:
// a single-select list and a radio group. Both read their options from
// their own `Retrieval`, never call the catalogue directly, and report
// user input as `ChoiceEvent`s.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::retrieval::{Phase, Retrieval, RetrievalSnapshot, RetrievalStream};
use crate::source::CatalogueSource;

/// Value of the "Other" escape-hatch option.
pub const OTHER_VALUE: &str = "other";
pub const OTHER_LABEL: &str = "Other";
pub const OTHER_INPUT_PLACEHOLDER: &str = "Please specify...";
pub const DEFAULT_PLACEHOLDER: &str = "Select an option";
pub const SELECT_LOADING_TEXT: &str = "Loading...";
pub const RADIO_LOADING_TEXT: &str = "Loading options...";

// ── Props ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RadioLayout {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceVariant {
    Select,
    Radio { layout: RadioLayout },
}

/// Inputs of a choice control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceProps {
    pub data_type: String,
    pub variant: ChoiceVariant,
    pub required: bool,
    /// Append an "Other" option that reveals a free-text input.
    pub include_other: bool,
    /// Label of the empty leading option (select variant only).
    pub placeholder: String,
    /// Render the retrieval error, if any, below the control.
    pub show_error: bool,
    pub disabled: bool,
}

impl ChoiceProps {
    pub fn select(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            variant: ChoiceVariant::Select,
            required: false,
            include_other: false,
            placeholder: DEFAULT_PLACEHOLDER.into(),
            show_error: false,
            disabled: false,
        }
    }

    pub fn radio(data_type: impl Into<String>, layout: RadioLayout) -> Self {
        Self {
            variant: ChoiceVariant::Radio { layout },
            ..Self::select(data_type)
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn include_other(mut self, include_other: bool) -> Self {
        self.include_other = include_other;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn show_error(mut self, show_error: bool) -> Self {
        self.show_error = show_error;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

// ── View ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl ChoiceOption {
    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }

    pub fn is_other(&self) -> bool {
        self.value == OTHER_VALUE
    }
}

/// Everything a renderer needs to draw the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub variant: ChoiceVariant,
    pub disabled: bool,
    /// Shown instead of the options while the first fetch is in flight.
    pub loading_text: Option<&'static str>,
    pub options: Vec<ChoiceOption>,
    pub required: bool,
    pub show_other_input: bool,
    pub other_value: String,
    pub other_placeholder: &'static str,
    pub other_required: bool,
    pub error: Option<String>,
    pub degraded: bool,
}

impl ChoiceView {
    pub fn selected_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.selected)
    }
}

// ── Events ──────────────────────────────────────────────────────────

/// Change notifications emitted in response to user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceEvent {
    ValueChanged(String),
    OtherValueChanged(String),
}

// ── Control ─────────────────────────────────────────────────────────

pub struct ChoiceControl<S: CatalogueSource> {
    props: ChoiceProps,
    retrieval: Retrieval<S>,
    value: String,
    other_value: String,
}

impl<S: CatalogueSource> ChoiceControl<S> {
    /// Mount the control, starting its own retrieval.
    pub fn new(source: Arc<S>, props: ChoiceProps) -> Self {
        let retrieval = Retrieval::mount(source, props.data_type.clone());
        Self {
            props,
            retrieval,
            value: String::new(),
            other_value: String::new(),
        }
    }

    /// Start from an existing value, e.g. when editing a saved form.
    pub fn with_value(mut self, value: impl Into<String>, other_value: impl Into<String>) -> Self {
        self.value = value.into();
        self.other_value = other_value.into();
        self
    }

    pub fn props(&self) -> &ChoiceProps {
        &self.props
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn other_value(&self) -> &str {
        &self.other_value
    }

    pub fn is_other_selected(&self) -> bool {
        self.props.include_other && self.value == OTHER_VALUE
    }

    /// Point the control at another data type. The current value is kept,
    /// as a controlled input keeps whatever its owner passes in.
    pub fn set_data_type(&mut self, data_type: impl Into<String>) {
        self.props.data_type = data_type.into();
        self.retrieval.set_data_type(self.props.data_type.clone());
    }

    pub fn refresh(&self) {
        self.retrieval.refresh();
    }

    pub fn snapshot(&self) -> RetrievalSnapshot {
        self.retrieval.snapshot()
    }

    pub fn subscribe(&self) -> RetrievalStream {
        self.retrieval.subscribe()
    }

    pub fn view(&self) -> ChoiceView {
        self.view_of(&self.retrieval.snapshot())
    }

    /// Build the view for a given retrieval snapshot.
    pub fn view_of(&self, snap: &RetrievalSnapshot) -> ChoiceView {
        let loading = matches!(snap.phase, Phase::Loading | Phase::Idle);
        let is_select = self.props.variant == ChoiceVariant::Select;

        let mut options = Vec::new();
        if !loading {
            if is_select {
                options.push(ChoiceOption {
                    value: String::new(),
                    label: self.props.placeholder.clone(),
                    selected: self.value.is_empty(),
                });
            }
            options.extend(snap.data.iter().map(|p| ChoiceOption {
                value: p.name.clone(),
                label: p.label().to_owned(),
                selected: self.value == p.name,
            }));
            if self.props.include_other {
                options.push(ChoiceOption {
                    value: OTHER_VALUE.into(),
                    label: OTHER_LABEL.into(),
                    selected: self.value == OTHER_VALUE,
                });
            }
        }

        let show_other_input = self.is_other_selected();

        ChoiceView {
            variant: self.props.variant,
            disabled: self.props.disabled || loading,
            loading_text: loading.then_some(if is_select {
                SELECT_LOADING_TEXT
            } else {
                RADIO_LOADING_TEXT
            }),
            options,
            required: self.props.required,
            show_other_input,
            other_value: self.other_value.clone(),
            other_placeholder: OTHER_INPUT_PLACEHOLDER,
            other_required: self.props.required && show_other_input,
            error: if self.props.show_error {
                snap.error.clone()
            } else {
                None
            },
            degraded: snap.is_degraded(),
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Select a value. "No selection" is the empty string; anything else
    /// must be one of the listed options. Returns an event only when the
    /// value actually changes.
    pub fn select(&mut self, value: impl Into<String>) -> Option<ChoiceEvent> {
        if self.props.disabled || !self.retrieval.snapshot().is_settled() {
            return None;
        }
        let value = value.into();
        if value == self.value {
            return None;
        }
        if !value.is_empty() && !self.view().options.iter().any(|o| o.value == value) {
            return None;
        }
        self.value.clone_from(&value);
        Some(ChoiceEvent::ValueChanged(value))
    }

    /// Select the option at `index` of the current view.
    pub fn select_index(&mut self, index: usize) -> Option<ChoiceEvent> {
        let value = self.view().options.get(index)?.value.clone();
        self.select(value)
    }

    /// Clear the selection.
    pub fn clear(&mut self) -> Option<ChoiceEvent> {
        self.select(String::new())
    }

    /// Replace the free-text "Other" value. Ignored unless "Other" is
    /// selected; the selected value stays `other`.
    pub fn set_other_value(&mut self, text: impl Into<String>) -> Option<ChoiceEvent> {
        if !self.is_other_selected() {
            return None;
        }
        self.other_value = text.into();
        Some(ChoiceEvent::OtherValueChanged(self.other_value.clone()))
    }

    /// Append one keystroke to the "Other" text.
    pub fn push_other_char(&mut self, c: char) -> Option<ChoiceEvent> {
        let mut text = self.other_value.clone();
        text.push(c);
        self.set_other_value(text)
    }

    /// Remove the last character of the "Other" text.
    pub fn pop_other_char(&mut self) -> Option<ChoiceEvent> {
        let mut text = self.other_value.clone();
        text.pop()?;
        self.set_other_value(text)
    }

    /// Check required-ness: a selection, and some text when "Other" is
    /// chosen.
    pub fn validate(&self) -> Result<(), String> {
        if !self.props.required {
            return Ok(());
        }
        if self.value.is_empty() {
            return Err("Please select an option".into());
        }
        if self.is_other_selected() && self.other_value.trim().is_empty() {
            return Err("Please specify a value for Other".into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fallback;
    use crate::testing::StubSource;
    use pretty_assertions::assert_eq;

    async fn settled<S: CatalogueSource>(control: &ChoiceControl<S>) {
        control.subscribe().settled().await.unwrap();
    }

    fn labels(view: &ChoiceView) -> Vec<&str> {
        view.options.iter().map(|o| o.label.as_str()).collect()
    }

    #[tokio::test]
    async fn select_is_disabled_while_loading() {
        let source = StubSource::default().with_points("risk_levels", &["low"]);
        let mut control = ChoiceControl::new(Arc::new(source), ChoiceProps::select("risk_levels"));

        let view = control.view();
        assert!(view.disabled);
        assert_eq!(view.loading_text, Some(SELECT_LOADING_TEXT));
        assert!(view.options.is_empty());
        assert_eq!(control.select("low"), None);
    }

    #[tokio::test]
    async fn radio_loading_text() {
        let source = StubSource::default().with_points("risk_levels", &["low"]);
        let control = ChoiceControl::new(
            Arc::new(source),
            ChoiceProps::radio("risk_levels", RadioLayout::Horizontal),
        );
        assert_eq!(control.view().loading_text, Some(RADIO_LOADING_TEXT));
    }

    #[tokio::test]
    async fn select_has_placeholder_then_points() {
        let source = StubSource::default().with_points("risk_levels", &["low", "high"]);
        let control = ChoiceControl::new(Arc::new(source), ChoiceProps::select("risk_levels"));
        settled(&control).await;

        let view = control.view();
        assert!(!view.disabled);
        assert_eq!(labels(&view), ["Select an option", "Low", "High"]);
        assert!(view.options[0].is_placeholder());
        assert!(view.options[0].selected);
    }

    #[tokio::test]
    async fn radio_has_no_placeholder() {
        let source = StubSource::default().with_points("risk_levels", &["low", "high"]);
        let control = ChoiceControl::new(
            Arc::new(source),
            ChoiceProps::radio("risk_levels", RadioLayout::Vertical).include_other(true),
        );
        settled(&control).await;

        let view = control.view();
        assert_eq!(labels(&view), ["Low", "High", "Other"]);
        assert_eq!(view.selected_index(), None);
    }

    #[tokio::test]
    async fn other_input_tracks_keystrokes() {
        let source = StubSource::default().with_points("contact_methods", &["phone", "email"]);
        let mut control = ChoiceControl::new(
            Arc::new(source),
            ChoiceProps::select("contact_methods").include_other(true),
        );
        settled(&control).await;

        let other_index = control.view().options.iter().position(ChoiceOption::is_other).unwrap();
        assert_eq!(
            control.select_index(other_index),
            Some(ChoiceEvent::ValueChanged("other".into()))
        );
        assert!(control.view().show_other_input);

        let events: Vec<_> = "fax".chars().filter_map(|c| control.push_other_char(c)).collect();
        assert_eq!(
            events,
            vec![
                ChoiceEvent::OtherValueChanged("f".into()),
                ChoiceEvent::OtherValueChanged("fa".into()),
                ChoiceEvent::OtherValueChanged("fax".into()),
            ]
        );
        assert_eq!(control.value(), "other");
        assert_eq!(control.view().other_value, "fax");

        assert_eq!(
            control.pop_other_char(),
            Some(ChoiceEvent::OtherValueChanged("fa".into()))
        );
    }

    #[tokio::test]
    async fn other_text_ignored_without_other_selected() {
        let source = StubSource::default().with_points("contact_methods", &["phone"]);
        let mut control = ChoiceControl::new(
            Arc::new(source),
            ChoiceProps::select("contact_methods").include_other(true),
        );
        settled(&control).await;
        control.select("phone");
        assert_eq!(control.push_other_char('x'), None);
        assert!(!control.view().show_other_input);
    }

    #[tokio::test]
    async fn unlisted_values_are_rejected() {
        let source = StubSource::default().with_points("risk_levels", &["low"]);
        let mut control = ChoiceControl::new(Arc::new(source), ChoiceProps::select("risk_levels"));
        settled(&control).await;

        assert_eq!(control.select("other"), None);
        assert_eq!(control.select("bogus"), None);
        assert_eq!(control.value(), "");
        let view = control.view();
        assert!(!view.show_other_input);
        assert_eq!(view.selected_index(), Some(0));
        assert!(view.options[0].is_placeholder());

        assert_eq!(
            control.select("low"),
            Some(ChoiceEvent::ValueChanged("low".into()))
        );
    }

    #[tokio::test]
    async fn other_is_accepted_only_when_offered() {
        let source = StubSource::default().with_points("risk_levels", &["low"]);
        let mut control = ChoiceControl::new(
            Arc::new(source),
            ChoiceProps::radio("risk_levels", RadioLayout::Vertical).include_other(true),
        );
        settled(&control).await;

        assert_eq!(control.select("bogus"), None);
        assert_eq!(
            control.select("other"),
            Some(ChoiceEvent::ValueChanged("other".into()))
        );
        assert!(control.view().show_other_input);
    }

    #[tokio::test]
    async fn choosing_placeholder_emits_empty_value() {
        let source = StubSource::default().with_points("risk_levels", &["low"]);
        let mut control = ChoiceControl::new(Arc::new(source), ChoiceProps::select("risk_levels"))
            .with_value("low", "");
        settled(&control).await;

        assert_eq!(
            control.select_index(0),
            Some(ChoiceEvent::ValueChanged(String::new()))
        );
        assert_eq!(control.value(), "");
        assert_eq!(control.clear(), None);
    }

    #[tokio::test]
    async fn error_slot_is_identical_for_both_variants() {
        for props in [
            ChoiceProps::select("risk_levels").show_error(true),
            ChoiceProps::radio("risk_levels", RadioLayout::Vertical).show_error(true),
        ] {
            let source = StubSource::default().failing("risk_levels");
            let control = ChoiceControl::new(Arc::new(source), props);
            settled(&control).await;

            let view = control.view();
            assert!(view.degraded);
            assert_eq!(
                view.error.as_deref(),
                Some("Catalogue service is offline or unreachable")
            );
            let values: Vec<_> = view
                .options
                .iter()
                .filter(|o| !o.is_placeholder())
                .map(|o| o.value.clone())
                .collect();
            let expected: Vec<_> = fallback::get("risk_levels").into_iter().map(|p| p.name).collect();
            assert_eq!(values, expected);
        }
    }

    #[tokio::test]
    async fn error_hidden_by_default() {
        let source = StubSource::default().failing("risk_levels");
        let control = ChoiceControl::new(Arc::new(source), ChoiceProps::select("risk_levels"));
        settled(&control).await;
        assert_eq!(control.view().error, None);
    }

    #[tokio::test]
    async fn required_validation() {
        let source = StubSource::default().with_points("contact_methods", &["phone"]);
        let mut control = ChoiceControl::new(
            Arc::new(source),
            ChoiceProps::radio("contact_methods", RadioLayout::Vertical)
                .required(true)
                .include_other(true),
        );
        settled(&control).await;

        assert_eq!(control.validate(), Err("Please select an option".into()));
        control.select(OTHER_VALUE);
        assert!(control.view().other_required);
        assert_eq!(
            control.validate(),
            Err("Please specify a value for Other".into())
        );
        control.set_other_value("carrier pigeon");
        assert_eq!(control.validate(), Ok(()));
    }

    #[test]
    fn radio_layout_parses() {
        assert_eq!("HORIZONTAL".parse::<RadioLayout>().unwrap(), RadioLayout::Horizontal);
        assert_eq!(RadioLayout::default().to_string(), "vertical");
    }
}
