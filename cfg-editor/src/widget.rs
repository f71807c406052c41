//! Edit-session state for one config file widget
//!
//! A widget is one `div.ConfigFileEdit` fragment: one or more text surfaces
//! plus the Save/Cancel buttons. All UI flags (read-only, disabled, the
//! `data-pre-edit` attribute) are derived from this record via
//! [`Widget::affordances`] and never stored separately.

use shared_types::SaveConfigRequest;

/// Identifier stamped on the enclosing widget element (`data-widget-id`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetId(pub String);

impl WidgetId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    ReadOnly,
    Editing,
}

/// One textarea inside a widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSurface {
    file_name: Option<String>,
    value: String,
    pre_edit: Option<String>,
}

impl TextSurface {
    /// An empty file name is treated the same as a missing one.
    pub fn new(file_name: Option<String>, value: impl Into<String>) -> Self {
        Self {
            file_name: file_name.filter(|name| !name.is_empty()),
            value: value.into(),
            pre_edit: None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn pre_edit(&self) -> Option<&str> {
        self.pre_edit.as_deref()
    }

    pub fn has_file(&self) -> bool {
        self.file_name.is_some()
    }
}

/// Result of a `beginEdit` attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginEdit {
    Entered,
    AlreadyEditing,
    NotEditable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Reverted,
    NotEditing,
    SaveInFlight,
}

/// Why a save could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRejected {
    NotEditing,
    InFlight,
}

/// A request planned by [`Widget::begin_save`], tagged with its surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub surface: usize,
    pub request: SaveConfigRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceView {
    pub readonly: bool,
    pub value: String,
    pub pre_edit: Option<String>,
}

/// UI projection of a widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordances {
    pub surfaces: Vec<SurfaceView>,
    pub buttons_disabled: bool,
}

#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    surfaces: Vec<TextSurface>,
    state: EditState,
    save_in_flight: bool,
}

impl Widget {
    pub fn new(id: WidgetId, surfaces: Vec<TextSurface>) -> Self {
        Self {
            id,
            surfaces,
            state: EditState::ReadOnly,
            save_in_flight: false,
        }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == EditState::Editing
    }

    pub fn save_in_flight(&self) -> bool {
        self.save_in_flight
    }

    pub fn surfaces(&self) -> &[TextSurface] {
        &self.surfaces
    }

    pub fn surface(&self, index: usize) -> Option<&TextSurface> {
        self.surfaces.get(index)
    }

    /// Whether the user may type into the surface right now.
    ///
    /// Nothing is writable while a save is pending; the planned requests
    /// already captured the values.
    pub fn is_surface_writable(&self, index: usize) -> bool {
        self.is_editing()
            && !self.save_in_flight
            && self.surface(index).is_some_and(TextSurface::has_file)
    }

    /// Enter edit mode from a double-click on `surface`.
    ///
    /// Every surface of the widget is snapshotted so cancel can restore all
    /// of them. A repeated call while editing keeps the first snapshot.
    pub fn begin_edit(&mut self, surface: usize) -> BeginEdit {
        if self.is_editing() {
            return BeginEdit::AlreadyEditing;
        }
        if !self.surface(surface).is_some_and(TextSurface::has_file) {
            return BeginEdit::NotEditable;
        }

        for s in &mut self.surfaces {
            s.pre_edit = Some(s.value.clone());
        }
        self.state = EditState::Editing;
        BeginEdit::Entered
    }

    /// Record what the user typed. Ignored unless the surface is writable.
    #[cfg(test)]
    pub fn set_value(&mut self, surface: usize, value: impl Into<String>) -> bool {
        if !self.is_surface_writable(surface) {
            return false;
        }
        match self.surfaces.get_mut(surface) {
            Some(s) => {
                s.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Pull live values from the page.
    ///
    /// While a save is pending the planned requests are authoritative, so
    /// live values are not taken.
    pub fn sync_values<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        if self.save_in_flight {
            return;
        }
        for (surface, value) in self.surfaces.iter_mut().zip(values) {
            surface.value = value;
        }
    }

    pub fn cancel(&mut self) -> CancelOutcome {
        if !self.is_editing() {
            return CancelOutcome::NotEditing;
        }
        if self.save_in_flight {
            return CancelOutcome::SaveInFlight;
        }

        for s in &mut self.surfaces {
            if let Some(snapshot) = s.pre_edit.take() {
                s.value = snapshot;
            }
        }
        self.state = EditState::ReadOnly;
        CancelOutcome::Reverted
    }

    /// Plan the save requests and mark the save as in flight.
    ///
    /// Surfaces without a file name are skipped. Requests are returned in
    /// surface order and must be submitted one after another.
    pub fn begin_save(&mut self) -> Result<Vec<PendingSave>, SaveRejected> {
        if !self.is_editing() {
            return Err(SaveRejected::NotEditing);
        }
        if self.save_in_flight {
            return Err(SaveRejected::InFlight);
        }

        let pending = self
            .surfaces
            .iter()
            .enumerate()
            .filter_map(|(index, s)| {
                let file_name = s.file_name.clone()?;
                Some(PendingSave {
                    surface: index,
                    request: SaveConfigRequest {
                        file_name,
                        after_edit: s.value.clone(),
                        pre_edit: s.pre_edit.clone().unwrap_or_else(|| s.value.clone()),
                    },
                })
            })
            .collect();

        self.save_in_flight = true;
        Ok(pending)
    }

    /// One surface was persisted; its baseline is now the persisted content.
    pub fn record_saved(&mut self, surface: usize, persisted: &str) {
        if let Some(s) = self.surfaces.get_mut(surface) {
            if s.pre_edit.is_some() {
                s.pre_edit = Some(persisted.to_string());
            }
        }
    }

    /// Close the save started by [`Widget::begin_save`].
    pub fn finish_save(&mut self, all_saved: bool) {
        self.save_in_flight = false;
        if all_saved {
            for s in &mut self.surfaces {
                s.pre_edit = None;
            }
            self.state = EditState::ReadOnly;
        }
    }

    pub fn affordances(&self) -> Affordances {
        Affordances {
            surfaces: self
                .surfaces
                .iter()
                .enumerate()
                .map(|(index, s)| SurfaceView {
                    readonly: !self.is_surface_writable(index),
                    value: s.value.clone(),
                    pre_edit: s.pre_edit.clone(),
                })
                .collect(),
            buttons_disabled: !self.is_editing() || self.save_in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conf_widget(value: &str) -> Widget {
        Widget::new(
            WidgetId::new(),
            vec![TextSurface::new(Some("a.conf".to_string()), value)],
        )
    }

    #[test]
    fn widget_without_file_name_never_enters_edit() {
        let mut widget = Widget::new(WidgetId::new(), vec![TextSurface::new(None, "x=1")]);

        assert_eq!(widget.begin_edit(0), BeginEdit::NotEditable);
        assert_eq!(widget.state(), EditState::ReadOnly);
        assert!(widget.affordances().surfaces[0].readonly);
        assert!(widget.affordances().buttons_disabled);
        assert_eq!(widget.surface(0).and_then(TextSurface::pre_edit), None);
    }

    #[test]
    fn empty_file_name_counts_as_missing() {
        let mut widget = Widget::new(
            WidgetId::new(),
            vec![TextSurface::new(Some(String::new()), "x=1")],
        );
        assert_eq!(widget.begin_edit(0), BeginEdit::NotEditable);
    }

    #[test]
    fn begin_edit_snapshots_and_enables_buttons() {
        let mut widget = conf_widget("x=1");

        assert_eq!(widget.begin_edit(0), BeginEdit::Entered);
        let view = widget.affordances();
        assert!(!view.buttons_disabled);
        assert!(!view.surfaces[0].readonly);
        assert_eq!(view.surfaces[0].pre_edit.as_deref(), Some("x=1"));
    }

    #[test]
    fn repeated_begin_edit_keeps_first_snapshot() {
        let mut widget = conf_widget("x=1");
        widget.begin_edit(0);
        assert!(widget.set_value(0, "x=2"));

        assert_eq!(widget.begin_edit(0), BeginEdit::AlreadyEditing);
        assert_eq!(widget.surface(0).and_then(TextSurface::pre_edit), Some("x=1"));
    }

    #[test]
    fn cancel_restores_snapshot_after_many_edits() {
        let mut widget = conf_widget("x=1");
        widget.begin_edit(0);
        widget.set_value(0, "x=2");
        widget.set_value(0, "y=9");

        assert_eq!(widget.cancel(), CancelOutcome::Reverted);
        assert_eq!(widget.surface(0).map(TextSurface::value), Some("x=1"));
        assert_eq!(widget.state(), EditState::ReadOnly);
        assert!(widget.affordances().buttons_disabled);
        assert_eq!(widget.affordances().surfaces[0].pre_edit, None);
    }

    #[test]
    fn cancel_outside_edit_is_noop() {
        let mut widget = conf_widget("x=1");
        assert_eq!(widget.cancel(), CancelOutcome::NotEditing);
    }

    #[test]
    fn set_value_rejected_while_read_only() {
        let mut widget = conf_widget("x=1");
        assert!(!widget.set_value(0, "x=2"));
        assert_eq!(widget.surface(0).map(TextSurface::value), Some("x=1"));
    }

    #[test]
    fn begin_save_plans_one_request_per_named_surface() {
        let mut widget = Widget::new(
            WidgetId::new(),
            vec![
                TextSurface::new(Some("a.yaml".to_string()), "a: 1"),
                TextSurface::new(None, "notes"),
                TextSurface::new(Some("b.yaml".to_string()), "b: 1"),
            ],
        );
        widget.begin_edit(0);
        widget.set_value(0, "a: 2");

        let pending = widget.begin_save().unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].surface, 0);
        assert_eq!(pending[0].request.after_edit, "a: 2");
        assert_eq!(pending[0].request.pre_edit, "a: 1");
        assert_eq!(pending[1].surface, 2);
        assert_eq!(pending[1].request.file_name, "b.yaml");
        assert!(widget.save_in_flight());
    }

    #[test]
    fn second_save_rejected_while_in_flight() {
        let mut widget = conf_widget("x=1");
        widget.begin_edit(0);
        widget.begin_save().unwrap();

        assert_eq!(widget.begin_save(), Err(SaveRejected::InFlight));
        assert_eq!(widget.cancel(), CancelOutcome::SaveInFlight);
    }

    #[test]
    fn save_rejected_when_not_editing() {
        let mut widget = conf_widget("x=1");
        assert_eq!(widget.begin_save(), Err(SaveRejected::NotEditing));
        assert!(!widget.save_in_flight());
    }

    #[test]
    fn failed_save_keeps_editing() {
        let mut widget = conf_widget("x=1");
        widget.begin_edit(0);
        widget.begin_save().unwrap();
        widget.finish_save(false);

        assert!(widget.is_editing());
        assert!(!widget.save_in_flight());
        assert!(!widget.affordances().buttons_disabled);
    }

    #[test]
    fn partial_save_advances_baseline_of_saved_surface() {
        let mut widget = Widget::new(
            WidgetId::new(),
            vec![
                TextSurface::new(Some("a.yaml".to_string()), "a: 1"),
                TextSurface::new(Some("b.yaml".to_string()), "b: 1"),
            ],
        );
        widget.begin_edit(0);
        widget.set_value(0, "a: 2");
        widget.set_value(1, "b: 2");
        widget.begin_save().unwrap();
        widget.record_saved(0, "a: 2");
        widget.finish_save(false);

        assert!(widget.is_editing());
        assert_eq!(widget.surface(0).and_then(TextSurface::pre_edit), Some("a: 2"));
        assert_eq!(widget.surface(1).and_then(TextSurface::pre_edit), Some("b: 1"));

        widget.cancel();
        assert_eq!(widget.surface(0).map(TextSurface::value), Some("a: 2"));
        assert_eq!(widget.surface(1).map(TextSurface::value), Some("b: 1"));
    }

    #[test]
    fn pending_save_locks_surfaces_and_buttons() {
        let mut widget = conf_widget("x=1");
        widget.begin_edit(0);
        widget.sync_values(vec!["x=2".to_string()]);
        widget.begin_save().unwrap();

        let view = widget.affordances();
        assert!(view.surfaces[0].readonly);
        assert!(view.buttons_disabled);
        assert!(!widget.is_surface_writable(0));

        widget.finish_save(false);

        let view = widget.affordances();
        assert!(!view.surfaces[0].readonly);
        assert!(!view.buttons_disabled);
        assert_eq!(view.surfaces[0].value, "x=2");
    }

    #[test]
    fn sync_values_ignored_during_save() {
        let mut widget = conf_widget("x=1");
        widget.begin_edit(0);
        widget.sync_values(vec!["x=2".to_string()]);
        widget.begin_save().unwrap();
        widget.sync_values(vec!["x=3".to_string()]);

        assert_eq!(widget.surface(0).map(TextSurface::value), Some("x=2"));
    }
}
