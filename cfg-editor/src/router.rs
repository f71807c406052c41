//! Delegated event routing
//!
//! One double-click and one click listener live on the table container.
//! The DOM layer describes the event target as a [`TargetKind`] and looks up
//! the enclosing widget; everything after that is decided here.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use shared_types::ButtonAction;
use tracing::{debug, warn};

use crate::controller::{SaveOutcome, SharedWidget, WidgetController};
use crate::widget::{BeginEdit, CancelOutcome, Widget, WidgetId};

/// What the raw event target is, as far as routing cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// A textarea, by position within its widget
    TextSurface { index: usize },
    /// A button with its raw `data-act` value
    ActionButton { action: Option<String> },
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DblClickRoute {
    Ignore,
    /// Surface is already writable; native word selection proceeds
    PassThrough,
    BeginEdit { surface: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickRoute {
    Ignore,
    Dispatch(ButtonAction),
    UnknownAction(Option<String>),
}

pub fn route_dblclick(target: &TargetKind, widget: Option<&Widget>) -> DblClickRoute {
    let TargetKind::TextSurface { index } = *target else {
        return DblClickRoute::Ignore;
    };
    let Some(widget) = widget else {
        return DblClickRoute::Ignore;
    };
    if widget.is_surface_writable(index) {
        return DblClickRoute::PassThrough;
    }
    DblClickRoute::BeginEdit { surface: index }
}

pub fn route_click(target: &TargetKind) -> ClickRoute {
    match target {
        TargetKind::ActionButton { action } => {
            match action.as_deref().and_then(ButtonAction::parse) {
                Some(action) => ClickRoute::Dispatch(action),
                None => ClickRoute::UnknownAction(action.clone()),
            }
        }
        _ => ClickRoute::Ignore,
    }
}

/// Outcome of a double-click, telling the DOM layer what to do with the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DblClickOutcome {
    Ignored,
    PassedThrough,
    /// The double-click was used for mode switching; suppress default
    /// handling and other listeners.
    Consumed(BeginEdit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored,
    Saved(SaveOutcome),
    Cancelled(CancelOutcome),
    UnknownAction,
}

/// Widgets seen so far on this page, keyed by `data-widget-id`
///
/// At most one entry per widget element; the table is rendered once by the server.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: RefCell<HashMap<WidgetId, SharedWidget>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing state for `id`, or a fresh widget built by `hydrate`.
    pub fn resolve(&self, id: &WidgetId, hydrate: impl FnOnce() -> Widget) -> SharedWidget {
        self.widgets
            .borrow_mut()
            .entry(id.clone())
            .or_insert_with(|| Rc::new(RefCell::new(hydrate())))
            .clone()
    }
}

pub struct EventRouter {
    registry: WidgetRegistry,
    controller: WidgetController,
}

impl EventRouter {
    pub fn new(controller: WidgetController) -> Self {
        Self {
            registry: WidgetRegistry::new(),
            controller,
        }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn dblclick(&self, target: &TargetKind, widget: Option<&SharedWidget>) -> DblClickOutcome {
        let route = {
            let borrowed = widget.map(|w| w.borrow());
            route_dblclick(target, borrowed.as_deref())
        };

        match (route, widget) {
            (DblClickRoute::BeginEdit { surface }, Some(widget)) => {
                DblClickOutcome::Consumed(self.controller.begin_edit(widget, surface))
            }
            (DblClickRoute::PassThrough, _) => DblClickOutcome::PassedThrough,
            _ => DblClickOutcome::Ignored,
        }
    }

    pub async fn click(&self, target: &TargetKind, widget: Option<&SharedWidget>) -> ClickOutcome {
        let action = match route_click(target) {
            ClickRoute::Ignore => return ClickOutcome::Ignored,
            ClickRoute::UnknownAction(action) => {
                warn!(action = ?action, "Unknown button action");
                return ClickOutcome::UnknownAction;
            }
            ClickRoute::Dispatch(action) => action,
        };

        let Some(widget) = widget else {
            debug!(action = action.as_str(), "button outside any config widget");
            return ClickOutcome::Ignored;
        };

        match action {
            ButtonAction::Save => ClickOutcome::Saved(self.controller.save(widget).await),
            ButtonAction::Cancel => ClickOutcome::Cancelled(self.controller.cancel(widget)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::executor::block_on;

    use super::*;
    use crate::controller::testing::{RecordingNotifier, ScriptedClient};
    use crate::persistence::{Ack, SaveFailure};
    use crate::widget::{EditState, TextSurface};

    fn router_with(
        results: Vec<Result<Ack, SaveFailure>>,
    ) -> (EventRouter, Rc<ScriptedClient>, Rc<RecordingNotifier>) {
        let client = Rc::new(ScriptedClient::with_results(results));
        let notifier = Rc::new(RecordingNotifier::default());
        let router = EventRouter::new(WidgetController::new(client.clone(), notifier.clone()));
        (router, client, notifier)
    }

    fn shared(file_name: Option<&str>, value: &str) -> SharedWidget {
        Rc::new(RefCell::new(Widget::new(
            WidgetId::new(),
            vec![TextSurface::new(file_name.map(str::to_string), value)],
        )))
    }

    fn button(action: &str) -> TargetKind {
        TargetKind::ActionButton {
            action: Some(action.to_string()),
        }
    }

    const SURFACE: TargetKind = TargetKind::TextSurface { index: 0 };

    #[test]
    fn dblclick_on_other_targets_is_ignored() {
        let (router, _, _) = router_with(vec![]);
        let widget = shared(Some("a.conf"), "x=1");

        assert_eq!(router.dblclick(&TargetKind::Other, Some(&widget)), DblClickOutcome::Ignored);
        assert_eq!(router.dblclick(&button("save"), Some(&widget)), DblClickOutcome::Ignored);
        assert_eq!(router.dblclick(&SURFACE, None), DblClickOutcome::Ignored);
        assert_eq!(widget.borrow().state(), EditState::ReadOnly);
    }

    #[test]
    fn dblclick_enters_edit_then_passes_through() {
        let (router, _, _) = router_with(vec![]);
        let widget = shared(Some("a.conf"), "x=1");

        assert_eq!(
            router.dblclick(&SURFACE, Some(&widget)),
            DblClickOutcome::Consumed(BeginEdit::Entered)
        );
        assert_eq!(
            router.dblclick(&SURFACE, Some(&widget)),
            DblClickOutcome::PassedThrough
        );
        assert_eq!(
            widget.borrow().surface(0).and_then(TextSurface::pre_edit),
            Some("x=1")
        );
    }

    #[test]
    fn dblclick_without_file_name_is_consumed_but_changes_nothing() {
        let (router, _, _) = router_with(vec![]);
        let widget = shared(None, "x=1");

        assert_eq!(
            router.dblclick(&SURFACE, Some(&widget)),
            DblClickOutcome::Consumed(BeginEdit::NotEditable)
        );
        let w = widget.borrow();
        assert_eq!(w.state(), EditState::ReadOnly);
        assert!(w.affordances().surfaces[0].readonly);
    }

    #[test]
    fn click_routes_declared_actions() {
        assert_eq!(route_click(&button("save")), ClickRoute::Dispatch(ButtonAction::Save));
        assert_eq!(
            route_click(&button("cancel")),
            ClickRoute::Dispatch(ButtonAction::Cancel)
        );
        assert_eq!(route_click(&SURFACE), ClickRoute::Ignore);
        assert_eq!(
            route_click(&TargetKind::ActionButton { action: None }),
            ClickRoute::UnknownAction(None)
        );
    }

    #[test]
    fn unknown_action_changes_nothing_and_alerts_nothing() {
        let (router, client, notifier) = router_with(vec![]);
        let widget = shared(Some("a.conf"), "x=1");
        router.dblclick(&SURFACE, Some(&widget));

        let outcome = block_on(router.click(&button("delete"), Some(&widget)));

        assert_eq!(outcome, ClickOutcome::UnknownAction);
        assert!(widget.borrow().is_editing());
        assert!(client.requests.borrow().is_empty());
        assert!(notifier.alerts.borrow().is_empty());
    }

    #[test]
    fn save_click_persists_and_locks_widget() {
        let (router, client, _) = router_with(vec![Ok(Ack)]);
        let widget = shared(Some("a.conf"), "x=1");
        router.dblclick(&SURFACE, Some(&widget));
        widget.borrow_mut().sync_values(vec!["x=2".to_string()]);

        let outcome = block_on(router.click(&button("save"), Some(&widget)));

        assert_eq!(outcome, ClickOutcome::Saved(SaveOutcome::Saved { requests: 1 }));
        assert_eq!(client.requests.borrow()[0].after_edit, "x=2");
        assert_eq!(client.requests.borrow()[0].pre_edit, "x=1");
        assert!(widget.borrow().affordances().buttons_disabled);
    }

    #[test]
    fn cancel_click_reverts() {
        let (router, client, _) = router_with(vec![]);
        let widget = shared(Some("a.conf"), "x=1");
        router.dblclick(&SURFACE, Some(&widget));
        widget.borrow_mut().sync_values(vec!["y=9".to_string()]);

        let outcome = block_on(router.click(&button("cancel"), Some(&widget)));

        assert_eq!(outcome, ClickOutcome::Cancelled(CancelOutcome::Reverted));
        assert_eq!(widget.borrow().surface(0).map(TextSurface::value), Some("x=1"));
        assert!(client.requests.borrow().is_empty());
    }

    #[test]
    fn registry_hydrates_once_per_id() {
        let registry = WidgetRegistry::new();
        let id = WidgetId::new();

        let first = registry.resolve(&id, || {
            Widget::new(id.clone(), vec![TextSurface::new(Some("a.conf".into()), "x=1")])
        });
        first.borrow_mut().begin_edit(0);
        let second = registry.resolve(&id, || unreachable!("already hydrated"));

        assert!(Rc::ptr_eq(&first, &second));
        assert!(second.borrow().is_editing());
    }
}
