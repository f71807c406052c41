//! Widget transitions that need collaborators: persistence and user alerts.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, info};

use crate::persistence::{PersistenceClient, SaveFailure};
use crate::widget::{BeginEdit, CancelOutcome, PendingSave, SaveRejected, Widget};

pub type SharedWidget = Rc<RefCell<Widget>>;

/// User-facing side of a widget transition
pub trait Notifier {
    /// Blocking notification (`window.alert` in the browser)
    fn alert(&self, message: &str);

    /// The widget is locked for a pending save; show it before the request goes out.
    fn save_started(&self, _widget: &Widget) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { requests: usize },
    Failed(SaveFailure),
    Rejected(SaveRejected),
}

pub struct WidgetController {
    client: Rc<dyn PersistenceClient>,
    notifier: Rc<dyn Notifier>,
}

impl WidgetController {
    pub fn new(client: Rc<dyn PersistenceClient>, notifier: Rc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    pub fn begin_edit(&self, widget: &SharedWidget, surface: usize) -> BeginEdit {
        let mut w = widget.borrow_mut();
        let result = w.begin_edit(surface);
        match result {
            BeginEdit::Entered => debug!(widget = %w.id().as_str(), surface, "edit started"),
            BeginEdit::NotEditable => {
                debug!(widget = %w.id().as_str(), surface, "surface has no file name")
            }
            BeginEdit::AlreadyEditing => {}
        }
        result
    }

    pub fn cancel(&self, widget: &SharedWidget) -> CancelOutcome {
        let mut w = widget.borrow_mut();
        let result = w.cancel();
        debug!(widget = %w.id().as_str(), ?result, "cancel");
        result
    }

    /// Submit every surface of the widget, one request at a time.
    ///
    /// The first failure stops the loop, is alerted, and leaves the widget
    /// editing. The widget is never borrowed across an await.
    pub async fn save(&self, widget: &SharedWidget) -> SaveOutcome {
        let planned = widget.borrow_mut().begin_save();
        let pending = match planned {
            Ok(pending) => pending,
            Err(rejected) => {
                debug!(widget = %widget.borrow().id().as_str(), ?rejected, "save ignored");
                return SaveOutcome::Rejected(rejected);
            }
        };
        self.notifier.save_started(&widget.borrow());

        let requests = pending.len();
        for PendingSave { surface, request } in pending {
            match self.client.submit(&request).await {
                Ok(_ack) => {
                    widget
                        .borrow_mut()
                        .record_saved(surface, &request.after_edit);
                    info!(file = %request.file_name, "config saved");
                }
                Err(failure) => {
                    error!(
                        file = %request.file_name,
                        error = ?failure,
                        "Config save failure"
                    );
                    widget.borrow_mut().finish_save(false);
                    self.notifier.alert(&failure.to_string());
                    return SaveOutcome::Failed(failure);
                }
            }
        }

        widget.borrow_mut().finish_save(true);
        SaveOutcome::Saved { requests }
    }
}
