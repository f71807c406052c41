//! Browser binding: delegated listeners on the config table and the
//! projection of widget state back onto the page.

use std::rc::Rc;

use dioxus_logger::tracing::Level;
use shared_types::{
    ACTION_BUTTON_TAG, ATTR_ACTION, ATTR_FILE_NAME, ATTR_PRE_EDIT, ATTR_WIDGET_ID,
    CONFIG_TABLE_ID, TEXT_SURFACE_TAG, WIDGET_SELECTOR,
};
use tracing::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlButtonElement, HtmlTextAreaElement, MouseEvent, Node};

use crate::controller::{Notifier, SharedWidget, WidgetController};
use crate::persistence::HttpPersistenceClient;
use crate::router::{DblClickOutcome, EventRouter, TargetKind};
use crate::widget::{BeginEdit, TextSurface, Widget, WidgetId};

/// `window.alert`, plus re-rendering a widget when its save starts
pub struct PageNotifier;

impl Notifier for PageNotifier {
    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.alert_with_message(message) {
                error!("alert failed: {:?}", e);
            }
        }
    }

    fn save_started(&self, widget: &Widget) {
        let selector = format!("[{ATTR_WIDGET_ID}=\"{}\"]", widget.id().as_str());
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.query_selector(&selector).ok().flatten());
        match element {
            Some(widget_el) => render(&widget_el, widget),
            None => debug!(widget = %widget.id().as_str(), "widget element gone"),
        }
    }
}

/// Module entry point, run when the page imports the bundle.
#[wasm_bindgen(start)]
pub fn start() {
    // Initialize logging for WASM
    dioxus_logger::init(Level::INFO).ok();

    if let Err(e) = mount(CONFIG_TABLE_ID) {
        error!("failed to mount config editor: {:?}", e);
    }
}

/// Attach the double-click and click listeners to the container with `container_id`.
pub fn mount(container_id: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id `{container_id}`")))?;

    let controller = WidgetController::new(
        Rc::new(HttpPersistenceClient::new()),
        Rc::new(PageNotifier),
    );
    let router = Rc::new(EventRouter::new(controller));

    let dblclick_router = Rc::clone(&router);
    let on_dblclick = Closure::wrap(Box::new(move |evt: MouseEvent| {
        handle_dblclick(&dblclick_router, &evt);
    }) as Box<dyn FnMut(MouseEvent)>);

    let click_router = Rc::clone(&router);
    let on_click = Closure::wrap(Box::new(move |evt: MouseEvent| {
        let Some(target) = event_element(&evt) else {
            return;
        };
        let router = Rc::clone(&click_router);
        wasm_bindgen_futures::spawn_local(async move {
            handle_click(&router, target).await;
        });
    }) as Box<dyn FnMut(MouseEvent)>);

    container.add_event_listener_with_callback("dblclick", on_dblclick.as_ref().unchecked_ref())?;
    container.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;

    // Listeners live as long as the page
    on_dblclick.forget();
    on_click.forget();

    debug!(container = container_id, "config editor mounted");
    Ok(())
}

fn handle_dblclick(router: &EventRouter, evt: &MouseEvent) {
    let Some(target) = event_element(evt) else {
        return;
    };
    if target.tag_name() != TEXT_SURFACE_TAG {
        return;
    }
    let Some(widget_el) = enclosing_widget(&target) else {
        debug!("textarea outside any config widget");
        return;
    };

    let widget = resolve_widget(router, &widget_el);
    sync_from_page(&widget, &widget_el);
    let kind = match surface_index(&widget_el, &target) {
        Some(index) => TargetKind::TextSurface { index },
        None => TargetKind::Other,
    };

    if let DblClickOutcome::Consumed(result) = router.dblclick(&kind, Some(&widget)) {
        render(&widget_el, &widget.borrow());
        if result == BeginEdit::Entered {
            if let Some(textarea) = target.dyn_ref::<HtmlTextAreaElement>() {
                let _ = textarea.blur();
                let _ = textarea.focus();
            }
        }
        evt.prevent_default();
        evt.stop_immediate_propagation();
    }
}

async fn handle_click(router: &EventRouter, target: Element) {
    if target.tag_name() != ACTION_BUTTON_TAG {
        return;
    }
    let kind = TargetKind::ActionButton {
        action: target.get_attribute(ATTR_ACTION),
    };

    let widget_el = enclosing_widget(&target);
    let widget = widget_el.as_ref().map(|el| {
        let widget = resolve_widget(router, el);
        sync_from_page(&widget, el);
        widget
    });

    router.click(&kind, widget.as_ref()).await;

    if let (Some(el), Some(widget)) = (widget_el, widget) {
        render(&el, &widget.borrow());
    }
}

fn event_element(evt: &MouseEvent) -> Option<Element> {
    evt.target().and_then(|t| t.dyn_into::<Element>().ok())
}

/// Ancestor-containment lookup of the widget fragment owning `target`
fn enclosing_widget(target: &Element) -> Option<Element> {
    target.closest(WIDGET_SELECTOR).ok().flatten()
}

fn resolve_widget(router: &EventRouter, widget_el: &Element) -> SharedWidget {
    let id = match widget_el.get_attribute(ATTR_WIDGET_ID) {
        Some(id) => WidgetId(id),
        None => {
            let id = WidgetId::new();
            let _ = widget_el.set_attribute(ATTR_WIDGET_ID, id.as_str());
            id
        }
    };
    router
        .registry()
        .resolve(&id, || hydrate(id.clone(), widget_el))
}

fn hydrate(id: WidgetId, widget_el: &Element) -> Widget {
    let surfaces = text_surfaces(widget_el)
        .iter()
        .map(|ta| TextSurface::new(ta.get_attribute(ATTR_FILE_NAME), ta.value()))
        .collect();
    Widget::new(id, surfaces)
}

fn sync_from_page(widget: &SharedWidget, widget_el: &Element) {
    let values = text_surfaces(widget_el).into_iter().map(|ta| ta.value());
    widget.borrow_mut().sync_values(values);
}

fn surface_index(widget_el: &Element, target: &Element) -> Option<usize> {
    let target: &Node = target;
    text_surfaces(widget_el)
        .iter()
        .position(|ta| ta.is_same_node(Some(target)))
}

fn text_surfaces(widget_el: &Element) -> Vec<HtmlTextAreaElement> {
    collect_elements(widget_el, "textarea")
}

fn buttons(widget_el: &Element) -> Vec<HtmlButtonElement> {
    collect_elements(widget_el, "button")
}

fn collect_elements<T: JsCast>(root: &Element, selector: &str) -> Vec<T> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

/// Write the widget's affordances onto its elements.
fn render(widget_el: &Element, widget: &Widget) {
    let view = widget.affordances();

    for (textarea, surface) in text_surfaces(widget_el).iter().zip(&view.surfaces) {
        textarea.set_read_only(surface.readonly);
        if textarea.value() != surface.value {
            textarea.set_value(&surface.value);
        }
        let _ = match &surface.pre_edit {
            Some(snapshot) => textarea.set_attribute(ATTR_PRE_EDIT, snapshot),
            None => textarea.remove_attribute(ATTR_PRE_EDIT),
        };
    }

    for button in buttons(widget_el) {
        button.set_disabled(view.buttons_disabled);
    }
}
