//! The browser backend.
//!
//! Charts are drawn with ECharts, which the page must load as the global
//! `echarts`. Searches go through `fetch` and fragment swaps are detected
//! with htmx's `htmx:afterSettle` event.

use std::{cell::Cell, rc::Rc, sync::Once};

use charming::Chart;
use gloo_net::http::Request;
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement};

use crate::{
    Error,
    app::ChartApp,
    domain::DomainConfig,
    filters::SearchRequest,
    page::{ChartSurface, ElementRef, Page},
    query::ExpenseSource,
    theme::{THEME_STORAGE_KEY, Theme},
};

/// Attribute holding the [ElementRef] stamped on an element.
const ELEMENT_REF_ATTRIBUTE: &str = "data-chart-ref";

/// The event htmx fires once swapped content has settled.
const FRAGMENT_SWAP_EVENT: &str = "htmx:afterSettle";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = echarts, js_name = init)]
    fn echarts_init(dom: &Element) -> JsValue;

    #[wasm_bindgen(js_namespace = echarts, js_name = getInstanceByDom)]
    fn echarts_get_instance(dom: &Element) -> JsValue;
}

type WebApp = ChartApp<WebPage, FetchSource>;

/// The live document.
///
/// Elements are identified by a counter stamped into a data attribute the
/// first time they are looked up. An element that replaces another in a swap
/// carries no stamp, so it gets a new reference.
pub struct WebPage {
    document: Document,
    next_ref: Cell<u64>,
}

impl WebPage {
    /// Wrap `document`.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            next_ref: Cell::new(1),
        }
    }

    fn find(&self, element: ElementRef) -> Option<Element> {
        let selector = format!("[{ELEMENT_REF_ATTRIBUTE}=\"{}\"]", element.0);

        self.document.query_selector(&selector).ok().flatten()
    }

    fn stamp(&self, element: &Element) -> ElementRef {
        if let Some(existing) = element
            .get_attribute(ELEMENT_REF_ATTRIBUTE)
            .and_then(|value| value.parse().ok())
        {
            return ElementRef(existing);
        }

        let id = self.next_ref.get();
        self.next_ref.set(id + 1);

        if let Err(error) = element.set_attribute(ELEMENT_REF_ATTRIBUTE, &id.to_string()) {
            tracing::error!("Could not stamp element {}: {error:?}", element.id());
        }

        ElementRef(id)
    }
}

impl Page for WebPage {
    type Listener = Closure<dyn FnMut()>;
    type Surface = EchartsSurface;

    fn element(&self, id: &str) -> Option<ElementRef> {
        self.document
            .get_element_by_id(id)
            .map(|element| self.stamp(&element))
    }

    fn is_connected(&self, element: ElementRef) -> bool {
        self.find(element).is_some()
    }

    fn control_value(&self, id: &str) -> Option<String> {
        let element = self.document.get_element_by_id(id)?;

        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            return Some(select.value());
        }

        element
            .dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::value)
    }

    fn surface(&self, id: &str) -> Option<EchartsSurface> {
        let dom = self.document.get_element_by_id(id)?;
        let element = self.stamp(&dom);

        let existing = echarts_get_instance(&dom);
        let instance = if existing.is_null() || existing.is_undefined() {
            echarts_init(&dom)
        } else {
            existing
        };

        Some(EchartsSurface { element, instance })
    }

    fn add_click_listener(&self, element: ElementRef, listener: &Self::Listener) {
        let Some(target) = self.find(element) else {
            return;
        };

        if let Err(error) =
            target.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
        {
            tracing::error!("Could not add click listener: {error:?}");
        }
    }

    fn remove_click_listener(&self, element: ElementRef, listener: &Self::Listener) {
        let Some(target) = self.find(element) else {
            return;
        };

        if let Err(error) =
            target.remove_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
        {
            tracing::error!("Could not remove click listener: {error:?}");
        }
    }

    fn theme(&self) -> Theme {
        let stored = web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .and_then(|storage| storage.get_item(THEME_STORAGE_KEY).ok().flatten());

        Theme::from_stored(stored.as_deref())
    }
}

/// An ECharts instance bound to one element.
pub struct EchartsSurface {
    element: ElementRef,
    instance: JsValue,
}

impl ChartSurface for EchartsSurface {
    fn element(&self) -> ElementRef {
        self.element
    }

    fn draw(&mut self, chart: &Chart) {
        // The options contain JS functions (axis formatters), so they are
        // evaluated rather than parsed as JSON.
        let options = js_sys::Function::new_no_args(&format!("return {chart};"))
            .call0(&JsValue::NULL);
        let options = match options {
            Ok(options) => options,
            Err(error) => {
                tracing::error!("Could not build chart options: {error:?}");
                return;
            }
        };

        let set_option = js_sys::Reflect::get(&self.instance, &JsValue::from_str("setOption"))
            .ok()
            .and_then(|function| function.dyn_into::<js_sys::Function>().ok());

        if let Some(set_option) = set_option {
            // Replace rather than merge so removed categories disappear.
            if let Err(error) = set_option.call2(&self.instance, &options, &JsValue::TRUE) {
                tracing::error!("Could not draw chart: {error:?}");
            }
        }
    }
}

/// Runs chart searches against the backend the page was served from.
pub struct FetchSource;

impl ExpenseSource for FetchSource {
    async fn fetch(&self, request: &SearchRequest) -> Result<String, Error> {
        let response = Request::get(request.url())
            .send()
            .await
            .map_err(|error| Error::Fetch(error.to_string()))?;

        if !response.ok() {
            return Err(Error::Fetch(format!(
                "{} responded with status {}",
                request.url(),
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|error| Error::Fetch(error.to_string()))
    }
}

/// Start the chart for a built-in domain, e.g. `"house"` or `"car"`.
#[wasm_bindgen(js_name = startExpenseChart)]
pub fn start_builtin(endpoint_prefix: &str) -> Result<(), JsValue> {
    let domain = DomainConfig::builtin(endpoint_prefix).ok_or_else(|| {
        JsValue::from_str(&format!("unknown expense domain \"{endpoint_prefix}\""))
    })?;

    start(domain)
}

/// Start the chart for `domain` on the current document.
///
/// Draws the chart and runs the first search if the chart surface is already
/// on the page, and rebinds the search trigger after every htmx swap. Log
/// output goes to the browser console.
pub fn start(domain: DomainConfig) -> Result<(), JsValue> {
    setup_logging();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document to draw charts in"))?;

    let page = Rc::new(WebPage::new(document.clone()));
    let app: Rc<WebApp> = Rc::new(ChartApp::new(domain, FetchSource));

    match app.start(&page, || refresh_listener(&app, &page)) {
        Ok(_) => spawn_refresh(&app, &page),
        Err(error) => tracing::debug!("Waiting for a fragment swap: {error}"),
    }

    let on_swap = {
        let app = Rc::clone(&app);
        let page = Rc::clone(&page);

        Closure::<dyn FnMut()>::new(move || {
            let action = app.handle_fragment_swap(&page, || refresh_listener(&app, &page));

            if action.initial_refresh {
                spawn_refresh(&app, &page);
            }
        })
    };

    document.add_event_listener_with_callback(FRAGMENT_SWAP_EVENT, on_swap.as_ref().unchecked_ref())?;
    // The listener lives as long as the document.
    on_swap.forget();

    Ok(())
}

/// Send `tracing` output and panics to the browser console.
///
/// Safe to call once per chart on the page. Only the first call installs
/// anything, and a subscriber set by the host page is left in place.
fn setup_logging() {
    static LOGGING: Once = Once::new();

    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();

        if let Err(error) = tracing_wasm::try_set_as_global_default() {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "Chart logging not installed: {error}"
            )));
        }
    });
}

fn refresh_listener(app: &Rc<WebApp>, page: &Rc<WebPage>) -> Closure<dyn FnMut()> {
    let app = Rc::clone(app);
    let page = Rc::clone(page);

    Closure::new(move || spawn_refresh(&app, &page))
}

fn spawn_refresh(app: &Rc<WebApp>, page: &Rc<WebPage>) {
    let app = Rc::clone(app);
    let page = Rc::clone(page);

    spawn_local(async move {
        let outcome = app.refresh(&page).await;
        tracing::debug!("Chart refresh finished: {outcome:?}");
    });
}
