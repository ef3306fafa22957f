use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use charming::Chart;

use crate::{
    page::{
        CATEGORY_FILTER_ID, CHART_SURFACE_ID, ChartSurface, ElementRef, Page, YEAR_FILTER_ID,
        search_trigger_id,
    },
    theme::Theme,
};

pub(crate) type FakeListener = Rc<dyn Fn()>;

/// An in-memory page with the chart surface, both filter controls and the
/// house search trigger.
pub(crate) struct FakePage {
    elements: RefCell<HashMap<String, ElementRef>>,
    controls: RefCell<HashMap<String, String>>,
    listeners: RefCell<HashMap<ElementRef, Vec<FakeListener>>>,
    frames: Rc<RefCell<Vec<String>>>,
    next_element: Cell<u64>,
    theme: Cell<Theme>,
}

impl FakePage {
    pub(crate) fn new() -> Self {
        let page = Self {
            elements: RefCell::default(),
            controls: RefCell::default(),
            listeners: RefCell::default(),
            frames: Rc::default(),
            next_element: Cell::new(1),
            theme: Cell::new(Theme::Light),
        };

        page.add_element(CHART_SURFACE_ID);
        page.add_element(&search_trigger_id("house"));
        page.set_control(CATEGORY_FILTER_ID, "");
        page.set_control(YEAR_FILTER_ID, "");

        page
    }

    /// Add or replace the element with `id`.
    pub(crate) fn add_element(&self, id: &str) -> ElementRef {
        let element = ElementRef(self.next_element.get());
        self.next_element.set(element.0 + 1);

        if let Some(old) = self.elements.borrow_mut().insert(id.to_owned(), element) {
            self.listeners.borrow_mut().remove(&old);
        }

        element
    }

    /// Swap in a fresh element for `id`, as a fragment swap would.
    pub(crate) fn replace_element(&self, id: &str) -> ElementRef {
        self.add_element(id)
    }

    pub(crate) fn remove_element(&self, id: &str) {
        if let Some(old) = self.elements.borrow_mut().remove(id) {
            self.listeners.borrow_mut().remove(&old);
        }
    }

    /// Set a control's value, adding the control if needed.
    pub(crate) fn set_control(&self, id: &str, value: &str) {
        if !self.elements.borrow().contains_key(id) {
            self.add_element(id);
        }
        self.controls
            .borrow_mut()
            .insert(id.to_owned(), value.to_owned());
    }

    pub(crate) fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
    }

    /// Click the element with `id`, returning how many listeners ran.
    pub(crate) fn click(&self, id: &str) -> usize {
        let Some(element) = self.element(id) else {
            return 0;
        };

        let listeners = self
            .listeners
            .borrow()
            .get(&element)
            .cloned()
            .unwrap_or_default();

        for listener in &listeners {
            listener();
        }

        listeners.len()
    }

    /// Every chart drawn so far, as ECharts option text.
    pub(crate) fn frames(&self) -> Vec<String> {
        self.frames.borrow().clone()
    }

    #[track_caller]
    pub(crate) fn last_frame(&self) -> String {
        self.frames
            .borrow()
            .last()
            .cloned()
            .expect("nothing has been drawn")
    }
}

impl Page for FakePage {
    type Listener = FakeListener;
    type Surface = FakeSurface;

    fn element(&self, id: &str) -> Option<ElementRef> {
        self.elements.borrow().get(id).copied()
    }

    fn is_connected(&self, element: ElementRef) -> bool {
        self.elements.borrow().values().any(|&e| e == element)
    }

    fn control_value(&self, id: &str) -> Option<String> {
        self.element(id)?;
        Some(self.controls.borrow().get(id).cloned().unwrap_or_default())
    }

    fn surface(&self, id: &str) -> Option<FakeSurface> {
        self.element(id).map(|element| FakeSurface {
            element,
            frames: Rc::clone(&self.frames),
        })
    }

    fn add_click_listener(&self, element: ElementRef, listener: &FakeListener) {
        self.listeners
            .borrow_mut()
            .entry(element)
            .or_default()
            .push(Rc::clone(listener));
    }

    fn remove_click_listener(&self, element: ElementRef, listener: &FakeListener) {
        if let Some(listeners) = self.listeners.borrow_mut().get_mut(&element) {
            listeners.retain(|attached| !Rc::ptr_eq(attached, listener));
        }
    }

    fn theme(&self) -> Theme {
        self.theme.get()
    }
}

/// Records each drawn chart in its page's frame list.
pub(crate) struct FakeSurface {
    element: ElementRef,
    frames: Rc<RefCell<Vec<String>>>,
}

impl ChartSurface for FakeSurface {
    fn element(&self) -> ElementRef {
        self.element
    }

    fn draw(&mut self, chart: &Chart) {
        self.frames.borrow_mut().push(chart.to_string());
    }
}
