//! Keeping the search trigger bound after fragment swaps.
//!
//! Partial page updates can replace the search button with a fresh element.
//! The new element has no click listener, while the old one may still be
//! bound if the swap kept it. [ListenerRegistry] tracks the listener attached
//! to each element so that binding never stacks a second listener on one
//! element.

use std::collections::HashMap;

use crate::page::{ElementRef, Page};

/// The click listener currently attached to each element.
pub struct ListenerRegistry<L> {
    bound: HashMap<ElementRef, L>,
}

impl<L> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self {
            bound: HashMap::new(),
        }
    }
}

impl<L> ListenerRegistry<L> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `listener` to `element`, first detaching any listener this
    /// registry previously attached to it.
    ///
    /// Returns `true` if a previous listener was replaced.
    pub fn bind<P>(&mut self, page: &P, element: ElementRef, listener: L) -> bool
    where
        P: Page<Listener = L>,
    {
        let replaced = match self.bound.remove(&element) {
            Some(previous) => {
                page.remove_click_listener(element, &previous);
                true
            }
            None => false,
        };

        page.add_click_listener(element, &listener);
        self.bound.insert(element, listener);

        replaced
    }

    /// Forget listeners of elements that have left the page.
    pub fn prune<P>(&mut self, page: &P)
    where
        P: Page<Listener = L>,
    {
        self.bound.retain(|element, _| page.is_connected(*element));
    }

    /// The number of elements with a listener.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Whether no element has a listener.
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

/// What handling a fragment swap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The page has no search trigger for this domain.
    NoTrigger,
    /// The trigger was (re)bound.
    Bound {
        /// Whether the trigger element is new since the last swap.
        new_trigger: bool,
    },
}

/// Rebinds one domain's search trigger whenever the page fragment changes.
pub struct NavigationRefreshHook<L> {
    trigger_id: String,
    listeners: ListenerRegistry<L>,
}

impl<L> NavigationRefreshHook<L> {
    /// A hook for the trigger with `trigger_id`.
    pub fn new(trigger_id: String) -> Self {
        Self {
            trigger_id,
            listeners: ListenerRegistry::new(),
        }
    }

    /// The ID of the trigger this hook binds.
    pub fn trigger_id(&self) -> &str {
        &self.trigger_id
    }

    /// Find the trigger on `page` and bind a listener made by `make_listener`.
    ///
    /// `make_listener` is only called when the trigger exists. A trigger that
    /// already has a listener from this hook gets it replaced, so each
    /// trigger element has exactly one.
    pub fn on_fragment_swap<P, F>(&mut self, page: &P, make_listener: F) -> SwapOutcome
    where
        P: Page<Listener = L>,
        F: FnOnce() -> L,
    {
        self.listeners.prune(page);

        let Some(trigger) = page.element(&self.trigger_id) else {
            tracing::debug!("No #{} on the page after swap.", self.trigger_id);
            return SwapOutcome::NoTrigger;
        };

        let replaced = self.listeners.bind(page, trigger, make_listener());
        tracing::debug!(
            "Bound #{} ({:?}), replaced previous listener: {replaced}",
            self.trigger_id,
            trigger
        );

        SwapOutcome::Bound {
            new_trigger: !replaced,
        }
    }

    /// The listeners this hook has attached.
    pub fn listeners(&self) -> &ListenerRegistry<L> {
        &self.listeners
    }
}
