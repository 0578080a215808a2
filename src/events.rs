//! Synchronous publish/subscribe for list changes.
//!
//! Listeners register a handler per [`EventKind`] they care about; kinds a
//! listener does not handle are skipped. Emission walks listeners in
//! registration order and runs every handler to completion before returning.
//!
//! Mutating list operations emit their event *before* touching the list, so a
//! handler that inspects `event.list()` always sees the pre-mutation state.
//!
//! # Example
//!
//! ```
//! use quickmarks::events::{EventBus, EventKind, Listener};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let bus: EventBus<String> = EventBus::new();
//! let adds = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&adds);
//! bus.add_listener(Listener::new().on(EventKind::Add, move |_| counter.set(counter.get() + 1)));
//! assert_eq!(bus.listener_count(), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::Settings;
use crate::list::MarkList;

/// Tag identifying an event variant, used as the listener dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Select,
    Remove,
    Reorder,
    UiCreate,
    SetupCalled,
    ListCreated,
    Navigate,
}

/// A structural or lifecycle notification.
///
/// Indices are 1-based list positions.
pub enum Event<'a, T> {
    /// `item` is about to be inserted at `index`.
    Add {
        list: &'a MarkList<T>,
        item: &'a T,
        index: usize,
    },
    /// The item at `index` (possibly none) is being handed to the codec's select.
    Select {
        list: &'a MarkList<T>,
        item: Option<&'a T>,
        index: usize,
    },
    /// `item` at `index` is about to be removed.
    Remove {
        list: &'a MarkList<T>,
        item: &'a T,
        index: usize,
    },
    /// `item` is about to move to `index`.
    Reorder {
        list: &'a MarkList<T>,
        item: &'a T,
        index: usize,
    },
    /// A picker UI was opened over `list`.
    UiCreate { list: &'a MarkList<T> },
    /// Configuration was merged by `Registry::setup`.
    SetupCalled { settings: &'a Settings },
    /// `list` was created for the first time in this session.
    ListCreated { list: &'a MarkList<T> },
    /// The codec navigated to `item`.
    Navigate {
        list: &'a MarkList<T>,
        item: Option<&'a T>,
        index: usize,
    },
}

impl<'a, T> Event<'a, T> {
    /// Returns the tag for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Add { .. } => EventKind::Add,
            Event::Select { .. } => EventKind::Select,
            Event::Remove { .. } => EventKind::Remove,
            Event::Reorder { .. } => EventKind::Reorder,
            Event::UiCreate { .. } => EventKind::UiCreate,
            Event::SetupCalled { .. } => EventKind::SetupCalled,
            Event::ListCreated { .. } => EventKind::ListCreated,
            Event::Navigate { .. } => EventKind::Navigate,
        }
    }

    /// Returns the list this event concerns, if any.
    pub fn list(&self) -> Option<&'a MarkList<T>> {
        match *self {
            Event::Add { list, .. }
            | Event::Select { list, .. }
            | Event::Remove { list, .. }
            | Event::Reorder { list, .. }
            | Event::UiCreate { list }
            | Event::ListCreated { list }
            | Event::Navigate { list, .. } => Some(list),
            Event::SetupCalled { .. } => None,
        }
    }

    /// Returns the item carried by this event, if any.
    pub fn item(&self) -> Option<&'a T> {
        match *self {
            Event::Add { item, .. } | Event::Remove { item, .. } | Event::Reorder { item, .. } => {
                Some(item)
            }
            Event::Select { item, .. } | Event::Navigate { item, .. } => item,
            _ => None,
        }
    }

    /// Returns the 1-based index carried by this event, if any.
    pub fn index(&self) -> Option<usize> {
        match *self {
            Event::Add { index, .. }
            | Event::Select { index, .. }
            | Event::Remove { index, .. }
            | Event::Reorder { index, .. }
            | Event::Navigate { index, .. } => Some(index),
            _ => None,
        }
    }
}

type Handler<T> = Box<dyn Fn(&Event<'_, T>)>;

/// A set of handlers keyed by event kind.
pub struct Listener<T> {
    handlers: HashMap<EventKind, Handler<T>>,
}

impl<T> Listener<T> {
    /// Creates a listener with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `kind`, replacing any previous handler for it.
    pub fn on<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(&Event<'_, T>) + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Returns true if this listener has a handler for `kind`.
    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    fn dispatch(&self, event: &Event<'_, T>) {
        if let Some(handler) = self.handlers.get(&event.kind()) {
            handler(event);
        }
    }
}

impl<T: 'static> Listener<T> {
    /// A listener that logs every event at debug level.
    pub fn logger() -> Self {
        const ALL: [EventKind; 8] = [
            EventKind::Add,
            EventKind::Select,
            EventKind::Remove,
            EventKind::Reorder,
            EventKind::UiCreate,
            EventKind::SetupCalled,
            EventKind::ListCreated,
            EventKind::Navigate,
        ];

        ALL.iter().fold(Self::new(), |listener, &kind| {
            listener.on(kind, log_event)
        })
    }
}

impl<T: 'static> Listener<T> {
    /// A listener that runs `action` after every successful navigation, with
    /// the list, the item navigated to and its position.
    pub fn on_navigate<F>(action: F) -> Self
    where
        F: Fn(&MarkList<T>, Option<&T>, usize) + 'static,
    {
        Self::new().on(EventKind::Navigate, move |event| {
            if let Event::Navigate { list, item, index } = *event {
                action(list, item, index);
            }
        })
    }
}

fn log_event<T>(event: &Event<'_, T>) {
    let Some(list) = event.list() else {
        log::debug!("event {:?}", event.kind());
        return;
    };
    let item = event.item().map(|item| list.config().codec.display(item));
    log::debug!(
        "event {:?} list={} index={:?} item={:?}",
        event.kind(),
        list.name(),
        event.index(),
        item
    );
}

impl<T> Default for Listener<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered collection of listeners with synchronous fan-out.
pub struct EventBus<T> {
    listeners: RefCell<Vec<Rc<Listener<T>>>>,
}

impl<T> EventBus<T> {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Appends a listener; it is invoked after all previously added ones.
    pub fn add_listener(&self, listener: Listener<T>) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Removes every listener.
    pub fn clear_listeners(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers `event` to every listener that handles its kind, in
    /// registration order.
    ///
    /// The listener set is snapshotted first: listeners added or cleared from
    /// inside a handler take effect on the next emission.
    pub fn emit(&self, event: &Event<'_, T>) {
        let listeners: Vec<Rc<Listener<T>>> = self.listeners.borrow().clone();
        for listener in &listeners {
            listener.dispatch(event);
        }
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
