use quickmarks::codec::PlainCodec;
use quickmarks::config::{Config, Settings};
use quickmarks::events::{Event, EventBus, EventKind, Listener};
use quickmarks::list::MarkList;
use std::cell::RefCell;
use std::rc::Rc;

fn sample_list(bus: &Rc<EventBus<String>>) -> MarkList<String> {
    let config = Config::<String>::new(Rc::new(PlainCodec)).list_config("events");
    MarkList::new(config, "events", vec!["x".to_string()], Rc::clone(bus))
}

#[test]
fn test_listeners_run_in_registration_order() {
    let bus: Rc<EventBus<String>> = Rc::new(EventBus::new());
    let order = Rc::new(RefCell::new(Vec::new()));
    for id in 1..=3 {
        let order = Rc::clone(&order);
        bus.add_listener(Listener::new().on(EventKind::Add, move |_| order.borrow_mut().push(id)));
    }

    let mut list = sample_list(&bus);
    list.append(Some("y".to_string()));

    assert_eq!(*order.borrow(), vec![1, 2, 3]);
}

#[test]
fn test_unhandled_kinds_are_skipped() {
    let bus: Rc<EventBus<String>> = Rc::new(EventBus::new());
    let removes = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&removes);
    let listener = Listener::new().on(EventKind::Remove, move |_| *counter.borrow_mut() += 1);
    assert!(listener.handles(EventKind::Remove));
    assert!(!listener.handles(EventKind::Add));
    bus.add_listener(listener);
    bus.add_listener(Listener::new());

    let mut list = sample_list(&bus);
    list.append(Some("y".to_string())).remove_at(1);

    assert_eq!(*removes.borrow(), 1);
}

#[test]
fn test_listener_added_during_emit_waits_for_next_event() {
    let bus: Rc<EventBus<String>> = Rc::new(EventBus::new());
    let late_calls = Rc::new(RefCell::new(0));

    let bus_handle = Rc::clone(&bus);
    let late = Rc::clone(&late_calls);
    bus.add_listener(Listener::new().on(EventKind::Add, move |_| {
        let late = Rc::clone(&late);
        let counter = Listener::new().on(EventKind::Add, move |_| *late.borrow_mut() += 1);
        bus_handle.add_listener(counter);
    }));

    let mut list = sample_list(&bus);
    list.append(Some("y".to_string()));
    assert_eq!(*late_calls.borrow(), 0);
    assert_eq!(bus.listener_count(), 2);

    list.append(Some("z".to_string()));
    assert_eq!(*late_calls.borrow(), 1);
}

#[test]
fn test_clear_listeners() {
    let bus: Rc<EventBus<String>> = Rc::new(EventBus::new());
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    bus.add_listener(Listener::new().on(EventKind::Add, move |_| *counter.borrow_mut() += 1));
    bus.clear_listeners();
    assert_eq!(bus.listener_count(), 0);

    let mut list = sample_list(&bus);
    list.append(Some("y".to_string()));
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn test_later_handler_replaces_earlier_for_same_kind() {
    let bus: Rc<EventBus<String>> = Rc::new(EventBus::new());
    let hits = Rc::new(RefCell::new(Vec::new()));
    let first = Rc::clone(&hits);
    let second = Rc::clone(&hits);
    bus.add_listener(
        Listener::new()
            .on(EventKind::Add, move |_| first.borrow_mut().push("first"))
            .on(EventKind::Add, move |_| second.borrow_mut().push("second")),
    );

    let mut list = sample_list(&bus);
    list.append(Some("y".to_string()));
    assert_eq!(*hits.borrow(), vec!["second"]);
}

#[test]
fn test_event_accessors() {
    let bus: Rc<EventBus<String>> = Rc::new(EventBus::new());
    let list = sample_list(&bus);
    let item = "x".to_string();

    let add = Event::Add {
        list: &list,
        item: &item,
        index: 1,
    };
    assert_eq!(add.kind(), EventKind::Add);
    assert_eq!(add.item(), Some(&item));
    assert_eq!(add.index(), Some(1));
    assert_eq!(add.list().map(|l| l.name()), Some("events"));

    let settings = Settings::default();
    let setup: Event<'_, String> = Event::SetupCalled {
        settings: &settings,
    };
    assert_eq!(setup.kind(), EventKind::SetupCalled);
    assert!(setup.list().is_none());
    assert!(setup.index().is_none());

    let created = Event::ListCreated { list: &list };
    assert!(created.item().is_none());
}

#[test]
fn test_logger_listener_handles_everything() {
    let listener: Listener<String> = Listener::logger();
    for kind in [
        EventKind::Add,
        EventKind::Select,
        EventKind::Remove,
        EventKind::Reorder,
        EventKind::UiCreate,
        EventKind::SetupCalled,
        EventKind::ListCreated,
        EventKind::Navigate,
    ] {
        assert!(listener.handles(kind));
    }
}

#[test]
fn test_on_navigate_runs_only_after_navigation() {
    let bus: Rc<EventBus<String>> = Rc::new(EventBus::new());
    let visits = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&visits);
    let listener = Listener::on_navigate(move |list: &MarkList<String>, item, index| {
        record
            .borrow_mut()
            .push((list.name().to_string(), item.cloned(), index));
    });
    assert!(listener.handles(EventKind::Navigate));
    assert!(!listener.handles(EventKind::Select));
    bus.add_listener(listener);

    let list = sample_list(&bus);
    bus.emit(&Event::Select {
        list: &list,
        item: list.get(1),
        index: 1,
    });
    bus.emit(&Event::Navigate {
        list: &list,
        item: list.get(1),
        index: 1,
    });

    assert_eq!(
        *visits.borrow(),
        vec![("events".to_string(), Some("x".to_string()), 1)]
    );
}
