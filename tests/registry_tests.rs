use quickmarks::codec::PlainCodec;
use quickmarks::config::{Config, PartialConfig, PartialListOptions, PartialSettings, Settings};
use quickmarks::events::{EventKind, Listener};
use quickmarks::store::{Data, MemoryStore};
use quickmarks::{Error, Lifecycle, Registry, DEFAULT_LIST};
use std::cell::RefCell;
use std::rc::Rc;

struct Harness {
    registry: Registry<String>,
    store: Rc<MemoryStore>,
    key: Rc<RefCell<String>>,
}

fn stored(entries: &[(&str, &str, &[&str])]) -> Data {
    let mut data = Data::new();
    for (key, list, items) in entries {
        data.entry(key.to_string())
            .or_default()
            .insert(list.to_string(), items.iter().map(|s| s.to_string()).collect());
    }
    data
}

fn harness_with(settings: Settings, data: Data) -> Harness {
    let store = Rc::new(MemoryStore::new(data));
    let key = Rc::new(RefCell::new("project-a".to_string()));
    let current = Rc::clone(&key);
    let config = Config::<String>::new(Rc::new(PlainCodec)).with_settings(settings);
    let registry = Registry::new(config, Box::new(Rc::clone(&store)), move || {
        current.borrow().clone()
    })
    .unwrap();
    Harness {
        registry,
        store,
        key,
    }
}

fn harness() -> Harness {
    harness_with(Settings::default(), Data::new())
}

fn count(registry: &Registry<String>, kind: EventKind) -> Rc<RefCell<usize>> {
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    registry.extend(Listener::new().on(kind, move |_| *counter.borrow_mut() += 1));
    hits
}

#[test]
fn test_list_is_created_once_from_stored_data() {
    let mut h = harness_with(
        Settings::default(),
        stored(&[("project-a", "cmds", &["make", "make test"][..])]),
    );
    let created = count(&h.registry, EventKind::ListCreated);

    assert_eq!(h.registry.list(Some("cmds")).display(), vec!["make", "make test"]);
    h.registry.list(Some("cmds")).append(Some("make docs".to_string()));
    assert_eq!(h.registry.list(Some("cmds")).length(), 3);

    assert_eq!(*created.borrow(), 1);
}

#[test]
fn test_default_list_name() {
    let mut h = harness();
    assert_eq!(h.registry.list(None).name(), DEFAULT_LIST);
    assert_eq!(h.registry.info().default_list_name, DEFAULT_LIST);
    assert_eq!(h.registry.info().data_path, None);
}

#[test]
fn test_session_keys_are_isolated() {
    let mut h = harness();
    h.registry.list(None).append(Some("a.rs".to_string()));

    *h.key.borrow_mut() = "project-b".to_string();
    assert!(h.registry.list(None).is_empty());
    h.registry.list(None).append(Some("b.rs".to_string()));

    *h.key.borrow_mut() = "project-a".to_string();
    assert_eq!(h.registry.list(None).display(), vec!["a.rs"]);
}

#[test]
fn test_sync_writes_seen_lists_for_current_key() {
    let mut h = harness_with(
        Settings::default(),
        stored(&[("project-a", "untouched", &["keep"][..])]),
    );
    h.registry.list(Some("files")).append(Some("src/lib.rs".to_string()));
    h.registry.sync().unwrap();

    let saved = h.store.snapshot();
    assert_eq!(saved["project-a"]["files"], vec!["src/lib.rs"]);
    assert_eq!(saved["project-a"]["untouched"], vec!["keep"]);
    assert_eq!(h.registry.dump(), &saved);
}

#[test]
fn test_sync_skips_lists_that_opt_out() {
    let mut settings = Settings::default();
    settings.lists.insert(
        "scratch".to_string(),
        PartialListOptions {
            encode: Some(false),
            ..Default::default()
        },
    );
    let mut h = harness_with(settings, Data::new());
    h.registry.list(Some("scratch")).append(Some("tmp".to_string()));
    h.registry.list(Some("files")).append(Some("a.rs".to_string()));
    h.registry.sync().unwrap();

    let saved = h.store.snapshot();
    assert!(saved["project-a"].get("scratch").is_none());
    assert_eq!(saved["project-a"]["files"], vec!["a.rs"]);
}

#[test]
fn test_for_each_seen_list_visits_only_current_key() {
    let mut h = harness();
    h.registry.list(Some("one"));
    h.registry.list(Some("two"));
    *h.key.borrow_mut() = "project-b".to_string();
    h.registry.list(Some("three"));
    *h.key.borrow_mut() = "project-a".to_string();

    let mut names = Vec::new();
    h.registry.for_each_seen_list(|list, _, name| {
        names.push((name.to_string(), list.name().to_string()));
    });

    assert_eq!(
        names,
        vec![
            ("one".to_string(), "one".to_string()),
            ("two".to_string(), "two".to_string())
        ]
    );
    assert_eq!(h.registry.seen_lists(), vec!["one", "two"]);
}

#[test]
fn test_exit_lifecycle_syncs() {
    let mut h = harness();
    h.registry.list(None).append(Some("a.rs".to_string()));

    h.registry.on_lifecycle(Lifecycle::BufLeave).unwrap();
    assert!(h.store.snapshot().is_empty());

    h.registry.on_lifecycle(Lifecycle::Exit).unwrap();
    assert_eq!(h.store.snapshot()["project-a"][DEFAULT_LIST], vec!["a.rs"]);
}

#[test]
fn test_setup_merges_and_announces() {
    let mut h = harness();
    let setups = count(&h.registry, EventKind::SetupCalled);

    let partial = PartialSettings {
        ui_nav_wrap: Some(true),
        ..Default::default()
    };
    h.registry.setup(PartialConfig::from(partial)).unwrap();

    assert!(h.registry.config().settings.ui_nav_wrap);
    assert!(h.registry.nav_options().ui_nav_wrap);
    assert_eq!(*setups.borrow(), 1);
}

#[test]
fn test_setup_applies_only_to_new_lists() {
    let mut h = harness();
    h.registry.list(Some("early"));

    let mut partial = PartialSettings::default();
    partial.default = Some(PartialListOptions {
        select_with_nil: Some(true),
        ..Default::default()
    });
    h.registry.setup(partial.into()).unwrap();

    assert!(!h.registry.list(Some("early")).config().options.select_with_nil);
    assert!(h.registry.list(Some("late")).config().options.select_with_nil);
}

#[test]
fn test_setup_rejects_empty_list_name() {
    let mut h = harness();
    let setups = count(&h.registry, EventKind::SetupCalled);

    let mut partial = PartialSettings::default();
    partial.ui_nav_wrap = Some(true);
    partial
        .lists
        .insert(String::new(), PartialListOptions::default());

    let result = h.registry.setup(partial.into());
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(!h.registry.config().settings.ui_nav_wrap);
    assert_eq!(*setups.borrow(), 0);
}

#[test]
fn test_unnamed_codec_override_is_rejected() {
    let store = Rc::new(MemoryStore::default());
    let config = Config::<String>::new(Rc::new(PlainCodec))
        .with_list_codec("", Rc::new(PlainCodec));
    let result = Registry::new(config, Box::new(store), || "k".to_string());
    assert!(result.is_err());
}

#[test]
fn test_ui_opened_announces_list() {
    let mut h = harness();
    let opened = count(&h.registry, EventKind::UiCreate);

    let list = h.registry.ui_opened(Some("files"));
    assert_eq!(list.name(), "files");
    assert_eq!(*opened.borrow(), 1);
}
