//! The session registry: every list, per session key, plus its persisted form.
//!
//! A [`Registry`] is the context object hosts hold on to. It owns the
//! configuration, the event bus, and the store. Lists are created lazily on
//! first access, from stored data when there is some.
//!
//! The host decides what a session is by supplying a key function (for
//! example, the working directory). Lists under different keys never see
//! each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};

use crate::config::{Config, ListConfig, PartialConfig};
use crate::events::{Event, EventBus, Listener};
use crate::list::{MarkList, NavOptions};
use crate::store::{Data, Store};
use crate::DEFAULT_LIST;

/// Host lifecycle notifications the registry reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// The user is leaving the current buffer.
    BufLeave,
    /// The editor is about to exit; triggers a sync.
    Exit,
}

/// Diagnostic information about the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub data_path: Option<PathBuf>,
    pub default_list_name: &'static str,
}

type KeyFn = Box<dyn Fn() -> String>;

/// Lists per session key, their persisted data, and the shared event bus.
pub struct Registry<T> {
    config: Config<T>,
    bus: Rc<EventBus<T>>,
    store: Box<dyn Store>,
    key: KeyFn,
    lists: HashMap<String, IndexMap<String, MarkList<T>>>,
    seen: HashMap<String, IndexSet<String>>,
    data: Data,
}

impl<T> Registry<T> {
    /// Creates a registry, loading persisted data from `store`.
    pub fn new<K>(config: Config<T>, store: Box<dyn Store>, key: K) -> anyhow::Result<Self>
    where
        K: Fn() -> String + 'static,
    {
        config.validate()?;
        let data = store.load()?;
        Ok(Self {
            config,
            bus: Rc::new(EventBus::new()),
            store,
            key: Box::new(key),
            lists: HashMap::new(),
            seen: HashMap::new(),
            data,
        })
    }

    pub fn config(&self) -> &Config<T> {
        &self.config
    }

    /// The bus every list of this registry emits on.
    pub fn events(&self) -> &Rc<EventBus<T>> {
        &self.bus
    }

    /// Registers a listener on the event bus.
    pub fn extend(&self, listener: Listener<T>) -> &Self {
        self.bus.add_listener(listener);
        self
    }

    /// The current session key.
    pub fn session_key(&self) -> String {
        (self.key)()
    }

    /// Navigation options derived from the current settings.
    pub fn nav_options(&self) -> NavOptions {
        NavOptions {
            ui_nav_wrap: self.config.settings.ui_nav_wrap,
        }
    }

    /// Returns the list called `name` (the default list when `None`) for the
    /// current session key, creating it from stored data on first access.
    pub fn list(&mut self, name: Option<&str>) -> &mut MarkList<T> {
        let name = name.unwrap_or(DEFAULT_LIST);
        let key = (self.key)();

        self.seen
            .entry(key.clone())
            .or_default()
            .insert(name.to_string());

        let lists = self.lists.entry(key.clone()).or_default();
        match lists.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let encoded = self
                    .data
                    .get(&key)
                    .and_then(|lists| lists.get(name))
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let list = MarkList::decode(
                    self.config.list_config(name),
                    name,
                    encoded,
                    Rc::clone(&self.bus),
                );
                log::debug!(
                    "Created list '{}' for '{}' with {} items",
                    name,
                    key,
                    list.length()
                );
                self.bus.emit(&Event::ListCreated { list: &list });
                entry.insert(list)
            }
        }
    }

    /// Names of the lists accessed under the current session key.
    pub fn seen_lists(&self) -> Vec<String> {
        self.seen
            .get(&(self.key)())
            .map(|seen| seen.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Calls `callback` for every list accessed under the current session
    /// key, along with the list's current configuration and name.
    pub fn for_each_seen_list<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut MarkList<T>, &ListConfig<T>, &str),
    {
        let key = (self.key)();
        let (Some(seen), Some(lists)) = (self.seen.get(&key), self.lists.get_mut(&key)) else {
            return;
        };

        for name in seen {
            let config = self.config.list_config(name);
            if let Some(list) = lists.get_mut(name.as_str()) {
                callback(list, &config, name);
            }
        }
    }

    /// Encodes every seen, persistable list and writes all data to the store.
    ///
    /// A list that fails to encode keeps its previously stored entries.
    pub fn sync(&mut self) -> anyhow::Result<()> {
        let key = (self.key)();
        let mut updates = Vec::new();

        self.for_each_seen_list(|list, _, name| {
            if !list.config().options.encode {
                return;
            }
            match list.encode() {
                Ok(encoded) => updates.push((name.to_string(), encoded)),
                Err(e) => log::warn!("Not syncing list '{}': {}", name, e),
            }
        });

        let stored = self.data.entry(key).or_default();
        for (name, encoded) in updates {
            stored.insert(name, encoded);
        }

        log::info!("Syncing list data");
        self.store.save(&self.data)
    }

    /// Dispatches a host lifecycle event to every seen list's codec, then
    /// syncs if the editor is exiting.
    pub fn on_lifecycle(&mut self, event: Lifecycle) -> anyhow::Result<()> {
        self.for_each_seen_list(|list, config, _| {
            config.codec.on_lifecycle(event, list);
        });

        if event == Lifecycle::Exit {
            self.sync()?;
        }
        Ok(())
    }

    /// Merges `partial` into the configuration and announces it.
    ///
    /// Lists that already exist keep the configuration they were created
    /// with; lists created from now on use the merged one.
    pub fn setup(&mut self, partial: PartialConfig<T>) -> crate::Result<&mut Self> {
        self.config.merge(partial)?;
        log::info!("Configuration updated");
        self.bus.emit(&Event::SetupCalled {
            settings: &self.config.settings,
        });
        Ok(self)
    }

    /// Tells listeners a picker UI has been opened over a list.
    pub fn ui_opened(&mut self, name: Option<&str>) -> &mut MarkList<T> {
        let bus = Rc::clone(&self.bus);
        let list = self.list(name);
        bus.emit(&Event::UiCreate { list: &*list });
        list
    }

    pub fn info(&self) -> Info {
        Info {
            data_path: self.store.path().map(Path::to_path_buf),
            default_list_name: DEFAULT_LIST,
        }
    }

    /// The persisted data as of the last sync or load.
    pub fn dump(&self) -> &Data {
        &self.data
    }
}
