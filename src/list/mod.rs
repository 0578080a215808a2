//! Ordered, named mark lists.
//!
//! A [`MarkList`] owns an ordered sequence of items plus a navigation cursor.
//! All positions at this API are 1-based: position 1 is the first item, the
//! way a user numbers their marks.
//!
//! Every structural change emits its event on the list's [`EventBus`] before
//! the change is applied. Operations on positions or items that don't exist
//! are silent no-ops; a stale mark is never an error.

mod reconcile;

use std::rc::Rc;

use crate::config::ListConfig;
use crate::error::{Error, Result};
use crate::events::{Event, EventBus};

/// How the codec should open a selected item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    pub vsplit: bool,
    pub split: bool,
    pub tabedit: bool,
}

/// Behavior of [`MarkList::next`] and [`MarkList::prev`] at the list ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavOptions {
    pub ui_nav_wrap: bool,
}

/// A named, ordered list of marks.
pub struct MarkList<T> {
    name: String,
    items: Vec<T>,
    /// Last navigated position (1-based)
    cursor: usize,
    config: ListConfig<T>,
    bus: Rc<EventBus<T>>,
}

impl<T> MarkList<T> {
    /// Creates a list holding `items`.
    pub fn new(
        config: ListConfig<T>,
        name: impl Into<String>,
        items: Vec<T>,
        bus: Rc<EventBus<T>>,
    ) -> Self {
        Self {
            name: name.into(),
            items,
            cursor: 1,
            config,
            bus,
        }
    }

    /// Builds a list from stored entries, decoding each with the codec.
    ///
    /// Entries that fail to decode are skipped with a warning so one corrupt
    /// entry doesn't cost the user the rest of the list.
    pub fn decode(
        config: ListConfig<T>,
        name: impl Into<String>,
        encoded: &[String],
        bus: Rc<EventBus<T>>,
    ) -> Self {
        let name = name.into();
        let items = encoded
            .iter()
            .filter_map(|entry| match config.codec.decode(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("Skipping stored item in list '{}': {}", name, e);
                    None
                }
            })
            .collect();
        Self::new(config, name, items, bus)
    }

    /// Encodes every item for storage, in list order.
    pub fn encode(&self) -> Result<Vec<String>> {
        self.items
            .iter()
            .map(|item| {
                self.config.codec.encode(item).map_err(|e| Error::Encode {
                    list: self.name.clone(),
                    item: self.config.codec.display(item),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ListConfig<T> {
        &self.config
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn length(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The last navigated position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Places the cursor at `index` without selecting, for hosts that track
    /// the current mark themselves. Clamped to the list bounds.
    pub fn set_cursor(&mut self, index: usize) -> &mut Self {
        self.cursor = index;
        self.clamp_cursor();
        self
    }

    /// Returns the item at 1-based `index`, or `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<&T> {
        index.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Returns the item whose display key equals `key`.
    pub fn get_by_display(&self, key: &str) -> Option<&T> {
        self.position_of_display(key).and_then(|index| self.get(index))
    }

    /// Returns the 1-based position of the item displayed as `key`.
    pub fn position_of_display(&self, key: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| self.config.codec.display(item) == key)
            .map(|i| i + 1)
    }

    /// Returns the 1-based position of the first item equal to `item`.
    pub fn position_of(&self, item: &T) -> Option<usize> {
        self.items
            .iter()
            .position(|existing| self.config.codec.equals(item, existing))
            .map(|i| i + 1)
    }

    /// Display keys of every item, in order.
    pub fn display(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| self.config.codec.display(item))
            .collect()
    }

    fn resolve_item(&self, item: Option<T>) -> Option<T> {
        let item = item.or_else(|| self.config.codec.create_list_item(None));
        if item.is_none() {
            log::warn!("List '{}': no item to operate on", self.name);
        }
        item
    }

    /// Adds `item` (or one synthesized by the codec) at the end, unless an
    /// equal item is already present.
    pub fn append(&mut self, item: Option<T>) -> &mut Self {
        let Some(item) = self.resolve_item(item) else {
            return self;
        };
        if let Some(existing) = self.position_of(&item) {
            log::debug!("List '{}': append skipped, already at {}", self.name, existing);
            return self;
        }

        let index = self.items.len() + 1;
        log::debug!(
            "List '{}': append {} at {}",
            self.name,
            self.config.codec.display(&item),
            index
        );
        let bus = Rc::clone(&self.bus);
        bus.emit(&Event::Add {
            list: self,
            item: &item,
            index,
        });
        self.items.push(item);
        self
    }

    /// Adds `item` (or one synthesized by the codec) at position 1, unless an
    /// equal item is already present.
    pub fn prepend(&mut self, item: Option<T>) -> &mut Self {
        let Some(item) = self.resolve_item(item) else {
            return self;
        };
        if self.position_of(&item).is_some() {
            return self;
        }

        log::debug!(
            "List '{}': prepend {}",
            self.name,
            self.config.codec.display(&item)
        );
        let bus = Rc::clone(&self.bus);
        bus.emit(&Event::Add {
            list: self,
            item: &item,
            index: 1,
        });
        self.items.insert(0, item);
        self
    }

    /// Removes the first item equal to `item` (or to one synthesized by the codec).
    pub fn remove(&mut self, item: Option<T>) -> &mut Self {
        let Some(item) = self.resolve_item(item) else {
            return self;
        };
        match self.position_of(&item) {
            Some(index) => self.remove_at(index),
            None => self,
        }
    }

    /// Removes the item at 1-based `index`.
    pub fn remove_at(&mut self, index: usize) -> &mut Self {
        let Some(item) = self.get(index) else {
            return self;
        };

        log::debug!(
            "List '{}': remove {} at {}",
            self.name,
            self.config.codec.display(item),
            index
        );
        let bus = Rc::clone(&self.bus);
        bus.emit(&Event::Remove {
            list: self,
            item,
            index,
        });
        self.items.remove(index - 1);
        self.clamp_cursor();
        self
    }

    /// Removes every item, emitting a remove event for each first.
    pub fn clear(&mut self) -> &mut Self {
        let bus = Rc::clone(&self.bus);
        for (i, item) in self.items.iter().enumerate() {
            bus.emit(&Event::Remove {
                list: self,
                item,
                index: i + 1,
            });
        }
        log::debug!("List '{}': cleared {} items", self.name, self.items.len());
        self.items.clear();
        self.cursor = 1;
        self
    }

    /// Moves the item at `from` so that it ends up at `to`.
    pub fn move_to(&mut self, from: usize, to: usize) -> &mut Self {
        if from == to || self.get(to).is_none() {
            return self;
        }
        let Some(item) = self.get(from) else {
            return self;
        };

        log::debug!("List '{}': move {} -> {}", self.name, from, to);
        let bus = Rc::clone(&self.bus);
        bus.emit(&Event::Reorder {
            list: self,
            item,
            index: to,
        });
        let item = self.items.remove(from - 1);
        self.items.insert(to - 1, item);
        self
    }

    /// Exchanges the items at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> &mut Self {
        if a == b {
            return self;
        }
        let (Some(first), Some(second)) = (self.get(a), self.get(b)) else {
            return self;
        };

        log::debug!("List '{}': swap {} <-> {}", self.name, a, b);
        let bus = Rc::clone(&self.bus);
        bus.emit(&Event::Reorder {
            list: self,
            item: first,
            index: b,
        });
        bus.emit(&Event::Reorder {
            list: self,
            item: second,
            index: a,
        });
        self.items.swap(a - 1, b - 1);
        self
    }

    /// Edits the item at `index` in place. Not a structural change, so no
    /// event is emitted.
    pub fn update<F>(&mut self, index: usize, f: F) -> &mut Self
    where
        F: FnOnce(&mut T),
    {
        if let Some(item) = index.checked_sub(1).and_then(|i| self.items.get_mut(i)) {
            f(item);
        }
        self
    }

    /// Hands the item at `index` to the codec for navigation.
    ///
    /// Does nothing when the index is empty unless the list allows
    /// `select_with_nil`.
    pub fn select(&self, index: usize, options: &SelectOptions) {
        let item = self.get(index);
        if item.is_none() && !self.config.options.select_with_nil {
            return;
        }

        self.bus.emit(&Event::Select {
            list: self,
            item,
            index,
        });
        if self.config.codec.select(item, self, options) {
            self.bus.emit(&Event::Navigate {
                list: self,
                item,
                index,
            });
        }
    }

    /// Advances the cursor and selects the item under it.
    pub fn next(&mut self, options: &NavOptions) {
        self.clamp_cursor();
        self.cursor += 1;
        if self.cursor > self.items.len() {
            self.cursor = if options.ui_nav_wrap {
                1
            } else {
                self.items.len().max(1)
            };
        }
        self.select(self.cursor, &SelectOptions::default());
    }

    /// Moves the cursor back and selects the item under it.
    pub fn prev(&mut self, options: &NavOptions) {
        self.clamp_cursor();
        if self.cursor <= 1 {
            self.cursor = if options.ui_nav_wrap {
                self.items.len().max(1)
            } else {
                1
            };
        } else {
            self.cursor -= 1;
        }
        self.select(self.cursor, &SelectOptions::default());
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.clamp(1, self.items.len().max(1));
    }
}
