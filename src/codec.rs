//! Item codecs: how a list creates, compares, shows, stores and opens items.
//!
//! A [`Codec`] is attached to every list through its
//! [`ListConfig`](crate::config::ListConfig). Two codecs ship with the crate:
//!
//! - [`PlainCodec`] keeps plain strings (commands, terminal names, notes).
//! - [`FileCodec`] keeps [`ListItem`]s, file paths with a cursor position,
//!   and talks to the host editor through the [`Editor`] trait.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::list::{MarkList, SelectOptions};
use crate::registry::Lifecycle;

/// Pluggable per-list item behavior.
pub trait Codec<T> {
    /// Synthesizes an item, from `name` when given or from editor state
    /// otherwise. Returns `None` when nothing sensible can be created.
    fn create_list_item(&self, name: Option<&str>) -> Option<T>;

    /// Identity predicate used for duplicate detection and removal.
    fn equals(&self, a: &T, b: &T) -> bool;

    /// The display key of an item; reconciliation matches on this.
    fn display(&self, item: &T) -> String;

    fn encode(&self, item: &T) -> Result<String>;

    fn decode(&self, encoded: &str) -> Result<T>;

    /// Hands the selected item to the host. Returns true if navigation
    /// actually happened.
    fn select(&self, _item: Option<&T>, _list: &MarkList<T>, _options: &SelectOptions) -> bool {
        false
    }

    /// Called for every seen list when the host reports a lifecycle event.
    fn on_lifecycle(&self, _event: Lifecycle, _list: &mut MarkList<T>) {}
}

/// Codec for lists of plain strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl Codec<String> for PlainCodec {
    fn create_list_item(&self, name: Option<&str>) -> Option<String> {
        name.map(str::to_string)
    }

    fn equals(&self, a: &String, b: &String) -> bool {
        a == b
    }

    fn display(&self, item: &String) -> String {
        item.clone()
    }

    fn encode(&self, item: &String) -> Result<String> {
        Ok(item.clone())
    }

    fn decode(&self, encoded: &str) -> Result<String> {
        Ok(encoded.to_string())
    }
}

/// A cursor position inside a file. Rows are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { row: 1, col: 0 }
    }
}

/// A bookmarked file and where the cursor was in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub value: String,
    #[serde(default)]
    pub context: Position,
}

impl ListItem {
    pub fn new(value: impl Into<String>, context: Position) -> Self {
        Self {
            value: value.into(),
            context,
        }
    }
}

/// The host editor, as seen by [`FileCodec`].
pub trait Editor {
    /// Namespace for this editing session, e.g. the working directory.
    fn session_key(&self) -> String;

    /// Path of the current buffer, relative to the session root.
    fn current_buffer(&self) -> Option<String>;

    /// Cursor position in the current buffer.
    fn cursor(&self) -> Position;

    /// Opens `path` at `position`. Returns false if the editor declined.
    fn navigate(&self, path: &str, position: Position, options: &SelectOptions) -> bool;
}

/// Codec for file bookmarks backed by an [`Editor`].
#[derive(Clone)]
pub struct FileCodec {
    editor: Rc<dyn Editor>,
}

impl FileCodec {
    pub fn new(editor: Rc<dyn Editor>) -> Self {
        Self { editor }
    }

    fn cursor_for(&self, path: &str) -> Position {
        match self.editor.current_buffer() {
            Some(current) if current == path => self.editor.cursor(),
            _ => Position::default(),
        }
    }
}

impl Codec<ListItem> for FileCodec {
    fn create_list_item(&self, name: Option<&str>) -> Option<ListItem> {
        let path = match name {
            Some(name) => name.to_string(),
            None => self.editor.current_buffer()?,
        };
        if path.is_empty() {
            return None;
        }
        let context = self.cursor_for(&path);
        Some(ListItem::new(path, context))
    }

    fn equals(&self, a: &ListItem, b: &ListItem) -> bool {
        a.value == b.value
    }

    fn display(&self, item: &ListItem) -> String {
        item.value.clone()
    }

    fn encode(&self, item: &ListItem) -> Result<String> {
        Ok(serde_json::to_string(item)?)
    }

    fn decode(&self, encoded: &str) -> Result<ListItem> {
        serde_json::from_str(encoded).map_err(|e| Error::Decode(e.to_string()))
    }

    fn select(
        &self,
        item: Option<&ListItem>,
        _list: &MarkList<ListItem>,
        options: &SelectOptions,
    ) -> bool {
        match item {
            Some(item) => self.editor.navigate(&item.value, item.context, options),
            None => false,
        }
    }

    fn on_lifecycle(&self, event: Lifecycle, list: &mut MarkList<ListItem>) {
        if event != Lifecycle::BufLeave {
            return;
        }
        let Some(current) = self.editor.current_buffer() else {
            return;
        };
        let Some(index) = list.position_of_display(&current) else {
            return;
        };
        let cursor = self.editor.cursor();
        list.update(index, |item| item.context = cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_codec_needs_a_name() {
        assert_eq!(PlainCodec.create_list_item(None), None);
        assert_eq!(
            PlainCodec.create_list_item(Some("make test")),
            Some("make test".to_string())
        );
    }

    #[test]
    fn test_list_item_decodes_without_context() {
        let item = FileCodec::new(Rc::new(NoEditor))
            .decode(r#"{"value":"src/lib.rs"}"#)
            .unwrap();
        assert_eq!(item.context, Position { row: 1, col: 0 });
    }

    #[test]
    fn test_list_item_decode_rejects_garbage() {
        let err = FileCodec::new(Rc::new(NoEditor)).decode("not json");
        assert!(matches!(err, Err(Error::Decode(_))));
    }

    struct NoEditor;

    impl Editor for NoEditor {
        fn session_key(&self) -> String {
            String::new()
        }

        fn current_buffer(&self) -> Option<String> {
            None
        }

        fn cursor(&self) -> Position {
            Position::default()
        }

        fn navigate(&self, _path: &str, _position: Position, _options: &SelectOptions) -> bool {
            false
        }
    }
}
