//! Persistence of encoded list data.
//!
//! The registry keeps every list's encoded items in a [`Data`] map keyed by
//! session key, then list name. A [`Store`] loads that map at startup and
//! writes it back on sync.

use std::cell::RefCell;
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexMap;

/// Encoded items per list name, per session key.
pub type Data = IndexMap<String, IndexMap<String, Vec<String>>>;

/// Durable storage for [`Data`].
pub trait Store {
    fn load(&self) -> Result<Data>;

    fn save(&self, data: &Data) -> Result<()>;

    /// Where the data lives, for diagnostics.
    fn path(&self) -> Option<&Path> {
        None
    }
}

impl<S: Store + ?Sized> Store for Rc<S> {
    fn load(&self) -> Result<Data> {
        (**self).load()
    }

    fn save(&self, data: &Data) -> Result<()> {
        (**self).save(data)
    }

    fn path(&self) -> Option<&Path> {
        (**self).path()
    }
}

/// Stores all data in one JSON document on disk.
///
/// A missing file loads as empty data. Paths ending in `.gz` are read and
/// written gzip-compressed.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_gzipped(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "gz")
            .unwrap_or(false)
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Data> {
        if !self.path.exists() {
            return Ok(Data::new());
        }

        let content = self.read_contents()?;
        if content.trim().is_empty() {
            return Ok(Data::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file {}", self.path.display()))
    }

    fn save(&self, data: &Data) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create data directory")?;
            }
        }

        let json = serde_json::to_string(data).context("Failed to serialize list data")?;
        self.replace_contents(json.as_bytes())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

impl JsonFileStore {
    fn read_contents(&self) -> Result<String> {
        let mut content = String::new();
        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open data file {}", self.path.display()))?;
        if self.is_gzipped() {
            GzDecoder::new(file)
                .read_to_string(&mut content)
                .context("Data file is not valid gzip")?;
        } else {
            BufReader::new(file)
                .read_to_string(&mut content)
                .context("Failed to read data file")?;
        }
        Ok(content)
    }

    /// Stages the bytes in a sibling `.tmp` file, then renames it over the
    /// data file. The data file is never partially written.
    fn replace_contents(&self, bytes: &[u8]) -> Result<()> {
        let staging = self.path.with_extension("tmp");
        let file = fs::File::create(&staging)
            .with_context(|| format!("Failed to stage data file {}", staging.display()))?;

        if self.is_gzipped() {
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(bytes).context("Failed to compress list data")?;
            encoder.finish().context("Failed to compress list data")?;
        } else {
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes).context("Failed to write list data")?;
            writer.flush().context("Failed to write list data")?;
        }

        fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to replace data file {}", self.path.display()))
    }
}

/// Keeps data in memory only. Useful for tests and for hosts that persist
/// through their own channel.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<Data>,
}

impl MemoryStore {
    pub fn new(data: Data) -> Self {
        Self {
            data: RefCell::new(data),
        }
    }

    /// A copy of what was last saved.
    pub fn snapshot(&self) -> Data {
        self.data.borrow().clone()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Data> {
        Ok(self.data.borrow().clone())
    }

    fn save(&self, data: &Data) -> Result<()> {
        *self.data.borrow_mut() = data.clone();
        Ok(())
    }
}
