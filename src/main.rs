use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use quickmarks::codec::{Editor, FileCodec, ListItem, Position};
use quickmarks::config::{Config, Settings};
use quickmarks::events::Listener;
use quickmarks::store::JsonFileStore;
use quickmarks::{Lifecycle, Registry, SelectOptions};

/// Quickmarks - named, ordered file bookmarks
#[derive(Parser)]
#[command(name = "quickmarks")]
#[command(version)]
#[command(about = "Keep named, ordered lists of file marks per project", long_about = None)]
struct Cli {
    /// List to operate on (omit for the default list)
    #[arg(short, long, global = true)]
    list: Option<String>,

    /// Session key (default: the current directory)
    #[arg(short, long, global = true)]
    key: Option<String>,

    /// Data file, overriding the configured one
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mark a file position
    Add {
        path: String,
        #[arg(long, default_value_t = 1)]
        row: usize,
        #[arg(long, default_value_t = 0)]
        col: usize,
        /// Insert at the top instead of the bottom
        #[arg(long)]
        prepend: bool,
    },
    /// Remove the mark for a file
    Rm { path: String },
    /// Remove the mark at a position
    RmAt { index: usize },
    /// Show the list
    Ls,
    /// Open the mark at a position
    Select {
        index: usize,
        #[arg(long)]
        vsplit: bool,
        #[arg(long)]
        split: bool,
        #[arg(long)]
        tabedit: bool,
    },
    /// Open the mark after the current one
    Next {
        /// Position of the current mark; each run starts from mark 1 otherwise
        #[arg(long, default_value_t = 1)]
        from: usize,
        #[arg(long)]
        wrap: bool,
    },
    /// Open the mark before the current one
    Prev {
        /// Position of the current mark; each run starts from mark 1 otherwise
        #[arg(long, default_value_t = 1)]
        from: usize,
        #[arg(long)]
        wrap: bool,
    },
    /// Move a mark to another position
    Move { from: usize, to: usize },
    /// Remove every mark in the list
    Clear,
    /// Rewrite the list to follow the given file order
    SyncBuffers { paths: Vec<String> },
    /// Show where data is stored
    Info,
}

/// Stands in for the host editor: the "current buffer" is whatever the
/// command names, and navigating prints the target.
struct CliEditor {
    key: String,
    buffer: RefCell<Option<String>>,
    cursor: Cell<Position>,
}

impl Editor for CliEditor {
    fn session_key(&self) -> String {
        self.key.clone()
    }

    fn current_buffer(&self) -> Option<String> {
        self.buffer.borrow().clone()
    }

    fn cursor(&self) -> Position {
        self.cursor.get()
    }

    fn navigate(&self, path: &str, position: Position, options: &SelectOptions) -> bool {
        let how = if options.vsplit {
            "vsplit "
        } else if options.split {
            "split "
        } else if options.tabedit {
            "tabedit "
        } else {
            ""
        };
        println!("{}{}:{}:{}", how, path, position.row, position.col);
        true
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut settings = Settings::load();
    if let Some(data) = cli.data {
        settings.data_path = Some(data);
    }
    let data_path = settings
        .resolved_data_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

    let key = match cli.key {
        Some(key) => key,
        None => std::env::current_dir()
            .context("Failed to read current directory")?
            .display()
            .to_string(),
    };

    let editor = Rc::new(CliEditor {
        key,
        buffer: RefCell::new(None),
        cursor: Cell::new(Position::default()),
    });

    let config: Config<ListItem> =
        Config::new(Rc::new(FileCodec::new(editor.clone()))).with_settings(settings);
    let key_editor = Rc::clone(&editor);
    let mut registry = Registry::new(
        config,
        Box::new(JsonFileStore::new(data_path)),
        move || key_editor.session_key(),
    )?;
    registry.extend(Listener::logger());

    let name = cli.list.as_deref();
    let mut nav = registry.nav_options();

    match cli.command {
        Command::Add {
            path,
            row,
            col,
            prepend,
        } => {
            *editor.buffer.borrow_mut() = Some(path);
            editor.cursor.set(Position { row, col });
            let list = registry.list(name);
            if prepend {
                list.prepend(None);
            } else {
                list.append(None);
            }
            registry.on_lifecycle(Lifecycle::BufLeave)?;
        }
        Command::Rm { path } => {
            registry
                .list(name)
                .remove(Some(ListItem::new(path, Position::default())));
        }
        Command::RmAt { index } => {
            registry.list(name).remove_at(index);
        }
        Command::Ls => {
            let list = registry.ui_opened(name);
            for (i, item) in list.items().iter().enumerate() {
                println!(
                    "{:>3}  {}:{}:{}",
                    i + 1,
                    item.value,
                    item.context.row,
                    item.context.col
                );
            }
        }
        Command::Select {
            index,
            vsplit,
            split,
            tabedit,
        } => {
            let options = SelectOptions {
                vsplit,
                split,
                tabedit,
            };
            registry.list(name).select(index, &options);
        }
        Command::Next { from, wrap } => {
            nav.ui_nav_wrap |= wrap;
            registry.list(name).set_cursor(from).next(&nav);
        }
        Command::Prev { from, wrap } => {
            nav.ui_nav_wrap |= wrap;
            registry.list(name).set_cursor(from).prev(&nav);
        }
        Command::Move { from, to } => {
            registry.list(name).move_to(from, to);
        }
        Command::Clear => {
            registry.list(name).clear();
        }
        Command::SyncBuffers { paths } => {
            registry.list(name).reconcile(&paths);
        }
        Command::Info => {
            let info = registry.info();
            match info.data_path {
                Some(path) => println!("data: {}", path.display()),
                None => println!("data: (memory)"),
            }
            println!("default list: {}", info.default_list_name);
            return Ok(());
        }
    }

    registry.on_lifecycle(Lifecycle::Exit)
}
