pub mod toml_loader;

pub use toml_loader::{load_all_snapshots, load_snapshot_from_toml, LoadedSnapshot};
