//! Durable storage for position state and price history
//!
//! Every save rewrites the whole file: write a sibling temp file, fsync it,
//! then rename it over the target.

pub mod memory;
pub mod price_file;
pub mod state_file;

pub use memory::{MemorySeriesStore, MemoryStateStore};
pub use price_file::CsvSeriesStore;
pub use state_file::JsonStateStore;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::execution::PriceSeries;
use crate::models::PositionState;
use crate::Result;

/// Load/save of the strategy's position state
pub trait StateStore: Send + Sync {
    /// `None` when nothing has been stored yet
    fn load(&self) -> Result<Option<PositionState>>;

    fn save(&self, state: &PositionState) -> Result<()>;
}

/// Load/save of the observed price series
pub trait SeriesStore: Send + Sync {
    /// Missing or unreadable storage yields an empty series
    fn load(&self) -> PriceSeries;

    fn save(&self, series: &PriceSeries) -> Result<()>;
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace `path` with `contents` in one rename
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path(&path).exists());
    }
}
