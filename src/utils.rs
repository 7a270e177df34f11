use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

pub const DATASET_FILE: &str = "hackathons.json";
pub const INDIA_DATASET_FILE: &str = "hackathons_india.json";
pub const TIMESTAMP_FILE: &str = "last_update.txt";

pub fn dataset_path(root: &Path) -> PathBuf {
    root.join(DATASET_FILE)
}

pub fn india_dataset_path(root: &Path) -> PathBuf {
    root.join(INDIA_DATASET_FILE)
}

pub fn timestamp_path(root: &Path) -> PathBuf {
    root.join(TIMESTAMP_FILE)
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
