use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod atomic_io;
pub mod catalog;
pub mod content;
pub mod elements;
pub mod error;
mod hashing;
pub mod minecraft;
pub mod snapshot;
pub mod state;
pub mod transformation;
pub mod world;

pub use catalog::{ActionId, Catalog, CatalogError, StepOutcome};
pub use content::{
    compile_catalog_dir, compile_catalog_file, compile_catalog_path, compile_catalog_str,
    ContentCompileError, ContentErrorCode, SourceLocation,
};
pub use elements::{EntityKey, Item, ItemStack, Zone};
pub use error::{ConfigurationError, StateError, TransformationError};
pub use hashing::world_layout_sha256_hex;
pub use minecraft::{minecraft_catalog, minecraft_transformations};
pub use snapshot::{
    read_snapshot, write_snapshot_atomic, SnapshotError, StateSnapshot, SNAPSHOT_FORMAT_VERSION,
};
pub use state::{CraftingState, StateShape};
pub use transformation::{
    ChangeKind, CompiledTransformation, InventoryChanges, InventoryOwner, OwnerOps, Transformation,
    TransformationBuilder, ZoneOps, UNBOUNDED,
};
pub use world::{World, WorldBuilder};

/// Default location of the defs to load when no path is given on the command line.
pub const DEFS_ENV_VAR: &str = "CRAFTING_DEFS";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error(
        "defs path does not exist: {path}\n\
Point --defs or {env_var} at a defs .xml file or a directory of them."
    )]
    DefsNotFound {
        path: PathBuf,
        env_var: &'static str,
    },
}

/// Where the catalog comes from: an explicit path wins over [`DEFS_ENV_VAR`];
/// `None` means the bundled Minecraft catalog.
pub fn resolve_defs_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, StartupError> {
    let raw = match explicit {
        Some(path) => path.to_path_buf(),
        None => match env::var(DEFS_ENV_VAR) {
            Ok(value) if value.trim().is_empty() => return Ok(None),
            Ok(value) => PathBuf::from(value),
            Err(env::VarError::NotPresent) => return Ok(None),
            Err(source) => {
                return Err(StartupError::EnvVar {
                    var: DEFS_ENV_VAR,
                    source,
                })
            }
        },
    };

    if !raw.exists() {
        return Err(StartupError::DefsNotFound {
            path: raw,
            env_var: DEFS_ENV_VAR,
        });
    }
    Ok(Some(normalize_path(&raw)))
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
