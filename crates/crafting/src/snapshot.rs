use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::atomic_io::write_text_atomic;
use crate::error::StateError;
use crate::hashing::world_layout_sha256_hex;
use crate::state::{CraftingState, StateShape};
use crate::world::World;

pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("unsupported snapshot format version {found}; expected {expected}")]
    UnsupportedVersion { found: u16, expected: u16 },
    #[error("snapshot was taken in a different world layout (snapshot={found}, world={expected})")]
    LayoutMismatch { found: String, expected: String },
    #[error("snapshot shape {found:?} does not match world shape {expected:?}")]
    ShapeMismatch {
        found: StateShape,
        expected: StateShape,
    },
    #[error(transparent)]
    State(#[from] StateError),
}

/// Persisted form of a [`CraftingState`], bound to the world layout it was taken in.
///
/// Zone inventories are stored one row per zone slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub format_version: u16,
    pub world_layout_sha256_hex: String,
    pub n_items: usize,
    pub n_zones: usize,
    pub n_zones_items: usize,
    pub player_inventory: Vec<i64>,
    pub position: Vec<i64>,
    pub zones_inventories: Vec<Vec<i64>>,
}

impl StateSnapshot {
    pub fn capture(world: &World, state: &CraftingState) -> Result<Self, SnapshotError> {
        let shape = state.shape();
        ensure_shape(shape, StateShape::of(world))?;
        Ok(Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            world_layout_sha256_hex: world_layout_sha256_hex(world),
            n_items: shape.n_items,
            n_zones: shape.n_zones,
            n_zones_items: shape.n_zones_items,
            player_inventory: state.player_inventory().to_vec(),
            position: state.position().to_vec(),
            zones_inventories: (0..shape.n_zones)
                .map(|slot| state.zone_inventory(slot).to_vec())
                .collect(),
        })
    }

    /// Rebuilds the state, refusing snapshots taken in another world layout.
    pub fn restore(&self, world: &World) -> Result<CraftingState, SnapshotError> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        let expected_layout = world_layout_sha256_hex(world);
        if self.world_layout_sha256_hex != expected_layout {
            return Err(SnapshotError::LayoutMismatch {
                found: self.world_layout_sha256_hex.clone(),
                expected: expected_layout,
            });
        }
        let shape = StateShape {
            n_items: self.n_items,
            n_zones: self.n_zones,
            n_zones_items: self.n_zones_items,
        };
        ensure_shape(shape, StateShape::of(world))?;

        let mut zones_inventories = Vec::with_capacity(shape.n_zones * shape.n_zones_items);
        for row in &self.zones_inventories {
            if row.len() != shape.n_zones_items {
                return Err(StateError::WrongLength {
                    array: "zones_inventories row",
                    actual: row.len(),
                    expected: shape.n_zones_items,
                }
                .into());
            }
            zones_inventories.extend_from_slice(row);
        }

        Ok(CraftingState::from_parts(
            shape,
            self.player_inventory.clone(),
            self.position.clone(),
            zones_inventories,
        )?)
    }
}

pub fn write_snapshot_atomic(
    path: &Path,
    world: &World,
    state: &CraftingState,
) -> Result<(), SnapshotError> {
    let snapshot = StateSnapshot::capture(world, state)?;
    let text = serde_json::to_string_pretty(&snapshot).map_err(SnapshotError::Encode)?;
    write_text_atomic(path, &text).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        world_layout = %snapshot.world_layout_sha256_hex,
        "snapshot_written"
    );
    Ok(())
}

pub fn read_snapshot(path: &Path, world: &World) -> Result<CraftingState, SnapshotError> {
    let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot =
        serde_json::from_str::<StateSnapshot>(&raw).map_err(|source| SnapshotError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    let state = snapshot.restore(world)?;
    info!(path = %path.display(), "snapshot_loaded");
    Ok(state)
}

fn ensure_shape(found: StateShape, expected: StateShape) -> Result<(), SnapshotError> {
    if found != expected {
        return Err(SnapshotError::ShapeMismatch { found, expected });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::elements::{Item, ItemStack, Zone};

    fn world() -> World {
        World::builder()
            .items([Item::new("wood"), Item::new("stone")])
            .zones([Zone::new("forest"), Zone::new("cave")])
            .zones_items([Item::new("tree")])
            .start_zone(Zone::new("cave"))
            .start_items([ItemStack::new(Item::new("wood"), 3)])
            .start_zone_items(Zone::new("forest"), [ItemStack::new(Item::new("tree"), 5)])
            .build()
            .expect("world")
    }

    #[test]
    fn snapshot_survives_a_disk_round_trip() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("saves").join("state.json");
        let world = world();
        let state = CraftingState::new(&world);

        write_snapshot_atomic(&path, &world, &state).expect("write");
        let restored = read_snapshot(&path, &world).expect("read");
        assert_eq!(restored, state);

        let raw = fs::read_to_string(&path).expect("raw");
        let snapshot = serde_json::from_str::<StateSnapshot>(&raw).expect("json");
        assert_eq!(snapshot.zones_inventories, vec![vec![5], vec![0]]);
        assert_eq!(snapshot.position, vec![0, 1]);
    }

    #[test]
    fn other_world_layout_is_rejected() {
        let world = world();
        let snapshot = StateSnapshot::capture(&world, &CraftingState::new(&world)).expect("capture");
        let reordered = World::new(
            [Item::new("stone"), Item::new("wood")],
            [Zone::new("forest"), Zone::new("cave")],
            [Item::new("tree")],
        )
        .expect("reordered");
        let err = snapshot.restore(&reordered).expect_err("layout");
        assert!(matches!(err, SnapshotError::LayoutMismatch { .. }));
    }

    #[test]
    fn tampered_snapshot_fails_state_checks() {
        let world = world();
        let mut snapshot =
            StateSnapshot::capture(&world, &CraftingState::new(&world)).expect("capture");
        snapshot.position = vec![1, 1];
        assert!(matches!(
            snapshot.restore(&world),
            Err(SnapshotError::State(StateError::NotOneHot { .. }))
        ));

        snapshot.position = vec![1, 0];
        snapshot.zones_inventories[1] = vec![0, 0];
        assert!(matches!(
            snapshot.restore(&world),
            Err(SnapshotError::State(StateError::WrongLength { .. }))
        ));

        snapshot.zones_inventories[1] = vec![0];
        snapshot.format_version = 99;
        assert!(matches!(
            snapshot.restore(&world),
            Err(SnapshotError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("state.json");
        fs::write(&path, "{ not json").expect("write");
        let err = read_snapshot(&path, &world()).expect_err("decode");
        assert!(matches!(err, SnapshotError::Decode { .. }));
    }
}
