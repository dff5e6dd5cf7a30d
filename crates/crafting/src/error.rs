use thiserror::Error;

use crate::elements::EntityKey;

/// Fatal problems detected while declaring or binding worlds and transformations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown inventory owner '{token}'; expected player, current_zone or destination")]
    MalformedOwner { token: String },
    #[error("item {key} is not registered in the world")]
    UnknownItem { key: EntityKey },
    #[error("zone item {key} is not registered in the world")]
    UnknownZoneItem { key: EntityKey },
    #[error("zone {key} is not registered in the world")]
    UnknownZone { key: EntityKey },
    #[error("{kind} {key} registered under conflicting names '{first}' and '{second}'")]
    ConflictingName {
        kind: &'static str,
        key: EntityKey,
        first: String,
        second: String,
    },
    #[error("stack of {item} has quantity 0; quantities must be >= 1")]
    ZeroQuantity { item: String },
    #[error("item {item} appears more than once in the same {kind} list of {owner}")]
    DuplicateStack {
        item: String,
        kind: &'static str,
        owner: String,
    },
    #[error("zone-scoped requirements cannot be bound to a world without zones")]
    WorldHasNoZones,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformationError {
    #[error("transformation '{name}' was used before build(world)")]
    NotBuilt { name: String },
    #[error(
        "state shape (items={state_items}, zones={state_zones}, zone_items={state_zone_items}) \
does not match the world the transformation was built for \
(items={world_items}, zones={world_zones}, zone_items={world_zone_items})"
    )]
    ShapeMismatch {
        state_items: usize,
        state_zones: usize,
        state_zone_items: usize,
        world_items: usize,
        world_zones: usize,
        world_zone_items: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("{array} has length {actual}, expected {expected}")]
    WrongLength {
        array: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("position must be one-hot over {n_zones} zones, got {position:?}")]
    NotOneHot { position: Vec<i64>, n_zones: usize },
    #[error("{array} holds a negative quantity {value} at index {index}")]
    NegativeQuantity {
        array: &'static str,
        index: usize,
        value: i64,
    },
}
