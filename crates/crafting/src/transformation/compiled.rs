use crate::elements::{Item, ItemStack};
use crate::error::ConfigurationError;
use crate::state::{CraftingState, StateShape};
use crate::world::World;

use super::{ChangeKind, InventoryChanges, InventoryOwner, Transformation};

/// Value of a `max` slot that carries no cap.
pub const UNBOUNDED: i64 = i64::MAX;

/// Fixed-length vectors of one owner, indexed by world slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerOps {
    add: Vec<i64>,
    remove: Vec<i64>,
    max: Vec<i64>,
    delta: Vec<i64>,
    caps: Vec<i64>,
    has_requirements: bool,
}

impl OwnerOps {
    fn compile(
        changes: &InventoryChanges,
        len: usize,
        slot_of: impl Fn(&Item) -> Result<usize, ConfigurationError>,
    ) -> Result<Self, ConfigurationError> {
        let add = quantities(changes.stacks(ChangeKind::Add), len, 0, &slot_of)?;
        let remove = quantities(changes.stacks(ChangeKind::Remove), len, 0, &slot_of)?;
        let max = quantities(changes.stacks(ChangeKind::Max), len, UNBOUNDED, &slot_of)?;

        let delta = add.iter().zip(&remove).map(|(a, r)| a - r).collect();
        let caps = max
            .iter()
            .zip(&add)
            .map(|(&cap, &added)| if cap == UNBOUNDED { UNBOUNDED } else { cap - added })
            .collect::<Vec<_>>();
        let has_requirements =
            remove.iter().any(|&amount| amount > 0) || caps.iter().any(|&cap| cap != UNBOUNDED);

        Ok(Self {
            add,
            remove,
            max,
            delta,
            caps,
            has_requirements,
        })
    }

    pub fn add(&self) -> &[i64] {
        &self.add
    }

    pub fn remove(&self) -> &[i64] {
        &self.remove
    }

    /// Declared caps; [`UNBOUNDED`] where no cap applies.
    pub fn max(&self) -> &[i64] {
        &self.max
    }

    pub fn has_requirements(&self) -> bool {
        self.has_requirements
    }

    /// `inventory >= remove` and `inventory <= max - add` on every slot.
    pub fn is_satisfied_by(&self, inventory: &[i64]) -> bool {
        if !self.has_requirements {
            return true;
        }
        inventory
            .iter()
            .zip(&self.remove)
            .zip(&self.caps)
            .all(|((&amount, &removed), &cap)| amount >= removed && amount <= cap)
    }

    /// Quantities saturate at the `i64` bounds.
    pub fn apply_to(&self, inventory: &mut [i64]) {
        for (amount, &delta) in inventory.iter_mut().zip(&self.delta) {
            *amount = amount.saturating_add(delta);
        }
    }
}

fn quantities(
    stacks: &[ItemStack],
    len: usize,
    fill: i64,
    slot_of: &impl Fn(&Item) -> Result<usize, ConfigurationError>,
) -> Result<Vec<i64>, ConfigurationError> {
    let mut values = vec![fill; len];
    for stack in stacks {
        values[slot_of(&stack.item)?] = i64::from(stack.quantity);
    }
    Ok(values)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOps {
    pub zone_slot: usize,
    pub ops: OwnerOps,
}

/// World-bound form of a [`Transformation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTransformation {
    shape: StateShape,
    player: Option<OwnerOps>,
    current: Option<OwnerOps>,
    destination_ops: Option<OwnerOps>,
    zones_ops: Vec<ZoneOps>,
    zones: Option<Vec<i64>>,
    destination: Option<Vec<i64>>,
    destination_slot: Option<usize>,
}

impl CompiledTransformation {
    pub(super) fn compile(
        transformation: &Transformation,
        world: &World,
    ) -> Result<Self, ConfigurationError> {
        let shape = StateShape::of(world);
        let needs_zones = transformation.zones.is_some()
            || transformation.destination.is_some()
            || !transformation.current.is_empty()
            || !transformation.zones_changes.is_empty();
        if needs_zones && shape.n_zones == 0 {
            return Err(ConfigurationError::WorldHasNoZones);
        }

        let player_slot = |item: &Item| world.item_slot(item);
        let zone_item_slot = |item: &Item| world.zone_item_slot(item);

        let mut player = None;
        let mut current = None;
        let mut destination_ops = None;
        let mut zones_ops = Vec::new();
        for (owner, changes) in transformation.declared_changes() {
            match owner {
                InventoryOwner::Player => {
                    player = Some(OwnerOps::compile(changes, shape.n_items, player_slot)?);
                }
                InventoryOwner::Current => {
                    current = Some(OwnerOps::compile(
                        changes,
                        shape.n_zones_items,
                        zone_item_slot,
                    )?);
                }
                InventoryOwner::Destination => {
                    destination_ops = Some(OwnerOps::compile(
                        changes,
                        shape.n_zones_items,
                        zone_item_slot,
                    )?);
                }
                InventoryOwner::Zone(zone) => zones_ops.push(ZoneOps {
                    zone_slot: world.zone_slot(&zone)?,
                    ops: OwnerOps::compile(changes, shape.n_zones_items, zone_item_slot)?,
                }),
            }
        }

        let zones = match &transformation.zones {
            Some(allowed) => {
                let mut mask = vec![0; shape.n_zones];
                for zone in allowed {
                    mask[world.zone_slot(zone)?] = 1;
                }
                Some(mask)
            }
            None => None,
        };

        let destination_slot = transformation
            .destination
            .as_ref()
            .map(|zone| world.zone_slot(zone))
            .transpose()?;
        let destination = destination_slot.map(|slot| {
            let mut one_hot = vec![0; shape.n_zones];
            one_hot[slot] = 1;
            one_hot
        });

        Ok(Self {
            shape,
            player,
            current,
            destination_ops,
            zones_ops,
            zones,
            destination,
            destination_slot,
        })
    }

    pub fn shape(&self) -> StateShape {
        self.shape
    }

    pub fn player(&self) -> Option<&OwnerOps> {
        self.player.as_ref()
    }

    pub fn current(&self) -> Option<&OwnerOps> {
        self.current.as_ref()
    }

    pub fn destination_ops(&self) -> Option<&OwnerOps> {
        self.destination_ops.as_ref()
    }

    pub fn zones_ops(&self) -> &[ZoneOps] {
        &self.zones_ops
    }

    /// Indicator of the zones the transformation may be invoked from.
    pub fn zones(&self) -> Option<&[i64]> {
        self.zones.as_deref()
    }

    /// One-hot of the destination zone.
    pub fn destination(&self) -> Option<&[i64]> {
        self.destination.as_deref()
    }

    pub fn destination_slot(&self) -> Option<usize> {
        self.destination_slot
    }

    pub(super) fn is_valid(&self, state: &CraftingState) -> bool {
        let current_slot = state.current_zone_slot();

        if let Some(mask) = &self.zones {
            let allowed = state
                .position()
                .iter()
                .zip(mask)
                .any(|(&here, &allowed)| here > 0 && allowed > 0);
            if !allowed {
                return false;
            }
        }

        if let Some(destination_slot) = self.destination_slot {
            if current_slot == Some(destination_slot) {
                return false;
            }
        }

        if let Some(ops) = &self.player {
            if !ops.is_satisfied_by(state.player_inventory()) {
                return false;
            }
        }

        if let Some(ops) = &self.current {
            match current_slot {
                Some(slot) if ops.is_satisfied_by(state.zone_inventory(slot)) => {}
                _ => return false,
            }
        }

        if let (Some(ops), Some(slot)) = (&self.destination_ops, self.destination_slot) {
            if !ops.is_satisfied_by(state.zone_inventory(slot)) {
                return false;
            }
        }

        self.zones_ops
            .iter()
            .all(|zone| zone.ops.is_satisfied_by(state.zone_inventory(zone.zone_slot)))
    }

    pub(super) fn apply(&self, state: &mut CraftingState) {
        let current_slot = state.current_zone_slot();

        if let Some(ops) = &self.player {
            ops.apply_to(state.player_inventory_mut());
        }

        if let (Some(ops), Some(slot)) = (&self.current, current_slot) {
            ops.apply_to(state.zone_inventory_mut(slot));
        }

        if let Some(slot) = self.destination_slot {
            if let Some(ops) = &self.destination_ops {
                ops.apply_to(state.zone_inventory_mut(slot));
            }
            state.move_to(slot);
        }

        for zone in &self.zones_ops {
            zone.ops.apply_to(state.zone_inventory_mut(zone.zone_slot));
        }
    }
}
