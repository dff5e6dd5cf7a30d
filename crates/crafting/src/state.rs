use crate::error::StateError;
use crate::world::World;

/// Dimensions of the three state arrays, fixed by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateShape {
    pub n_items: usize,
    pub n_zones: usize,
    pub n_zones_items: usize,
}

impl StateShape {
    pub fn of(world: &World) -> Self {
        Self {
            n_items: world.n_items(),
            n_zones: world.n_zones(),
            n_zones_items: world.n_zones_items(),
        }
    }
}

/// Numeric simulation state.
///
/// * `player_inventory`: quantity of each item held by the player (`n_items`).
/// * `position`: one-hot over zones (`n_zones`), empty in a world without zones.
/// * `zones_inventories`: row-major `n_zones x n_zones_items` matrix.
///
/// Quantities are signed so that applying an unchecked transformation can be
/// observed instead of wrapping; a state reached only through valid transformations
/// never holds a negative quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftingState {
    shape: StateShape,
    player_inventory: Vec<i64>,
    position: Vec<i64>,
    zones_inventories: Vec<i64>,
}

impl CraftingState {
    /// Allocates a state for `world` already reset to its start configuration.
    pub fn new(world: &World) -> Self {
        let shape = StateShape::of(world);
        let mut state = Self {
            shape,
            player_inventory: vec![0; shape.n_items],
            position: vec![0; shape.n_zones],
            zones_inventories: vec![0; shape.n_zones * shape.n_zones_items],
        };
        state.reset(world);
        state
    }

    /// Builds a state from raw arrays, checking shape, one-hot position and signs.
    pub fn from_parts(
        shape: StateShape,
        player_inventory: Vec<i64>,
        position: Vec<i64>,
        zones_inventories: Vec<i64>,
    ) -> Result<Self, StateError> {
        check_len("player_inventory", &player_inventory, shape.n_items)?;
        check_len("position", &position, shape.n_zones)?;
        check_len(
            "zones_inventories",
            &zones_inventories,
            shape.n_zones * shape.n_zones_items,
        )?;
        check_non_negative("player_inventory", &player_inventory)?;
        check_non_negative("zones_inventories", &zones_inventories)?;

        let ones = position.iter().filter(|&&value| value == 1).count();
        let zeros = position.iter().filter(|&&value| value == 0).count();
        let one_hot = ones == 1 && ones + zeros == position.len();
        if !position.is_empty() && !one_hot {
            return Err(StateError::NotOneHot {
                position,
                n_zones: shape.n_zones,
            });
        }

        Ok(Self {
            shape,
            player_inventory,
            position,
            zones_inventories,
        })
    }

    /// Zero-fills every array, then seeds start zone and start inventories.
    ///
    /// Start stacks whose entities are missing from `world` are skipped; the world
    /// registers them at build time so this only happens when resetting with a
    /// different world than the one the state was allocated for.
    pub fn reset(&mut self, world: &World) {
        self.player_inventory.fill(0);
        self.position.fill(0);
        self.zones_inventories.fill(0);

        if let Some(slot) = world.start_zone_slot() {
            if let Some(cell) = self.position.get_mut(slot) {
                *cell = 1;
            }
        }
        for stack in world.start_items() {
            if let Ok(slot) = world.item_slot(&stack.item) {
                self.player_inventory[slot] += i64::from(stack.quantity);
            }
        }
        for (zone, stacks) in world.start_zones_items() {
            let Ok(zone_slot) = world.zone_slot(zone) else {
                continue;
            };
            for stack in stacks {
                if let Ok(item_slot) = world.zone_item_slot(&stack.item) {
                    self.zone_inventory_mut(zone_slot)[item_slot] += i64::from(stack.quantity);
                }
            }
        }
    }

    pub fn shape(&self) -> StateShape {
        self.shape
    }

    pub fn player_inventory(&self) -> &[i64] {
        &self.player_inventory
    }

    pub fn position(&self) -> &[i64] {
        &self.position
    }

    /// Row-major `n_zones x n_zones_items` matrix.
    pub fn zones_inventories(&self) -> &[i64] {
        &self.zones_inventories
    }

    pub fn zone_inventory(&self, zone_slot: usize) -> &[i64] {
        let width = self.shape.n_zones_items;
        &self.zones_inventories[zone_slot * width..(zone_slot + 1) * width]
    }

    pub fn current_zone_slot(&self) -> Option<usize> {
        self.position.iter().position(|&value| value > 0)
    }

    pub fn current_zone_inventory(&self) -> Option<&[i64]> {
        self.current_zone_slot()
            .map(|slot| self.zone_inventory(slot))
    }

    /// Flat observation: player inventory, position, current zone inventory.
    pub fn observation(&self) -> Vec<i64> {
        let mut observation = Vec::with_capacity(
            self.shape.n_items + self.shape.n_zones + self.shape.n_zones_items,
        );
        observation.extend_from_slice(&self.player_inventory);
        observation.extend_from_slice(&self.position);
        match self.current_zone_inventory() {
            Some(inventory) => observation.extend_from_slice(inventory),
            None => observation.extend(std::iter::repeat(0).take(self.shape.n_zones_items)),
        }
        observation
    }

    pub(crate) fn player_inventory_mut(&mut self) -> &mut [i64] {
        &mut self.player_inventory
    }

    pub(crate) fn zone_inventory_mut(&mut self, zone_slot: usize) -> &mut [i64] {
        let width = self.shape.n_zones_items;
        &mut self.zones_inventories[zone_slot * width..(zone_slot + 1) * width]
    }

    pub(crate) fn move_to(&mut self, zone_slot: usize) {
        self.position.fill(0);
        self.position[zone_slot] = 1;
    }
}

fn check_len(array: &'static str, values: &[i64], expected: usize) -> Result<(), StateError> {
    if values.len() != expected {
        return Err(StateError::WrongLength {
            array,
            actual: values.len(),
            expected,
        });
    }
    Ok(())
}

fn check_non_negative(array: &'static str, values: &[i64]) -> Result<(), StateError> {
    match values.iter().position(|&value| value < 0) {
        Some(index) => Err(StateError::NegativeQuantity {
            array,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}
