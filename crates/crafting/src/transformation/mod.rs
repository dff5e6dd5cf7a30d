mod compiled;
mod display;

use std::fmt;

use crate::elements::{ItemStack, Zone};
use crate::error::{ConfigurationError, TransformationError};
use crate::state::CraftingState;
use crate::world::World;

pub use compiled::{CompiledTransformation, OwnerOps, ZoneOps, UNBOUNDED};

/// Whose inventory a change applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InventoryOwner {
    Player,
    /// The zone the player stands in when the transformation is evaluated.
    Current,
    /// The zone the transformation moves the player to.
    Destination,
    /// A specific zone, regardless of the player's position.
    Zone(Zone),
}

impl InventoryOwner {
    pub fn from_token(token: &str) -> Result<Self, ConfigurationError> {
        match token {
            "player" => Ok(Self::Player),
            "current_zone" => Ok(Self::Current),
            "destination" => Ok(Self::Destination),
            other => Err(ConfigurationError::MalformedOwner {
                token: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for InventoryOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Current => f.write_str("current_zone"),
            Self::Destination => f.write_str("destination"),
            Self::Zone(zone) => write!(f, "zone {}", zone.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Remove,
    /// Caps the quantity held after the add.
    Max,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 3] = [ChangeKind::Add, ChangeKind::Remove, ChangeKind::Max];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Max => "max",
        }
    }
}

/// Ordered add/remove/max stacks of one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryChanges {
    add: Vec<ItemStack>,
    remove: Vec<ItemStack>,
    max: Vec<ItemStack>,
}

impl InventoryChanges {
    pub fn stacks(&self, kind: ChangeKind) -> &[ItemStack] {
        match kind {
            ChangeKind::Add => &self.add,
            ChangeKind::Remove => &self.remove,
            ChangeKind::Max => &self.max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty() && self.max.is_empty()
    }

    fn stacks_mut(&mut self, kind: ChangeKind) -> &mut Vec<ItemStack> {
        match kind {
            ChangeKind::Add => &mut self.add,
            ChangeKind::Remove => &mut self.remove,
            ChangeKind::Max => &mut self.max,
        }
    }
}

/// Declarative inventory deltas plus an optional move, compiled against a [`World`]
/// by [`Transformation::build`].
#[derive(Debug, Clone)]
pub struct Transformation {
    name: Option<String>,
    destination: Option<Zone>,
    zones: Option<Vec<Zone>>,
    player: InventoryChanges,
    current: InventoryChanges,
    destination_changes: InventoryChanges,
    zones_changes: Vec<(Zone, InventoryChanges)>,
    compiled: Option<CompiledTransformation>,
}

impl Transformation {
    pub fn builder() -> TransformationBuilder {
        TransformationBuilder::default()
    }

    /// Explicit name, or the rendered form when none was given.
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.to_string(),
        }
    }

    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn destination(&self) -> Option<&Zone> {
        self.destination.as_ref()
    }

    /// Zones the transformation may be invoked from; `None` means anywhere.
    pub fn zones(&self) -> Option<&[Zone]> {
        self.zones.as_deref()
    }

    pub fn is_built(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn compiled(&self) -> Option<&CompiledTransformation> {
        self.compiled.as_ref()
    }

    /// Resolves every item and zone against `world` and precomputes the
    /// fixed-size vectors used by [`Self::is_valid`] and [`Self::apply`].
    ///
    /// Building again replaces the compiled form; the declarative changes are kept,
    /// so rebinding to another world is a fresh compile.
    pub fn build(&mut self, world: &World) -> Result<(), ConfigurationError> {
        self.compiled = Some(CompiledTransformation::compile(self, world)?);
        Ok(())
    }

    pub fn is_valid(&self, state: &CraftingState) -> Result<bool, TransformationError> {
        Ok(self.compiled_for(state)?.is_valid(state))
    }

    /// Applies the deltas in place. Does not re-check validity: applying a
    /// transformation for which [`Self::is_valid`] is false leaves the quantities
    /// in an unspecified (possibly negative) state.
    pub fn apply(&self, state: &mut CraftingState) -> Result<(), TransformationError> {
        self.compiled_for(state)?.apply(state);
        Ok(())
    }

    /// Declared stacks of `owner` for `kind`; empty when nothing was declared.
    pub fn get_changes(
        &self,
        owner: &InventoryOwner,
        kind: ChangeKind,
    ) -> Result<&[ItemStack], TransformationError> {
        if self.compiled.is_none() {
            return Err(self.not_built());
        }
        Ok(self
            .changes(owner)
            .map(|changes| changes.stacks(kind))
            .unwrap_or(&[]))
    }

    pub(crate) fn changes(&self, owner: &InventoryOwner) -> Option<&InventoryChanges> {
        let changes = match owner {
            InventoryOwner::Player => &self.player,
            InventoryOwner::Current => &self.current,
            InventoryOwner::Destination => &self.destination_changes,
            InventoryOwner::Zone(zone) => {
                return self
                    .zones_changes
                    .iter()
                    .find(|(candidate, _)| candidate == zone)
                    .map(|(_, changes)| changes)
            }
        };
        (!changes.is_empty()).then_some(changes)
    }

    /// Non-empty changes in owner order: player, current, destination, then
    /// explicit zones in declaration order.
    pub(crate) fn declared_changes(&self) -> Vec<(InventoryOwner, &InventoryChanges)> {
        let mut declared = Vec::new();
        for (owner, changes) in [
            (InventoryOwner::Player, &self.player),
            (InventoryOwner::Current, &self.current),
            (InventoryOwner::Destination, &self.destination_changes),
        ] {
            if !changes.is_empty() {
                declared.push((owner, changes));
            }
        }
        for (zone, changes) in &self.zones_changes {
            declared.push((InventoryOwner::Zone(zone.clone()), changes));
        }
        declared
    }

    fn compiled_for(
        &self,
        state: &CraftingState,
    ) -> Result<&CompiledTransformation, TransformationError> {
        let compiled = self.compiled.as_ref().ok_or_else(|| self.not_built())?;
        let expected = compiled.shape();
        let actual = state.shape();
        if expected != actual {
            return Err(TransformationError::ShapeMismatch {
                state_items: actual.n_items,
                state_zones: actual.n_zones,
                state_zone_items: actual.n_zones_items,
                world_items: expected.n_items,
                world_zones: expected.n_zones,
                world_zone_items: expected.n_zones_items,
            });
        }
        Ok(compiled)
    }

    fn not_built(&self) -> TransformationError {
        TransformationError::NotBuilt { name: self.name() }
    }
}

/// Collects inventory changes and validates them eagerly in [`Self::build`].
#[derive(Debug, Clone, Default)]
pub struct TransformationBuilder {
    name: Option<String>,
    destination: Option<Zone>,
    zones: Option<Vec<Zone>>,
    changes: Vec<(InventoryOwner, ChangeKind, Vec<ItemStack>)>,
}

impl TransformationBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn destination(mut self, zone: Zone) -> Self {
        self.destination = Some(zone);
        self
    }

    pub fn zones(mut self, zones: impl IntoIterator<Item = Zone>) -> Self {
        self.zones
            .get_or_insert_with(Vec::new)
            .extend(zones);
        self
    }

    pub fn add<S: Into<ItemStack>>(
        self,
        owner: InventoryOwner,
        stacks: impl IntoIterator<Item = S>,
    ) -> Self {
        self.change(owner, ChangeKind::Add, stacks)
    }

    pub fn remove<S: Into<ItemStack>>(
        self,
        owner: InventoryOwner,
        stacks: impl IntoIterator<Item = S>,
    ) -> Self {
        self.change(owner, ChangeKind::Remove, stacks)
    }

    pub fn max<S: Into<ItemStack>>(
        self,
        owner: InventoryOwner,
        stacks: impl IntoIterator<Item = S>,
    ) -> Self {
        self.change(owner, ChangeKind::Max, stacks)
    }

    pub fn change<S: Into<ItemStack>>(
        mut self,
        owner: InventoryOwner,
        kind: ChangeKind,
        stacks: impl IntoIterator<Item = S>,
    ) -> Self {
        let stacks = stacks.into_iter().map(Into::into).collect();
        self.changes.push((owner, kind, stacks));
        self
    }

    pub fn build(self) -> Result<Transformation, ConfigurationError> {
        let mut transformation = Transformation {
            name: self.name,
            destination: self.destination,
            zones: self.zones.filter(|zones| !zones.is_empty()),
            player: InventoryChanges::default(),
            current: InventoryChanges::default(),
            destination_changes: InventoryChanges::default(),
            zones_changes: Vec::new(),
            compiled: None,
        };

        for (owner, kind, stacks) in self.changes {
            let target = match &owner {
                InventoryOwner::Player => &mut transformation.player,
                InventoryOwner::Current => &mut transformation.current,
                InventoryOwner::Destination => &mut transformation.destination_changes,
                InventoryOwner::Zone(zone) => {
                    let index = match transformation
                        .zones_changes
                        .iter()
                        .position(|(candidate, _)| candidate == zone)
                    {
                        Some(index) => index,
                        None => {
                            transformation
                                .zones_changes
                                .push((zone.clone(), InventoryChanges::default()));
                            transformation.zones_changes.len() - 1
                        }
                    };
                    &mut transformation.zones_changes[index].1
                }
            };
            let list = target.stacks_mut(kind);
            for stack in stacks {
                if stack.quantity == 0 {
                    return Err(ConfigurationError::ZeroQuantity {
                        item: stack.item.name().to_string(),
                    });
                }
                if list.iter().any(|existing| existing.item == stack.item) {
                    return Err(ConfigurationError::DuplicateStack {
                        item: stack.item.name().to_string(),
                        kind: kind.as_str(),
                        owner: owner.to_string(),
                    });
                }
                list.push(stack);
            }
        }

        Ok(transformation)
    }
}
