use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::error::{ConfigurationError, TransformationError};
use crate::state::CraftingState;
use crate::transformation::Transformation;
use crate::world::World;

/// Stable index of a transformation inside a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u32);

impl ActionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize, count: usize) -> Result<Self, CatalogError> {
        u32::try_from(index)
            .map(Self)
            .map_err(|_| CatalogError::TooManyTransformations { count })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    /// The action exists but its requirements do not hold; the state is untouched.
    Invalid,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Configuration(ConfigurationError),
    #[error("failed to build transformation '{name}': {source}")]
    Build {
        name: String,
        #[source]
        source: ConfigurationError,
    },
    #[error("action {} is out of range; the catalog holds {count} transformations", .action.0)]
    UnknownAction { action: ActionId, count: usize },
    #[error("catalog holds {count} transformations; action ids stop at {}", u32::MAX)]
    TooManyTransformations { count: usize },
    #[error(transparent)]
    Transformation(#[from] TransformationError),
}

/// A world together with its transformations, built and enumerated in a fixed order.
#[derive(Debug, Clone)]
pub struct Catalog {
    world: World,
    transformations: Vec<Transformation>,
    ids_by_name: HashMap<String, ActionId>,
}

impl Catalog {
    pub fn new(
        world: World,
        mut transformations: Vec<Transformation>,
    ) -> Result<Self, CatalogError> {
        let count = transformations.len();
        let mut ids_by_name = HashMap::with_capacity(count);
        for (idx, transformation) in transformations.iter_mut().enumerate() {
            let id = ActionId::from_index(idx, count)?;
            transformation
                .build(&world)
                .map_err(|source| CatalogError::Build {
                    name: transformation.name(),
                    source,
                })?;
            ids_by_name
                .entry(transformation.name())
                .or_insert(id);
        }

        info!(
            transformations = transformations.len(),
            items = world.n_items(),
            zones = world.n_zones(),
            zones_items = world.n_zones_items(),
            "catalog_built"
        );

        Ok(Self {
            world,
            transformations,
            ids_by_name,
        })
    }

    /// Infers the world from the transformations, then builds them against it.
    pub fn from_transformations(transformations: Vec<Transformation>) -> Result<Self, CatalogError> {
        let world = World::from_transformations(&transformations).map_err(CatalogError::Configuration)?;
        Self::new(world, transformations)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    pub fn get(&self, action: ActionId) -> Option<&Transformation> {
        self.transformations.get(action.index())
    }

    /// First transformation whose name is `name`.
    pub fn find(&self, name: &str) -> Option<ActionId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn new_state(&self) -> CraftingState {
        CraftingState::new(&self.world)
    }

    /// Validity of every action in catalog order.
    pub fn actions_mask(&self, state: &CraftingState) -> Result<Vec<bool>, CatalogError> {
        self.transformations
            .iter()
            .map(|transformation| Ok(transformation.is_valid(state)?))
            .collect()
    }

    pub fn step(
        &self,
        state: &mut CraftingState,
        action: ActionId,
    ) -> Result<StepOutcome, CatalogError> {
        let transformation = self.get(action).ok_or(CatalogError::UnknownAction {
            action,
            count: self.transformations.len(),
        })?;
        if !transformation.is_valid(state)? {
            debug!(
                action = action.0,
                name = %transformation.name(),
                "step_invalid_action"
            );
            return Ok(StepOutcome::Invalid);
        }
        transformation.apply(state)?;
        Ok(StepOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Item, ItemStack, Zone};
    use crate::transformation::InventoryOwner;

    fn catalog() -> Catalog {
        let wood = Item::new("wood");
        let plank = Item::new("plank");
        let tree = Item::new("tree");
        let transformations = vec![
            Transformation::builder()
                .name("chop")
                .zones([Zone::new("forest")])
                .remove(InventoryOwner::Current, [tree.clone()])
                .add(InventoryOwner::Player, [wood.clone()])
                .build()
                .expect("chop"),
            Transformation::builder()
                .name("saw")
                .remove(InventoryOwner::Player, [wood])
                .add(InventoryOwner::Player, [ItemStack::new(plank, 4)])
                .build()
                .expect("saw"),
            Transformation::builder()
                .name("walk")
                .destination(Zone::new("meadow"))
                .build()
                .expect("walk"),
        ];
        let world = World::builder()
            .with_transformations(&transformations)
            .start_zone_items(Zone::new("forest"), [ItemStack::new(tree, 1)])
            .build()
            .expect("world");
        Catalog::new(world, transformations).expect("catalog")
    }

    #[test]
    fn names_resolve_to_stable_ids() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find("saw"), Some(ActionId(1)));
        assert_eq!(catalog.find("fly"), None);
        let walk = catalog.get(ActionId(2)).expect("walk");
        assert_eq!(walk.to_string(), "> | meadow");
    }

    #[test]
    fn step_applies_valid_actions_and_skips_invalid_ones() {
        let catalog = catalog();
        let mut state = catalog.new_state();
        assert_eq!(
            catalog.actions_mask(&state).expect("mask"),
            vec![true, false, true]
        );

        assert_eq!(
            catalog.step(&mut state, ActionId(1)).expect("saw"),
            StepOutcome::Invalid
        );
        assert_eq!(state, catalog.new_state());

        assert_eq!(
            catalog.step(&mut state, ActionId(0)).expect("chop"),
            StepOutcome::Applied
        );
        assert_eq!(
            catalog.step(&mut state, ActionId(1)).expect("saw"),
            StepOutcome::Applied
        );
        let plank = catalog
            .world()
            .item_slot(&Item::new("plank"))
            .expect("plank slot");
        assert_eq!(state.player_inventory()[plank], 4);
        assert_eq!(
            catalog.actions_mask(&state).expect("mask"),
            vec![false, false, true]
        );
    }

    #[test]
    fn unknown_action_is_an_error() {
        let catalog = catalog();
        let mut state = catalog.new_state();
        let err = catalog.step(&mut state, ActionId(7)).expect_err("unknown");
        assert!(matches!(
            err,
            CatalogError::UnknownAction { action: ActionId(7), count: 3 }
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn action_ids_past_u32_are_rejected() {
        let last = u32::MAX as usize;
        assert_eq!(
            ActionId::from_index(last, last + 1).expect("last id"),
            ActionId(u32::MAX)
        );
        let err = ActionId::from_index(last + 1, last + 2).expect_err("overflow");
        assert!(matches!(
            err,
            CatalogError::TooManyTransformations { count } if count == last + 2
        ));
    }

    #[test]
    fn build_failures_name_the_transformation() {
        let world = World::new([Item::new("a")], [Zone::new("z")], []).expect("world");
        let broken = Transformation::builder()
            .name("broken")
            .add(InventoryOwner::Player, [Item::new("missing")])
            .build()
            .expect("declare");
        let err = Catalog::new(world, vec![broken]).expect_err("build");
        assert!(matches!(err, CatalogError::Build { ref name, .. } if name == "broken"));
    }

    #[test]
    fn inferred_catalog_starts_in_first_zone() {
        let catalog = Catalog::from_transformations(vec![Transformation::builder()
            .destination(Zone::new("cave"))
            .zones([Zone::new("camp")])
            .build()
            .expect("walk")])
        .expect("catalog");
        assert_eq!(catalog.world().start_zone(), Some(&Zone::new("camp")));
        let mut state = catalog.new_state();
        assert_eq!(
            catalog.step(&mut state, ActionId(0)).expect("walk"),
            StepOutcome::Applied
        );
        assert_eq!(state.position(), &[0, 1]);
    }
}
