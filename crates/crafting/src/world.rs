use std::collections::HashMap;

use crate::elements::{EntityKey, Item, ItemStack, Zone};
use crate::error::ConfigurationError;
use crate::transformation::{ChangeKind, InventoryOwner, Transformation};

trait Registrable: Clone {
    const KIND: &'static str;
    fn key(&self) -> &EntityKey;
    fn name(&self) -> &str;
}

impl Registrable for Item {
    const KIND: &'static str = "item";

    fn key(&self) -> &EntityKey {
        Item::key(self)
    }

    fn name(&self) -> &str {
        Item::name(self)
    }
}

impl Registrable for Zone {
    const KIND: &'static str = "zone";

    fn key(&self) -> &EntityKey {
        Zone::key(self)
    }

    fn name(&self) -> &str {
        Zone::name(self)
    }
}

#[derive(Debug, Clone)]
struct SlotRegistry<T> {
    entries: Vec<T>,
    slots: HashMap<EntityKey, usize>,
}

impl<T> Default for SlotRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<T: Registrable> SlotRegistry<T> {
    fn register(&mut self, entity: &T) -> Result<usize, ConfigurationError> {
        if let Some(&slot) = self.slots.get(entity.key()) {
            let existing = &self.entries[slot];
            if existing.name() != entity.name() {
                return Err(ConfigurationError::ConflictingName {
                    kind: T::KIND,
                    key: entity.key().clone(),
                    first: existing.name().to_string(),
                    second: entity.name().to_string(),
                });
            }
            return Ok(slot);
        }
        let slot = self.entries.len();
        self.slots.insert(entity.key().clone(), slot);
        self.entries.push(entity.clone());
        Ok(slot)
    }

    fn slot(&self, key: &EntityKey) -> Option<usize> {
        self.slots.get(key).copied()
    }

    fn get(&self, key: &EntityKey) -> Option<&T> {
        self.slot(key).map(|slot| &self.entries[slot])
    }
}

/// Registry of every item and zone a simulation can address.
///
/// Each entity gets a dense slot in `[0, n)` in first-seen order. Slots never
/// change once the world is built, and they are the only addressing scheme used
/// by compiled transformations and by [`crate::CraftingState`].
#[derive(Debug, Clone)]
pub struct World {
    items: SlotRegistry<Item>,
    zones: SlotRegistry<Zone>,
    zones_items: SlotRegistry<Item>,
    start_zone: Option<usize>,
    start_items: Vec<ItemStack>,
    start_zones_items: Vec<(Zone, Vec<ItemStack>)>,
}

impl World {
    pub fn new(
        items: impl IntoIterator<Item = Item>,
        zones: impl IntoIterator<Item = Zone>,
        zones_items: impl IntoIterator<Item = Item>,
    ) -> Result<Self, ConfigurationError> {
        WorldBuilder::default()
            .items(items)
            .zones(zones)
            .zones_items(zones_items)
            .build()
    }

    pub fn builder() -> WorldBuilder {
        WorldBuilder::default()
    }

    /// Infers the world from every item and zone the transformations reference.
    pub fn from_transformations(
        transformations: &[Transformation],
    ) -> Result<Self, ConfigurationError> {
        WorldBuilder::default()
            .with_transformations(transformations)
            .build()
    }

    pub fn items(&self) -> &[Item] {
        &self.items.entries
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones.entries
    }

    pub fn zones_items(&self) -> &[Item] {
        &self.zones_items.entries
    }

    pub fn n_items(&self) -> usize {
        self.items.entries.len()
    }

    pub fn n_zones(&self) -> usize {
        self.zones.entries.len()
    }

    pub fn n_zones_items(&self) -> usize {
        self.zones_items.entries.len()
    }

    pub fn start_zone(&self) -> Option<&Zone> {
        self.start_zone.map(|slot| &self.zones.entries[slot])
    }

    pub fn start_zone_slot(&self) -> Option<usize> {
        self.start_zone
    }

    pub fn start_items(&self) -> &[ItemStack] {
        &self.start_items
    }

    pub fn start_zones_items(&self) -> &[(Zone, Vec<ItemStack>)] {
        &self.start_zones_items
    }

    pub fn item_slot(&self, item: &Item) -> Result<usize, ConfigurationError> {
        self.item_slot_by_key(item.key())
    }

    pub fn item_slot_by_key(&self, key: &EntityKey) -> Result<usize, ConfigurationError> {
        self.items
            .slot(key)
            .ok_or_else(|| ConfigurationError::UnknownItem { key: key.clone() })
    }

    pub fn zone_slot(&self, zone: &Zone) -> Result<usize, ConfigurationError> {
        self.zone_slot_by_key(zone.key())
    }

    pub fn zone_slot_by_key(&self, key: &EntityKey) -> Result<usize, ConfigurationError> {
        self.zones
            .slot(key)
            .ok_or_else(|| ConfigurationError::UnknownZone { key: key.clone() })
    }

    pub fn zone_item_slot(&self, item: &Item) -> Result<usize, ConfigurationError> {
        self.zone_item_slot_by_key(item.key())
    }

    pub fn zone_item_slot_by_key(&self, key: &EntityKey) -> Result<usize, ConfigurationError> {
        self.zones_items
            .slot(key)
            .ok_or_else(|| ConfigurationError::UnknownZoneItem { key: key.clone() })
    }

    pub fn item_from_slot(&self, slot: usize) -> Option<&Item> {
        self.items.entries.get(slot)
    }

    pub fn zone_from_slot(&self, slot: usize) -> Option<&Zone> {
        self.zones.entries.get(slot)
    }

    pub fn zone_item_from_slot(&self, slot: usize) -> Option<&Item> {
        self.zones_items.entries.get(slot)
    }
}

/// Collects entities and start inventories, then assigns slots in `build`.
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    items: Vec<Item>,
    zones: Vec<Zone>,
    zones_items: Vec<Item>,
    start_zone: Option<Zone>,
    start_items: Vec<ItemStack>,
    start_zones_items: Vec<(Zone, Vec<ItemStack>)>,
}

impl WorldBuilder {
    pub fn items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn zones(mut self, zones: impl IntoIterator<Item = Zone>) -> Self {
        self.zones.extend(zones);
        self
    }

    pub fn zones_items(mut self, zones_items: impl IntoIterator<Item = Item>) -> Self {
        self.zones_items.extend(zones_items);
        self
    }

    pub fn start_zone(mut self, zone: Zone) -> Self {
        self.start_zone = Some(zone);
        self
    }

    pub fn start_items(mut self, stacks: impl IntoIterator<Item = ItemStack>) -> Self {
        self.start_items.extend(stacks);
        self
    }

    pub fn start_zone_items(
        mut self,
        zone: Zone,
        stacks: impl IntoIterator<Item = ItemStack>,
    ) -> Self {
        let stacks = stacks.into_iter().collect::<Vec<_>>();
        match self
            .start_zones_items
            .iter()
            .position(|(existing, _)| *existing == zone)
        {
            Some(index) => self.start_zones_items[index].1.extend(stacks),
            None => self.start_zones_items.push((zone, stacks)),
        }
        self
    }

    /// Queues every entity referenced by `transformations`.
    ///
    /// Order per transformation: allowed zones, destination, explicit zone owners;
    /// player stacks go to items, every other owner's stacks to zone items. Within an
    /// owner the kinds are visited add, remove, max.
    pub fn with_transformations(mut self, transformations: &[Transformation]) -> Self {
        for transformation in transformations {
            if let Some(zones) = transformation.zones() {
                self.zones.extend(zones.iter().cloned());
            }
            if let Some(destination) = transformation.destination() {
                self.zones.push(destination.clone());
            }
            for (owner, changes) in transformation.declared_changes() {
                if let InventoryOwner::Zone(zone) = &owner {
                    self.zones.push(zone.clone());
                }
                let target = match owner {
                    InventoryOwner::Player => &mut self.items,
                    _ => &mut self.zones_items,
                };
                for kind in ChangeKind::ALL {
                    target.extend(changes.stacks(kind).iter().map(|stack| stack.item.clone()));
                }
            }
        }
        self
    }

    pub fn build(self) -> Result<World, ConfigurationError> {
        let mut items = SlotRegistry::<Item>::default();
        let mut zones = SlotRegistry::<Zone>::default();
        let mut zones_items = SlotRegistry::<Item>::default();

        for item in &self.items {
            items.register(item)?;
        }
        for zone in &self.zones {
            zones.register(zone)?;
        }
        for item in &self.zones_items {
            zones_items.register(item)?;
        }

        for stack in &self.start_items {
            ensure_positive(stack)?;
            items.register(&stack.item)?;
        }
        for (zone, stacks) in &self.start_zones_items {
            zones.register(zone)?;
            for stack in stacks {
                ensure_positive(stack)?;
                zones_items.register(&stack.item)?;
            }
        }

        // Player items and zone items share one key space.
        for zone_item in &zones_items.entries {
            if let Some(item) = items.get(zone_item.key()) {
                if item.name() != zone_item.name() {
                    return Err(ConfigurationError::ConflictingName {
                        kind: "item",
                        key: zone_item.key().clone(),
                        first: item.name().to_string(),
                        second: zone_item.name().to_string(),
                    });
                }
            }
        }

        let start_zone = match &self.start_zone {
            Some(zone) => Some(zones.register(zone)?),
            None if zones.entries.is_empty() => None,
            None => Some(0),
        };

        Ok(World {
            items,
            zones,
            zones_items,
            start_zone,
            start_items: self.start_items,
            start_zones_items: self.start_zones_items,
        })
    }
}

fn ensure_positive(stack: &ItemStack) -> Result<(), ConfigurationError> {
    if stack.quantity == 0 {
        return Err(ConfigurationError::ZeroQuantity {
            item: stack.item.name().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stacks(names: &[&str]) -> Vec<ItemStack> {
        names.iter().map(|name| ItemStack::from(Item::new(*name))).collect()
    }

    #[test]
    fn slots_follow_first_seen_order_and_deduplicate() {
        let world = World::new(
            [Item::new("b"), Item::new("a"), Item::new("b")],
            [Zone::new("z0"), Zone::new("z1")],
            [Item::new("a")],
        )
        .expect("world");
        assert_eq!(world.n_items(), 2);
        assert_eq!(world.item_slot(&Item::new("b")).expect("b"), 0);
        assert_eq!(world.item_slot(&Item::new("a")).expect("a"), 1);
        assert_eq!(world.zone_slot(&Zone::new("z1")).expect("z1"), 1);
        assert_eq!(world.zone_item_slot(&Item::new("a")).expect("a"), 0);
        assert_eq!(world.start_zone(), Some(&Zone::new("z0")));
    }

    #[test]
    fn unknown_entities_are_reported() {
        let world = World::new([Item::new("a")], [Zone::new("z")], []).expect("world");
        assert!(matches!(
            world.item_slot(&Item::new("nope")),
            Err(ConfigurationError::UnknownItem { .. })
        ));
        assert!(matches!(
            world.zone_slot(&Zone::new("nope")),
            Err(ConfigurationError::UnknownZone { .. })
        ));
        assert!(matches!(
            world.zone_item_slot(&Item::new("a")),
            Err(ConfigurationError::UnknownZoneItem { .. })
        ));
    }

    #[test]
    fn conflicting_names_for_one_key_fail() {
        let err = World::new([Item::numbered(1, "wood"), Item::numbered(1, "stone")], [], [])
            .expect_err("conflict");
        assert!(matches!(
            err,
            ConfigurationError::ConflictingName { kind: "item", .. }
        ));
    }

    #[test]
    fn item_and_zone_item_keys_must_agree_on_names() {
        let err = World::new([Item::numbered(1, "wood")], [], [Item::numbered(1, "log")])
            .expect_err("conflict");
        assert_eq!(
            err,
            ConfigurationError::ConflictingName {
                kind: "item",
                key: EntityKey::Numbered(1),
                first: "wood".to_string(),
                second: "log".to_string(),
            }
        );

        let shared = World::new([Item::new("ore")], [], [Item::new("ore")]).expect("shared");
        assert_eq!(shared.item_slot(&Item::new("ore")), Ok(0));
        assert_eq!(shared.zone_item_slot(&Item::new("ore")), Ok(0));
    }

    #[test]
    fn inferred_world_scans_every_owner() {
        let transformations = [
            Transformation::builder()
                .zones([Zone::new("forest")])
                .add(InventoryOwner::Player, stacks(&["wood"]))
                .remove(InventoryOwner::Current, stacks(&["tree"]))
                .build()
                .expect("chop"),
            Transformation::builder()
                .destination(Zone::new("swamp"))
                .add(InventoryOwner::Destination, stacks(&["footprint"]))
                .add(InventoryOwner::Zone(Zone::new("cave")), stacks(&["echo"]))
                .max(InventoryOwner::Player, stacks(&["boots"]))
                .build()
                .expect("walk"),
        ];
        let world = World::from_transformations(&transformations).expect("world");
        let names = |items: &[Item]| items.iter().map(|i| i.name().to_string()).collect::<Vec<_>>();
        assert_eq!(names(world.items()), ["wood", "boots"]);
        assert_eq!(names(world.zones_items()), ["tree", "footprint", "echo"]);
        let zone_names = world.zones().iter().map(Zone::name).collect::<Vec<_>>();
        assert_eq!(zone_names, ["forest", "swamp", "cave"]);
        assert_eq!(world.start_zone_slot(), Some(0));
    }

    #[test]
    fn start_inventories_register_their_entities() {
        let world = World::builder()
            .zones([Zone::new("a")])
            .start_zone(Zone::new("b"))
            .start_items([ItemStack::new(Item::new("coin"), 3)])
            .start_zone_items(Zone::new("a"), [ItemStack::new(Item::new("ore"), 2)])
            .build()
            .expect("world");
        assert_eq!(world.start_zone_slot(), Some(1));
        assert_eq!(world.n_items(), 1);
        assert_eq!(world.n_zones_items(), 1);
    }

    #[test]
    fn zero_quantity_start_items_fail() {
        let err = World::builder()
            .start_items([ItemStack::new(Item::new("coin"), 0)])
            .build()
            .expect_err("zero");
        assert!(matches!(err, ConfigurationError::ZeroQuantity { .. }));
    }

    #[test]
    fn world_without_zones_has_no_start_zone() {
        let world = World::new([Item::new("a")], [], []).expect("world");
        assert_eq!(world.start_zone(), None);
    }
}
