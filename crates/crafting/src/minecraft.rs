//! A Minecraft-flavoured catalog: gathering gated by zone and tool, recipes that
//! need a placed crafting table or furnace, and portals to the nether and the end.

use crate::catalog::{Catalog, CatalogError};
use crate::elements::{Item, ItemStack, Zone};
use crate::transformation::{InventoryOwner, Transformation, TransformationBuilder};
use crate::world::World;

pub const FOREST: &str = "forest";
pub const SWAMP: &str = "swamp";
pub const MEADOW: &str = "meadow";
pub const UNDERGROUND: &str = "underground";
pub const BEDROCK: &str = "bedrock";
pub const NETHER: &str = "nether";
pub const END: &str = "end";

pub const ZONES: [&str; 7] = [FOREST, SWAMP, MEADOW, UNDERGROUND, BEDROCK, NETHER, END];
const OVERWORLD: [&str; 5] = [FOREST, SWAMP, MEADOW, UNDERGROUND, BEDROCK];

const CRAFTING_TABLE: &str = "crafting_table";
const FURNACE: &str = "furnace";
const CLOSE_NETHER_PORTAL: &str = "close_nether_portal";
const OPEN_NETHER_PORTAL: &str = "open_nether_portal";
const CLOSE_ENDER_PORTAL: &str = "close_ender_portal";
const OPEN_ENDER_PORTAL: &str = "open_ender_portal";

#[derive(Clone, Copy)]
enum ToolKind {
    Pickaxe,
    Axe,
    Shovel,
    Sword,
}

impl ToolKind {
    const ALL: [ToolKind; 4] = [Self::Pickaxe, Self::Axe, Self::Shovel, Self::Sword];

    fn as_str(self) -> &'static str {
        match self {
            Self::Pickaxe => "pickaxe",
            Self::Axe => "axe",
            Self::Shovel => "shovel",
            Self::Sword => "sword",
        }
    }

    /// Material units and sticks per tool.
    fn cost(self) -> (u32, u32) {
        match self {
            Self::Pickaxe | Self::Axe => (3, 2),
            Self::Shovel => (1, 2),
            Self::Sword => (2, 1),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Material {
    Wooden,
    Stone,
    Iron,
    Gold,
    Diamond,
}

impl Material {
    const ALL: [Material; 5] = [
        Self::Wooden,
        Self::Stone,
        Self::Iron,
        Self::Gold,
        Self::Diamond,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Wooden => "wooden",
            Self::Stone => "stone",
            Self::Iron => "iron",
            Self::Gold => "gold",
            Self::Diamond => "diamond",
        }
    }

    fn ingredient(self) -> &'static str {
        match self {
            Self::Wooden => "wood_plank",
            Self::Stone => "cobblestone",
            Self::Iron => "iron_ingot",
            Self::Gold => "gold_ingot",
            Self::Diamond => "diamond",
        }
    }
}

fn tool_name(material: Material, kind: ToolKind) -> String {
    format!("{}_{}", material.as_str(), kind.as_str())
}

/// Who may gather an item: bare hands and/or tools of a kind and material.
struct ToolRequirement {
    bare_hands: bool,
    kind: Option<ToolKind>,
    materials: &'static [Material],
}

impl ToolRequirement {
    const NONE: Self = Self {
        bare_hands: true,
        kind: None,
        materials: &[],
    };

    const fn optional(kind: ToolKind) -> Self {
        Self {
            bare_hands: true,
            kind: Some(kind),
            materials: &Material::ALL,
        }
    }

    const fn any(kind: ToolKind) -> Self {
        Self::of(kind, &Material::ALL)
    }

    const fn of(kind: ToolKind, materials: &'static [Material]) -> Self {
        Self {
            bare_hands: false,
            kind: Some(kind),
            materials,
        }
    }

    fn alternatives(&self) -> Vec<Option<String>> {
        let mut tools = Vec::new();
        if self.bare_hands {
            tools.push(None);
        }
        if let Some(kind) = self.kind {
            tools.extend(
                self.materials
                    .iter()
                    .map(|&material| Some(tool_name(material, kind))),
            );
        }
        tools
    }
}

const IRON_OR_BETTER: [Material; 2] = [Material::Iron, Material::Diamond];
const STONE_OR_BETTER: [Material; 3] = [Material::Stone, Material::Iron, Material::Diamond];

struct Gatherable {
    item: &'static str,
    zones: &'static [&'static str],
    tools: ToolRequirement,
}

const GATHERABLES: [Gatherable; 16] = [
    Gatherable {
        item: "dirt",
        zones: &[FOREST, SWAMP, MEADOW],
        tools: ToolRequirement::optional(ToolKind::Shovel),
    },
    Gatherable {
        item: "wood",
        zones: &[FOREST],
        tools: ToolRequirement::optional(ToolKind::Axe),
    },
    Gatherable {
        item: "gravel",
        zones: &[SWAMP],
        tools: ToolRequirement::any(ToolKind::Shovel),
    },
    Gatherable {
        item: "cobblestone",
        zones: &[FOREST, SWAMP, MEADOW, UNDERGROUND, BEDROCK],
        tools: ToolRequirement::any(ToolKind::Pickaxe),
    },
    Gatherable {
        item: "iron_ore",
        zones: &[UNDERGROUND, BEDROCK],
        tools: ToolRequirement::of(ToolKind::Pickaxe, &STONE_OR_BETTER),
    },
    Gatherable {
        item: "gold_ore",
        zones: &[BEDROCK, NETHER],
        tools: ToolRequirement::of(ToolKind::Pickaxe, &IRON_OR_BETTER),
    },
    Gatherable {
        item: "diamond",
        zones: &[BEDROCK],
        tools: ToolRequirement::of(ToolKind::Pickaxe, &IRON_OR_BETTER),
    },
    Gatherable {
        item: "obsidian",
        zones: &[BEDROCK],
        tools: ToolRequirement::of(ToolKind::Pickaxe, &[Material::Diamond]),
    },
    Gatherable {
        item: "redstone",
        zones: &[BEDROCK],
        tools: ToolRequirement::of(ToolKind::Pickaxe, &IRON_OR_BETTER),
    },
    Gatherable {
        item: "netherrack",
        zones: &[NETHER],
        tools: ToolRequirement::any(ToolKind::Pickaxe),
    },
    Gatherable {
        item: "reeds",
        zones: &[SWAMP],
        tools: ToolRequirement::NONE,
    },
    Gatherable {
        item: "egg",
        zones: &[MEADOW],
        tools: ToolRequirement::NONE,
    },
    Gatherable {
        item: "leather",
        zones: &[MEADOW],
        tools: ToolRequirement::any(ToolKind::Sword),
    },
    Gatherable {
        item: "blaze_rod",
        zones: &[NETHER],
        tools: ToolRequirement::of(ToolKind::Sword, &[Material::Gold]),
    },
    Gatherable {
        item: "ender_pearl",
        zones: &[UNDERGROUND, END],
        tools: ToolRequirement::of(ToolKind::Sword, &IRON_OR_BETTER),
    },
    Gatherable {
        item: "ender_dragon_head",
        zones: &[END],
        tools: ToolRequirement::of(ToolKind::Sword, &[Material::Diamond]),
    },
];

struct Recipe {
    output: (&'static str, u32),
    inputs: &'static [(&'static str, u32)],
    /// Building that must stand in the current zone.
    station: Option<&'static str>,
}

const RECIPES: [Recipe; 14] = [
    Recipe {
        output: ("wood_plank", 4),
        inputs: &[("wood", 1)],
        station: None,
    },
    Recipe {
        output: ("stick", 4),
        inputs: &[("wood_plank", 2)],
        station: None,
    },
    Recipe {
        output: (CRAFTING_TABLE, 1),
        inputs: &[("wood_plank", 4)],
        station: None,
    },
    Recipe {
        output: (FURNACE, 1),
        inputs: &[("cobblestone", 8)],
        station: Some(CRAFTING_TABLE),
    },
    Recipe {
        output: ("iron_ingot", 1),
        inputs: &[("iron_ore", 1)],
        station: Some(FURNACE),
    },
    Recipe {
        output: ("gold_ingot", 1),
        inputs: &[("gold_ore", 1)],
        station: Some(FURNACE),
    },
    Recipe {
        output: ("paper", 3),
        inputs: &[("reeds", 3)],
        station: Some(CRAFTING_TABLE),
    },
    Recipe {
        output: ("book", 1),
        inputs: &[("paper", 3), ("leather", 1)],
        station: Some(CRAFTING_TABLE),
    },
    Recipe {
        output: ("clock", 1),
        inputs: &[("gold_ingot", 4), ("redstone", 1)],
        station: Some(CRAFTING_TABLE),
    },
    Recipe {
        output: ("enchanting_table", 1),
        inputs: &[("book", 1), ("diamond", 2), ("obsidian", 4)],
        station: Some(CRAFTING_TABLE),
    },
    Recipe {
        output: ("flint", 1),
        inputs: &[("gravel", 1)],
        station: None,
    },
    Recipe {
        output: ("flint_and_steel", 1),
        inputs: &[("iron_ingot", 1), ("flint", 1)],
        station: None,
    },
    Recipe {
        output: ("blaze_powder", 2),
        inputs: &[("blaze_rod", 1)],
        station: None,
    },
    Recipe {
        output: ("ender_eye", 1),
        inputs: &[("ender_pearl", 1), ("blaze_powder", 1)],
        station: None,
    },
];

/// Every transformation of the Minecraft catalog, in action order: moves, gathering,
/// recipes, tools, building placement, then portals.
pub fn minecraft_transformations() -> Result<Vec<Transformation>, CatalogError> {
    let mut transformations = Vec::new();
    push_moves(&mut transformations)?;
    push_gathering(&mut transformations)?;
    push_recipes(&mut transformations)?;
    push_tools(&mut transformations)?;
    push_placements(&mut transformations)?;
    push_portals(&mut transformations)?;
    Ok(transformations)
}

/// Fresh Minecraft catalog. The player starts in the forest; the stronghold's
/// inactive ender portal waits in the bedrock zone.
pub fn minecraft_catalog() -> Result<Catalog, CatalogError> {
    let transformations = minecraft_transformations()?;
    let world = World::builder()
        .zones(ZONES.map(Zone::new))
        .with_transformations(&transformations)
        .start_zone(Zone::new(FOREST))
        .start_zone_items(Zone::new(BEDROCK), [stack(CLOSE_ENDER_PORTAL, 1)])
        .build()
        .map_err(CatalogError::Configuration)?;
    Catalog::new(world, transformations)
}

fn push_moves(transformations: &mut Vec<Transformation>) -> Result<(), CatalogError> {
    let pickaxe = ToolRequirement::any(ToolKind::Pickaxe);
    let good_pickaxe = ToolRequirement::of(ToolKind::Pickaxe, &STONE_OR_BETTER);
    for destination in OVERWORLD {
        let requirement = match destination {
            UNDERGROUND => &pickaxe,
            BEDROCK => &good_pickaxe,
            _ => &ToolRequirement::NONE,
        };
        for tool in requirement.alternatives() {
            let builder = Transformation::builder()
                .name(with_suffix(&format!("move_to_{destination}"), tool.as_deref()))
                .zones(OVERWORLD.map(Zone::new))
                .destination(Zone::new(destination));
            transformations.push(declare(using_tool(builder, tool.as_deref()))?);
        }
    }
    for origin in [NETHER, END] {
        transformations.push(declare(
            Transformation::builder()
                .name(format!("leave_{origin}"))
                .zones([Zone::new(origin)])
                .destination(Zone::new(FOREST)),
        )?);
    }
    Ok(())
}

fn push_gathering(transformations: &mut Vec<Transformation>) -> Result<(), CatalogError> {
    for gatherable in &GATHERABLES {
        for tool in gatherable.tools.alternatives() {
            let builder = Transformation::builder()
                .name(with_suffix(
                    &format!("collect_{}", gatherable.item),
                    tool.as_deref(),
                ))
                .zones(gatherable.zones.iter().copied().map(Zone::new));
            let builder = using_tool(builder, tool.as_deref())
                .add(InventoryOwner::Player, [stack(gatherable.item, 1)]);
            transformations.push(declare(builder)?);
        }
    }
    Ok(())
}

fn push_recipes(transformations: &mut Vec<Transformation>) -> Result<(), CatalogError> {
    for recipe in &RECIPES {
        let (output, quantity) = recipe.output;
        let verb = if recipe.station == Some(FURNACE) {
            "smelt"
        } else {
            "craft"
        };
        let builder = Transformation::builder()
            .name(format!("{verb}_{output}"))
            .remove(InventoryOwner::Player, stacks(recipe.inputs))
            .add(InventoryOwner::Player, [stack(output, quantity)]);
        transformations.push(declare(at_station(builder, recipe.station))?);
    }
    Ok(())
}

fn push_tools(transformations: &mut Vec<Transformation>) -> Result<(), CatalogError> {
    for material in Material::ALL {
        for kind in ToolKind::ALL {
            let tool = tool_name(material, kind);
            let (units, sticks) = kind.cost();
            let builder = Transformation::builder()
                .name(format!("craft_{tool}"))
                .remove(
                    InventoryOwner::Player,
                    [stack(material.ingredient(), units), stack("stick", sticks)],
                )
                .add(InventoryOwner::Player, [stack(&tool, 1)]);
            transformations.push(declare(at_station(builder, Some(CRAFTING_TABLE)))?);
        }
    }
    Ok(())
}

/// Buildings move from the player inventory into the current zone, one per zone.
fn push_placements(transformations: &mut Vec<Transformation>) -> Result<(), CatalogError> {
    for building in [CRAFTING_TABLE, FURNACE] {
        transformations.push(declare(
            Transformation::builder()
                .name(format!("place_{building}"))
                .remove(InventoryOwner::Player, [stack(building, 1)])
                .add(InventoryOwner::Current, [stack(building, 1)])
                .max(InventoryOwner::Current, [stack(building, 1)]),
        )?);
    }
    Ok(())
}

fn push_portals(transformations: &mut Vec<Transformation>) -> Result<(), CatalogError> {
    transformations.push(declare(
        Transformation::builder()
            .name("build_nether_portal")
            .zones(OVERWORLD.map(Zone::new))
            .remove(InventoryOwner::Player, [stack("obsidian", 10)])
            .add(InventoryOwner::Current, [stack(CLOSE_NETHER_PORTAL, 1)])
            .max(InventoryOwner::Current, [stack(CLOSE_NETHER_PORTAL, 1)]),
    )?);
    transformations.push(declare(using_tool(
        Transformation::builder()
            .name("light_nether_portal")
            .remove(InventoryOwner::Current, [stack(CLOSE_NETHER_PORTAL, 1)])
            .add(InventoryOwner::Current, [stack(OPEN_NETHER_PORTAL, 1)]),
        Some("flint_and_steel"),
    ))?);
    transformations.push(declare(
        Transformation::builder()
            .name("activate_ender_portal")
            .remove(InventoryOwner::Player, [stack("ender_eye", 12)])
            .remove(InventoryOwner::Current, [stack(CLOSE_ENDER_PORTAL, 1)])
            .add(InventoryOwner::Current, [stack(OPEN_ENDER_PORTAL, 1)]),
    )?);
    for (portal, destination) in [(OPEN_NETHER_PORTAL, NETHER), (OPEN_ENDER_PORTAL, END)] {
        transformations.push(declare(at_station(
            Transformation::builder()
                .name(format!("enter_{destination}"))
                .destination(Zone::new(destination)),
            Some(portal),
        ))?);
    }
    Ok(())
}

/// The tool must be held and is kept.
fn using_tool(builder: TransformationBuilder, tool: Option<&str>) -> TransformationBuilder {
    match tool {
        Some(tool) => builder
            .remove(InventoryOwner::Player, [stack(tool, 1)])
            .add(InventoryOwner::Player, [stack(tool, 1)]),
        None => builder,
    }
}

/// The building must stand in the current zone and is kept.
fn at_station(builder: TransformationBuilder, station: Option<&str>) -> TransformationBuilder {
    match station {
        Some(station) => builder
            .remove(InventoryOwner::Current, [stack(station, 1)])
            .add(InventoryOwner::Current, [stack(station, 1)]),
        None => builder,
    }
}

fn declare(builder: TransformationBuilder) -> Result<Transformation, CatalogError> {
    builder.build().map_err(CatalogError::Configuration)
}

fn with_suffix(name: &str, tool: Option<&str>) -> String {
    match tool {
        Some(tool) => format!("{name}_with_{tool}"),
        None => name.to_string(),
    }
}

fn stack(name: &str, quantity: u32) -> ItemStack {
    ItemStack::new(Item::new(name), quantity)
}

fn stacks(specs: &[(&str, u32)]) -> Vec<ItemStack> {
    specs
        .iter()
        .map(|&(name, quantity)| stack(name, quantity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StepOutcome;

    fn run(catalog: &Catalog, state: &mut crate::CraftingState, plan: &[&str]) {
        for name in plan {
            let action = catalog
                .find(name)
                .unwrap_or_else(|| panic!("missing action {name}"));
            assert_eq!(
                catalog.step(state, action).expect("step"),
                StepOutcome::Applied,
                "action {name} should be valid"
            );
        }
    }

    fn held(catalog: &Catalog, state: &crate::CraftingState, name: &str) -> i64 {
        let slot = catalog
            .world()
            .item_slot(&Item::new(name))
            .expect("item slot");
        state.player_inventory()[slot]
    }

    #[test]
    fn catalog_builds_with_every_zone_and_unique_names() {
        let catalog = minecraft_catalog().expect("catalog");
        let zone_names = catalog
            .world()
            .zones()
            .iter()
            .map(Zone::name)
            .collect::<Vec<_>>();
        assert_eq!(zone_names, ZONES);

        let mut names = catalog
            .transformations()
            .iter()
            .map(Transformation::name)
            .collect::<Vec<_>>();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn player_starts_empty_handed_in_the_forest() {
        let catalog = minecraft_catalog().expect("catalog");
        let state = catalog.new_state();
        let forest = catalog
            .world()
            .zone_slot(&Zone::new(FOREST))
            .expect("forest");
        assert_eq!(state.current_zone_slot(), Some(forest));
        assert!(state.player_inventory().iter().all(|&amount| amount == 0));

        let mask = catalog.actions_mask(&state).expect("mask");
        let valid = catalog
            .transformations()
            .iter()
            .zip(mask)
            .filter(|(_, valid)| *valid)
            .map(|(transformation, _)| transformation.name())
            .collect::<Vec<_>>();
        assert!(valid.contains(&"collect_wood".to_string()));
        assert!(valid.contains(&"move_to_swamp".to_string()));
        assert!(!valid.contains(&"move_to_forest".to_string()));
        assert!(!valid.contains(&"move_to_underground_with_wooden_pickaxe".to_string()));
    }

    #[test]
    fn short_plan_reaches_the_underground() {
        let catalog = minecraft_catalog().expect("catalog");
        let mut state = catalog.new_state();
        run(
            &catalog,
            &mut state,
            &[
                "collect_wood",
                "collect_wood",
                "collect_wood",
                "craft_wood_plank",
                "craft_wood_plank",
                "craft_wood_plank",
                "craft_crafting_table",
                "place_crafting_table",
                "craft_stick",
                "craft_wooden_pickaxe",
                "collect_cobblestone_with_wooden_pickaxe",
                "move_to_underground_with_wooden_pickaxe",
            ],
        );
        assert_eq!(held(&catalog, &state, "wood_plank"), 3);
        assert_eq!(held(&catalog, &state, "stick"), 2);
        assert_eq!(held(&catalog, &state, "wooden_pickaxe"), 1);
        assert_eq!(held(&catalog, &state, "cobblestone"), 1);
        let underground = catalog
            .world()
            .zone_slot(&Zone::new(UNDERGROUND))
            .expect("underground");
        assert_eq!(state.current_zone_slot(), Some(underground));
    }

    #[test]
    fn buildings_stay_in_the_zone_they_were_placed_in() {
        let catalog = minecraft_catalog().expect("catalog");
        let mut state = catalog.new_state();
        run(
            &catalog,
            &mut state,
            &[
                "collect_wood",
                "collect_wood",
                "collect_wood",
                "craft_wood_plank",
                "craft_wood_plank",
                "craft_wood_plank",
                "craft_crafting_table",
                "place_crafting_table",
                "craft_stick",
                "move_to_swamp",
            ],
        );
        let wooden_pickaxe = catalog.find("craft_wooden_pickaxe").expect("recipe");
        assert_eq!(
            catalog.step(&mut state, wooden_pickaxe).expect("step"),
            StepOutcome::Invalid
        );
        run(&catalog, &mut state, &["move_to_forest", "craft_wooden_pickaxe"]);
        assert_eq!(held(&catalog, &state, "wooden_pickaxe"), 1);
    }

    #[test]
    fn a_zone_holds_at_most_one_crafting_table() {
        let catalog = minecraft_catalog().expect("catalog");
        let mut state = catalog.new_state();
        run(
            &catalog,
            &mut state,
            &[
                "collect_wood",
                "collect_wood",
                "craft_wood_plank",
                "craft_wood_plank",
                "craft_crafting_table",
                "craft_crafting_table",
                "place_crafting_table",
            ],
        );
        let place = catalog.find("place_crafting_table").expect("place");
        assert_eq!(
            catalog.step(&mut state, place).expect("step"),
            StepOutcome::Invalid
        );
        assert_eq!(held(&catalog, &state, CRAFTING_TABLE), 1);
    }
}
