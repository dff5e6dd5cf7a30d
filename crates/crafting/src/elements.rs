use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of an item or a zone. Two entities with the same key are the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Named(String),
    Numbered(u32),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "'{name}'"),
            Self::Numbered(id) => write!(f, "#{id}"),
        }
    }
}

/// Something that can sit in the player inventory or in a zone inventory.
#[derive(Debug, Clone)]
pub struct Item {
    key: EntityKey,
    name: String,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: EntityKey::Named(name.clone()),
            name,
        }
    }

    pub fn numbered(id: u32, name: impl Into<String>) -> Self {
        Self {
            key: EntityKey::Numbered(id),
            name: name.into(),
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `quantity` units of `item`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemStack {
    pub item: Item,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item: Item, quantity: u32) -> Self {
        Self { item, quantity }
    }
}

impl From<Item> for ItemStack {
    fn from(item: Item) -> Self {
        Self { item, quantity: 1 }
    }
}

impl From<&Item> for ItemStack {
    fn from(item: &Item) -> Self {
        Self {
            item: item.clone(),
            quantity: 1,
        }
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quantity == 1 {
            write!(f, "{}", self.item.name)
        } else {
            write!(f, "{}[{}]", self.item.name, self.quantity)
        }
    }
}

/// A location the player can occupy. Zones own an inventory of zone items.
#[derive(Debug, Clone)]
pub struct Zone {
    key: EntityKey,
    name: String,
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: EntityKey::Named(name.clone()),
            name,
        }
    }

    pub fn numbered(id: u32, name: impl Into<String>) -> Self {
        Self {
            key: EntityKey::Numbered(id),
            name: name.into(),
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Zone {}

impl Hash for Zone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
