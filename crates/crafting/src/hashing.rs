use sha2::{Digest, Sha256};

use crate::elements::EntityKey;
use crate::world::World;

/// SHA-256 over the slot-ordered keys of items, zones and zone items.
///
/// Two worlds share a fingerprint exactly when every slot addresses the same
/// entity, which is what a persisted state needs to be meaningful.
pub fn world_layout_sha256_hex(world: &World) -> String {
    let mut hasher = Sha256::new();
    hash_section(&mut hasher, "items", world.items().iter().map(|item| item.key()));
    hash_section(&mut hasher, "zones", world.zones().iter().map(|zone| zone.key()));
    hash_section(
        &mut hasher,
        "zones_items",
        world.zones_items().iter().map(|item| item.key()),
    );
    to_hex_lower(&hasher.finalize())
}

fn hash_section<'a>(
    hasher: &mut Sha256,
    tag: &str,
    keys: impl Iterator<Item = &'a EntityKey>,
) {
    hasher.update(tag.as_bytes());
    hasher.update([0u8]);
    for key in keys {
        match key {
            EntityKey::Named(name) => {
                hasher.update(b"n:");
                hasher.update(name.as_bytes());
            }
            EntityKey::Numbered(id) => {
                hasher.update(b"#:");
                hasher.update(id.to_le_bytes());
            }
        }
        hasher.update([0u8]);
    }
    hasher.update([1u8]);
}

/// Hash of defs sources in the given order: each relative path, then its bytes.
pub(crate) fn hash_xml_inputs<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut hasher = Sha256::new();
    for (rel_path, raw) in sources {
        hasher.update(rel_path.as_bytes());
        hasher.update([0u8]);
        hasher.update(raw.as_bytes());
    }
    to_hex_lower(&hasher.finalize())
}

pub(crate) fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Item, Zone};

    #[test]
    fn layout_hash_depends_on_slot_order() {
        let a = World::new([Item::new("a"), Item::new("b")], [Zone::new("z")], []).expect("a");
        let b = World::new([Item::new("b"), Item::new("a")], [Zone::new("z")], []).expect("b");
        let a_again =
            World::new([Item::new("a"), Item::new("b")], [Zone::new("z")], []).expect("a again");
        assert_ne!(world_layout_sha256_hex(&a), world_layout_sha256_hex(&b));
        assert_eq!(world_layout_sha256_hex(&a), world_layout_sha256_hex(&a_again));
        assert_eq!(world_layout_sha256_hex(&a).len(), 64);
    }

    #[test]
    fn layout_hash_separates_sections() {
        let as_item = World::new([Item::new("x")], [], []).expect("item");
        let as_zone_item = World::new([], [], [Item::new("x")]).expect("zone item");
        assert_ne!(
            world_layout_sha256_hex(&as_item),
            world_layout_sha256_hex(&as_zone_item)
        );
    }

    #[test]
    fn input_hash_changes_on_edit_or_rename() {
        let first = hash_xml_inputs([("defs.xml", "<Defs/>")]);
        assert_ne!(first, hash_xml_inputs([("defs.xml", "<Defs><A/></Defs>")]));
        assert_ne!(first, hash_xml_inputs([("other.xml", "<Defs/>")]));
        assert_eq!(first, hash_xml_inputs([("defs.xml", "<Defs/>")]));
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(to_hex_lower(&[0x00, 0x0f, 0xab]), "000fab");
    }
}
