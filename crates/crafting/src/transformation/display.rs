use std::fmt;

use crate::elements::ItemStack;

use super::{ChangeKind, InventoryChanges, Transformation};

/// `removed > added | destination`, e.g.
/// `P1 Zone(Z1) Dest(D1) A(A1) > P2 Zone(Z2) Dest(D2) A(A2) | D`.
impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let removed = self.sections(ChangeKind::Remove);
        let mut added = self.sections(ChangeKind::Add);
        if let Some(destination) = &self.destination {
            added.push(format!("| {}", destination.name()));
        }

        if !removed.is_empty() {
            write!(f, "{} ", removed.join(" "))?;
        }
        write!(f, "> {}", added.join(" "))
    }
}

impl Transformation {
    fn sections(&self, kind: ChangeKind) -> Vec<String> {
        let mut sections = Vec::new();
        push_section(&mut sections, None, &self.player, kind);
        push_section(&mut sections, Some("Zone"), &self.current, kind);
        push_section(&mut sections, Some("Dest"), &self.destination_changes, kind);
        for (zone, changes) in &self.zones_changes {
            push_section(&mut sections, Some(zone.name()), changes, kind);
        }
        sections
    }
}

fn push_section(
    sections: &mut Vec<String>,
    wrapper: Option<&str>,
    changes: &InventoryChanges,
    kind: ChangeKind,
) {
    let stacks = changes.stacks(kind);
    if stacks.is_empty() {
        return;
    }
    let joined = stacks
        .iter()
        .map(ItemStack::to_string)
        .collect::<Vec<_>>()
        .join(",");
    match wrapper {
        Some(wrapper) => sections.push(format!("{wrapper}({joined})")),
        None => sections.push(joined),
    }
}
