use crate::models::{Category, EntityId};
use std::collections::HashSet;

impl Category {
    /// Ids of this node and everything below it, preorder, without
    /// duplicates. Only as deep as `children` was populated.
    pub fn descendant_ids(&self) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        collect(self, &mut seen, &mut ids);
        ids
    }
}

fn collect(node: &Category, seen: &mut HashSet<EntityId>, ids: &mut Vec<EntityId>) {
    if seen.insert(node.id) {
        ids.push(node.id);
    }
    for child in &node.children {
        collect(child, seen, ids);
    }
}
