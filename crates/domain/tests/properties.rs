use domain::{top_level, Category, Comment, CommentThread, EntityId};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// `parents[i]` is the parent index of node `i + 1` (always smaller), or
/// `None` for a root. Node 0 is always a root.
fn forest() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1usize..40).prop_flat_map(|n| {
        (1..n)
            .map(|i| proptest::option::of(0..i))
            .collect::<Vec<_>>()
    })
}

fn children_map(parents: &[Option<usize>]) -> HashMap<usize, Vec<usize>> {
    let mut map: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, parent) in parents.iter().enumerate() {
        if let Some(p) = parent {
            map.entry(*p).or_default().push(i + 1);
        }
    }
    map
}

fn build_comment(idx: usize, map: &HashMap<usize, Vec<usize>>) -> Comment {
    let children = map
        .get(&idx)
        .map(|kids| kids.iter().map(|k| build_comment(*k, map)).collect())
        .unwrap_or_default();
    Comment::new(idx as EntityId + 1, "x").with_children(children)
}

fn reachable(c: &Comment, out: &mut Vec<EntityId>) {
    out.push(c.id);
    for child in &c.children {
        reachable(child, out);
    }
}

fn build_category(idx: usize, map: &HashMap<usize, Vec<usize>>) -> Category {
    Category {
        id: idx as EntityId + 1,
        children: map
            .get(&idx)
            .map(|kids| kids.iter().map(|k| build_category(*k, map)).collect())
            .unwrap_or_default(),
        ..Category::default()
    }
}

proptest! {
    #[test]
    fn top_level_plus_children_cover_every_comment(parents in forest()) {
        let map = children_map(&parents);
        let flat: Vec<Comment> = (0..=parents.len()).map(|i| build_comment(i, &map)).collect();

        let mut seen = Vec::new();
        for root in top_level(&flat) {
            reachable(root, &mut seen);
        }

        let unique: BTreeSet<EntityId> = seen.iter().copied().collect();
        let all: BTreeSet<EntityId> = flat.iter().map(|c| c.id).collect();
        prop_assert_eq!(unique.len(), seen.len(), "a comment was rendered twice");
        prop_assert_eq!(unique, all);
    }

    #[test]
    fn rendered_thread_has_one_node_per_comment(parents in forest()) {
        let map = children_map(&parents);
        let flat: Vec<Comment> = (0..=parents.len()).map(|i| build_comment(i, &map)).collect();
        let thread = CommentThread::new(flat);

        fn count(nodes: &[domain::CommentNode]) -> usize {
            nodes.iter().map(|n| 1 + count(n.replies())).sum()
        }
        prop_assert_eq!(count(&thread.render()), thread.len());
    }

    #[test]
    fn descendant_ids_match_subtree(parents in forest(), pick in any::<prop::sample::Index>()) {
        let map = children_map(&parents);
        let root_idx = pick.index(parents.len() + 1);
        let root = build_category(root_idx, &map);

        let mut expected = BTreeSet::new();
        let mut stack = vec![root_idx];
        while let Some(i) = stack.pop() {
            expected.insert(i as EntityId + 1);
            if let Some(kids) = map.get(&i) {
                stack.extend(kids.iter().copied());
            }
        }

        let ids = root.descendant_ids();
        let unique: BTreeSet<EntityId> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
        prop_assert_eq!(ids[0], root.id);
        prop_assert_eq!(unique, expected);
    }
}

#[test]
fn small_worked_examples() {
    let comments: Vec<Comment> = serde_json::from_value(serde_json::json!([
        { "id": 1, "children": [{ "id": 2, "children": [] }] },
        { "id": 2, "children": [] }
    ]))
    .unwrap();
    let ids: Vec<EntityId> = top_level(&comments).iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1]);

    let category: Category = serde_json::from_value(serde_json::json!({
        "id": 1,
        "children": [
            { "id": 2, "children": [] },
            { "id": 3, "children": [{ "id": 4, "children": [] }] }
        ]
    }))
    .unwrap();
    let ids: BTreeSet<EntityId> = category.descendant_ids().into_iter().collect();
    assert_eq!(ids, BTreeSet::from([1, 2, 3, 4]));
}
