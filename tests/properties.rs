//! Propagation invariants over random catalogs and random toggle histories

use permtree::{seed, toggle, Catalog, PermissionNode, PermissionPath, SelectionSet};
use proptest::prelude::*;
use proptest::sample::Index;

/// Sibling lists up to 4 levels deep; names are positional so siblings are unique.
fn forest() -> impl Strategy<Value = Vec<PermissionNode>> {
    Just(Vec::<PermissionNode>::new()).prop_recursive(4, 40, 4, |inner| {
        prop::collection::vec(inner, 1..4).prop_map(|kids| {
            kids.into_iter()
                .enumerate()
                .map(|(i, children)| PermissionNode::new(format!("n{i}"), children))
                .collect()
        })
    })
}

fn replay(c: &Catalog, history: &[Index]) -> SelectionSet {
    history.iter().fold(SelectionSet::new(), |s, i| {
        let p = &c.universe()[i.index(c.len())];
        toggle(p.as_str(), &s, c)
    })
}

fn pick<'c>(c: &'c Catalog, i: &Index) -> &'c PermissionPath {
    &c.universe()[i.index(c.len())]
}

fn history() -> impl Strategy<Value = Vec<Index>> {
    prop::collection::vec(any::<Index>(), 0..24)
}

/// Parent granted iff all its direct children are granted.
fn is_closed(c: &Catalog, s: &SelectionSet) -> bool {
    c.universe().iter().filter(|p| !c.is_leaf(p.as_str())).all(|p| {
        let full = c.direct_children_of(p.as_str()).all(|k| s.is_selected(k.as_str()));
        full == s.is_selected(p.as_str())
    })
}

proptest! {
    /// Verify select all and deselect all are idempotent from any reachable state
    #[test]
    fn select_all_and_deselect_all_idempotent(nodes in forest(), h in history()) {
        let c = Catalog::from_nodes(&nodes).unwrap();
        prop_assume!(!c.is_empty());
        let start = replay(&c, &h);

        let mut once = start.clone();
        once.select_all(&c);
        let mut twice = once.clone();
        twice.select_all(&c);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.len(), c.len());

        let mut once = start;
        once.deselect_all();
        let mut twice = once.clone();
        twice.deselect_all();
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.is_empty());
    }

    /// Verify granting a node grants every descendant
    #[test]
    fn grant_cascades_to_every_descendant(nodes in forest(), h in history(), i in any::<Index>()) {
        let c = Catalog::from_nodes(&nodes).unwrap();
        prop_assume!(!c.is_empty());
        let s = replay(&c, &h);
        let p = pick(&c, &i);
        prop_assume!(!s.is_selected(p.as_str()));

        let next = toggle(p.as_str(), &s, &c);
        prop_assert!(next.is_selected(p.as_str()));
        for d in c.descendants_of(p.as_str()) {
            prop_assert!(next.is_selected(d.as_str()), "{} missing after granting {}", d, p);
        }
    }

    /// Verify a granted parent always has every child granted
    #[test]
    fn selected_parent_implies_selected_children(nodes in forest(), h in history()) {
        let c = Catalog::from_nodes(&nodes).unwrap();
        prop_assume!(!c.is_empty());
        let s = replay(&c, &h);

        for p in s.iter() {
            if let Some(a) = c.parent_of(p.as_str()) {
                if s.is_selected(a.as_str()) {
                    for k in c.direct_children_of(a.as_str()) {
                        prop_assert!(s.is_selected(k.as_str()));
                    }
                }
            }
        }
        prop_assert!(is_closed(&c, &s));
    }

    /// Verify revoking a leaf clears every ancestor
    #[test]
    fn revoking_leaf_clears_all_ancestors(nodes in forest(), h in history(), i in any::<Index>()) {
        let c = Catalog::from_nodes(&nodes).unwrap();
        prop_assume!(!c.is_empty());
        let mut s = replay(&c, &h);
        let leaf = pick(&c, &i);
        prop_assume!(c.is_leaf(leaf.as_str()));
        if !s.is_selected(leaf.as_str()) {
            s = toggle(leaf.as_str(), &s, &c);
        }

        let next = toggle(leaf.as_str(), &s, &c);
        prop_assert!(!next.is_selected(leaf.as_str()));
        for a in leaf.ancestors() {
            prop_assert!(!next.is_selected(a), "ancestor {} survived revoke of {}", a, leaf);
        }
    }

    /// Verify the last child grant promotes its parent
    #[test]
    fn last_child_promotes_parent_exactly(nodes in forest(), i in any::<Index>()) {
        let c = Catalog::from_nodes(&nodes).unwrap();
        prop_assume!(!c.is_empty());
        let parent = pick(&c, &i);
        let kids: Vec<&PermissionPath> = c.direct_children_of(parent.as_str()).collect();
        prop_assume!(!kids.is_empty());

        let (last, rest) = kids.split_last().unwrap();
        let s = rest.iter().fold(SelectionSet::new(), |s, k| toggle(k.as_str(), &s, &c));
        prop_assert!(!s.is_selected(parent.as_str()));

        let s = toggle(last.as_str(), &s, &c);
        prop_assert!(s.is_selected(parent.as_str()));
    }

    /// Verify toggling twice restores the set when the subtree is uniform
    #[test]
    fn double_toggle_restores_when_subtree_uniform(nodes in forest(), h in history(), i in any::<Index>()) {
        let c = Catalog::from_nodes(&nodes).unwrap();
        prop_assume!(!c.is_empty());
        let s = replay(&c, &h);
        let p = pick(&c, &i);

        // Uniform: the subtree under p is entirely granted or entirely revoked.
        let below = c.descendants_of(p.as_str());
        let granted = below.iter().filter(|d| s.is_selected(d.as_str())).count();
        prop_assume!(granted == 0 || granted == below.len());

        let back = toggle(p.as_str(), &toggle(p.as_str(), &s, &c), &c);
        prop_assert_eq!(back, s);
    }

    /// Verify toggle keeps reachable states closed
    #[test]
    fn toggle_keeps_reachable_states_closed(nodes in forest(), h in history(), i in any::<Index>()) {
        let c = Catalog::from_nodes(&nodes).unwrap();
        prop_assume!(!c.is_empty());
        let s = replay(&c, &h);
        let next = toggle(pick(&c, &i).as_str(), &s, &c);
        prop_assert!(is_closed(&c, &next));
    }

    /// Verify any stored grant list seeds a closed state that toggles keep closed
    #[test]
    fn seeded_states_are_closed(nodes in forest(), stored in prop::collection::vec(any::<Index>(), 0..12), i in any::<Index>()) {
        let c = Catalog::from_nodes(&nodes).unwrap();
        prop_assume!(!c.is_empty());
        let s = seed(stored.iter().map(|j| pick(&c, j)), &c);
        prop_assert!(is_closed(&c, &s));
        for j in &stored {
            let p = pick(&c, j);
            prop_assert!(c.descendants_of(p.as_str()).iter().all(|d| s.is_selected(d.as_str())));
        }
        let next = toggle(pick(&c, &i).as_str(), &s, &c);
        prop_assert!(is_closed(&c, &next));
    }
}
