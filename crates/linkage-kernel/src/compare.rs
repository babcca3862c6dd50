//! Comparison engine: containment, intersection and equality.
//!
//! All three reduce to the same primitive: whether one single tree can be
//! found inside another. A concrete single is found at any node of the other
//! tree carrying the same kind, with its lower layers matched below that
//! node. Members of an AND-group are matched injectively, so one lower layer
//! of the other tree never satisfies two members at once.

use crate::endpoint::metadata_matches;
use crate::error::LinkageError;
use crate::kind::Lineage;
use crate::tree::{Branch, LinkTree};

/// Structural equality ignoring metadata and the order of alternatives and
/// AND-group members.
pub(crate) fn same_shape(a: &LinkTree, b: &LinkTree) -> bool {
    shape_matches(a, b, false)
}

/// Endpoints of two corresponding nodes, when they are compared at all.
fn endpoints_agree(a: &LinkTree, b: &LinkTree, endpoints: bool) -> bool {
    !endpoints || metadata_matches(a.metadata(), b.metadata())
}

/// [`same_shape`], additionally requiring matching endpoints on every pair
/// of corresponding nodes when `endpoints` is set.
fn shape_matches(a: &LinkTree, b: &LinkTree, endpoints: bool) -> bool {
    a.kind() == b.kind()
        && endpoints_agree(a, b, endpoints)
        && a.branches()
            .iter()
            .all(|x| b.branches().iter().any(|y| same_group(x, y, endpoints)))
        && b.branches()
            .iter()
            .all(|y| a.branches().iter().any(|x| same_group(x, y, endpoints)))
}

fn same_group(a: &Branch, b: &Branch, endpoints: bool) -> bool {
    let (left, right) = (a.members(), b.members());
    left.len() == right.len()
        && assign(left, right, &|x: &LinkTree, y: &LinkTree| {
            shape_matches(x, y, endpoints)
        })
}

/// Injective assignment of every member to a distinct candidate.
fn assign(
    members: &[LinkTree],
    candidates: &[LinkTree],
    fits: &dyn Fn(&LinkTree, &LinkTree) -> bool,
) -> bool {
    fn place(
        idx: usize,
        members: &[LinkTree],
        candidates: &[LinkTree],
        used: &mut [bool],
        fits: &dyn Fn(&LinkTree, &LinkTree) -> bool,
    ) -> bool {
        let Some(member) = members.get(idx) else {
            return true;
        };
        for (slot, candidate) in candidates.iter().enumerate() {
            if used[slot] || !fits(member, candidate) {
                continue;
            }
            used[slot] = true;
            if place(idx + 1, members, candidates, used, fits) {
                return true;
            }
            used[slot] = false;
        }
        false
    }

    if members.len() > candidates.len() {
        return false;
    }
    let mut used = vec![false; candidates.len()];
    place(0, members, candidates, &mut used, fits)
}

/// Every node of `tree`, pre-order.
fn nodes(tree: &LinkTree) -> Vec<&LinkTree> {
    let mut out = vec![tree];
    let mut idx = 0;
    while let Some(current) = out.get(idx).copied() {
        out.extend(current.branches().iter().flat_map(Branch::members));
        idx += 1;
    }
    out
}

/// `lower` sits directly below a node of kind equal to `node`'s, layer for
/// layer.
fn anchored(lower: &LinkTree, node: &LinkTree, endpoints: bool) -> bool {
    if !endpoints_agree(lower, node, endpoints) {
        return false;
    }
    match (lower.branches(), node.branches()) {
        ([], _) => true,
        ([mine], [theirs]) => assign(
            mine.members(),
            theirs.members(),
            &|m: &LinkTree, c: &LinkTree| {
                m.kind().is_some() && m.kind() == c.kind() && anchored(m, c, endpoints)
            },
        ),
        _ => false,
    }
}

/// Whether single `part` is found inside single `whole`.
fn fits(part: &LinkTree, whole: &LinkTree, endpoints: bool) -> bool {
    let Some(kind) = part.kind() else {
        return match part.branches() {
            [] => true,
            [group] => match group.members() {
                [only] => fits(only, whole, endpoints),
                members => nodes(whole)
                    .into_iter()
                    .flat_map(LinkTree::branches)
                    .any(|theirs| {
                        assign(members, theirs.members(), &|m: &LinkTree, c: &LinkTree| {
                            fits(m, c, endpoints)
                        })
                    }),
            },
            _ => false,
        };
    };
    nodes(whole)
        .into_iter()
        .any(|node| node.kind() == Some(kind) && anchored(part, node, endpoints))
}

impl Lineage<'_> {
    /// Whether `tree` can be satisfied inside `other`: some realization of
    /// `tree` is part of some realization of `other`. An OR in `tree` is a
    /// choice the requirement leaves open, so one fitting alternative is
    /// enough.
    ///
    /// Both trees must be resolved. Unless `ignore_metadata` is set, every
    /// node of the fitting realization must carry endpoints equal (or
    /// mirrored) to those of the node it lands on. The unconstrained tree is
    /// contained in everything, and everything is contained in it.
    pub fn is_contained_in(
        &self,
        tree: &LinkTree,
        other: &LinkTree,
        ignore_metadata: bool,
    ) -> Result<bool, LinkageError> {
        self.require_resolved(tree)?;
        self.require_resolved(other)?;
        if !ignore_metadata && !metadata_matches(tree.metadata(), other.metadata()) {
            return Ok(false);
        }
        if tree.is_unconstrained() || other.is_unconstrained() {
            return Ok(true);
        }
        let theirs = self.expand_to_singles(other)?;
        for mine in self.expand_to_singles(tree)? {
            let found = theirs
                .iter()
                .find(|whole| fits(&mine, whole, !ignore_metadata));
            if let Some(found) = found {
                tracing::trace!(part = %mine, whole = %found, "contained");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Largest pieces both trees have in common, as an OR-container.
    ///
    /// `None` means the trees share nothing. When one side is unconstrained
    /// the other is returned unchanged. The result carries no endpoints.
    pub fn intersect(
        &self,
        tree: &LinkTree,
        other: &LinkTree,
    ) -> Result<Option<LinkTree>, LinkageError> {
        if tree.is_unconstrained() {
            return Ok(Some(other.clone()));
        }
        if other.is_unconstrained() {
            return Ok(Some(tree.clone()));
        }
        let left = self.stripped_singles(tree)?;
        let right = self.stripped_singles(other)?;

        let mut kept: Vec<Branch> = Vec::new();
        for (source, target) in [(&left, &right), (&right, &left)] {
            for single in source {
                for piece in self.enumerate_subtrees(single)? {
                    let shape = piece.to_tree();
                    let common = target.iter().any(|whole| fits(&shape, whole, false));
                    let fresh = !kept.iter().any(|seen| {
                        seen.is_conjunction() == piece.is_conjunction()
                            && same_shape(&seen.to_tree(), &shape)
                    });
                    if common && fresh {
                        kept.push(piece);
                    }
                }
            }
        }

        let shapes: Vec<LinkTree> = kept.iter().map(Branch::to_tree).collect();
        let maximal: Vec<LinkTree> = shapes
            .iter()
            .enumerate()
            .filter(|(idx, piece)| {
                !shapes.iter().enumerate().any(|(other_idx, larger)| {
                    other_idx != *idx
                        && fits(piece, larger, false)
                        && (!fits(larger, piece, false) || other_idx < *idx)
                })
            })
            .map(|(_, piece)| piece.clone())
            .collect();
        tracing::trace!(
            candidates = shapes.len(),
            maximal = maximal.len(),
            "intersection pieces"
        );
        if maximal.is_empty() {
            return Ok(None);
        }
        Ok(Some(LinkTree::any_of(maximal)))
    }

    fn stripped_singles(&self, tree: &LinkTree) -> Result<Vec<LinkTree>, LinkageError> {
        self.expand_to_singles(tree)?
            .iter()
            .map(|single| single.set_endpoints_on_all_subitems(None))
            .collect()
    }

    /// Whether both trees describe the same set of realizations.
    ///
    /// Both sides are normalized first. Unless `ignore_metadata` is set,
    /// corresponding nodes must carry matching endpoints at every layer.
    pub fn equals(
        &self,
        tree: &LinkTree,
        other: &LinkTree,
        ignore_metadata: bool,
    ) -> Result<bool, LinkageError> {
        let left = self.normalize(tree)?;
        let right = self.normalize(other)?;
        if !ignore_metadata && !metadata_matches(left.metadata(), right.metadata()) {
            return Ok(false);
        }
        let endpoints = !ignore_metadata;
        if shape_matches(&left, &right, endpoints) {
            return Ok(true);
        }
        let left = self.expand_to_singles(&left)?;
        let right = self.expand_to_singles(&right)?;
        let covers = |a: &[LinkTree], b: &[LinkTree]| {
            a.iter()
                .all(|x| b.iter().any(|y| shape_matches(x, y, endpoints)))
        };
        Ok(covers(&left, &right) && covers(&right, &left))
    }
}
