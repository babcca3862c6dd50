//! Resolution engine.
//!
//! A tree is *resolved* when every edge below a concrete node leads to one of
//! that node's direct parents. Normalization inserts the missing intermediate
//! layers; when a kind has several direct parents that all lead down to the
//! attached layer, each of them becomes its own alternative. This fan-out is
//! the main source of growth in the algebra and is bounded by the lineage's
//! expansion ceiling.
//!
//! A tree is *single* when it is resolved and contains no OR anywhere.
//! [`Lineage::expand_to_singles`] enumerates the single realizations of any
//! tree; [`Lineage::enumerate_subtrees`] cuts a single tree into every
//! connected piece the comparison engine may need.

use crate::compare::same_shape;
use crate::error::LinkageError;
use crate::kind::{LinkKind, Lineage};
use crate::tree::{Branch, LinkTree};

/// Every way of picking one option per slot, concatenated.
fn product(combos: Vec<Vec<LinkTree>>, options: &[Vec<LinkTree>]) -> Vec<Vec<LinkTree>> {
    let mut out = Vec::with_capacity(combos.len() * options.len());
    for combo in &combos {
        for option in options {
            let mut next = combo.clone();
            next.extend(option.iter().cloned());
            out.push(next);
        }
    }
    out
}

/// Non-empty, order-preserving subsets, full set first.
///
/// Callers bound the count with `Lineage::check_subsets` first.
fn subsets(items: &[LinkTree]) -> impl Iterator<Item = Vec<&LinkTree>> {
    let total = 1usize.checked_shl(items.len() as u32).unwrap_or(0);
    (1..total).rev().map(move |mask| {
        items
            .iter()
            .enumerate()
            .filter(|(idx, _)| mask & (1usize << idx) != 0)
            .map(|(_, item)| item)
            .collect()
    })
}

impl Lineage<'_> {
    pub fn is_resolved(&self, tree: &LinkTree) -> bool {
        tree.branches()
            .iter()
            .flat_map(Branch::members)
            .all(|member| {
                let direct = match (tree.kind(), member.kind()) {
                    (None, _) => true,
                    (Some(kind), Some(lower)) => self.is_direct_parent(lower, kind),
                    (Some(_), None) => false,
                };
                direct && self.is_resolved(member)
            })
    }

    pub fn is_single(&self, tree: &LinkTree) -> bool {
        fn or_free(tree: &LinkTree) -> bool {
            match tree.branches() {
                [] => true,
                [only] => only.members().iter().all(or_free),
                _ => false,
            }
        }
        or_free(tree) && self.is_resolved(tree)
    }

    pub(crate) fn require_resolved(&self, tree: &LinkTree) -> Result<(), LinkageError> {
        if self.is_resolved(tree) {
            Ok(())
        } else {
            Err(LinkageError::Precondition(format!("`{tree}` is not resolved")))
        }
    }

    /// Equivalent tree in which every edge is a direct-parent edge.
    pub fn normalize(&self, tree: &LinkTree) -> Result<LinkTree, LinkageError> {
        let mut out = tree.shell();
        let Some(kind) = tree.kind() else {
            for branch in tree.branches() {
                let members = branch
                    .members()
                    .iter()
                    .map(|member| self.normalize(member))
                    .collect::<Result<Vec<_>, _>>()?;
                out.push_branch(match branch {
                    Branch::Single(_) => Branch::all_of(members),
                    Branch::Conjunction(_) => Branch::Conjunction(members),
                });
            }
            return Ok(out.collapsed());
        };

        let parents = self.declared_parents(kind)?;
        let mut alternatives = 0usize;
        for branch in tree.branches() {
            let mut combos = vec![Vec::new()];
            for member in branch.members() {
                let options = self.lift(kind, parents, member)?;
                combos = product(combos, &options);
                self.check_budget(combos.len())?;
            }
            alternatives += combos.len();
            self.check_budget(alternatives)?;
            for group in combos {
                out.push_branch(match branch {
                    Branch::Single(_) => Branch::all_of(group),
                    Branch::Conjunction(_) => Branch::Conjunction(group),
                });
            }
        }
        Ok(out)
    }

    /// Resolved alternatives for `member` placed directly below `kind`.
    ///
    /// Each alternative is an AND-group; it has one element unless `member`
    /// is a container that carries a conjunction. A container's endpoints
    /// move onto the members it is dissolved into.
    fn lift(
        &self,
        kind: &LinkKind,
        parents: &[LinkKind],
        member: &LinkTree,
    ) -> Result<Vec<Vec<LinkTree>>, LinkageError> {
        let Some(lower) = member.kind() else {
            let mut out = Vec::new();
            for branch in member.branches() {
                let mut combos = vec![Vec::new()];
                for inner in branch.members() {
                    combos = product(combos, &self.lift(kind, parents, inner)?);
                    self.check_budget(combos.len())?;
                }
                out.extend(combos);
            }
            for lifted in out.iter_mut().flatten() {
                lifted.inherit_metadata(member.metadata());
            }
            return Ok(out);
        };

        if parents.contains(lower) {
            return Ok(vec![vec![self.normalize(member)?]]);
        }

        let via: Vec<&LinkKind> = parents
            .iter()
            .filter(|parent| self.is_ancestor(lower, parent))
            .collect();
        if via.is_empty() {
            return Err(LinkageError::IllegalLinkType {
                kind: kind.clone(),
                attached: member.to_string(),
            });
        }
        if via.len() > 1 {
            tracing::debug!(
                graph = self.graph(),
                %kind,
                %lower,
                alternatives = via.len(),
                "indirect edge fans out over several direct parents"
            );
        }
        via.into_iter()
            .map(|parent| {
                let step = LinkTree::from_parts(
                    Some(parent.clone()),
                    vec![Branch::Single(member.clone())],
                    member.metadata().cloned(),
                );
                Ok(vec![self.normalize(&step)?])
            })
            .collect()
    }

    /// Every single (OR-free) realization of `tree`, without duplicates.
    ///
    /// The node's endpoints are carried onto every realization.
    pub fn expand_to_singles(&self, tree: &LinkTree) -> Result<Vec<LinkTree>, LinkageError> {
        if self.is_single(tree) {
            return Ok(vec![tree.clone()]);
        }
        let resolved = self.normalize(tree)?;
        if self.is_single(&resolved) {
            return Ok(vec![resolved]);
        }

        let mut out: Vec<LinkTree> = Vec::new();
        for branch in resolved.branches() {
            let mut combos = vec![Vec::new()];
            for member in branch.members() {
                let options: Vec<Vec<LinkTree>> = self
                    .expand_to_singles(member)?
                    .into_iter()
                    .map(|single| vec![single])
                    .collect();
                combos = product(combos, &options);
                self.check_budget(combos.len())?;
            }
            for group in combos {
                let realized = match branch {
                    Branch::Single(_) => Branch::all_of(group),
                    Branch::Conjunction(_) => Branch::Conjunction(group),
                };
                let realized = match realized {
                    Branch::Single(mut only) if resolved.is_container() => {
                        only.inherit_metadata(resolved.metadata());
                        only
                    }
                    realized => {
                        let mut node = resolved.shell();
                        node.push_branch(realized);
                        node
                    }
                };
                if !out.iter().any(|seen| same_shape(seen, &realized)) {
                    out.push(realized);
                    self.check_budget(out.len())?;
                }
            }
        }
        Ok(out)
    }

    /// Subsets of an AND-group of `width` members, checked against the
    /// expansion ceiling before any of them is built.
    fn check_subsets(&self, width: usize) -> Result<(), LinkageError> {
        let Some(total) = 1usize.checked_shl(width as u32) else {
            return Err(LinkageError::Precondition(format!(
                "an AND-group of {width} members is too wide to enumerate"
            )));
        };
        self.check_budget(total - 1)
    }

    /// Every connected piece of a single tree.
    ///
    /// For each concrete node: the node with all of its lower layers, then
    /// with the deepest layers cut away step by step, down to the bare node.
    /// Conjunctions are explored member-subset by member-subset, and every
    /// conjunction also yields its AND-groups of two or more members as
    /// pieces of their own. Pieces are listed from the root downwards.
    pub fn enumerate_subtrees(&self, tree: &LinkTree) -> Result<Vec<Branch>, LinkageError> {
        if !self.is_single(tree) {
            return Err(LinkageError::Precondition(format!(
                "`{tree}` is not single; expand it first"
            )));
        }
        let mut out: Vec<Branch> = Vec::new();
        self.collect_pieces(tree, &mut out)?;
        let mut unique: Vec<Branch> = Vec::with_capacity(out.len());
        for piece in out {
            if !unique.iter().any(|seen| same_branch_shape(seen, &piece)) {
                unique.push(piece);
            }
        }
        Ok(unique)
    }

    fn collect_pieces(&self, tree: &LinkTree, out: &mut Vec<Branch>) -> Result<(), LinkageError> {
        if tree.kind().is_some() {
            out.extend(self.prefixes(tree)?.into_iter().map(Branch::Single));
            self.check_budget(out.len())?;
        }
        for branch in tree.branches() {
            let members = branch.members();
            if members.len() > 1 {
                self.check_subsets(members.len())?;
                for subset in subsets(members).filter(|s| s.len() > 1) {
                    let mut combos = vec![Vec::new()];
                    for member in subset {
                        let options: Vec<Vec<LinkTree>> = self
                            .prefixes(member)?
                            .into_iter()
                            .map(|piece| vec![piece])
                            .collect();
                        combos = product(combos, &options);
                        self.check_budget(combos.len())?;
                    }
                    out.extend(combos.into_iter().map(Branch::Conjunction));
                    self.check_budget(out.len())?;
                }
            }
            for member in members {
                self.collect_pieces(member, out)?;
            }
        }
        Ok(())
    }

    /// `tree` truncated at every depth, full tree first, bare node last.
    fn prefixes(&self, tree: &LinkTree) -> Result<Vec<LinkTree>, LinkageError> {
        let mut out = Vec::new();
        for branch in tree.branches() {
            self.check_subsets(branch.members().len())?;
            for subset in subsets(branch.members()) {
                let mut combos = vec![Vec::new()];
                for member in subset {
                    let options: Vec<Vec<LinkTree>> = self
                        .prefixes(member)?
                        .into_iter()
                        .map(|piece| vec![piece])
                        .collect();
                    combos = product(combos, &options);
                    self.check_budget(combos.len())?;
                }
                for group in combos {
                    let mut node = tree.shell();
                    node.push_branch(Branch::all_of(group));
                    out.push(node);
                    self.check_budget(out.len())?;
                }
            }
        }
        out.push(tree.shell());
        Ok(out)
    }
}

fn same_branch_shape(a: &Branch, b: &Branch) -> bool {
    a.is_conjunction() == b.is_conjunction() && same_shape(&a.to_tree(), &b.to_tree())
}
