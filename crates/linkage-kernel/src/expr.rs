//! Builder algebra: AND/OR expressions over kinds and trees.
//!
//! An [`Expr`] is transient. It exists while a requirement is being written
//! and is reduced by [`Expr::simplify`] into a flat disjunction whose members
//! are single trees or flat conjunctions. AND distributes over OR by
//! Cartesian product; nothing of the shape AND-of-OR survives.

use crate::error::LinkageError;
use crate::kind::{LinkKind, Lineage};
use crate::tree::{Branch, LinkTree};
use std::ops::{BitAnd, BitOr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Kind(LinkKind),
    Tree(LinkTree),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn and(self, other: impl Into<Expr>) -> Self {
        Self::And(Box::new(self), Box::new(other.into()))
    }

    pub fn or(self, other: impl Into<Expr>) -> Self {
        Self::Or(Box::new(self), Box::new(other.into()))
    }

    /// Reduce to a flat OR-set of single trees and conjunctions.
    pub fn simplify(&self) -> Result<Vec<Branch>, LinkageError> {
        match self {
            Self::Kind(kind) => Ok(vec![Branch::Single(LinkTree::new(kind.clone()))]),
            Self::Tree(tree) => Ok(vec![Branch::Single(tree.clone())]),
            Self::Or(left, right) => {
                let mut out = left.simplify()?;
                out.extend(right.simplify()?);
                Ok(out)
            }
            Self::And(left, right) => {
                let left = left.simplify()?;
                let right = right.simplify()?;
                let mut out = Vec::with_capacity(left.len() * right.len());
                for l in &left {
                    for r in &right {
                        let mut members = conjunct_members(l)?;
                        members.extend(conjunct_members(r)?);
                        out.push(Branch::Conjunction(members));
                    }
                }
                Ok(out)
            }
        }
    }
}

/// Members an alternative contributes to an enclosing conjunction.
fn conjunct_members(branch: &Branch) -> Result<Vec<LinkTree>, LinkageError> {
    let mut out = Vec::new();
    for member in branch.members() {
        if member.kind().is_some() {
            out.push(member.clone());
            continue;
        }
        match member.branches() {
            [] => {
                return Err(LinkageError::InvalidExpression(
                    "an empty container cannot be part of a conjunction".to_string(),
                ));
            }
            [only] => out.extend(conjunct_members(only)?),
            _ => {
                return Err(LinkageError::InvalidExpression(format!(
                    "conjunction over the alternatives `{member}` is ambiguous"
                )));
            }
        }
    }
    Ok(out)
}

impl From<LinkKind> for Expr {
    fn from(kind: LinkKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<&LinkKind> for Expr {
    fn from(kind: &LinkKind) -> Self {
        Self::Kind(kind.clone())
    }
}

impl From<LinkTree> for Expr {
    fn from(tree: LinkTree) -> Self {
        Self::Tree(tree)
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Self::Kind(LinkKind::new(name))
    }
}

macro_rules! expr_operators {
    ($($ty:ty),*) => {$(
        impl<R: Into<Expr>> BitAnd<R> for $ty {
            type Output = Expr;

            fn bitand(self, rhs: R) -> Expr {
                Expr::from(self).and(rhs)
            }
        }

        impl<R: Into<Expr>> BitOr<R> for $ty {
            type Output = Expr;

            fn bitor(self, rhs: R) -> Expr {
                Expr::from(self).or(rhs)
            }
        }
    )*};
}

expr_operators!(Expr, LinkKind, LinkTree);

impl Lineage<'_> {
    /// Attach `with` as further lower-layer alternatives of `base`.
    ///
    /// Below a concrete kind every attached kind must be one of its
    /// ancestors, not necessarily a direct one. Containers accept anything.
    /// Attached containers without endpoints are spliced into their
    /// alternatives.
    pub fn combine(&self, base: &LinkTree, with: impl Into<Expr>) -> Result<LinkTree, LinkageError> {
        let mut out = base.clone();
        for branch in with.into().simplify()? {
            let spliced = match branch {
                Branch::Single(tree) if tree.is_container() && tree.metadata().is_none() => {
                    tree.into_branches()
                }
                other => vec![other],
            };
            for branch in spliced {
                if let Some(kind) = base.kind() {
                    for member in branch.members() {
                        self.check_attachable(kind, member)?;
                    }
                }
                out.push_branch(branch);
            }
        }
        tracing::trace!(tree = %out, "combined");
        Ok(out)
    }

    /// Build a requirement from an expression alone.
    pub fn build(&self, expr: impl Into<Expr>) -> Result<LinkTree, LinkageError> {
        Ok(self.combine(&LinkTree::container(), expr)?.collapsed())
    }

    fn check_attachable(&self, kind: &LinkKind, tree: &LinkTree) -> Result<(), LinkageError> {
        match tree.kind() {
            Some(attached) if self.is_ancestor(attached, kind) => Ok(()),
            Some(_) => Err(LinkageError::IllegalLinkType {
                kind: kind.clone(),
                attached: tree.to_string(),
            }),
            None => tree
                .branches()
                .iter()
                .flat_map(Branch::members)
                .try_for_each(|member| self.check_attachable(kind, member)),
        }
    }
}

impl LinkTree {
    /// `lineage.combine(self, with)`.
    pub fn combine_with(
        &self,
        lineage: &Lineage<'_>,
        with: impl Into<Expr>,
    ) -> Result<LinkTree, LinkageError> {
        lineage.combine(self, with)
    }
}
