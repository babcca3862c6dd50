//! Link trees: connection requirements over link kinds.
//!
//! A [`LinkTree`] node is either concrete (it names a [`LinkKind`]) or a
//! container that only groups alternatives. Its [`Branch`]es are the lower
//! layer alternatives (logical OR); a [`Branch::Conjunction`] requires all of
//! its members at once (logical AND). A node without branches places no
//! constraint below itself.
//!
//! Trees are values. Every algebra operation returns a fresh tree and leaves
//! its inputs untouched.

use crate::endpoint::{self, DeviceRef, EndpointMetadata};
use crate::error::LinkageError;
use crate::kind::LinkKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTree {
    kind: Option<LinkKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    branches: Vec<Branch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<EndpointMetadata>,
}

/// One OR-alternative below a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Single(LinkTree),
    Conjunction(Vec<LinkTree>),
}

impl Branch {
    /// Build an AND-group; a group of one is the member itself.
    pub fn all_of(mut members: Vec<LinkTree>) -> Self {
        if members.len() == 1 {
            if let Some(only) = members.pop() {
                return Self::Single(only);
            }
        }
        Self::Conjunction(members)
    }

    /// The trees that must hold simultaneously for this alternative.
    pub fn members(&self) -> &[LinkTree] {
        match self {
            Self::Single(tree) => std::slice::from_ref(tree),
            Self::Conjunction(members) => members,
        }
    }

    pub fn into_members(self) -> Vec<LinkTree> {
        match self {
            Self::Single(tree) => vec![tree],
            Self::Conjunction(members) => members,
        }
    }

    pub fn is_conjunction(&self) -> bool {
        matches!(self, Self::Conjunction(_))
    }

    /// View this alternative as a tree: the member itself, or a container
    /// holding the AND-group.
    pub fn to_tree(&self) -> LinkTree {
        match self {
            Self::Single(tree) => tree.clone(),
            Self::Conjunction(_) => LinkTree {
                kind: None,
                branches: vec![self.clone()],
                metadata: None,
            },
        }
    }
}

impl LinkTree {
    /// A concrete node with no constraint below it.
    pub fn new(kind: impl Into<LinkKind>) -> Self {
        Self {
            kind: Some(kind.into()),
            branches: Vec::new(),
            metadata: None,
        }
    }

    /// An empty container: no constraint at all.
    pub fn container() -> Self {
        Self {
            kind: None,
            branches: Vec::new(),
            metadata: None,
        }
    }

    /// OR-container over realizations.
    ///
    /// Metadata-free containers are spliced in place; a container holding
    /// exactly one plain alternative collapses to it. With no input, or with
    /// an unconstrained input, the result is the unconstrained container.
    pub fn any_of(trees: impl IntoIterator<Item = LinkTree>) -> Self {
        let mut out = Self::container();
        for tree in trees {
            if tree.is_unconstrained() {
                return Self::container();
            }
            if tree.is_container() && tree.metadata.is_none() {
                out.branches.extend(tree.branches);
            } else {
                out.branches.push(Branch::Single(tree));
            }
        }
        out.collapsed()
    }

    pub(crate) fn from_parts(
        kind: Option<LinkKind>,
        branches: Vec<Branch>,
        metadata: Option<EndpointMetadata>,
    ) -> Self {
        Self {
            kind,
            branches,
            metadata,
        }
    }

    pub fn kind(&self) -> Option<&LinkKind> {
        self.kind.as_ref()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn metadata(&self) -> Option<&EndpointMetadata> {
        self.metadata.as_ref()
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_none()
    }

    /// The empty container, which every requirement satisfies.
    pub fn is_unconstrained(&self) -> bool {
        self.kind.is_none() && self.branches.is_empty()
    }

    /// Same node without its branches.
    pub(crate) fn shell(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            branches: Vec::new(),
            metadata: self.metadata.clone(),
        }
    }

    pub(crate) fn push_branch(&mut self, branch: Branch) {
        self.branches.push(branch);
    }

    pub(crate) fn into_branches(self) -> Vec<Branch> {
        self.branches
    }

    /// A container with one plain alternative is that alternative, taking
    /// over the container's metadata when it has none of its own.
    pub(crate) fn collapsed(mut self) -> Self {
        if self.kind.is_some() || self.branches.len() != 1 || self.branches[0].is_conjunction() {
            return self;
        }
        let Some(Branch::Single(mut only)) = self.branches.pop() else {
            return self;
        };
        if only.metadata.is_none() {
            only.metadata = self.metadata.take();
        } else if self.metadata.is_some() {
            self.branches.push(Branch::Single(only));
            return self;
        }
        only
    }

    /// Give this node `metadata` unless it already carries some.
    pub(crate) fn inherit_metadata(&mut self, metadata: Option<&EndpointMetadata>) {
        if self.metadata.is_none() {
            self.metadata = metadata.cloned();
        }
    }

    /// Set or clear this node's endpoints under the one-shot rule.
    pub fn set_endpoints(&mut self, metadata: Option<EndpointMetadata>) -> Result<(), LinkageError> {
        endpoint::assign(&mut self.metadata, metadata)
    }

    pub fn with_endpoints(mut self, metadata: EndpointMetadata) -> Result<Self, LinkageError> {
        self.set_endpoints(Some(metadata))?;
        Ok(self)
    }

    /// Copy of this tree with `metadata` set (or cleared) on every node.
    pub fn set_endpoints_on_all_subitems(
        &self,
        metadata: Option<&EndpointMetadata>,
    ) -> Result<Self, LinkageError> {
        let mut out = self.shell();
        out.set_endpoints(metadata.cloned())?;
        for branch in &self.branches {
            out.branches.push(match branch {
                Branch::Single(lower) => {
                    Branch::Single(lower.set_endpoints_on_all_subitems(metadata)?)
                }
                Branch::Conjunction(members) => Branch::Conjunction(
                    members
                        .iter()
                        .map(|member| member.set_endpoints_on_all_subitems(metadata))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
            });
        }
        Ok(out)
    }

    /// Copy of this tree bound to a connection between two device ports, on
    /// every node. A unidirectional binding only leads from `from_endpoint`
    /// to `to_endpoint`.
    pub fn apply_endpoints(
        &self,
        from_endpoint: &DeviceRef,
        from_label: &str,
        to_endpoint: &DeviceRef,
        to_label: &str,
        bidirectional: bool,
    ) -> Result<Self, LinkageError> {
        let metadata = EndpointMetadata::new(
            from_endpoint.clone(),
            from_label,
            to_endpoint.clone(),
            to_label,
            bidirectional,
        );
        self.set_endpoints_on_all_subitems(Some(&metadata))
    }

    /// Device and label at the other end of `endpoint`.
    pub fn partner_of(
        &self,
        endpoint: &DeviceRef,
        label: Option<&str>,
    ) -> Result<(DeviceRef, String), LinkageError> {
        let Some(metadata) = &self.metadata else {
            return Err(LinkageError::Precondition(format!(
                "`{self}` has no endpoints"
            )));
        };
        metadata.partner_of(endpoint, label)
    }

    /// Whether this tree's connection leads from `start` (to `end`).
    /// A tree without endpoints connects nothing.
    pub fn connects(
        &self,
        start: &DeviceRef,
        start_label: Option<&str>,
        end: Option<&DeviceRef>,
        end_label: Option<&str>,
    ) -> bool {
        self.metadata
            .as_ref()
            .is_some_and(|m| m.connects(start, start_label, end, end_label))
    }
}

impl Default for LinkTree {
    fn default() -> Self {
        Self::container()
    }
}

impl From<LinkKind> for LinkTree {
    fn from(kind: LinkKind) -> Self {
        Self::new(kind)
    }
}

// Rendering uses the requirement notation:
//   expr := and ('|' and)*   and := chain ('&' chain)*
//   chain := term ('>' chain)?   term := KIND | '(' expr ')' | '*'

fn write_chain(tree: &LinkTree, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Some(kind) = &tree.kind else {
        if tree.branches.is_empty() {
            return f.write_str("*");
        }
        f.write_str("(")?;
        write_alternatives(&tree.branches, f)?;
        return f.write_str(")");
    };
    write!(f, "{kind}")?;
    match tree.branches.as_slice() {
        [] => Ok(()),
        [Branch::Single(lower)] => {
            f.write_str(" > ")?;
            write_chain(lower, f)
        }
        branches => {
            f.write_str(" > (")?;
            write_alternatives(branches, f)?;
            f.write_str(")")
        }
    }
}

fn write_alternatives(branches: &[Branch], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (idx, branch) in branches.iter().enumerate() {
        if idx > 0 {
            f.write_str(" | ")?;
        }
        for (pos, member) in branch.members().iter().enumerate() {
            if pos > 0 {
                f.write_str(" & ")?;
            }
            write_chain(member, f)?;
        }
    }
    Ok(())
}

impl fmt::Display for LinkTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_none() && !self.branches.is_empty() {
            write_alternatives(&self.branches, f)
        } else {
            write_chain(self, f)
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_alternatives(std::slice::from_ref(self), f)
    }
}
