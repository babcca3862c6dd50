//! Endpoint metadata attached to link trees.
//!
//! Metadata names the two devices (and their ports) a connection joins. It
//! is either fully present or fully absent. Once set it is one-shot: it may
//! be re-set to an equal value, or cleared, but never silently replaced.

use crate::error::LinkageError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Opaque, shared reference to a device taking part in a connection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceRef(Arc<str>);

impl DeviceRef {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DeviceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeviceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::new(String::deserialize(deserializer)?))
    }
}

/// The two endpoints of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointMetadata {
    pub from_endpoint: DeviceRef,
    pub from_label: String,
    pub to_endpoint: DeviceRef,
    pub to_label: String,
    pub bidirectional: bool,
}

impl EndpointMetadata {
    pub fn new(
        from_endpoint: DeviceRef,
        from_label: impl Into<String>,
        to_endpoint: DeviceRef,
        to_label: impl Into<String>,
        bidirectional: bool,
    ) -> Self {
        Self {
            from_endpoint,
            from_label: from_label.into(),
            to_endpoint,
            to_label: to_label.into(),
            bidirectional,
        }
    }

    /// The same connection seen from the other end.
    pub fn mirrored(&self) -> Self {
        Self {
            from_endpoint: self.to_endpoint.clone(),
            from_label: self.to_label.clone(),
            to_endpoint: self.from_endpoint.clone(),
            to_label: self.from_label.clone(),
            bidirectional: self.bidirectional,
        }
    }

    /// Equal, or mirrored when either side is bidirectional.
    pub fn matches(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        (self.bidirectional || other.bidirectional)
            && self.from_endpoint == other.to_endpoint
            && self.from_label == other.to_label
            && self.to_endpoint == other.from_endpoint
            && self.to_label == other.from_label
    }

    /// The device and label on the opposite end of `endpoint`.
    ///
    /// With `label` omitted the first end on `endpoint` is used, which
    /// matters only for loop-back connections.
    pub fn partner_of(
        &self,
        endpoint: &DeviceRef,
        label: Option<&str>,
    ) -> Result<(DeviceRef, String), LinkageError> {
        let at_from =
            self.from_endpoint == *endpoint && label.is_none_or(|l| l == self.from_label);
        let at_to = self.to_endpoint == *endpoint && label.is_none_or(|l| l == self.to_label);
        if at_from {
            Ok((self.to_endpoint.clone(), self.to_label.clone()))
        } else if at_to {
            Ok((self.from_endpoint.clone(), self.from_label.clone()))
        } else {
            Err(LinkageError::Precondition(format!(
                "`{endpoint}`{} is not an end of {self}",
                label.map(|l| format!(".{l}")).unwrap_or_default()
            )))
        }
    }

    /// Whether the connection leads from `start` (to `end`, when given).
    /// Unidirectional connections are only traversed from `from` to `to`.
    pub fn connects(
        &self,
        start: &DeviceRef,
        start_label: Option<&str>,
        end: Option<&DeviceRef>,
        end_label: Option<&str>,
    ) -> bool {
        let leads = |src: &DeviceRef, src_label: &str, dst: &DeviceRef, dst_label: &str| {
            src == start
                && start_label.is_none_or(|l| l == src_label)
                && end.is_none_or(|e| e == dst)
                && end_label.is_none_or(|l| l == dst_label)
        };
        leads(
            &self.from_endpoint,
            &self.from_label,
            &self.to_endpoint,
            &self.to_label,
        ) || (self.bidirectional
            && leads(
                &self.to_endpoint,
                &self.to_label,
                &self.from_endpoint,
                &self.from_label,
            ))
    }
}

impl fmt::Display for EndpointMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.bidirectional { "<->" } else { "->" };
        write!(
            f,
            "{}.{} {arrow} {}.{}",
            self.from_endpoint, self.from_label, self.to_endpoint, self.to_label
        )
    }
}

/// Compare optional metadata: both absent, or both present and matching.
pub fn metadata_matches(a: Option<&EndpointMetadata>, b: Option<&EndpointMetadata>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.matches(b),
        _ => false,
    }
}

/// Apply the one-shot rule to a metadata slot.
pub(crate) fn assign(
    slot: &mut Option<EndpointMetadata>,
    value: Option<EndpointMetadata>,
) -> Result<(), LinkageError> {
    if let (Some(current), Some(requested)) = (slot.as_ref(), value.as_ref()) {
        if current != requested {
            return Err(LinkageError::MetadataConflict {
                current: current.to_string(),
                requested: requested.to_string(),
            });
        }
    }
    *slot = value;
    Ok(())
}
