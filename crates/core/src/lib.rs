//! offgc core types: resources read from exported list snapshots, their
//! owner references, the identity key both resolve to, and the delete
//! directive handed to the external executor.

#![forbid(unsafe_code)]

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Deserializer};
use smallvec::SmallVec;

pub mod prelude {
    pub use super::{Directive, Metadata, OwnerReference, Resource, ResourceKey, ResourceList};
}

/// `null` and missing both decode to the type's default, like the list
/// output of `kubectl get -o json` expects.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Canonical identity of a cluster object.
///
/// `kind` is lowercased on construction; `api_version`, `namespace` and
/// `name` are compared exactly. An empty namespace is a distinct value
/// (cluster-scoped).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: String,
    pub api_version: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(kind: &str, api_version: &str, namespace: &str, name: &str) -> Self {
        Self {
            kind: kind.to_lowercase(),
            api_version: api_version.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceKey {
    // Log rendering only; never used for identity.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.kind, self.api_version, self.namespace, self.name)
    }
}

/// Claim of ownership embedded in a resource. The owner is assumed to live
/// in the namespace of the resource carrying the reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl OwnerReference {
    /// Identity of the owner, resolved in the referencing resource's namespace.
    pub fn key(&self, namespace: &str) -> ResourceKey {
        ResourceKey::new(&self.kind, &self.api_version, namespace, &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    /// Almost always zero or one entry.
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner_references: SmallVec<[OwnerReference; 1]>,
}

/// One cluster object read from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

impl Resource {
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.kind, &self.api_version, &self.metadata.namespace, &self.metadata.name)
    }

    pub fn namespace(&self) -> &str { &self.metadata.namespace }
    pub fn name(&self) -> &str { &self.metadata.name }

    /// The owner reference when there is exactly one, `None` otherwise.
    pub fn sole_owner(&self) -> Option<&OwnerReference> {
        match self.metadata.owner_references.as_slice() {
            [owner] => Some(owner),
            _ => None,
        }
    }
}

/// `{"items": [...]}` envelope produced by `kubectl get <kind> -o json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Resource>,
}

/// Description of one object to delete. Never executed by this workspace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Directive {
    pub namespace: String,
    /// Lowercased kind, accepted by `kubectl delete`.
    pub kind: String,
    pub name: String,
}

impl Directive {
    /// Writes `-n <namespace> delete <kind> <name>` terminated by NUL, so
    /// `xargs -0` can split records even when names contain whitespace.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "{}\0", self)
    }
}

impl From<&Resource> for Directive {
    fn from(r: &Resource) -> Self {
        Self {
            namespace: r.metadata.namespace.clone(),
            kind: r.kind.to_lowercase(),
            name: r.metadata.name.clone(),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-n {} delete {} {}", self.namespace, self.kind, self.name)
    }
}
