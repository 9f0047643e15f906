// ABOUTME: Phantom-typed GUIDs for platform resources.
// ABOUTME: Prevents passing a package GUID where a droplet GUID is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum OrgMarker {}
pub enum SpaceMarker {}
pub enum AppMarker {}
pub enum PackageMarker {}
pub enum BuildMarker {}
pub enum DropletMarker {}
pub enum DomainMarker {}
pub enum RouteMarker {}
pub enum DeploymentMarker {}

/// A platform GUID tagged with the kind of resource it names.
///
/// An empty GUID means "not known yet": a plan for an application that has
/// not been created, or a package that has not been uploaded.
#[must_use = "GUIDs reference remote resources and should not be ignored"]
pub struct Guid<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Guid<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// The "not yet known" GUID.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

// Manual trait implementations that don't require T to implement the trait.

impl<T> Default for Guid<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> std::fmt::Debug for Guid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Guid").field(&self.value).finish()
    }
}

impl<T> Clone for Guid<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Guid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Guid<T> {}

impl<T> Hash for Guid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Guid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Guid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Guid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type OrgGuid = Guid<OrgMarker>;
pub type SpaceGuid = Guid<SpaceMarker>;
pub type AppGuid = Guid<AppMarker>;
pub type PackageGuid = Guid<PackageMarker>;
pub type BuildGuid = Guid<BuildMarker>;
pub type DropletGuid = Guid<DropletMarker>;
pub type DomainGuid = Guid<DomainMarker>;
pub type RouteGuid = Guid<RouteMarker>;
pub type DeploymentGuid = Guid<DeploymentMarker>;
