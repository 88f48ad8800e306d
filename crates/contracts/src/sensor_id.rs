//! SensorId - Cheap-to-clone stream identifier
//!
//! Stamped on every envelope, so cloning must not allocate.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::DEFAULT_SENSOR_ID;

/// Sensor identifier backed by `Arc<str>`.
///
/// # Examples
/// ```
/// use contracts::SensorId;
///
/// let id: SensorId = "ctg-bed-4".into();
/// let per_tick = id.clone();
/// assert_eq!(id, per_tick);
/// assert_eq!(id.as_str(), "ctg-bed-4");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SensorId(Arc<str>);

impl SensorId {
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SensorId {
    fn default() -> Self {
        Self::new(DEFAULT_SENSOR_ID)
    }
}

impl Deref for SensorId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for SensorId {
    #[inline]
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SensorId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensorId({:?})", self.0)
    }
}

impl PartialEq<str> for SensorId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for SensorId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for SensorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SensorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
