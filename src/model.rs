//! Data models for the ULD packing run.
//!
//! This module defines the fundamental data structures of a run:
//! - `Uld`: a transport container with interior extents and a weight limit
//! - `Package`: an item to be shipped, with a priority class and deferral cost
//! - `Placement`: a package claimed into a ULD at a rotation and position
//!
//! All structures implement the traits from the `types` module.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{BoundingBox, Dimensional, Vec3};

/// Validation error for ULD and package data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
}

fn validate_identifier(id: &str, kind: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::InvalidIdentifier(format!(
            "{kind} identifier must not be empty"
        )));
    }
    Ok(())
}

fn validate_dimension(value: u32, name: &str) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::InvalidDimension(format!(
            "{name} must be positive, got: {value}"
        )));
    }
    Ok(())
}

fn validate_dims(dims: (u32, u32, u32), kind: &str) -> Result<(), ValidationError> {
    validate_dimension(dims.0, &format!("{kind} length"))?;
    validate_dimension(dims.1, &format!("{kind} width"))?;
    validate_dimension(dims.2, &format!("{kind} height"))?;
    Ok(())
}

fn validate_weight_value(value: u32, name: &str) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::InvalidWeight(format!(
            "{name} must be positive, got: {value}"
        )));
    }
    Ok(())
}

/// Priority class of a package.
///
/// Priority packages are placed first and never carry a deferral cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Priority,
    Economy,
}

impl Priority {
    /// Sort rank: lower ranks are packed first.
    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            Priority::Priority => 0,
            Priority::Economy => 1,
        }
    }

    pub fn is_priority(self) -> bool {
        matches!(self, Priority::Priority)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Priority => write!(f, "Priority"),
            Priority::Economy => write!(f, "Economy"),
        }
    }
}

/// A unit load device: the transport container packages are claimed into.
///
/// # Fields
/// * `id` - Unique identifier of the ULD
/// * `dims` - Interior extents (length, width, height)
/// * `weight_limit` - Maximum total weight of the load
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Uld {
    #[schema(example = "U1")]
    pub id: String,
    #[schema(value_type = [u32; 3], example = json!([224, 318, 162]))]
    pub dims: (u32, u32, u32),
    #[schema(example = 2500)]
    pub weight_limit: u32,
}

impl Uld {
    /// Creates a new ULD with validation.
    ///
    /// # Returns
    /// `Ok(Uld)` for valid values, otherwise `Err(ValidationError)`
    pub fn new(
        id: impl Into<String>,
        dims: (u32, u32, u32),
        weight_limit: u32,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_identifier(&id, "ULD")?;
        validate_dims(dims, "ULD")?;
        validate_weight_value(weight_limit, "ULD weight limit")?;
        Ok(Self {
            id,
            dims,
            weight_limit,
        })
    }

    /// Re-runs validation on a deserialized value.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Self::new(self.id, self.dims, self.weight_limit)
    }

    #[inline]
    pub fn dims_as_vec3(&self) -> Vec3 {
        Vec3::from_tuple(self.dims)
    }
}

impl Dimensional for Uld {
    fn dimensions(&self) -> Vec3 {
        self.dims_as_vec3()
    }
}

/// A package to be shipped.
///
/// # Fields
/// * `id` - Unique identifier of the package
/// * `dims` - Extents (length, width, height) before rotation
/// * `weight` - Weight of the package
/// * `priority` - Priority class
/// * `deferral_cost` - Cost incurred when an Economy package is left behind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Package {
    pub id: String,
    pub dims: (u32, u32, u32),
    pub weight: u32,
    pub priority: Priority,
    pub deferral_cost: u32,
}

impl Package {
    /// Creates a new package with validation.
    ///
    /// The deferral cost of a Priority package is always zero; any value
    /// passed for one is discarded.
    pub fn new(
        id: impl Into<String>,
        dims: (u32, u32, u32),
        weight: u32,
        priority: Priority,
        deferral_cost: u32,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        validate_identifier(&id, "Package")?;
        validate_dims(dims, "Package")?;
        validate_weight_value(weight, "Package weight")?;
        let deferral_cost = match priority {
            Priority::Priority => 0,
            Priority::Economy => deferral_cost,
        };
        Ok(Self {
            id,
            dims,
            weight,
            priority,
            deferral_cost,
        })
    }

    /// Calculates the volume of the package as `length * width * height`.
    pub fn volume(&self) -> u64 {
        self.dims_as_vec3().volume()
    }

    #[inline]
    pub fn dims_as_vec3(&self) -> Vec3 {
        Vec3::from_tuple(self.dims)
    }
}

impl Dimensional for Package {
    fn dimensions(&self) -> Vec3 {
        self.dims_as_vec3()
    }
}

/// A package claimed into a ULD.
///
/// `extents` are the package dimensions after rotation, mapped onto the
/// ULD's (length, width, height) axes. `min` and `max` are opposite corners
/// of the occupied box in ULD-local coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Placement {
    pub package_id: String,
    pub uld_id: String,
    #[schema(value_type = [u32; 3], example = json!([99, 53, 55]))]
    pub extents: (u32, u32, u32),
    #[schema(value_type = [u32; 3], example = json!([0, 0, 0]))]
    pub min: (u32, u32, u32),
    #[schema(value_type = [u32; 3], example = json!([99, 53, 55]))]
    pub max: (u32, u32, u32),
}

impl Placement {
    pub fn new(package_id: &str, uld_id: &str, bounds: BoundingBox) -> Self {
        Self {
            package_id: package_id.to_string(),
            uld_id: uld_id.to_string(),
            extents: bounds.extents().as_tuple(),
            min: bounds.min.as_tuple(),
            max: bounds.max.as_tuple(),
        }
    }
}

impl Dimensional for Placement {
    fn dimensions(&self) -> Vec3 {
        Vec3::from_tuple(self.extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uld_rejects_zero_dimension() {
        let err = Uld::new("U1", (10, 0, 10), 100).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDimension(_)));
    }

    #[test]
    fn uld_rejects_zero_weight_limit() {
        let err = Uld::new("U1", (10, 10, 10), 0).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidWeight(_)));
    }

    #[test]
    fn package_rejects_blank_identifier() {
        let err = Package::new("  ", (1, 1, 1), 1, Priority::Economy, 3).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidIdentifier(_)));
    }

    #[test]
    fn priority_package_drops_deferral_cost() {
        let pkg = Package::new("P-2", (56, 99, 81), 53, Priority::Priority, 99).unwrap();
        assert_eq!(pkg.deferral_cost, 0);

        let pkg = Package::new("P-1", (99, 53, 55), 61, Priority::Economy, 176).unwrap();
        assert_eq!(pkg.deferral_cost, 176);
    }

    #[test]
    fn package_volume_is_product_of_dims() {
        let pkg = Package::new("P-1", (99, 53, 55), 61, Priority::Economy, 176).unwrap();
        assert_eq!(pkg.volume(), 99 * 53 * 55);
    }

    #[test]
    fn priority_deserializes_lowercase() {
        let classes: Vec<Priority> = serde_json::from_str(r#"["priority", "economy"]"#).unwrap();
        assert_eq!(classes, [Priority::Priority, Priority::Economy]);
    }

    #[test]
    fn placement_keeps_corners_and_extents() {
        let bounds = BoundingBox::from_origin_and_extents(Vec3::new(5, 0, 2), Vec3::new(3, 4, 5));
        let placement = Placement::new("P-1", "U1", bounds);

        assert_eq!(placement.min, (5, 0, 2));
        assert_eq!(placement.max, (8, 4, 7));
        assert_eq!(placement.extents, (3, 4, 5));
        assert_eq!(placement.volume(), 60);
    }
}
