//! Cost accounting for a finished packing run.
//!
//! Folds the per-ULD outcomes and the final claim state into a `RunResult`:
//! `total_cost = priority_uld_count * K + sum of deferral costs of every
//! unclaimed package`.

use serde::Serialize;
use utoipa::ToSchema;

use crate::claim::ClaimBoard;
use crate::geometry::rotations;
use crate::model::{Package, Placement, Priority, Uld};
use crate::optimizer::{PackingConfig, UldOutcome};
use crate::types::{Dimensional, Vec3};

/// Result of a packing run.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct RunResult {
    /// Placements in ULD input order, each ULD's in placement order
    pub placements: Vec<Placement>,
    pub total_cost: u64,
    pub total_claimed: usize,
    /// Number of ULDs holding at least one Priority package
    pub priority_uld_count: usize,
    pub uld_loads: Vec<UldLoad>,
    /// Packages no ULD claimed, in prioritized order
    pub unclaimed: Vec<UnclaimedPackage>,
}

impl RunResult {
    /// Indicates whether every package was placed.
    pub fn is_complete(&self) -> bool {
        self.unclaimed.is_empty()
    }

    pub fn unclaimed_count(&self) -> usize {
        self.unclaimed.len()
    }

    /// Sum of deferral costs over unclaimed packages, saturating at `u64::MAX`.
    pub fn deferral_cost(&self) -> u64 {
        self.unclaimed
            .iter()
            .fold(0u64, |acc, u| acc.saturating_add(u64::from(u.deferral_cost)))
    }
}

/// Load summary of a single ULD.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct UldLoad {
    pub uld_id: String,
    pub placed: usize,
    pub total_weight: u64,
    pub weight_limit: u32,
    pub used_volume: u64,
    pub total_volume: u64,
    pub carries_priority: bool,
}

impl UldLoad {
    /// Volume utilization in percent (0.0 to 100.0 without overlap).
    pub fn utilization_percent(&self) -> f64 {
        if self.total_volume == 0 {
            return 0.0;
        }
        self.used_volume as f64 / self.total_volume as f64 * 100.0
    }
}

/// A package left behind by every ULD.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct UnclaimedPackage {
    pub package_id: String,
    pub priority: Priority,
    pub deferral_cost: u32,
    pub reason_code: String,
    pub reason: String,
}

/// Reasons why a package could not be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnplacedReason {
    TooHeavyForEveryUld,
    DimensionsExceedEveryUld,
    /// Every ULD rejects the package, some by weight and some by size.
    NoCompatibleUld,
    NoFreeSpace,
}

impl UnplacedReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnplacedReason::TooHeavyForEveryUld => "too_heavy_for_every_uld",
            UnplacedReason::DimensionsExceedEveryUld => "dimensions_exceed_every_uld",
            UnplacedReason::NoCompatibleUld => "no_compatible_uld",
            UnplacedReason::NoFreeSpace => "no_free_space",
        }
    }
}

impl std::fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnplacedReason::TooHeavyForEveryUld => {
                write!(f, "Package exceeds the weight limit of every ULD")
            }
            UnplacedReason::DimensionsExceedEveryUld => {
                write!(f, "Package does not fit any ULD in any rotation")
            }
            UnplacedReason::NoCompatibleUld => {
                write!(f, "Package is too heavy or too large for every ULD")
            }
            UnplacedReason::NoFreeSpace => {
                write!(f, "No ULD had enough free space and weight left")
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum UldMismatch {
    Weight,
    Dimensions,
}

/// Why `uld` can never hold the package, even when empty. Weight is
/// checked first, matching the order of the packing loop.
fn uld_mismatch(uld: &Uld, weight: u32, rotated: &[Vec3]) -> Option<UldMismatch> {
    if weight > uld.weight_limit {
        return Some(UldMismatch::Weight);
    }
    let bounds = uld.dimensions();
    if !rotated.iter().any(|r| r.fits_within(&bounds)) {
        return Some(UldMismatch::Dimensions);
    }
    None
}

fn determine_unplaced_reason(ulds: &[Uld], package: &Package) -> UnplacedReason {
    if ulds.is_empty() {
        return UnplacedReason::DimensionsExceedEveryUld;
    }

    let rotated = rotations(package.dims_as_vec3());
    let mut mismatches = Vec::with_capacity(ulds.len());
    for uld in ulds {
        match uld_mismatch(uld, package.weight, &rotated) {
            Some(mismatch) => mismatches.push(mismatch),
            None => return UnplacedReason::NoFreeSpace,
        }
    }

    if mismatches.iter().all(|m| *m == UldMismatch::Weight) {
        UnplacedReason::TooHeavyForEveryUld
    } else if mismatches.iter().all(|m| *m == UldMismatch::Dimensions) {
        UnplacedReason::DimensionsExceedEveryUld
    } else {
        UnplacedReason::NoCompatibleUld
    }
}

/// Builds the `RunResult` once every ULD task has joined.
///
/// # Parameters
/// * `ulds` - ULDs in input order, aligned with `outcomes`
/// * `packages` - Packages in prioritized order, aligned with `claims`
/// * `outcomes` - One outcome per ULD
/// * `claims` - Final claim state
/// * `config` - Run configuration (for the priority penalty)
pub fn aggregate(
    ulds: &[Uld],
    packages: &[Package],
    outcomes: Vec<UldOutcome>,
    claims: &ClaimBoard,
    config: &PackingConfig,
) -> RunResult {
    let priority_uld_count = outcomes.iter().filter(|o| o.carries_priority).count();

    let unclaimed: Vec<UnclaimedPackage> = packages
        .iter()
        .enumerate()
        .filter(|&(idx, _)| claims.owner(idx).is_none())
        .map(|(_, package)| {
            let reason = determine_unplaced_reason(ulds, package);
            UnclaimedPackage {
                package_id: package.id.clone(),
                priority: package.priority,
                deferral_cost: package.deferral_cost,
                reason_code: reason.code().to_string(),
                reason: reason.to_string(),
            }
        })
        .collect();

    let mut placements = Vec::new();
    let mut uld_loads = Vec::with_capacity(ulds.len());
    for (uld, outcome) in ulds.iter().zip(outcomes) {
        uld_loads.push(UldLoad {
            uld_id: uld.id.clone(),
            placed: outcome.placements.len(),
            total_weight: outcome.total_weight,
            weight_limit: uld.weight_limit,
            used_volume: outcome.used_volume,
            total_volume: uld.volume(),
            carries_priority: outcome.carries_priority,
        });
        placements.extend(outcome.placements);
    }

    let mut result = RunResult {
        placements,
        total_cost: 0,
        total_claimed: claims.claimed_count(),
        priority_uld_count,
        uld_loads,
        unclaimed,
    };
    result.total_cost = (priority_uld_count as u64)
        .saturating_mul(config.priority_uld_cost)
        .saturating_add(result.deferral_cost());
    result
}
