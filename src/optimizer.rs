//! Placement engine for assigning packages to ULDs.
//!
//! A run has three stages:
//! - prioritizing the packages (Priority first, then larger volume first)
//! - packing every ULD independently and in parallel, each ULD greedily
//!   claiming still-unclaimed packages through the shared `ClaimBoard`
//! - folding the per-ULD outcomes into a `RunResult` (see `cost`)

use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::claim::ClaimBoard;
use crate::cost::{self, RunResult};
use crate::geometry::{corner_origin, first_free_origin, rotations};
use crate::model::{Package, Placement, Uld};
use crate::types::{BoundingBox, Dimensional, Vec3};

/// Configuration of a packing run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PackingConfig {
    /// Penalty added once for every ULD carrying at least one Priority package
    pub priority_uld_cost: u64,
    /// Reject origins whose box overlaps a package already in the ULD
    pub collision_check: bool,
    /// Size of the worker pool; 0 uses rayon's default, 1 packs sequentially
    pub worker_threads: usize,
}

impl PackingConfig {
    pub const DEFAULT_PRIORITY_ULD_COST: u64 = 40;
    pub const DEFAULT_COLLISION_CHECK: bool = true;
    pub const DEFAULT_WORKER_THREADS: usize = 0;
    /// Largest accepted per-priority-ULD penalty.
    pub const MAX_PRIORITY_ULD_COST: u64 = u32::MAX as u64;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::default()
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            priority_uld_cost: Self::DEFAULT_PRIORITY_ULD_COST,
            collision_check: Self::DEFAULT_COLLISION_CHECK,
            worker_threads: Self::DEFAULT_WORKER_THREADS,
        }
    }
}

/// Builder for `PackingConfig`.
#[derive(Clone, Debug, Default)]
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    /// Sets the per-priority-ULD penalty.
    pub fn priority_uld_cost(mut self, cost: u64) -> Self {
        self.config.priority_uld_cost = cost;
        self
    }

    /// Enables or disables the overlap test between packages in a ULD.
    pub fn collision_check(mut self, enabled: bool) -> Self {
        self.config.collision_check = enabled;
        self
    }

    /// Sets the worker pool size.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.config.worker_threads = threads;
        self
    }

    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Events emitted while packing, for live progress reporting.
///
/// ULD tasks run in parallel, so events of different ULDs interleave.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type")]
pub enum PackEvent {
    /// A ULD task started.
    UldStarted {
        uld_id: String,
        dims: (u32, u32, u32),
        weight_limit: u32,
    },
    /// A package was claimed into a ULD.
    PackagePlaced {
        uld_id: String,
        package_id: String,
        min: (u32, u32, u32),
        max: (u32, u32, u32),
        weight: u32,
        total_weight: u64,
    },
    /// A ULD task finished.
    UldFinished {
        uld_id: String,
        placed: usize,
        total_weight: u64,
        carries_priority: bool,
    },
    /// The run finished.
    Finished {
        total_cost: u64,
        total_claimed: usize,
        priority_uld_count: usize,
        unclaimed: usize,
    },
}

/// What a single ULD task produced.
#[derive(Clone, Debug, Default)]
pub struct UldOutcome {
    pub placements: Vec<Placement>,
    pub total_weight: u64,
    pub used_volume: u64,
    pub carries_priority: bool,
}

/// Orders packages for packing.
///
/// Priority packages precede Economy packages; within a class, packages are
/// sorted by strictly descending volume. The sort is stable, so packages of
/// equal class and volume keep their input order.
pub fn prioritize(mut packages: Vec<Package>) -> Vec<Package> {
    packages.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.volume().cmp(&a.volume()))
    });
    packages
}

/// Main entry point: packs `packages` into `ulds`.
pub fn pack_packages_with_config(
    ulds: Vec<Uld>,
    packages: Vec<Package>,
    config: PackingConfig,
) -> RunResult {
    pack_packages_with_progress(ulds, packages, config, |_| {})
}

/// Packing with a custom configuration and a progress callback.
///
/// The callback is invoked from the worker threads and must be `Sync`.
pub fn pack_packages_with_progress(
    ulds: Vec<Uld>,
    packages: Vec<Package>,
    config: PackingConfig,
    on_event: impl Fn(&PackEvent) + Sync,
) -> RunResult {
    info!(
        ulds = ulds.len(),
        packages = packages.len(),
        collision_check = config.collision_check,
        "starting packing run"
    );

    let packages = prioritize(packages);
    let claims = ClaimBoard::new(packages.len());
    let outcomes = run_uld_tasks(&ulds, &packages, &claims, &config, &on_event);
    let result = cost::aggregate(&ulds, &packages, outcomes, &claims, &config);

    on_event(&PackEvent::Finished {
        total_cost: result.total_cost,
        total_claimed: result.total_claimed,
        priority_uld_count: result.priority_uld_count,
        unclaimed: result.unclaimed_count(),
    });
    info!(
        total_cost = result.total_cost,
        total_claimed = result.total_claimed,
        priority_uld_count = result.priority_uld_count,
        "packing run finished"
    );
    result
}

/// Runs one task per ULD and joins them, keeping ULD input order.
fn run_uld_tasks(
    ulds: &[Uld],
    packages: &[Package],
    claims: &ClaimBoard,
    config: &PackingConfig,
    on_event: &(dyn Fn(&PackEvent) + Sync),
) -> Vec<UldOutcome> {
    let pack = |(idx, uld): (usize, &Uld)| pack_uld(idx, uld, packages, claims, config, on_event);

    match config.worker_threads {
        1 => ulds.iter().enumerate().map(pack).collect(),
        0 => ulds.par_iter().enumerate().map(pack).collect(),
        threads => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| ulds.par_iter().enumerate().map(pack).collect()),
            Err(err) => {
                warn!(threads, %err, "could not build worker pool, using the global pool");
                ulds.par_iter().enumerate().map(pack).collect()
            }
        },
    }
}

/// Greedily claims packages into a single ULD.
///
/// Walks `packages` in prioritized order. A package is skipped if another
/// ULD holds it or if its weight would exceed the remaining weight budget.
/// Otherwise the six rotations are tried in enumeration order and the first
/// feasible origin of the first feasible rotation is taken. The package is
/// only recorded once the atomic claim succeeds.
///
/// # Parameters
/// * `uld_index` - Index of the ULD, recorded in the claim slots
/// * `uld` - The ULD to fill
/// * `packages` - Packages in prioritized order, aligned with `claims`
/// * `claims` - Claim board shared by all ULD tasks
/// * `config` - Run configuration
/// * `on_event` - Progress callback
pub fn pack_uld(
    uld_index: usize,
    uld: &Uld,
    packages: &[Package],
    claims: &ClaimBoard,
    config: &PackingConfig,
    on_event: &(dyn Fn(&PackEvent) + Sync),
) -> UldOutcome {
    on_event(&PackEvent::UldStarted {
        uld_id: uld.id.clone(),
        dims: uld.dims,
        weight_limit: uld.weight_limit,
    });

    let bounds = uld.dimensions();
    let weight_limit = u64::from(uld.weight_limit);
    let uld_volume = uld.volume();
    let mut occupied: Vec<BoundingBox> = Vec::new();
    let mut outcome = UldOutcome::default();

    for (idx, package) in packages.iter().enumerate() {
        if claims.is_claimed(idx) {
            continue;
        }
        if outcome.total_weight + u64::from(package.weight) > weight_limit {
            continue;
        }
        // Non-overlapping boxes can never exceed the ULD volume.
        if config.collision_check && outcome.used_volume + package.volume() > uld_volume {
            continue;
        }

        let Some(placed) = find_placement(bounds, package.dims_as_vec3(), &occupied, config)
        else {
            continue;
        };

        debug_assert!(placed.within(&bounds));

        if !claims.try_claim(idx, uld_index) {
            trace!(uld = %uld.id, package = %package.id, "claim lost to another ULD");
            continue;
        }

        outcome.total_weight += u64::from(package.weight);
        outcome.carries_priority |= package.priority.is_priority();
        occupied.push(placed);

        let placement = Placement::new(&package.id, &uld.id, placed);
        outcome.used_volume += placement.volume();
        on_event(&PackEvent::PackagePlaced {
            uld_id: uld.id.clone(),
            package_id: package.id.clone(),
            min: placement.min,
            max: placement.max,
            weight: package.weight,
            total_weight: outcome.total_weight,
        });
        outcome.placements.push(placement);
    }

    debug!(
        uld = %uld.id,
        placed = outcome.placements.len(),
        total_weight = outcome.total_weight,
        carries_priority = outcome.carries_priority,
        "ULD packed"
    );
    on_event(&PackEvent::UldFinished {
        uld_id: uld.id.clone(),
        placed: outcome.placements.len(),
        total_weight: outcome.total_weight,
        carries_priority: outcome.carries_priority,
    });
    outcome
}

/// Finds the box a package would occupy: first rotation in enumeration
/// order that has a feasible origin, at its first origin in (x, y, z) order.
fn find_placement(
    bounds: Vec3,
    dims: Vec3,
    occupied: &[BoundingBox],
    config: &PackingConfig,
) -> Option<BoundingBox> {
    rotations(dims).into_iter().find_map(|extents| {
        let origin = if config.collision_check {
            first_free_origin(bounds, extents, occupied)
        } else {
            corner_origin(bounds, extents)
        }?;
        Some(BoundingBox::from_origin_and_extents(origin, extents))
    })
}
