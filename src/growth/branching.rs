//! Child-spawning policy
//!
//! Trunk extensions bend little and twist around the trunk so consecutive
//! segments spiral; lateral branches leave at a wide angle; further branches
//! fork in pairs at a narrower one. The asymmetry gives the tree its
//! silhouette.

use std::f32::consts::{PI, TAU};
use rand::Rng;

use crate::math::Vec3;
use super::node::{GrowthNode, NodeKind};
use super::params::GrowthParams;

/// Everything needed to create one child node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildSpec {
    pub kind: NodeKind,
    pub height_index: u32,
    pub branch_index: u32,
    pub direction: Vec3,
    pub branching_angle: f32,
    pub target_length: f32,
}

/// Uniform in `[low, high)`
pub fn rand_float<R: Rng>(rng: &mut R, low: f32, high: f32) -> f32 {
    if low >= high {
        return low;
    }
    rng.gen_range(low..high)
}

/// Uniform in `[-range/2, range/2)`
pub fn rand_spread<R: Rng>(rng: &mut R, range: f32) -> f32 {
    range * (rng.gen::<f32>() - 0.5)
}

/// Tilt `direction` away from itself by `amount` (plus random spread)
///
/// The tilt axis starts perpendicular to `direction` and is spun around it
/// by `axis_angle`, which picks the side the new direction leans toward.
pub fn rotate_direction<R: Rng>(
    direction: Vec3,
    axis_angle: f32,
    amount: f32,
    variation: f32,
    rng: &mut R,
) -> Vec3 {
    let mut axis = direction.cross(&Vec3::ONE);
    if axis.length_squared() < 1e-8 {
        axis = direction.perpendicular();
    }
    let axis = axis.normalize().rotate_around_axis(direction, axis_angle);

    direction
        .rotate_around_axis(axis, amount + rand_spread(rng, variation))
        .normalize()
}

/// Children a node spawns once it reaches full length
///
/// Roots spawn a single trunk segment, trunks and branches spawn two, and
/// leaves spawn nothing.
pub fn child_specs<R: Rng>(parent: &GrowthNode, params: &GrowthParams, rng: &mut R) -> Vec<ChildSpec> {
    let count = match parent.kind() {
        NodeKind::Leaf => 0,
        NodeKind::Root => 1,
        NodeKind::Trunk | NodeKind::Branch => 2,
    };

    (0..count)
        .map(|i| match parent.kind() {
            NodeKind::Root => first_trunk(parent, params, rng),
            NodeKind::Trunk if parent.height_index() < params.max_height => {
                if i == 0 {
                    trunk_extension(parent, params, rng)
                } else {
                    lateral_branch(parent, params, rng)
                }
            }
            NodeKind::Trunk => crown_branch(parent, i, params, rng),
            _ => further_branch(parent, i, params, rng),
        })
        .collect()
}

fn twisted_angle<R: Rng>(parent: &GrowthNode, params: &GrowthParams, rng: &mut R) -> f32 {
    parent.branching_angle() + params.twist_factor + rand_spread(rng, params.twist_variation)
}

/// Lateral base length shrinks the higher up the trunk it starts
fn lateral_length<R: Rng>(parent: &GrowthNode, params: &GrowthParams, rng: &mut R) -> f32 {
    let base = 1.5 - parent.height_index() as f32 * 0.1;
    (base * rand_float(rng, 0.8, 1.2)).max(params.min_length)
}

fn first_trunk<R: Rng>(parent: &GrowthNode, params: &GrowthParams, rng: &mut R) -> ChildSpec {
    ChildSpec {
        kind: NodeKind::Trunk,
        height_index: 1,
        branch_index: 0,
        direction: rotate_direction(parent.direction(), parent.branching_angle(), 0.0, PI / 16.0, rng),
        target_length: rand_float(rng, 2.0, 4.0),
        branching_angle: twisted_angle(parent, params, rng),
    }
}

fn trunk_extension<R: Rng>(parent: &GrowthNode, params: &GrowthParams, rng: &mut R) -> ChildSpec {
    ChildSpec {
        kind: NodeKind::Trunk,
        height_index: parent.height_index() + 1,
        branch_index: 0,
        direction: rotate_direction(parent.direction(), parent.branching_angle(), 0.0, PI / 16.0, rng),
        target_length: (parent.target_length() * rand_float(rng, 0.5, 0.8)).max(params.min_length),
        branching_angle: twisted_angle(parent, params, rng),
    }
}

fn lateral_branch<R: Rng>(parent: &GrowthNode, params: &GrowthParams, rng: &mut R) -> ChildSpec {
    ChildSpec {
        kind: NodeKind::Branch,
        height_index: parent.height_index(),
        branch_index: 1,
        direction: rotate_direction(parent.direction(), parent.branching_angle(), PI / 4.0, PI / 10.0, rng),
        target_length: lateral_length(parent, params, rng),
        branching_angle: rand_float(rng, 0.0, TAU),
    }
}

/// The pair of branches that caps a fully grown trunk
fn crown_branch<R: Rng>(parent: &GrowthNode, i: usize, params: &GrowthParams, rng: &mut R) -> ChildSpec {
    let axis_angle = parent.branching_angle() + PI * i as f32;
    ChildSpec {
        kind: NodeKind::Branch,
        height_index: parent.height_index(),
        branch_index: 1,
        direction: rotate_direction(parent.direction(), axis_angle, PI / 8.0, PI / 8.0, rng),
        target_length: lateral_length(parent, params, rng),
        branching_angle: parent.branching_angle() + rand_spread(rng, PI / 2.0),
    }
}

fn further_branch<R: Rng>(parent: &GrowthNode, i: usize, params: &GrowthParams, rng: &mut R) -> ChildSpec {
    let axis_angle = parent.branching_angle() + PI * i as f32;
    let kind = if parent.branch_index() < params.max_branches {
        NodeKind::Branch
    } else {
        NodeKind::Leaf
    };
    ChildSpec {
        kind,
        height_index: parent.height_index(),
        branch_index: parent.branch_index() + 1,
        direction: rotate_direction(parent.direction(), axis_angle, PI / 8.0, PI / 8.0, rng),
        target_length: (parent.target_length() * rand_float(rng, 0.6, 0.8)).max(params.min_length),
        branching_angle: parent.branching_angle() + rand_spread(rng, PI / 2.0),
    }
}
