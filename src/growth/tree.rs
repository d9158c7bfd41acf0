use std::f32::consts::TAU;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::animation::{Scheduler, TaskHandle};
use crate::config::MusicParams;
use crate::math::{Mat4, Vec3};
use crate::mesh::{RenderableGeometry, TreePalette};
use crate::music::{length_to_pitch, Oscillator};
use super::arpeggio::{self, ArpeggioTask, NoteContext, SungNote};
use super::branching::{self, rand_float};
use super::node::{GrowthNode, GrowthStage, NodeId, NodeKind};
use super::params::GrowthParams;

/// One planted tree: its node graph, growth state, timers and render buffers
///
/// Nodes live in an arena in creation order, so a parent always precedes
/// its children. A node is in at most one of `tips` and `leaves`.
pub struct TreeAggregate {
    origin: Vec3,
    params: GrowthParams,
    music: MusicParams,
    nodes: Vec<GrowthNode>,
    tips: Vec<NodeId>,
    leaves: Vec<NodeId>,
    growing: bool,
    alive: bool,
    rng: SmallRng,
    palette: TreePalette,
    /// Tree-local transform of every node, rebuilt each tick
    world: Vec<Mat4>,
    geometry: RenderableGeometry,
    scheduler: Scheduler<ArpeggioTask>,
    arpeggio_timer: Option<TaskHandle>,
    elapsed_ms: f64,
    ticks: u64,
    capacity_warned: bool,
}

impl TreeAggregate {
    /// Plant a tree at `origin` with a seeded random source
    pub fn new(origin: Vec3, params: GrowthParams, music: MusicParams, seed: u64) -> Self {
        Self::with_rng(origin, params, music, SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(origin: Vec3, params: GrowthParams, music: MusicParams, mut rng: SmallRng) -> Self {
        let palette = TreePalette::random(&mut rng);
        let root_angle = rand_float(&mut rng, 0.0, TAU);
        let root = GrowthNode::new(NodeKind::Root, 0, 0, Vec3::UP, root_angle, 0.0, &params, music.attack);

        debug!("planted tree at {:?} (hue {:.0})", origin, palette.hue);

        let mut geometry = RenderableGeometry::default();
        geometry.line_color = palette.line.to_array();

        Self {
            origin,
            params,
            music,
            nodes: vec![root],
            tips: vec![NodeId(0)],
            leaves: Vec::new(),
            growing: true,
            alive: true,
            rng,
            palette,
            world: Vec::new(),
            geometry,
            scheduler: Scheduler::new(),
            arpeggio_timer: None,
            elapsed_ms: 0.0,
            ticks: 0,
            capacity_warned: false,
        }
    }

    /// Advance one frame of `dt` seconds
    ///
    /// Order within a tick: sway and transforms, due arpeggio steps, render
    /// buffers (with resonance decay), then growth. Children spawned by this
    /// tick's growth first appear in the next tick's buffers.
    pub fn update(&mut self, dt: f64, ctx: &NoteContext) -> Vec<SungNote> {
        let mut sung = Vec::new();
        if !self.alive {
            return sung;
        }
        if !dt.is_finite() || dt < 0.0 {
            warn!("ignoring tick with invalid dt {}", dt);
            return sung;
        }

        self.ticks += 1;
        self.elapsed_ms += dt * 1000.0;

        self.apply_wind();
        self.update_transforms();

        for task in self.scheduler.advance(dt) {
            self.run_task(task, ctx, &mut sung);
        }

        self.rebuild_geometry();

        if self.growing {
            self.grow_tips();
        }

        sung
    }

    fn apply_wind(&mut self) {
        let time = self.elapsed_ms;
        let params = self.params;
        for node in self.nodes.iter_mut().filter(|n| n.sways()) {
            node.apply_wind(time, &params);
        }
    }

    fn update_transforms(&mut self) {
        self.world.clear();
        for node in &self.nodes {
            let parent = match node.parent {
                Some(p) => self.world[p.0],
                None => Mat4::identity(),
            };
            self.world.push(parent.mul(&node.local_transform()));
        }
    }

    fn rebuild_geometry(&mut self) {
        let capacity = self.params.instance_capacity;
        self.geometry.clear();

        for (index, node) in self.nodes.iter_mut().enumerate() {
            let position = self.world[index].origin();
            let parent_position = node.parent.map_or(Vec3::ZERO, |p| self.world[p.0].origin());
            self.geometry.push_segment(position, parent_position);

            if index < capacity {
                let transform = Mat4::from_translation_scale(position, node.display_size());
                self.geometry.push_instance(&transform, self.palette.node_color(node.resonance));
            }
            node.decay_resonance(self.params.resonance_decay);
        }

        if self.nodes.len() > capacity && !self.capacity_warned {
            warn!(
                "tree has {} nodes, only {} instanced",
                self.nodes.len(),
                capacity
            );
            self.capacity_warned = true;
        }
    }

    fn grow_tips(&mut self) {
        let tips = std::mem::take(&mut self.tips);
        let mut still_growing = Vec::with_capacity(tips.len());
        let mut spawned = Vec::new();

        for id in tips {
            match self.nodes[id.0].stage() {
                GrowthStage::Growing => {
                    self.nodes[id.0].grow();
                    still_growing.push(id);
                }
                GrowthStage::Branching => {
                    let children = self.branch(id);
                    if children.is_empty() {
                        self.leaves.push(id);
                    }
                    spawned.extend(children);
                }
                GrowthStage::Grown => self.leaves.push(id),
            }
        }

        still_growing.extend(spawned);
        self.tips = still_growing;

        if self.tips.is_empty() {
            self.finish_growth();
        }
    }

    fn branch(&mut self, id: NodeId) -> Vec<NodeId> {
        let specs = branching::child_specs(&self.nodes[id.0], &self.params, &mut self.rng);
        let mut children = Vec::with_capacity(specs.len());

        for spec in specs {
            let mut child = GrowthNode::new(
                spec.kind,
                spec.height_index,
                spec.branch_index,
                spec.direction,
                spec.branching_angle,
                spec.target_length,
                &self.params,
                self.music.attack,
            );
            child.parent = Some(id);
            let child_id = NodeId(self.nodes.len());
            self.nodes.push(child);
            children.push(child_id);
        }

        self.nodes[id.0].children.extend_from_slice(&children);
        children
    }

    fn finish_growth(&mut self) {
        self.growing = false;
        info!(
            "tree at {:?} finished growing: {} nodes, {} leaves after {} ticks",
            self.origin,
            self.nodes.len(),
            self.leaves.len(),
            self.ticks
        );
        self.arpeggio_timer = Some(self.scheduler.schedule_every(
            0.0,
            self.music.arpeggio_period,
            ArpeggioTask::Start,
        ));
    }

    fn run_task(&mut self, task: ArpeggioTask, ctx: &NoteContext, sung: &mut Vec<SungNote>) {
        // Gate on liveness at fire time, not only at cancellation
        if !self.alive || self.nodes.is_empty() {
            return;
        }
        match task {
            ArpeggioTask::Start => self.visit(NodeId(0), ctx.scale, ctx.oscillator, ctx, sung),
            ArpeggioTask::Step { node, scale, oscillator } if node.0 < self.nodes.len() => {
                self.visit(node, scale, oscillator, ctx, sung)
            }
            ArpeggioTask::Step { node, .. } => warn!("arpeggio step for unknown node {}", node.0),
        }
    }

    /// Sing `id` with the walk's own scale and oscillator, then queue a child
    fn visit(
        &mut self,
        id: NodeId,
        scale: usize,
        oscillator: Oscillator,
        ctx: &NoteContext,
        sung: &mut Vec<SungNote>,
    ) {
        let node = &mut self.nodes[id.0];

        if node.kind() != NodeKind::Root {
            match length_to_pitch(node.target_length(), ctx.base_frequency, ctx.scale_at(scale)) {
                Ok(note) => {
                    if node.voice.trigger(oscillator) {
                        node.pulse();
                        sung.push(SungNote {
                            node: id,
                            note,
                            oscillator,
                            position: self.origin
                                + self.world.get(id.0).map_or(Vec3::ZERO, |m| m.origin()),
                        });
                    }
                }
                Err(e) => warn!("skipping note for node {}: {}", id.0, e),
            }
        }

        if let Some(next) = arpeggio::next_step(&self.nodes[id.0].children, &mut self.rng) {
            let step = ArpeggioTask::Step { node: next, scale, oscillator };
            self.scheduler.schedule_after(self.music.step_delay, step);
        }
    }

    /// Tear the tree down: silence voices, cancel timers, drop buffers
    ///
    /// Returns how many voices were released. Later updates are no-ops.
    pub fn dispose(&mut self) -> usize {
        if !self.alive {
            return 0;
        }
        self.alive = false;

        let released = self
            .nodes
            .iter_mut()
            .map(|n| n.voice.release())
            .filter(|held| *held)
            .count();
        let cancelled = self.scheduler.cancel_all();
        self.arpeggio_timer = None;

        self.nodes.clear();
        self.tips.clear();
        self.leaves.clear();
        self.world.clear();
        self.geometry.clear();

        info!(
            "disposed tree at {:?}: {} voices released, {} timers cancelled",
            self.origin, released, cancelled
        );
        released
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_growing(&self) -> bool {
        self.growing
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn palette(&self) -> &TreePalette {
        &self.palette
    }

    pub fn geometry(&self) -> &RenderableGeometry {
        &self.geometry
    }

    pub fn root(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then_some(NodeId(0))
    }

    pub fn node(&self, id: NodeId) -> Option<&GrowthNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GrowthNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tips(&self) -> &[NodeId] {
        &self.tips
    }

    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of timers (arpeggio period and pending steps) still queued
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn arpeggio_timer(&self) -> Option<TaskHandle> {
        self.arpeggio_timer
    }
}
