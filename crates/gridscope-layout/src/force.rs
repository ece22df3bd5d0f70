//! Bounded force relaxation for circle clusters.
//!
//! A velocity-Verlet style simulation with a decaying `alpha` temperature. Every tick applies, in
//! order: a weak pull towards the canvas center, a stronger pull towards each node's anchor,
//! pairwise many-body repulsion, and collision resolution sized to each node's radius. The loop
//! stops once `alpha` falls below the convergence threshold or the iteration bound is hit; the
//! result is treated as converged either way.

use crate::error::{Error, Result};
use crate::rng::Lcg;

#[derive(Debug, Clone, PartialEq)]
pub struct ForceNode {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
}

impl ForceNode {
    /// A node resting on its anchor.
    pub fn anchored(anchor_x: f64, anchor_y: f64, radius: f64) -> Self {
        Self {
            x: anchor_x,
            y: anchor_y,
            vx: 0.0,
            vy: 0.0,
            radius,
            anchor_x,
            anchor_y,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForceOptions {
    pub center_x: f64,
    pub center_y: f64,
    pub center_strength: f64,
    pub anchor_strength: f64,
    /// Negative values repel.
    pub charge_strength: f64,
    pub collide_padding: f64,
    pub collide_strength: f64,
    /// Relaxation stops once `alpha` drops to or below this value.
    pub convergence_alpha: f64,
    pub alpha_decay: f64,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f64,
    pub max_iterations: usize,
}

impl ForceOptions {
    pub const DEFAULT_CENTER_STRENGTH: f64 = 0.02;
    pub const DEFAULT_ANCHOR_STRENGTH: f64 = 0.3;
    pub const DEFAULT_CHARGE_STRENGTH: f64 = -1.0;
    pub const DEFAULT_COLLIDE_PADDING: f64 = 2.0;
    pub const DEFAULT_COLLIDE_STRENGTH: f64 = 1.0;
    pub const DEFAULT_CONVERGENCE_ALPHA: f64 = 0.01;
    pub const DEFAULT_VELOCITY_DECAY: f64 = 0.4;
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
    /// `alpha` reaches 0.001 after 300 ticks.
    const ALPHA_MIN_REFERENCE: f64 = 0.001;
    const ALPHA_TICKS_REFERENCE: f64 = 300.0;

    pub fn centered_on(center_x: f64, center_y: f64) -> Self {
        Self {
            center_x,
            center_y,
            ..Self::default()
        }
    }
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            center_strength: Self::DEFAULT_CENTER_STRENGTH,
            anchor_strength: Self::DEFAULT_ANCHOR_STRENGTH,
            charge_strength: Self::DEFAULT_CHARGE_STRENGTH,
            collide_padding: Self::DEFAULT_COLLIDE_PADDING,
            collide_strength: Self::DEFAULT_COLLIDE_STRENGTH,
            convergence_alpha: Self::DEFAULT_CONVERGENCE_ALPHA,
            alpha_decay: 1.0
                - Self::ALPHA_MIN_REFERENCE.powf(1.0 / Self::ALPHA_TICKS_REFERENCE),
            velocity_decay: Self::DEFAULT_VELOCITY_DECAY,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxStats {
    pub iterations: usize,
    pub alpha: f64,
    pub converged: bool,
}

/// Relaxes `nodes` in place and reports how many ticks it took.
pub fn relax(nodes: &mut [ForceNode], opts: &ForceOptions) -> Result<RelaxStats> {
    for (index, n) in nodes.iter_mut().enumerate() {
        if !(n.x.is_finite() && n.y.is_finite() && n.anchor_x.is_finite() && n.anchor_y.is_finite())
        {
            return Err(Error::NonFiniteNode { index });
        }
        if !n.vx.is_finite() {
            n.vx = 0.0;
        }
        if !n.vy.is_finite() {
            n.vy = 0.0;
        }
    }

    let mut sim = Simulation {
        alpha: 1.0,
        rng: Lcg::default(),
    };
    let mut iterations = 0usize;
    while sim.alpha > opts.convergence_alpha && iterations < opts.max_iterations {
        sim.tick(nodes, opts);
        iterations += 1;
    }

    let converged = sim.alpha <= opts.convergence_alpha;
    if !converged {
        tracing::debug!(
            iterations,
            alpha = sim.alpha,
            "force relaxation hit the iteration bound"
        );
    }
    Ok(RelaxStats {
        iterations,
        alpha: sim.alpha,
        converged,
    })
}

struct Simulation {
    alpha: f64,
    rng: Lcg,
}

impl Simulation {
    fn tick(&mut self, nodes: &mut [ForceNode], opts: &ForceOptions) {
        self.alpha += (0.0 - self.alpha) * opts.alpha_decay;
        let alpha = self.alpha;

        for n in nodes.iter_mut() {
            n.vx += (opts.center_x - n.x) * opts.center_strength * alpha;
        }
        for n in nodes.iter_mut() {
            n.vy += (opts.center_y - n.y) * opts.center_strength * alpha;
        }
        for n in nodes.iter_mut() {
            n.vx += (n.anchor_x - n.x) * opts.anchor_strength * alpha;
        }
        for n in nodes.iter_mut() {
            n.vy += (n.anchor_y - n.y) * opts.anchor_strength * alpha;
        }
        self.apply_charge(nodes, opts.charge_strength, alpha);
        self.apply_collide(nodes, opts);

        let keep = 1.0 - opts.velocity_decay;
        for n in nodes.iter_mut() {
            n.vx *= keep;
            n.x += n.vx;
            n.vy *= keep;
            n.y += n.vy;
        }
    }

    /// Exact pairwise many-body force; cluster counts are small enough that no quadtree
    /// approximation is needed.
    fn apply_charge(&mut self, nodes: &mut [ForceNode], strength: f64, alpha: f64) {
        const DISTANCE_MIN2: f64 = 1.0;
        let positions = nodes.iter().map(|n| (n.x, n.y)).collect::<Vec<_>>();
        for (i, node) in nodes.iter_mut().enumerate() {
            for (j, &(px, py)) in positions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let mut x = px - node.x;
                let mut y = py - node.y;
                let mut l = x * x + y * y;
                if x == 0.0 {
                    x = self.rng.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.rng.jiggle();
                    l += y * y;
                }
                if l < DISTANCE_MIN2 {
                    l = (DISTANCE_MIN2 * l).sqrt();
                }
                node.vx += x * strength * alpha / l;
                node.vy += y * strength * alpha / l;
            }
        }
    }

    fn apply_collide(&mut self, nodes: &mut [ForceNode], opts: &ForceOptions) {
        let radii = nodes
            .iter()
            .map(|n| n.radius + opts.collide_padding)
            .collect::<Vec<_>>();
        for i in 0..nodes.len() {
            let ri = radii[i];
            let ri2 = ri * ri;
            for j in (i + 1)..nodes.len() {
                let xi = nodes[i].x + nodes[i].vx;
                let yi = nodes[i].y + nodes[i].vy;
                let rj = radii[j];
                let r = ri + rj;
                let mut x = xi - nodes[j].x - nodes[j].vx;
                let mut y = yi - nodes[j].y - nodes[j].vy;
                let mut l = x * x + y * y;
                if l >= r * r {
                    continue;
                }
                if x == 0.0 {
                    x = self.rng.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.rng.jiggle();
                    l += y * y;
                }
                let dist = l.sqrt();
                let push = (r - dist) / dist * opts.collide_strength;
                x *= push;
                y *= push;
                let rj2 = rj * rj;
                let share = rj2 / (ri2 + rj2);
                nodes[i].vx += x * share;
                nodes[i].vy += y * share;
                nodes[j].vx -= x * (1.0 - share);
                nodes[j].vy -= y * (1.0 - share);
            }
        }
    }
}
