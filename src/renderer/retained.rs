//! Retained-node renderer
//!
//! Keeps one persistent host node (a DOM element in the browser) per particle
//! id. Nodes are created the first frame a particle is seen, updated in place
//! afterwards, and detached the first frame it is gone.

use std::collections::HashMap;

use glam::Vec2;

use crate::sim::{Particle, ParticleId, Rgba};

/// What a node needs to show for one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeView {
    pub center: Vec2,
    pub radius: f32,
    pub color: Rgba,
    pub opacity: f32,
}

impl NodeView {
    pub fn of(particle: &Particle) -> Self {
        Self {
            center: particle.pos,
            radius: particle.radius(),
            color: particle.color,
            opacity: (particle.color.a * particle.opacity).clamp(0.0, 1.0),
        }
    }
}

/// Creates, updates and removes visual nodes
pub trait NodeHost {
    type Node;

    /// Create and attach a node; `None` if the host cannot (the particle is skipped)
    fn create(&mut self) -> Option<Self::Node>;

    fn update(&mut self, node: &Self::Node, view: &NodeView);

    fn detach(&mut self, node: Self::Node);
}

struct Slot<N> {
    node: N,
    frame: u64,
}

pub struct RetainedRenderer<H: NodeHost> {
    host: H,
    nodes: HashMap<ParticleId, Slot<H::Node>>,
    frame: u64,
    /// Scratch list of ids to detach, reused across frames
    stale: Vec<ParticleId>,
}

impl<H: NodeHost> RetainedRenderer<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            nodes: HashMap::new(),
            frame: 0,
            stale: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Live node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sync nodes with the live particle set
    pub fn render(&mut self, particles: &[Particle]) {
        self.frame += 1;
        let frame = self.frame;

        for particle in particles {
            let view = NodeView::of(particle);
            if let Some(slot) = self.nodes.get_mut(&particle.id) {
                slot.frame = frame;
                self.host.update(&slot.node, &view);
            } else if let Some(node) = self.host.create() {
                self.host.update(&node, &view);
                self.nodes.insert(particle.id, Slot { node, frame });
            }
        }

        self.stale.clear();
        self.stale.extend(
            self.nodes
                .iter()
                .filter(|(_, slot)| slot.frame != frame)
                .map(|(id, _)| *id),
        );
        for id in self.stale.drain(..) {
            if let Some(slot) = self.nodes.remove(&id) {
                self.host.detach(slot.node);
            }
        }
    }

    /// Detach every node
    pub fn clear(&mut self) {
        for (_, slot) in self.nodes.drain() {
            self.host.detach(slot.node);
        }
    }
}

impl<H: NodeHost> Drop for RetainedRenderer<H> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ParticleSystem, SpawnParams};

    #[derive(Default)]
    struct CountingHost {
        next: u32,
        created: usize,
        updated: usize,
        detached: Vec<u32>,
    }

    impl NodeHost for CountingHost {
        type Node = u32;

        fn create(&mut self) -> Option<u32> {
            self.next += 1;
            self.created += 1;
            Some(self.next)
        }

        fn update(&mut self, _node: &u32, _view: &NodeView) {
            self.updated += 1;
        }

        fn detach(&mut self, node: u32) {
            self.detached.push(node);
        }
    }

    #[test]
    fn test_nodes_reused_across_frames() {
        let mut system = ParticleSystem::new(1);
        for _ in 0..4 {
            system.spawn(SpawnParams {
                lifetime: 10.0,
                ..Default::default()
            });
        }
        let mut renderer = RetainedRenderer::new(CountingHost::default());
        for _ in 0..5 {
            system.tick(0.016);
            renderer.render(system.live_particles());
        }
        assert_eq!(renderer.host().created, 4);
        assert_eq!(renderer.host().updated, 20);
        assert_eq!(renderer.node_count(), 4);
        assert!(renderer.host().detached.is_empty());
    }

    #[test]
    fn test_removed_particles_detached() {
        let mut system = ParticleSystem::new(1);
        let keep = system.spawn(SpawnParams {
            lifetime: 10.0,
            ..Default::default()
        });
        let gone = system.spawn(SpawnParams {
            lifetime: 10.0,
            ..Default::default()
        });
        let mut renderer = RetainedRenderer::new(CountingHost::default());
        renderer.render(system.live_particles());
        assert_eq!(renderer.node_count(), 2);

        system.pop(gone);
        renderer.render(system.live_particles());
        assert_eq!(renderer.node_count(), 1);
        assert_eq!(renderer.host().detached, vec![2]);
        assert!(system.get(keep).is_some());

        renderer.clear();
        assert_eq!(renderer.node_count(), 0);
        assert_eq!(renderer.host().detached.len(), 2);
    }
}
