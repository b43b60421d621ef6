//! Broad-phase pair pruning using sweep-and-prune along x.
//!
//! Heightfield bodies are not swept: every dynamic body is a terrain
//! candidate and the narrow phase rejects it cheaply by cell range.

use crate::body::{CollisionGroups, RigidBody};
use crate::collision::Aabb;
use std::cmp::Ordering;

/// Potential collision pair (body indices, first < second)
pub type CollisionPair = (usize, usize);

/// Cached bounding volume of one body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BroadphaseEntry {
    pub aabb: Aabb,
    pub groups: CollisionGroups,
    pub is_static: bool,
    pub is_awake: bool,
    pub is_heightfield: bool,
}

#[derive(Clone, Copy)]
struct Endpoint {
    value: f32,
    entry: usize,
    is_min: bool,
}

/// Per-step index of body bounding boxes
#[derive(Debug, Clone, Default)]
pub struct BroadphaseIndex {
    entries: Vec<BroadphaseEntry>,
    margin: f32,
}

impl BroadphaseIndex {
    /// `margin` loosens every box so resting contacts stay candidates
    pub fn new(margin: f32) -> Self {
        Self {
            entries: Vec::new(),
            margin: margin.max(0.0),
        }
    }

    /// Refresh every entry from the bodies' current poses, in body order
    pub fn rebuild(&mut self, bodies: &[RigidBody]) {
        self.entries.clear();
        self.entries.extend(bodies.iter().map(|body| BroadphaseEntry {
            aabb: body.world_aabb().loosened(self.margin),
            groups: body.groups(),
            is_static: body.is_static(),
            is_awake: body.is_awake(),
            is_heightfield: !body.shape().is_convex(),
        }));
    }

    fn wants_pair(a: &BroadphaseEntry, b: &BroadphaseEntry) -> bool {
        let a_moves = !a.is_static && a.is_awake;
        let b_moves = !b.is_static && b.is_awake;
        (a_moves || b_moves) && a.groups.interacts_with(&b.groups)
    }

    /// Candidate pairs, sorted so the narrow phase visits them in a fixed order
    pub fn candidate_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();

        let mut endpoints = Vec::with_capacity(self.entries.len() * 2);
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.is_heightfield {
                continue;
            }
            endpoints.push(Endpoint {
                value: entry.aabb.min.x,
                entry: i,
                is_min: true,
            });
            endpoints.push(Endpoint {
                value: entry.aabb.max.x,
                entry: i,
                is_min: false,
            });
        }
        // Starts sort before ends at equal x so touching boxes pair up
        endpoints.sort_by(|a, b| match a.value.total_cmp(&b.value) {
            Ordering::Equal => b.is_min.cmp(&a.is_min),
            other => other,
        });

        let mut active: Vec<usize> = Vec::new();
        for ep in endpoints {
            if !ep.is_min {
                active.retain(|&i| i != ep.entry);
                continue;
            }
            let entry = &self.entries[ep.entry];
            for &other in &active {
                let candidate = &self.entries[other];
                if entry.aabb.intersects(&candidate.aabb) && Self::wants_pair(entry, candidate) {
                    pairs.push((ep.entry.min(other), ep.entry.max(other)));
                }
            }
            active.push(ep.entry);
        }

        for (t, terrain) in self.entries.iter().enumerate() {
            if !terrain.is_heightfield {
                continue;
            }
            for (i, entry) in self.entries.iter().enumerate() {
                if i != t && !entry.is_heightfield && Self::wants_pair(terrain, entry) {
                    pairs.push((t.min(i), t.max(i)));
                }
            }
        }

        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}
