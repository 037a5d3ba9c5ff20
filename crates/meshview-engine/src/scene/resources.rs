use std::collections::BTreeMap;

/// Opaque id of a GPU-backed resource.
///
/// Ids increase monotonically, so ordering by id is creation order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Geometry,
    Texture,
}

/// Owning handle to a registered geometry. Not `Clone`: releasing consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct GeometryHandle(ResourceId);

impl GeometryHandle {
    pub fn id(&self) -> ResourceId {
        self.0
    }
}

/// Owning handle to a registered texture.
#[derive(Debug, PartialEq, Eq)]
pub struct TextureHandle(ResourceId);

impl TextureHandle {
    pub fn id(&self) -> ResourceId {
        self.0
    }
}

/// Allocation/disposal counters, per kind.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LedgerStats {
    pub geometries_created: u64,
    pub geometries_disposed: u64,
    pub textures_created: u64,
    pub textures_disposed: u64,
}

/// CPU-side registry of everything the renderer keeps on the GPU for the scene.
///
/// The scene graph registers a handle whenever it attaches new geometry or a
/// texture and releases the handle it replaces. Released ids are queued; the
/// renderer drains the queue at the start of the next frame, after it has
/// uploaded whatever replaced them, and drops the matching GPU buffers.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    next_id: u64,
    live: BTreeMap<ResourceId, ResourceKind>,
    released: Vec<ResourceId>,
    stats: LedgerStats,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_geometry(&mut self) -> GeometryHandle {
        self.stats.geometries_created += 1;
        GeometryHandle(self.allocate(ResourceKind::Geometry))
    }

    pub fn register_texture(&mut self) -> TextureHandle {
        self.stats.textures_created += 1;
        TextureHandle(self.allocate(ResourceKind::Texture))
    }

    pub fn release_geometry(&mut self, handle: GeometryHandle) {
        self.release(handle.0);
    }

    pub fn release_texture(&mut self, handle: TextureHandle) {
        self.release(handle.0);
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_count(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    pub fn stats(&self) -> LedgerStats {
        self.stats
    }

    /// Takes the ids released since the last call.
    pub fn drain_released(&mut self) -> Vec<ResourceId> {
        std::mem::take(&mut self.released)
    }

    /// Releases every live id, newest first.
    pub(crate) fn release_all(&mut self) {
        let ids: Vec<ResourceId> = self.live.keys().rev().copied().collect();
        for id in ids {
            self.release(id);
        }
    }

    fn allocate(&mut self, kind: ResourceKind) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, kind);
        id
    }

    /// Returns false when `id` was not live (already released or never issued).
    fn release(&mut self, id: ResourceId) -> bool {
        let Some(kind) = self.live.remove(&id) else {
            log::warn!("ignoring release of resource {} which is not live", id.0);
            return false;
        };

        match kind {
            ResourceKind::Geometry => self.stats.geometries_disposed += 1,
            ResourceKind::Texture => self.stats.textures_disposed += 1,
        }
        self.released.push(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_moves_id_to_drain_queue() {
        let mut ledger = ResourceLedger::new();
        let g = ledger.register_geometry();
        let id = g.id();

        ledger.release_geometry(g);

        assert!(!ledger.is_live(id));
        assert_eq!(ledger.drain_released(), vec![id]);
        assert!(ledger.drain_released().is_empty());
    }

    #[test]
    fn double_release_is_ignored() {
        let mut ledger = ResourceLedger::new();
        let id = ledger.register_texture().id();

        assert!(ledger.release(id));
        assert!(!ledger.release(id));

        assert_eq!(ledger.stats().textures_disposed, 1);
        assert_eq!(ledger.drain_released().len(), 1);
    }

    #[test]
    fn release_all_runs_newest_first() {
        let mut ledger = ResourceLedger::new();
        let a = ledger.register_geometry().id();
        let b = ledger.register_texture().id();
        let c = ledger.register_geometry().id();

        ledger.release_all();

        assert_eq!(ledger.drain_released(), vec![c, b, a]);
        assert_eq!(ledger.live_count(ResourceKind::Geometry), 0);
        assert_eq!(ledger.live_count(ResourceKind::Texture), 0);
    }
}
