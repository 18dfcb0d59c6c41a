//! Shared Buffer Handle
//!
//! Two producers write into the same pool: the graph event stream and the
//! layout engine. The render loop reads it once per frame.
//!
//! # Thread Safety
//!
//! One `parking_lot::Mutex` guards the whole pool. Every read-modify-write
//! on the identifier indices (lookup-then-insert, lookup-then-swap) runs
//! under it, which makes the compaction swap atomic with respect to any
//! concurrent lookup of either the removed or the moved identifier.
//! Attribute writes take the same lock; they are short and uncontended in
//! practice.
//!
//! The renderer holds the lock only while it copies a snapshot or runs a
//! draw closure, never across frames.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::BufferPool;
use crate::config::ViewerConfig;

/// Cloneable handle to a pool shared between threads.
#[derive(Clone)]
pub struct GraphBuffers {
    pool: Arc<Mutex<BufferPool>>,
}

impl GraphBuffers {
    /// Allocate a pool for `config` and wrap it.
    pub fn new(config: &ViewerConfig) -> Self {
        Self::from_pool(BufferPool::new(config))
    }

    /// Share an already built pool.
    pub fn from_pool(pool: BufferPool) -> Self {
        Self {
            pool: Arc::new(Mutex::new(pool)),
        }
    }

    /// Lock the pool for the lifetime of the guard.
    pub fn lock(&self) -> MutexGuard<'_, BufferPool> {
        self.pool.lock()
    }

    /// Run `f` with exclusive access to the pool.
    pub fn with<R>(&self, f: impl FnOnce(&mut BufferPool) -> R) -> R {
        f(&mut self.pool.lock())
    }

    /// Run `f` with shared access to the pool.
    pub fn read<R>(&self, f: impl FnOnce(&BufferPool) -> R) -> R {
        f(&self.pool.lock())
    }

    /// Live nodes, taking the lock briefly.
    pub fn node_count(&self) -> usize {
        self.pool.lock().node_count()
    }

    /// Live edges, taking the lock briefly.
    pub fn edge_count(&self) -> usize {
        self.pool.lock().edge_count()
    }
}

impl std::fmt::Debug for GraphBuffers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("GraphBuffers").field(&*self.pool.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn buffers(max_nodes: usize) -> GraphBuffers {
        GraphBuffers::new(&ViewerConfig {
            max_nodes,
            max_edges: 4,
            ..Default::default()
        })
    }

    #[test]
    fn clones_share_one_pool() {
        let a = buffers(4);
        let b = a.clone();

        a.with(|pool| pool.allocate_node("n").map(|_| ())).unwrap();

        assert_eq!(b.node_count(), 1);
        assert!(b.read(|pool| pool.contains_node("n")));
    }

    #[test]
    fn concurrent_producers_keep_pool_consistent() {
        let shared = buffers(256);

        let adders: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..64 {
                        let id = format!("t{t}-{i}");
                        shared.with(|pool| pool.allocate_node(&id)).unwrap();
                        if i % 2 == 0 {
                            shared.with(|pool| pool.free_node(&id));
                        }
                    }
                })
            })
            .collect();

        let mover = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..256 {
                    let id = format!("t0-{}", i % 64);
                    // Ids may not exist yet or may already be gone.
                    let _ = shared.with(|pool| pool.set_position_xyz(&id, [1.0, 1.0, 1.0]));
                }
            })
        };

        for handle in adders {
            handle.join().unwrap();
        }
        mover.join().unwrap();

        shared.read(|pool| {
            assert_eq!(pool.node_count(), 4 * 32);
            for slot in 0..pool.node_count() {
                let id = pool.id_at(slot).unwrap();
                assert_eq!(pool.index_of(id), Some(slot));
            }
        });
    }
}
