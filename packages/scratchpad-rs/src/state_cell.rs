// Shared "current state" cell
//
// Written by the feed thread on every incoming line, read and edited by the UI
// loop. The cell holds an `Arc<StatePoint>`; a whole-vector `set` swaps that
// pointer, so a reader always sees either the old or the new vector in full.
//
// `set_component` is a read-copy-update over the same slot and is NOT atomic
// with respect to a concurrent `set`: if the feed replaces the vector between
// the copy and the store, one of the two writes is lost. Updates arrive on a
// human timescale so the lost write is replaced by the next line.

use crate::error::Result;
use crate::types::StatePoint;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct SharedStateCell {
    current: RwLock<Arc<StatePoint>>,
    dimensions: usize,
    version: AtomicU64,
}

impl SharedStateCell {
    /// Cell starting at the all-zero point of the session arity
    pub fn new(dimensions: usize) -> Self {
        Self::with_initial(StatePoint::zeros(dimensions))
    }

    pub fn with_initial(initial: StatePoint) -> Self {
        Self {
            dimensions: initial.len(),
            current: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(0),
        }
    }

    /// Replace the whole vector
    pub fn set(&self, state: StatePoint) -> Result<()> {
        state.ensure_dimensions(self.dimensions)?;
        let state = Arc::new(state);
        *self.current.write() = state;
        self.version.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Snapshot of the current vector
    pub fn get(&self) -> Arc<StatePoint> {
        Arc::clone(&*self.current.read())
    }

    /// Overwrite one component of the live vector.
    ///
    /// See the module notes: this can race with `set` and lose a write.
    pub fn set_component(&self, index: usize, value: f64) -> Result<()> {
        let edited = self.get().with_component(index, value)?;
        *self.current.write() = Arc::new(edited);
        self.version.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Monotonic write counter, bumped by every `set` and `set_component`
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScratchpadError;
    use std::thread;

    #[test]
    fn test_set_then_get() {
        let cell = SharedStateCell::new(3);
        assert_eq!(cell.get().components(), &[0.0, 0.0, 0.0]);

        cell.set(StatePoint::new(vec![0.1, 0.2, 0.3])).unwrap();
        assert_eq!(cell.get().components(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_set_rejects_wrong_arity() {
        let cell = SharedStateCell::new(3);
        let err = cell.set(StatePoint::new(vec![0.1, 0.2])).unwrap_err();
        assert!(matches!(err, ScratchpadError::DimensionMismatch { .. }));
        assert_eq!(cell.version(), 0);
    }

    #[test]
    fn test_set_component_edits_one_slot() {
        let cell = SharedStateCell::new(3);
        cell.set_component(2, 0.75).unwrap();
        assert_eq!(cell.get().components(), &[0.0, 0.0, 0.75]);
        assert!(cell.set_component(3, 0.1).is_err());
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_writes() {
        let cell = SharedStateCell::new(2);
        let before = cell.get();
        cell.set(StatePoint::new(vec![1.0, 1.0])).unwrap();
        cell.set_component(0, 0.5).unwrap();

        assert_eq!(before.components(), &[0.0, 0.0]);
        assert_eq!(cell.get().components(), &[0.5, 1.0]);
    }

    #[test]
    fn test_version_counts_writes() {
        let cell = SharedStateCell::new(2);
        cell.set(StatePoint::new(vec![0.3, 0.3])).unwrap();
        cell.set_component(1, 0.9).unwrap();
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn test_readers_never_see_torn_vectors() {
        let cell = Arc::new(SharedStateCell::new(16));

        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 0..2000 {
                    let value = (i % 2) as f64;
                    cell.set(StatePoint::new(vec![value; 16])).unwrap();
                }
            })
        };

        for _ in 0..2000 {
            let snapshot = cell.get();
            let first = snapshot.components()[0];
            assert!(snapshot.components().iter().all(|&v| v == first));
        }

        writer.join().unwrap();
    }
}
