//! Lock-protected arena of simulation objects shared by the engines and
//! the controller.
//!
//! Every mutation and every traversal holds the same mutex for its whole
//! duration, so no reader ever sees the sequence half-updated. Objects
//! live inline in the arena; callers address them by [`ParticleId`] and
//! only touch them from inside a traversal.
//!
//! Nested all-pairs traversal goes through [`ParticleStore::map_pairs`],
//! which walks both loop levels under a single lock acquisition instead
//! of re-entering the lock.

use crate::{molecule::SimulationObject, types::ParticleId};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct ParticleStore {
    objects: Mutex<Vec<SimulationObject>>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Acquires the arena lock.
    ///
    /// A panic inside a traversal poisons the mutex; the arena itself is
    /// still structurally valid afterwards, so the poison is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<SimulationObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an object and returns its id.
    pub fn push_back(&self, object: SimulationObject) -> ParticleId {
        let mut objects = self.lock();
        objects.push(object);
        objects.len() - 1
    }

    /// Removes and returns the last object, or `None` if the store is empty.
    pub fn pop_back(&self) -> Option<SimulationObject> {
        self.lock().pop()
    }

    /// Removes the object at `index`, shifting later objects down by one.
    ///
    /// The last object is never removed through this path (use
    /// [`ParticleStore::pop_back`]); for it, and for out-of-range indices,
    /// the store is left unchanged and `None` is returned.
    pub fn erase(&self, index: ParticleId) -> Option<SimulationObject> {
        let mut objects = self.lock();
        if index < objects.len().saturating_sub(1) {
            Some(objects.remove(index))
        } else {
            None
        }
    }

    /// Visits every object in insertion order while holding the lock.
    ///
    /// The visitor receives the object and its id and returns `true` to
    /// stop the traversal early.
    ///
    /// ### Returns
    /// The number of objects visited.
    pub fn map<F>(&self, mut visitor: F) -> usize
    where
        F: FnMut(&mut SimulationObject, ParticleId) -> bool,
    {
        let mut objects = self.lock();
        let mut visited = 0;
        for (id, obj) in objects.iter_mut().enumerate() {
            visited += 1;
            if visitor(obj, id) {
                break;
            }
        }
        visited
    }

    /// Read-only counterpart of [`ParticleStore::map`], used for rendering.
    pub fn inspect<F>(&self, mut visitor: F) -> usize
    where
        F: FnMut(&SimulationObject, ParticleId) -> bool,
    {
        let objects = self.lock();
        let mut visited = 0;
        for (id, obj) in objects.iter().enumerate() {
            visited += 1;
            if visitor(obj, id) {
                break;
            }
        }
        visited
    }

    /// Visits every ordered pair `(i, j)` with `i != j`, outer index first.
    ///
    /// Both `(i, j)` and `(j, i)` are visited. The whole sweep runs under a
    /// single lock acquisition; returning `true` from the visitor ends it,
    /// inner and outer loop alike.
    ///
    /// ### Returns
    /// The number of pairs visited.
    pub fn map_pairs<F>(&self, mut visitor: F) -> usize
    where
        F: FnMut(&mut SimulationObject, &mut SimulationObject, ParticleId, ParticleId) -> bool,
    {
        let mut objects = self.lock();
        let n = objects.len();
        let mut visited = 0;
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                visited += 1;
                let (a, b) = pair_mut(objects.as_mut_slice(), i, j);
                if visitor(a, b, i, j) {
                    return visited;
                }
            }
        }
        visited
    }

    /// Copies the whole arena out under one lock acquisition.
    pub fn snapshot(&self) -> Vec<SimulationObject> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Returns mutable references to two distinct elements, in argument order.
///
/// ### Panics
/// Panics if `i == j` or either index is out of bounds.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "pair_mut needs two distinct indices");
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::MoleculeKind;
    use glam::DVec3;
    use std::sync::Arc;
    use std::thread;

    fn object_at(x: f64) -> SimulationObject {
        let mut obj = SimulationObject::molecule(MoleculeKind::O2);
        obj.particle.position = DVec3::new(x, 0.0, 0.0);
        obj
    }

    fn xs(store: &ParticleStore) -> Vec<f64> {
        store.snapshot().iter().map(|o| o.position().x).collect()
    }

    #[test]
    fn push_and_pop_follow_lifo_order() {
        let store = ParticleStore::new();
        assert!(store.is_empty());

        let a = store.push_back(object_at(1.0));
        let b = store.push_back(object_at(2.0));
        assert_eq!((a, b), (0, 1));
        assert_eq!(store.len(), 2);

        let popped = store.pop_back().unwrap();
        assert_eq!(popped.position().x, 2.0);
        assert_eq!(store.len(), 1);

        assert_eq!(store.pop_back().unwrap().position().x, 1.0);
        assert!(store.pop_back().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn erase_removes_inner_elements_only() {
        let store = ParticleStore::new();
        for x in [0.0, 1.0, 2.0, 3.0] {
            store.push_back(object_at(x));
        }

        assert_eq!(store.erase(1).unwrap().position().x, 1.0);
        assert_eq!(xs(&store), vec![0.0, 2.0, 3.0]);

        // The last element is refused, as are out-of-range indices.
        assert!(store.erase(2).is_none());
        assert!(store.erase(99).is_none());
        assert!(store.erase(usize::MAX).is_none());
        assert_eq!(store.len(), 3);

        let empty = ParticleStore::new();
        assert!(empty.erase(0).is_none());
    }

    #[test]
    fn map_visits_in_insertion_order_and_can_mutate() {
        let store = ParticleStore::new();
        for x in [5.0, 6.0, 7.0] {
            store.push_back(object_at(x));
        }

        let mut seen = Vec::new();
        let visited = store.map(|obj, id| {
            seen.push(id);
            obj.particle.velocity = DVec3::new(id as f64, 0.0, 0.0);
            false
        });

        assert_eq!(visited, 3);
        assert_eq!(seen, vec![0, 1, 2]);
        let velocities: Vec<f64> = store.snapshot().iter().map(|o| o.particle.velocity.x).collect();
        assert_eq!(velocities, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn map_stops_when_visitor_returns_true() {
        let store = ParticleStore::new();
        for x in 0..50 {
            store.push_back(object_at(x as f64));
        }

        let mut calls = 0;
        let visited = store.map(|_, _| {
            calls += 1;
            true
        });
        assert_eq!(calls, 1);
        assert_eq!(visited, 1);

        let mut calls = 0;
        store.inspect(|_, id| {
            calls += 1;
            id == 9
        });
        assert_eq!(calls, 10);
    }

    #[test]
    fn map_pairs_visits_every_ordered_pair_except_self() {
        let store = ParticleStore::new();
        for x in 0..4 {
            store.push_back(object_at(x as f64));
        }

        let mut pairs = Vec::new();
        let visited = store.map_pairs(|a, b, i, j| {
            assert_eq!(a.position().x, i as f64);
            assert_eq!(b.position().x, j as f64);
            pairs.push((i, j));
            false
        });

        assert_eq!(visited, 12);
        assert!(pairs.contains(&(0, 3)));
        assert!(pairs.contains(&(3, 0)));
        assert!(pairs.iter().all(|(i, j)| i != j));
    }

    #[test]
    fn map_pairs_early_stop_ends_outer_loop_too() {
        let store = ParticleStore::new();
        for x in 0..10 {
            store.push_back(object_at(x as f64));
        }

        let mut count = 0;
        let visited = store.map_pairs(|_, _, _, _| {
            count += 1;
            count == 15
        });
        assert_eq!(visited, 15);
        assert_eq!(count, 15);
    }

    #[test]
    fn map_pairs_on_tiny_stores_visits_nothing() {
        let store = ParticleStore::new();
        assert_eq!(store.map_pairs(|_, _, _, _| false), 0);
        store.push_back(object_at(0.0));
        assert_eq!(store.map_pairs(|_, _, _, _| false), 0);
    }

    #[test]
    fn pair_mut_returns_elements_in_argument_order() {
        let mut v = vec![10, 20, 30];
        let (a, b) = pair_mut(&mut v, 2, 0);
        assert_eq!((*a, *b), (30, 10));
        std::mem::swap(a, b);
        assert_eq!(v, vec![30, 20, 10]);
    }

    #[test]
    fn concurrent_pushes_are_all_kept() {
        let store = Arc::new(ParticleStore::new());
        let workers: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for k in 0..250 {
                        store.push_back(object_at((t * 1000 + k) as f64));
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(store.len(), 1000);
    }

    #[test]
    fn readers_never_observe_a_partially_applied_traversal() {
        let store = Arc::new(ParticleStore::new());
        for _ in 0..200 {
            store.push_back(object_at(0.0));
        }

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for round in 1..=200 {
                    store.map(|obj, _| {
                        obj.particle.position.x = round as f64;
                        false
                    });
                }
            })
        };

        for _ in 0..200 {
            let mut first = None;
            store.inspect(|obj, _| {
                let x = obj.position().x;
                let expected = *first.get_or_insert(x);
                assert_eq!(x, expected, "torn traversal observed");
                false
            });
        }
        writer.join().unwrap();
        assert!(xs(&store).iter().all(|&x| x == 200.0));
    }
}
