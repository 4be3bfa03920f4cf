//! Fixed-capacity, append-only store of spawned instances

use log::warn;

use super::instance::Instance;

/// Default ceiling on the number of live instances
pub const DEFAULT_CAPACITY: usize = 100_000;

/// Append-only pool of instances in spawn order
///
/// Instances are never removed. Once the pool is full further appends are
/// dropped without error.
#[derive(Debug, Clone)]
pub struct InstancePool {
    instances: Vec<Instance>,
    capacity: usize,
    reported_full: bool,
}

impl InstancePool {
    /// Creates an empty pool that holds at most `capacity` instances
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::new(),
            capacity,
            reported_full: false,
        }
    }

    /// Appends an instance unless the pool is full
    ///
    /// # Returns
    /// `true` if the instance was stored, `false` if it was dropped
    pub fn try_append(&mut self, instance: Instance) -> bool {
        if self.is_full() {
            if !self.reported_full {
                warn!(
                    "Instance pool is full ({} instances), further spawns are ignored",
                    self.capacity
                );
                self.reported_full = true;
            }
            return false;
        }

        self.instances.push(instance);
        true
    }

    /// Calls `action` for every instance in spawn order
    pub fn for_each<F>(&mut self, mut action: F)
    where
        F: FnMut(usize, &mut Instance),
    {
        for (index, instance) in self.instances.iter_mut().enumerate() {
            action(index, instance);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.instances.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Instance> {
        self.instances.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.instances.len() >= self.capacity
    }
}

impl Default for InstancePool {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn instance_at(x: f32) -> Instance {
        Instance::new(0.0, Vector3::new(x, 0.0, 0.0), Vector3::unit_z(), 10.0)
    }

    #[test]
    fn test_append_until_full() {
        let mut pool = InstancePool::with_capacity(3);
        assert!(pool.try_append(instance_at(0.0)));
        assert!(pool.try_append(instance_at(1.0)));
        assert!(pool.try_append(instance_at(2.0)));
        assert!(pool.is_full());

        let before: Vec<Instance> = pool.iter().copied().collect();
        assert!(!pool.try_append(instance_at(3.0)));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let mut pool = InstancePool::with_capacity(10);
        for i in 0..50 {
            pool.try_append(instance_at(i as f32));
            assert!(pool.len() <= pool.capacity());
        }
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn test_zero_capacity_drops_everything() {
        let mut pool = InstancePool::with_capacity(0);
        assert!(!pool.try_append(instance_at(0.0)));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_for_each_visits_in_insertion_order() {
        let mut pool = InstancePool::with_capacity(5);
        for i in 0..5 {
            pool.try_append(instance_at(i as f32));
        }

        let mut visited = Vec::new();
        pool.for_each(|index, instance| visited.push((index, instance.position.x)));

        assert_eq!(
            visited,
            vec![(0, 0.0), (1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]
        );
    }

    #[test]
    fn test_default_capacity() {
        let pool = InstancePool::default();
        assert_eq!(pool.capacity(), DEFAULT_CAPACITY);
        assert!(pool.get(0).is_none());
    }
}
