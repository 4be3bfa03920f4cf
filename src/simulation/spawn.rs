//! Spawn controller: turns a spawn trigger into a randomized pool entry

use std::time::{SystemTime, UNIX_EPOCH};

use cgmath::Vector3;
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{instance::Instance, pool::InstancePool};
use crate::config::SpawnConfig;

/// Source of uniform random values for spawning
pub trait SpawnSource {
    /// Returns a uniform sample in `[min, max]`
    fn sample(&mut self, min: f32, max: f32) -> f32;
}

/// Seeded pseudo-random source used by the running application
pub struct SeededSource {
    rng: StdRng,
    seed: u64,
}

impl SeededSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seeds from the wall clock, so every run spawns differently
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Self::from_seed(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl SpawnSource for SeededSource {
    fn sample(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }
}

/// Creates instances with random placement, axis and speed
pub struct SpawnController<S: SpawnSource> {
    ranges: SpawnConfig,
    source: S,
}

impl<S: SpawnSource> SpawnController<S> {
    pub fn new(ranges: SpawnConfig, source: S) -> Self {
        Self { ranges, source }
    }

    /// Draws a new instance spawned at `now`
    ///
    /// Values are drawn in a fixed order: position x, y, z, then axis x, y, z,
    /// then angular speed.
    pub fn sample_instance(&mut self, now: f32) -> Instance {
        let position = self.sample_vector(self.ranges.position_extent);
        let axis = self.sample_vector(self.ranges.axis_extent);
        let speed = self.ranges.max_angular_speed;
        let angular_speed = self.source.sample(-speed, speed);

        Instance::new(now, position, axis, angular_speed)
    }

    /// Spawns an instance at `now` into `pool`
    ///
    /// # Returns
    /// `false` when the pool is already full and the spawn was dropped
    pub fn spawn(&mut self, now: f32, pool: &mut InstancePool) -> bool {
        let instance = self.sample_instance(now);
        let appended = pool.try_append(instance);
        if appended {
            debug!(
                "Spawned instance #{} at ({:.2}, {:.2}, {:.2}), {:.1} deg/s",
                pool.len(),
                instance.position.x,
                instance.position.y,
                instance.position.z,
                instance.angular_speed
            );
        }
        appended
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn sample_vector(&mut self, extent: f32) -> Vector3<f32> {
        let x = self.source.sample(-extent, extent);
        let y = self.source.sample(-extent, extent);
        let z = self.source.sample(-extent, extent);
        Vector3::new(x, y, z)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a fixed list of samples, ignoring the requested range
    pub(crate) struct ScriptedSource {
        values: VecDeque<f32>,
        pub requested: Vec<(f32, f32)>,
    }

    impl ScriptedSource {
        pub(crate) fn new(values: &[f32]) -> Self {
            Self {
                values: values.iter().copied().collect(),
                requested: Vec::new(),
            }
        }
    }

    impl SpawnSource for ScriptedSource {
        fn sample(&mut self, min: f32, max: f32) -> f32 {
            self.requested.push((min, max));
            self.values.pop_front().unwrap_or(0.0)
        }
    }

    #[test]
    fn test_draw_order_and_ranges() {
        let source = ScriptedSource::new(&[1.0, 2.0, 3.0, 0.5, 0.5, 0.5, 90.0]);
        let mut controller = SpawnController::new(SpawnConfig::default(), source);

        let instance = controller.sample_instance(4.0);

        assert_eq!(instance.spawn_time, 4.0);
        assert_eq!(instance.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(instance.rotation_axis, Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(instance.angular_speed, 90.0);
        assert_eq!(instance.rotation_deg, 0.0);

        let requested = &controller.source_mut().requested;
        assert_eq!(&requested[..3], &[(-5.0_f32, 5.0_f32); 3]);
        assert_eq!(&requested[3..6], &[(-1.0_f32, 1.0_f32); 3]);
        assert_eq!(requested[6], (-500.0_f32, 500.0_f32));
    }

    #[test]
    fn test_seeded_spawns_stay_in_bounds() {
        let mut controller = SpawnController::new(SpawnConfig::default(), SeededSource::from_seed(7));
        let mut pool = InstancePool::with_capacity(10_000);

        for i in 0..10_000 {
            assert!(controller.spawn(i as f32 * 0.001, &mut pool));
        }

        for instance in pool.iter() {
            for component in [instance.position.x, instance.position.y, instance.position.z] {
                assert!((-5.0..=5.0).contains(&component));
            }
            for component in [
                instance.rotation_axis.x,
                instance.rotation_axis.y,
                instance.rotation_axis.z,
            ] {
                assert!((-1.0..=1.0).contains(&component));
            }
            assert!((-500.0..=500.0).contains(&instance.angular_speed));
        }
    }

    #[test]
    fn test_same_seed_same_instances() {
        let mut a = SpawnController::new(SpawnConfig::default(), SeededSource::from_seed(42));
        let mut b = SpawnController::new(SpawnConfig::default(), SeededSource::from_seed(42));
        for _ in 0..32 {
            assert_eq!(a.sample_instance(0.0), b.sample_instance(0.0));
        }
    }

    #[test]
    fn test_spawn_into_full_pool_is_dropped() {
        let mut controller = SpawnController::new(SpawnConfig::default(), SeededSource::from_seed(1));
        let mut pool = InstancePool::with_capacity(2);

        assert!(controller.spawn(0.0, &mut pool));
        assert!(controller.spawn(0.1, &mut pool));
        let snapshot: Vec<Instance> = pool.iter().copied().collect();

        assert!(!controller.spawn(0.2, &mut pool));
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), snapshot);
    }

    #[test]
    fn test_empty_range_returns_lower_bound() {
        let mut source = SeededSource::from_seed(3);
        assert_eq!(source.sample(2.0, 2.0), 2.0);
        assert_eq!(source.sample(1.0, -1.0), 1.0);
    }
}
