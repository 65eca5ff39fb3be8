//! Small RNG helpers shared by the growth and replacer modules.
use glam::IVec3;
use rand::RngCore;

/// Generate a random float in the range [0, 1].
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Uniform integer in `0..bound`; `0` when `bound` is zero.
#[inline]
pub(crate) fn rand_below(rng: &mut dyn RngCore, bound: u32) -> u32 {
    if bound == 0 {
        return 0;
    }
    ((rng.next_u32() as u64 * bound as u64) >> 32) as u32
}

/// Uniform integer in `lo..=hi`; returns `lo` when the range is empty.
#[inline]
pub(crate) fn rand_inclusive(rng: &mut dyn RngCore, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        return lo;
    }
    lo + rand_below(rng, (hi - lo + 1) as u32) as i32
}

#[inline]
pub(crate) fn chance(rng: &mut dyn RngCore, probability: f32) -> bool {
    rand01(rng) < probability
}

/// One of the four horizontal unit directions.
pub(crate) fn random_horizontal(rng: &mut dyn RngCore) -> IVec3 {
    const DIRECTIONS: [IVec3; 4] = [IVec3::X, IVec3::NEG_X, IVec3::Z, IVec3::NEG_Z];
    DIRECTIONS[rand_below(rng, 4) as usize]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct FixedRng {
        pub(crate) value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    #[test]
    fn rand01_stays_below_one() {
        let mut rng = FixedRng { value: u32::MAX };
        let result = rand01(&mut rng);
        assert!(result <= 1.0);
        let mut rng = FixedRng { value: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
    }

    #[test]
    fn rand_below_covers_the_range() {
        let mut low = FixedRng { value: 0 };
        let mut high = FixedRng { value: u32::MAX };
        assert_eq!(rand_below(&mut low, 5), 0);
        assert_eq!(rand_below(&mut high, 5), 4);
        assert_eq!(rand_below(&mut high, 0), 0);
    }

    #[test]
    fn rand_inclusive_handles_bounds() {
        let mut high = FixedRng { value: u32::MAX };
        assert_eq!(rand_inclusive(&mut high, -2, -1), -1);
        assert_eq!(rand_inclusive(&mut high, 3, 3), 3);
        assert_eq!(rand_inclusive(&mut high, 5, 1), 5);
    }
}
