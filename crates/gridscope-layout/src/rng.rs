/// Linear congruential generator with the classic Numerical Recipes constants.
///
/// Layouts only need a reproducible stream of "random enough" values, so every consumer starts
/// from the same seed and results are stable across runs and platforms.
#[derive(Debug, Clone)]
pub(crate) struct Lcg {
    state: u32,
}

impl Lcg {
    const A: u32 = 1_664_525;
    const C: u32 = 1_013_904_223;

    pub(crate) fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in `[0, 1)`.
    pub(crate) fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(Self::A).wrapping_add(Self::C);
        f64::from(self.state) / 4_294_967_296.0
    }

    /// A tiny non-zero offset used to separate exactly coincident points.
    pub(crate) fn jiggle(&mut self) -> f64 {
        (self.next_f64() - 0.5) * 1e-6
    }

    /// Fisher-Yates, consuming values from the back of the slice like the reference packer.
    pub(crate) fn shuffle<T>(&mut self, items: &mut [T]) {
        let mut m = items.len();
        while m > 0 {
            let i = ((self.next_f64() * m as f64) as usize).min(m - 1);
            m -= 1;
            items.swap(m, i);
        }
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::Lcg;

    #[test]
    fn lcg_first_values_match_seeded_baseline() {
        let mut rng = Lcg::new(1);
        // (1664525 * 1 + 1013904223) mod 2^32 = 1015568748
        let v = rng.next_f64();
        assert!((v - 1_015_568_748.0 / 4_294_967_296.0).abs() < 1e-15);
        let w = rng.next_f64();
        assert!((0.0..1.0).contains(&w));
        assert_ne!(v, w);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Lcg::default();
        let mut items: Vec<usize> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn jiggle_is_tiny() {
        let mut rng = Lcg::default();
        for _ in 0..100 {
            assert!(rng.jiggle().abs() <= 5e-7);
        }
    }
}
