/// Signals that the uniform sequence has no values left.
///
/// Exhaustion is an expected termination path for the simulation, not a
/// failure, so it travels through return values rather than panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("uniform sequence exhausted")]
pub struct Exhausted;

/// A finite, ordered sequence of values in `[0, 1)`.
///
/// The cursor only moves forward. Once `next` reports [`Exhausted`], it does
/// so forever.
#[derive(Debug, Clone)]
pub struct UniformSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl UniformSequence {
    /// Wraps a predefined list of values. Callers are responsible for keeping
    /// every value in `[0, 1)`.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Generates `quantity` values with the linear congruential recurrence
    /// `x_{n+1} = (a * x_n + c) mod M`, normalized by `M`.
    pub fn congruential(seed: u64, quantity: usize) -> Self {
        const A: u64 = 214_013;
        const C: u64 = 2_531_011;
        const M: u64 = 1 << 32;

        let mut prev = seed;
        let values = (0..quantity)
            .map(|_| {
                prev = (A.wrapping_mul(prev).wrapping_add(C)) % M;
                prev as f64 / M as f64
            })
            .collect();
        Self { values, cursor: 0 }
    }

    pub fn next(&mut self) -> Result<f64, Exhausted> {
        match self.values.get(self.cursor) {
            Some(&value) => {
                self.cursor += 1;
                Ok(value)
            }
            None => Err(Exhausted),
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.values.len()
    }

    /// Number of values consumed so far.
    pub fn index(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_never_rewinds() {
        let mut seq = UniformSequence::from_values(vec![0.25, 0.75]);
        assert!(seq.has_next());
        assert_eq!(seq.next(), Ok(0.25));
        assert_eq!(seq.next(), Ok(0.75));
        assert!(!seq.has_next());
        assert_eq!(seq.next(), Err(Exhausted));
        assert_eq!(seq.next(), Err(Exhausted));
        assert_eq!(seq.index(), 2);
    }

    #[test]
    fn congruential_values_in_unit_interval() {
        let mut seq = UniformSequence::congruential(69, 1_000);
        for _ in 0..1_000 {
            let r = seq.next().unwrap();
            assert!((0.0..1.0).contains(&r));
        }
        assert!(!seq.has_next());
    }

    #[test]
    fn congruential_is_deterministic() {
        let a = UniformSequence::congruential(42, 100);
        let b = UniformSequence::congruential(42, 100);
        assert_eq!(a.values, b.values);
    }
}
