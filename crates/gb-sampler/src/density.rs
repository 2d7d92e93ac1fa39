use nuts_rs::{CpuLogpFunc, LogpError};
use thiserror::Error;

/// A differentiable log density over an unconstrained real vector.
///
/// Implementations are shared across chain threads, so they must be `Sync`.
/// Regions outside the support report `f64::NEG_INFINITY`; the sampler treats
/// any non-finite value as zero probability.
pub trait LogDensity: Sync {
    /// Number of coordinates.
    fn dim(&self) -> usize;

    /// Evaluate the log density at `position`, writing its gradient into `grad`.
    ///
    /// `grad.len() == position.len() == self.dim()`.
    fn logp_and_grad(&self, position: &[f64], grad: &mut [f64]) -> f64;

    /// Log density alone. The default evaluates the gradient and discards it.
    fn logp(&self, position: &[f64]) -> f64 {
        let mut grad = vec![0.0; position.len()];
        self.logp_and_grad(position, &mut grad)
    }
}

impl<T: LogDensity + ?Sized> LogDensity for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn logp_and_grad(&self, position: &[f64], grad: &mut [f64]) -> f64 {
        (**self).logp_and_grad(position, grad)
    }
}

/// A point where the density or its gradient is not finite.
///
/// Recoverable: the engine rejects the trajectory as divergent and carries on.
#[derive(Debug, Error)]
#[error("log density {logp} is not finite or has a non-finite gradient")]
pub struct NonFiniteDensity {
    pub logp: f64,
}

impl LogpError for NonFiniteDensity {
    fn is_recoverable(&self) -> bool {
        true
    }
}

/// [`LogDensity`] seen through the engine's CPU interface.
pub(crate) struct EngineDensity<'a, D: ?Sized> {
    density: &'a D,
}

impl<'a, D: LogDensity + ?Sized> EngineDensity<'a, D> {
    pub(crate) fn new(density: &'a D) -> Self {
        Self { density }
    }
}

impl<D: LogDensity + ?Sized> CpuLogpFunc for EngineDensity<'_, D> {
    type LogpError = NonFiniteDensity;

    fn dim(&self) -> usize {
        self.density.dim()
    }

    fn logp(&mut self, position: &[f64], grad: &mut [f64]) -> Result<f64, Self::LogpError> {
        let logp = self.density.logp_and_grad(position, grad);
        if logp.is_finite() && grad.iter().all(|g| g.is_finite()) {
            Ok(logp)
        } else {
            Err(NonFiniteDensity { logp })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HalfLine;

    impl LogDensity for HalfLine {
        fn dim(&self) -> usize {
            1
        }

        fn logp_and_grad(&self, position: &[f64], grad: &mut [f64]) -> f64 {
            grad[0] = -1.0;
            if position[0] <= 0.0 {
                return f64::NEG_INFINITY;
            }
            -position[0]
        }
    }

    #[test]
    fn finite_points_pass_through() {
        let mut func = EngineDensity::new(&HalfLine);
        let mut grad = [0.0];
        assert_eq!(CpuLogpFunc::dim(&func), 1);
        assert_eq!(CpuLogpFunc::logp(&mut func, &[2.0], &mut grad).unwrap(), -2.0);
        assert_eq!(grad, [-1.0]);
    }

    #[test]
    fn outside_support_is_recoverable() {
        let mut func = EngineDensity::new(&HalfLine);
        let mut grad = [0.0];
        let err = CpuLogpFunc::logp(&mut func, &[-1.0], &mut grad).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.logp, f64::NEG_INFINITY);
    }
}
