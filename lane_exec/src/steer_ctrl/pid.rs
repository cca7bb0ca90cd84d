//! # PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains and accumulated state of a PID controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Sum of `error * dt` over all computations since the last reset
    pub integral: f64,

    /// Error of the last computation, zero after a reset
    pub prev_error: f64,
}

/// A PID controller with an explicit time step.
///
/// Neither the output nor the integral are limited.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PidController {
    state: ControlState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains and zeroed state.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            state: ControlState {
                k_p, k_i, k_d,
                ..Default::default()
            }
        }
    }

    /// Compute the controller output for the current value, `dt` seconds
    /// after the previous computation.
    ///
    /// If `dt` is not positive (or NaN) the output is zero and the state is
    /// left untouched.
    pub fn compute(&mut self, setpoint: f64, actual: f64, dt: f64) -> f64 {
        if !(dt > 0.0) {
            return 0.0;
        }

        let s = &mut self.state;

        let error = setpoint - actual;

        let proportional = s.k_p * error;

        s.integral += error * dt;
        let integral = s.k_i * s.integral;

        let derivative = s.k_d * (error - s.prev_error) / dt;

        s.prev_error = error;

        proportional + integral + derivative
    }

    /// Zero the integral and previous error. Gains are kept.
    pub fn reset(&mut self) {
        self.state.integral = 0.0;
        self.state.prev_error = 0.0;
    }

    /// Replace the gains, keeping the accumulated state.
    pub fn set_gains(&mut self, k_p: f64, k_i: f64, k_d: f64) {
        self.state.k_p = k_p;
        self.state.k_i = k_i;
        self.state.k_d = k_d;
    }

    /// Get the gains as `(k_p, k_i, k_d)`.
    pub fn get_gains(&self) -> (f64, f64, f64) {
        (self.state.k_p, self.state.k_i, self.state.k_d)
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_non_positive_dt() {
        let mut pid = PidController::new(1.0, 2.0, 3.0);
        pid.compute(4.0, 1.0, 0.5);
        let before = *pid.state();

        assert_eq!(pid.compute(10.0, 0.0, 0.0), 0.0);
        assert_eq!(*pid.state(), before);

        assert_eq!(pid.compute(10.0, 0.0, -1.0), 0.0);
        assert_eq!(*pid.state(), before);

        assert_eq!(pid.compute(10.0, 0.0, std::f64::NAN), 0.0);
        assert_eq!(*pid.state(), before);
    }

    #[test]
    fn test_proportional() {
        let mut pid = PidController::new(1.0, 0.0, 0.0);

        assert_eq!(pid.compute(10.0, 0.0, 1.0), 10.0);
        assert_eq!(pid.state().prev_error, 10.0);

        assert_eq!(pid.compute(10.0, 0.0, 1.0), 10.0);
        assert_eq!(pid.state().prev_error, 10.0);
    }

    #[test]
    fn test_integral() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);

        assert_eq!(pid.compute(5.0, 0.0, 1.0), 5.0);
        assert_eq!(pid.compute(5.0, 0.0, 1.0), 10.0);
        assert_eq!(pid.state().integral, 10.0);
    }

    #[test]
    fn test_derivative() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);

        // First step differentiates against a zero previous error
        assert_eq!(pid.compute(4.0, 0.0, 0.5), 8.0);
        assert_eq!(pid.compute(4.0, 0.0, 0.5), 0.0);
        assert_eq!(pid.compute(1.0, 0.0, 0.5), -6.0);
    }

    #[test]
    fn test_no_windup_limit() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        let mut out = 0.0;
        for _ in 0..1000 {
            out = pid.compute(100.0, 0.0, 1.0);
        }
        assert_eq!(out, 100_000.0);
    }

    #[test]
    fn test_reset() {
        let mut pid = PidController::new(0.7, 0.3, 0.1);
        let mut fresh = pid.clone();

        pid.compute(3.0, 1.0, 0.1);
        pid.compute(-2.0, 1.5, 0.2);
        pid.compute(8.0, -1.0, 0.05);
        assert_ne!(pid.state().integral, 0.0);

        pid.reset();
        assert_eq!(pid.state().integral, 0.0);
        assert_eq!(pid.state().prev_error, 0.0);

        let a = pid.compute(6.0, 2.0, 0.3);
        let b = fresh.compute(6.0, 2.0, 0.3);
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(pid, fresh);
    }

    #[test]
    fn test_gains() {
        let mut pid = PidController::new(1.0, 1.0, 0.0);
        pid.compute(2.0, 0.0, 1.0);

        pid.set_gains(0.5, 0.25, 0.125);
        assert_eq!(pid.get_gains(), (0.5, 0.25, 0.125));

        // Accumulated state is kept
        assert_eq!(pid.state().integral, 2.0);
        assert_eq!(pid.state().prev_error, 2.0);

        // New gains apply from the next computation
        assert_eq!(pid.compute(2.0, 0.0, 1.0), 0.5 * 2.0 + 0.25 * 4.0);
    }
}
