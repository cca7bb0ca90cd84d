//! Parameters structure for SteerCtrl

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {

    /// Proportional gain of the lateral error controller
    pub k_p: f64,

    /// Integral gain of the lateral error controller
    pub k_i: f64,

    /// Derivative gain of the lateral error controller
    pub k_d: f64,

    /// Target lateral error, 0 puts the lane centre in the middle of the
    /// frame.
    ///
    /// Units: pixels
    pub setpoint_px: f64,

    /// What to do on a frame with no lane centre.
    pub dropout_policy: DropoutPolicy,
}

/// Behaviour on a frame without a lane centre.
///
/// The controller is never run on such a frame, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropoutPolicy {
    /// No demand is produced, the actuators keep their last command.
    Skip,

    /// The previous demand is produced again.
    Hold,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: 0.01,
            k_i: 0.0,
            k_d: 0.0,
            setpoint_px: 0.0,
            dropout_policy: DropoutPolicy::Skip,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let params: Params = util::params::from_str(
            include_str!("../../../params/steer_ctrl.toml")
        ).unwrap();
        assert_eq!(params.dropout_policy, DropoutPolicy::Skip);
        assert_eq!(params.k_d, 0.002);
    }
}
