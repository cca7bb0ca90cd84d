//! # Drive Equipment Communications Module
//!
//! Identifiers and demands for the PWM driven equipment: the drive motor and the steering servo.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Hardware PWM capable GPIO pins.
///
/// GPIO 12 and 18 share PWM channel 0, GPIO 13 and 19 share PWM channel 1. Only one pin per
/// channel can be driven at a time.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, Eq, PartialEq)]
pub enum HardwarePwmPin {
    Pwm0Gpio12,
    Pwm0Gpio18,
    Pwm1Gpio13,
    Pwm1Gpio19,
}

/// Hardware PWM channels.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, Eq, PartialEq)]
pub enum PwmChannel {
    Pwm0,
    Pwm1,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands for the drive equipment on one control tick.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Default)]
pub struct DriveDems {
    /// Drive motor speed demand in RPM, or `None` to leave the motor as it is.
    pub motor_rpm: Option<i32>,

    /// Steering servo angle demand in degrees, or `None` to leave the servo as it is.
    pub servo_angle_deg: Option<i32>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HardwarePwmPin {
    /// The BCM GPIO number of the pin.
    pub fn gpio(&self) -> u8 {
        match self {
            HardwarePwmPin::Pwm0Gpio12 => 12,
            HardwarePwmPin::Pwm0Gpio18 => 18,
            HardwarePwmPin::Pwm1Gpio13 => 13,
            HardwarePwmPin::Pwm1Gpio19 => 19,
        }
    }

    /// The PWM channel driving the pin.
    pub fn channel(&self) -> PwmChannel {
        match self {
            HardwarePwmPin::Pwm0Gpio12 | HardwarePwmPin::Pwm0Gpio18 => PwmChannel::Pwm0,
            HardwarePwmPin::Pwm1Gpio13 | HardwarePwmPin::Pwm1Gpio19 => PwmChannel::Pwm1,
        }
    }

    /// Whether two pins cannot be driven together because they share a channel.
    pub fn conflicts_with(&self, other: &HardwarePwmPin) -> bool {
        self.channel() == other.channel()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pin_channels() {
        assert_eq!(HardwarePwmPin::Pwm0Gpio18.gpio(), 18);
        assert!(HardwarePwmPin::Pwm0Gpio12.conflicts_with(&HardwarePwmPin::Pwm0Gpio18));
        assert!(!HardwarePwmPin::Pwm0Gpio12.conflicts_with(&HardwarePwmPin::Pwm1Gpio13));
        assert_eq!(HardwarePwmPin::Pwm1Gpio19.channel(), PwmChannel::Pwm1);
    }
}
