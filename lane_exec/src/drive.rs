//! # Drive output
//!
//! Maps steering demands onto the steering servo and drives the motor at a
//! cruise speed. The output goes to a `PwmSink`, this crate does no hardware
//! I/O itself.
//!
//! Speed and angle demands are converted to PWM values through lookup tables
//! built once at start up and indexed by the clamped integer demand.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use comms_if::eqpt::drive::{DriveDems, HardwarePwmPin};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Destination for PWM commands.
pub trait PwmSink {
    /// Set the duty cycle of a pin, in the range `0..=resolution` of the
    /// motor lookup table.
    fn set_duty_cycle(&mut self, pin: HardwarePwmPin, duty: u16) -> Result<(), DriveError>;

    /// Set the servo pulse width of a pin.
    fn set_pulse_width_us(&mut self, pin: HardwarePwmPin, pulse_width_us: u16) -> Result<(), DriveError>;

    /// Turn off the output of a pin.
    fn stop(&mut self, pin: HardwarePwmPin) -> Result<(), DriveError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive output parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub motor_pin: HardwarePwmPin,
    pub servo_pin: HardwarePwmPin,

    /// Maximum speed of the drive motor, reached at full duty.
    ///
    /// Units: RPM
    pub motor_max_rpm: u32,

    /// Duty cycle value of full duty.
    pub motor_pwm_resolution: u16,

    /// Constant speed of the drive motor while not in safe mode.
    ///
    /// Units: RPM
    pub cruise_rpm: i32,

    /// Largest servo angle, mapped to a 2000 us pulse. Zero maps to 1000 us.
    ///
    /// Units: degrees
    pub servo_max_angle_deg: u32,

    /// Servo angle for driving straight ahead.
    ///
    /// Units: degrees
    pub servo_centre_deg: f64,

    /// Servo angle change per unit of steering demand. Negative values
    /// reverse the servo.
    ///
    /// Units: degrees
    pub servo_deg_per_unit: f64,
}

/// Lookup table from motor speed to PWM duty cycle.
#[derive(Debug, Clone)]
pub struct DcMotorLut {
    table: Vec<u16>,
}

/// Lookup table from servo angle to pulse width.
#[derive(Debug, Clone)]
pub struct ServoLut {
    table: Vec<u16>,
}

/// Converts steering demands into PWM commands.
pub struct DriveCtrl {
    params: Params,
    motor_lut: DcMotorLut,
    servo_lut: ServoLut,
}

/// A sink which only records and logs the commands it receives.
#[derive(Debug, Default)]
pub struct LogSink {
    outputs: HashMap<HardwarePwmPin, PwmOutput>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The last command applied to a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmOutput {
    Duty(u16),
    PulseWidthUs(u16),
    Stopped,
}

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Pins {0:?} and {1:?} share a PWM channel and cannot be driven together")]
    PinConflict(HardwarePwmPin, HardwarePwmPin),

    #[error("Invalid lookup table parameters: {0}")]
    InvalidLut(String),

    #[error("The PWM sink rejected a command: {0}")]
    SinkError(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            motor_pin: HardwarePwmPin::Pwm0Gpio12,
            servo_pin: HardwarePwmPin::Pwm1Gpio13,
            motor_max_rpm: 95,
            motor_pwm_resolution: 255,
            cruise_rpm: 30,
            servo_max_angle_deg: 180,
            servo_centre_deg: 90.0,
            servo_deg_per_unit: 1.0,
        }
    }
}

impl DcMotorLut {
    /// Build the table for speeds `0..=max_rpm`.
    pub fn new(max_rpm: u32, resolution: u16) -> Result<Self, DriveError> {
        if max_rpm == 0 {
            return Err(DriveError::InvalidLut(String::from("max_rpm must be non-zero")));
        }

        let table = (0..=max_rpm)
            .map(|rpm| (rpm as f64 / max_rpm as f64 * resolution as f64).round() as u16)
            .collect();

        Ok(Self { table })
    }

    /// Duty cycle for a speed, clamped to `0..=max_rpm`.
    pub fn duty(&self, rpm: i32) -> u16 {
        self.table[clamp_index(rpm, self.table.len())]
    }
}

impl ServoLut {
    /// Build the table for angles `0..=max_angle_deg`.
    pub fn new(max_angle_deg: u32) -> Result<Self, DriveError> {
        if max_angle_deg == 0 {
            return Err(DriveError::InvalidLut(String::from("max_angle_deg must be non-zero")));
        }

        let table = (0..=max_angle_deg)
            .map(|a| (a as f64 / max_angle_deg as f64 * 1000.0 + 1000.0).round() as u16)
            .collect();

        Ok(Self { table })
    }

    /// Pulse width for an angle, clamped to `0..=max_angle_deg`.
    pub fn pulse_width_us(&self, angle_deg: i32) -> u16 {
        self.table[clamp_index(angle_deg, self.table.len())]
    }
}

impl DriveCtrl {
    pub fn new(params: &Params) -> Result<Self, DriveError> {
        if params.motor_pin.conflicts_with(&params.servo_pin) {
            return Err(DriveError::PinConflict(params.motor_pin, params.servo_pin));
        }

        Ok(Self {
            params: params.clone(),
            motor_lut: DcMotorLut::new(params.motor_max_rpm, params.motor_pwm_resolution)?,
            servo_lut: ServoLut::new(params.servo_max_angle_deg)?,
        })
    }

    /// Get the drive demands for a steering demand.
    ///
    /// With no steering demand the servo is left as it is. In safe mode
    /// nothing is demanded.
    pub fn demands(&self, steer_dem: Option<f64>, safe: bool) -> DriveDems {
        if safe {
            return DriveDems::default();
        }

        DriveDems {
            motor_rpm: Some(self.params.cruise_rpm),
            servo_angle_deg: steer_dem.map(|d| {
                (self.params.servo_centre_deg + d * self.params.servo_deg_per_unit).round() as i32
            }),
        }
    }

    /// Send the demands to the sink.
    pub fn actuate<S: PwmSink>(&self, sink: &mut S, dems: &DriveDems) -> Result<(), DriveError> {
        if let Some(rpm) = dems.motor_rpm {
            sink.set_duty_cycle(self.params.motor_pin, self.motor_lut.duty(rpm))?;
        }
        if let Some(angle) = dems.servo_angle_deg {
            sink.set_pulse_width_us(self.params.servo_pin, self.servo_lut.pulse_width_us(angle))?;
        }

        trace!("Drive demands applied: {:?}", dems);

        Ok(())
    }

    /// Stop the motor and the servo.
    pub fn stop<S: PwmSink>(&self, sink: &mut S) -> Result<(), DriveError> {
        debug!("Stopping drive outputs");
        sink.stop(self.params.motor_pin)?;
        sink.stop(self.params.servo_pin)
    }
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last command applied to a pin, if any.
    pub fn output(&self, pin: HardwarePwmPin) -> Option<PwmOutput> {
        self.outputs.get(&pin).copied()
    }
}

impl PwmSink for LogSink {
    fn set_duty_cycle(&mut self, pin: HardwarePwmPin, duty: u16) -> Result<(), DriveError> {
        trace!("GPIO{} duty {}", pin.gpio(), duty);
        self.outputs.insert(pin, PwmOutput::Duty(duty));
        Ok(())
    }

    fn set_pulse_width_us(&mut self, pin: HardwarePwmPin, pulse_width_us: u16) -> Result<(), DriveError> {
        trace!("GPIO{} pulse width {} us", pin.gpio(), pulse_width_us);
        self.outputs.insert(pin, PwmOutput::PulseWidthUs(pulse_width_us));
        Ok(())
    }

    fn stop(&mut self, pin: HardwarePwmPin) -> Result<(), DriveError> {
        debug!("GPIO{} stopped", pin.gpio());
        self.outputs.insert(pin, PwmOutput::Stopped);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn clamp_index(value: i32, len: usize) -> usize {
    util::maths::clamp(&(value.max(0) as usize), &0, &(len - 1))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_motor_lut() {
        let lut = DcMotorLut::new(95, 255).unwrap();

        assert_eq!(lut.duty(0), 0);
        assert_eq!(lut.duty(95), 255);
        // 50/95*255 = 134.2
        assert_eq!(lut.duty(50), 134);
        // 30/95*255 = 80.5263
        assert_eq!(lut.duty(30), 81);

        // Clamped
        assert_eq!(lut.duty(-10), 0);
        assert_eq!(lut.duty(500), 255);

        assert!(DcMotorLut::new(0, 255).is_err());
    }

    #[test]
    fn test_servo_lut() {
        let lut = ServoLut::new(180).unwrap();

        assert_eq!(lut.pulse_width_us(0), 1000);
        assert_eq!(lut.pulse_width_us(90), 1500);
        assert_eq!(lut.pulse_width_us(180), 2000);
        // 45/180*1000 + 1000
        assert_eq!(lut.pulse_width_us(45), 1250);
        // 1/180*1000 + 1000 = 1005.56
        assert_eq!(lut.pulse_width_us(1), 1006);

        assert_eq!(lut.pulse_width_us(-5), 1000);
        assert_eq!(lut.pulse_width_us(200), 2000);
    }

    #[test]
    fn test_pin_conflict() {
        let params = Params {
            servo_pin: HardwarePwmPin::Pwm0Gpio18,
            ..Default::default()
        };
        assert!(matches!(DriveCtrl::new(&params), Err(DriveError::PinConflict(_, _))));
    }

    #[test]
    fn test_demands() {
        let params = Params {
            servo_deg_per_unit: 2.0,
            ..Default::default()
        };
        let drive = DriveCtrl::new(&params).unwrap();

        assert_eq!(
            drive.demands(Some(10.0), false),
            DriveDems { motor_rpm: Some(30), servo_angle_deg: Some(110) }
        );
        assert_eq!(
            drive.demands(None, false),
            DriveDems { motor_rpm: Some(30), servo_angle_deg: None }
        );
        assert_eq!(drive.demands(Some(10.0), true), DriveDems::default());
    }

    #[test]
    fn test_actuate() {
        let drive = DriveCtrl::new(&Params::default()).unwrap();
        let mut sink = LogSink::new();

        drive.actuate(&mut sink, &drive.demands(Some(45.0), false)).unwrap();
        assert_eq!(sink.output(HardwarePwmPin::Pwm0Gpio12), Some(PwmOutput::Duty(81)));
        assert_eq!(sink.output(HardwarePwmPin::Pwm1Gpio13), Some(PwmOutput::PulseWidthUs(1750)));

        // No steering demand leaves the servo alone
        drive.actuate(&mut sink, &drive.demands(None, false)).unwrap();
        assert_eq!(sink.output(HardwarePwmPin::Pwm1Gpio13), Some(PwmOutput::PulseWidthUs(1750)));

        // Saturated demand
        drive.actuate(&mut sink, &drive.demands(Some(1e6), false)).unwrap();
        assert_eq!(sink.output(HardwarePwmPin::Pwm1Gpio13), Some(PwmOutput::PulseWidthUs(2000)));

        drive.stop(&mut sink).unwrap();
        assert_eq!(sink.output(HardwarePwmPin::Pwm0Gpio12), Some(PwmOutput::Stopped));
        assert_eq!(sink.output(HardwarePwmPin::Pwm1Gpio13), Some(PwmOutput::Stopped));
    }
}
