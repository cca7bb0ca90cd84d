//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface. Telecommands are JSON documents of the form
//! `{"type": "<TcType>", "payload": ...}`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod steer_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Internal
use steer_ctrl::SteerCtrlTc;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the vehicle by the operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Stop all actuators and ignore steering demands until `MakeUnsafe`.
    MakeSafe,

    /// Leave safe mode.
    MakeUnsafe,

    /// A steering controller tuning command.
    SteerCtrl(SteerCtrlTc),
}

/// Response to a telecommand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TcResponse {
    /// The telecommand was executed.
    Ok,

    /// The current steering controller gains.
    Gains {
        k_p: f64,
        k_i: f64,
        k_d: f64,
    },

    /// The telecommand was rejected.
    Invalid(String),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise the TC into a JSON packet
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
