//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with equipment: the camera producing
//! frames and the PWM driven motor and servo consuming demands.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod cam;
pub mod drive;
