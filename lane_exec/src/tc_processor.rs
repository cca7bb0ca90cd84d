//! # Telecommand processor module
//!
//! The telecommand processor handles the TCs read from the operator.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};

// Internal
use comms_if::tc::{steer_ctrl::SteerCtrlTc, Tc, TcResponse};
use lane_lib::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) -> TcResponse {

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
            TcResponse::Ok
        },
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            match ds.make_unsafe(SafeModeCause::MakeSafeTc) {
                Ok(()) => TcResponse::Ok,
                Err(cause) => TcResponse::Invalid(format!(
                    "Safe mode was caused by {:?} and cannot be cleared by a TC", cause
                ))
            }
        },
        Tc::SteerCtrl(SteerCtrlTc::SetGains { k_p, k_i, k_d }) => {
            if !(k_p.is_finite() && k_i.is_finite() && k_d.is_finite()) {
                warn!("Rejected non-finite SteerCtrl gains ({}, {}, {})", k_p, k_i, k_d);
                return TcResponse::Invalid(String::from("Gains must be finite"));
            }
            ds.steer_ctrl.set_gains(*k_p, *k_i, *k_d);
            TcResponse::Ok
        },
        Tc::SteerCtrl(SteerCtrlTc::GetGains) => {
            let (k_p, k_i, k_d) = ds.steer_ctrl.gains();
            info!("SteerCtrl gains: k_p = {}, k_i = {}, k_d = {}", k_p, k_i, k_d);
            TcResponse::Gains { k_p, k_i, k_d }
        },
        Tc::SteerCtrl(SteerCtrlTc::Reset) => {
            ds.steer_ctrl.reset();
            TcResponse::Ok
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_gains_tcs() {
        let mut ds = DataStore::default();

        let rsp = exec(&mut ds, &Tc::SteerCtrl(SteerCtrlTc::SetGains { k_p: 0.5, k_i: 0.1, k_d: 0.0 }));
        assert_eq!(rsp, TcResponse::Ok);

        assert_eq!(
            exec(&mut ds, &Tc::SteerCtrl(SteerCtrlTc::GetGains)),
            TcResponse::Gains { k_p: 0.5, k_i: 0.1, k_d: 0.0 }
        );

        let rsp = exec(&mut ds, &Tc::SteerCtrl(SteerCtrlTc::SetGains {
            k_p: std::f64::NAN, k_i: 0.0, k_d: 0.0
        }));
        assert!(matches!(rsp, TcResponse::Invalid(_)));
        assert_eq!(ds.steer_ctrl.gains(), (0.5, 0.1, 0.0));

        assert_eq!(exec(&mut ds, &Tc::SteerCtrl(SteerCtrlTc::Reset)), TcResponse::Ok);
    }

    #[test]
    fn test_safe_tcs() {
        let mut ds = DataStore::default();

        assert_eq!(exec(&mut ds, &Tc::MakeSafe), TcResponse::Ok);
        assert!(ds.safe);
        assert_eq!(exec(&mut ds, &Tc::MakeUnsafe), TcResponse::Ok);
        assert!(!ds.safe);

        ds.make_safe(SafeModeCause::DriveError);
        assert!(matches!(exec(&mut ds, &Tc::MakeUnsafe), TcResponse::Invalid(_)));
        assert!(ds.safe);
    }
}
