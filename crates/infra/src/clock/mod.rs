//! School time service
//!
//! The engine never trusts the device clock. Readings come from the backend
//! time service and are extrapolated between samples from a monotonic
//! reference, so a rewound device clock cannot move the school day.

pub mod remote;

pub use remote::RemoteClockService;
