pub mod calibration;
pub mod label;
pub mod measurement;
pub mod spectral;
pub mod surface;
