//! Pipeline for spectroradiometer grid surveys: file classification and
//! organization, PFD/PPFD extraction with optional coordinate calibration,
//! scattered-surface interpolation and spectral curve analysis.

pub mod analysis;
pub mod calibration;
pub mod classifier;
pub mod error;
pub mod export;
pub mod extraction;
pub mod organizer;
pub mod spectral;
pub mod surface;
pub mod worker;

pub use error::LuxmapError;
