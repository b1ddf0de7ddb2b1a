//! Integrations that rely on third-party capabilities.
//!
//! Groups adapters that bridge the solvers with external libraries the crate
//! does not implement itself, such as barcode decoding.

pub mod barcode;

pub use barcode::{BarcodeDecoder, DecodeError, RqrrBarcodeDecoder};
