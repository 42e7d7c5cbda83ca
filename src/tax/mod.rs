//! Statutory tax calculations

pub mod gst;

pub use gst::*;
