//! Contracts for whatever draws the overlay, plus backdrop handling.

pub mod capture;
pub mod overlay;
