//! Game implementations.

pub mod cardtoe;
