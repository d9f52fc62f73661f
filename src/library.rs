//! Track descriptors and the ways a queue gets populated.
//!
//! The controller only needs a flat list of [`Track`]s. They come either
//! from scanning a local directory or from a TOML playlist manifest handed
//! over by whatever fetched the catalogue.

mod display;
mod manifest;
mod model;
mod scan;

pub use manifest::{ManifestError, load_manifest};
pub use model::*;
pub use scan::scan;

#[cfg(test)]
mod tests;
