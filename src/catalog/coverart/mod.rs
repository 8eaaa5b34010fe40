//! Cover Art Archive integration
//!
//! Provides album artwork for MusicBrainz releases.

mod client;

pub use client::{CoverArtClient, CoverSize};
