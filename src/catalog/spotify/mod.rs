//! Spotify Web API integration
//!
//! Track search, track lookup by id/URL, album artwork and artist genres.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

mod adapter;
mod client;
pub mod dto;

pub use client::{SpotifyClient, parse_track_id};
