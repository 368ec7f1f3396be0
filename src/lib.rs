// Emotion analyzer: keyword-filtered sentiment over Reddit hot listings.
//
// This is the library root. Each module corresponds to one stage of the
// fetch, filter, classify, present flow.

pub mod config;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod reddit;
pub mod sentiment;

#[cfg(feature = "web")]
pub mod web;
