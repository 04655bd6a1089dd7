//! Extractive question answering over converted transformer models.
//!
//! Layers, outermost first:
//!   - [`cli`]: argument parsing and printing
//!   - [`application`]: the request/response [`QaPipeline`](application::ask_use_case::QaPipeline)
//!     and the interactive session
//!   - [`domain`]: typed records, errors and collaborator traits
//!   - [`data`]: context loading and model input windows
//!   - [`ml`]: answer-window scorer, post-processing, burn model
//!   - [`infra`]: checkpoints, tokenizers, label files

#![recursion_limit = "256"]

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;
