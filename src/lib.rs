//! Staff Performance Server Library
//!
//! This module exports the core components for testing and integration.

pub mod access;
pub mod actions;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod password;
pub mod performance;
pub mod types;
pub mod web;
