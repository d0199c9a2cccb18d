//! Core Beating client library (session lifecycle, deferred actions, API client).

pub mod api;
pub mod auth;
pub mod config;
pub mod storage;
