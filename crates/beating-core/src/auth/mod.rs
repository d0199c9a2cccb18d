//! Authentication core: credential codec, session lifecycle, deferred actions.
//!
//! `session` and `pending` are independent singletons over the same
//! [`crate::storage::StateStore`]; `flow` composes them for the views.

pub mod flow;
pub mod pending;
pub mod session;
pub mod token;
