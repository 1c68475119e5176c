#![allow(unused_imports)]

//! Database models split into separate files.
//! This module re-exports individual model modules so imports like
//! `use crate::db::models::*;` work across the crate.

pub mod comment;
pub mod share;
pub mod task;
pub mod user;

// Re-export all types at the `crate::db::models` namespace.
pub use self::comment::*;
pub use self::share::*;
pub use self::task::*;
pub use self::user::*;
