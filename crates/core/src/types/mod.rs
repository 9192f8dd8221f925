//! Core types for the pantry service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod item_name;
pub mod pantry;
pub mod recipe;
pub mod user;

pub use id::*;
pub use item_name::{ItemName, ItemNameError};
pub use pantry::{NewPantryItem, PantryItem};
pub use recipe::{RecipeSuggestion, VideoMatch};
pub use user::{UserId, UserIdError};
