//! Domain models for the menu service.

pub mod menu;

pub use menu::MenuRequest;
