//! Domain library for the Pine Ridge RV park and lodge website: page
//! content rows and their loader, admin drafts, image uploads and the
//! admin gate.

pub mod activity;
pub mod auth;
pub mod content;
pub mod draft;
pub mod events;
pub mod media;
pub mod pages;
pub mod store;
