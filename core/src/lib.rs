//! Core of a small notes application: an in-memory note tree, mirrored to a directory of
//! plain files and cached locally, with debounced content saves.
//!
//! *   [`store`] holds the tree and its mutations.
//! *   [`codec`] encodes the whole store and single notes.
//! *   [`storage`] mirrors the store to disk.
//! *   [`sync`] ties the tiers together in a [`sync::Session`].
//! *   [`interchange`] imports and exports folder trees and database files.
//! *   [`preview`] renders note text with its lightweight markup.

pub mod codec;
pub mod config;
pub mod interchange;
pub mod preview;
pub mod storage;
pub mod store;
pub mod sync;
