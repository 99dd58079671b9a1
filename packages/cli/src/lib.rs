//! # prefstore-cli
//!
//! Inspect and edit a preference file from the shell.
//!
//! ## Usage
//!
//! ```bash
//! # List everything in the default store of ~/.config/prefs
//! prefs list
//!
//! # Point at another application's store
//! prefs --dir ~/.config/my-app --name settings get theme
//! prefs --dir ~/.config/my-app set volume int 7
//! prefs --dir ~/.config/my-app set tags string_set a,b,c
//! prefs --dir ~/.config/my-app remove volume
//! ```

pub mod commands;

pub use commands::{execute, Command};
