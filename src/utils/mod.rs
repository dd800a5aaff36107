// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by UI and business logic.

pub mod file_names;
pub mod fs;

/// Force an extension onto a user-chosen path.
pub use file_names::ensure_extension;
/// Suggest a KML file name for the save dialog.
pub use file_names::suggested_kml_name;
/// Replace a file in one step.
pub use fs::write_atomic;
