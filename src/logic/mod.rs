// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Coordinate math, map rendering and KML exchange (UI-agnostic).

pub mod datum;
pub mod kml;
pub mod map;
pub mod projection;
