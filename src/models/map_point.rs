// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Map marker domain model (UI-agnostic).

use crate::errors::GeoError;
use crate::models::coords::{CoordinatePair, CoordinateSystem};

/// A WGS'84 position with an optional label, placed as one map marker.
#[derive(Clone, Debug, PartialEq)]
pub struct MapPoint {
    pub position: CoordinatePair,
    pub label: Option<String>,
    /// Free text shown in the popup and stored as the KML description.
    pub note: Option<String>,
}

impl MapPoint {
    /// Create a point from a WGS'84 pair; blank labels are dropped.
    ///
    /// # Errors
    ///
    /// Fails when the pair is not WGS'84 or lies outside the WGS'84 domain.
    pub fn new(position: CoordinatePair, label: Option<String>) -> Result<Self, GeoError> {
        position.expect_system(CoordinateSystem::Wgs84)?;
        position.validate()?;
        Ok(Self {
            position,
            label: normalize_text(label),
            note: None,
        })
    }

    /// Attach a popup/description note; blank notes are dropped.
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = normalize_text(note);
        self
    }

    pub fn latitude(&self) -> f64 {
        self.position.latitude()
    }

    pub fn longitude(&self) -> f64 {
        self.position.longitude()
    }

    /// Label or a positional fallback such as `Point 3`.
    pub fn display_name(&self, index: usize) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("Point {}", index + 1))
    }
}

fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
