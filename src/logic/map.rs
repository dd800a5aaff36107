// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Map document rendering.
//!
//! Responsibilities:
//! - Render a self-contained Leaflet page centered on a point with its markers.
//! - Keep user text (labels, notes) escaped so it cannot break out of the page.
//! - Build external map links for a point.

use serde::Serialize;
use url::Url;

use crate::config::MapSettings;
use crate::errors::GeoError;
use crate::models::coords::{CoordinatePair, CoordinateSystem};
use crate::models::map_point::MapPoint;

/// Highest zoom level the tile layers serve.
pub const MAX_ZOOM: u8 = 19;

const GOOGLE_MAPS_BASE: &str = "https://www.google.hu/maps/";
const GOOGLE_MAPS_ZOOM: &str = "18";

/// Rendered map artifact. A new document is produced for every view.
#[derive(Clone, Debug, PartialEq)]
pub struct MapDocument {
    html: String,
    center: CoordinatePair,
    zoom: u8,
    marker_count: usize,
}

impl MapDocument {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn center(&self) -> CoordinatePair {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn marker_count(&self) -> usize {
        self.marker_count
    }
}

/// Produces map documents for WGS'84 points.
pub trait MapRenderer {
    /// Render `markers` on a map centered on `center`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Render`] when the center or a marker is not a valid
    /// WGS'84 position or the zoom is out of range.
    fn render_markers(
        &self,
        center: &CoordinatePair,
        markers: &[MapPoint],
        zoom: u8,
    ) -> Result<MapDocument, GeoError>;

    /// Render a map centered on `point` with a single marker.
    fn render(&self, point: &MapPoint, zoom: u8) -> Result<MapDocument, GeoError> {
        self.render_markers(&point.position, std::slice::from_ref(point), zoom)
    }

    /// Render the map around `center` without markers.
    fn render_base(&self, center: &CoordinatePair, zoom: u8) -> Result<MapDocument, GeoError> {
        self.render_markers(center, &[], zoom)
    }
}

/// Renders Leaflet HTML pages backed by a configurable tile layer.
#[derive(Clone, Debug)]
pub struct LeafletRenderer {
    tile_url: String,
    attribution: String,
    layer_name: String,
    /// Decimals of the coordinates shown in tooltips and click popups.
    decimals: usize,
    click_for_marker: bool,
}

impl Default for LeafletRenderer {
    fn default() -> Self {
        Self::new(&MapSettings::default())
    }
}

impl LeafletRenderer {
    pub fn new(settings: &MapSettings) -> Self {
        Self {
            tile_url: settings.tile_url.clone(),
            attribution: settings.attribution.clone(),
            layer_name: settings.layer_name.clone(),
            decimals: 5,
            click_for_marker: true,
        }
    }

    fn marker_data(&self, point: &MapPoint) -> MarkerData {
        let lat = format!("{:.*}", self.decimals, point.latitude());
        let lon = format!("{:.*}", self.decimals, point.longitude());
        let label = point.label.as_deref().map(ammonia::clean_text);
        let note = point
            .note
            .as_deref()
            .map(|n| n.lines().map(ammonia::clean_text).collect::<Vec<_>>().join("<br>"));

        let tooltip = match &label {
            Some(label) => format!("{label}<br>{lat}, {lon}"),
            None => format!("{lat}, {lon}"),
        };
        let popup = match (&label, &note) {
            (Some(label), Some(note)) => format!("<b>{label}</b><br>{note}"),
            (Some(label), None) => format!("<b>{label}</b><br>Latitude: {lat}<br>Longitude: {lon}"),
            (None, Some(note)) => format!("<b>{note}</b>"),
            (None, None) => format!("Latitude: {lat}<br>Longitude: {lon}"),
        };

        MarkerData {
            lat: point.latitude(),
            lon: point.longitude(),
            tooltip,
            popup,
            label,
        }
    }
}

impl MapRenderer for LeafletRenderer {
    fn render_markers(
        &self,
        center: &CoordinatePair,
        markers: &[MapPoint],
        zoom: u8,
    ) -> Result<MapDocument, GeoError> {
        if zoom > MAX_ZOOM {
            return Err(GeoError::Render(format!(
                "zoom level {zoom} is outside 0..={MAX_ZOOM}"
            )));
        }
        check_position("map center", center)?;
        for (index, marker) in markers.iter().enumerate() {
            check_position(&format!("marker {}", index + 1), &marker.position)?;
        }

        let view = ViewData {
            center: [center.latitude(), center.longitude()],
            zoom,
            tiles: TileData {
                url: &self.tile_url,
                attribution: &self.attribution,
                max_zoom: MAX_ZOOM,
            },
            markers: markers.iter().map(|m| self.marker_data(m)).collect(),
            click_for_marker: self.click_for_marker,
            decimals: self.decimals,
        };
        let view_json = serde_json::to_string(&view)
            .map_err(|err| GeoError::Render(format!("failed to encode map view: {err}")))?
            // A literal `</` inside the script block would end it early.
            .replace("</", "<\\/");

        let html = LEAFLET_TEMPLATE
            .replace("{{TITLE}}", &ammonia::clean_text(&self.layer_name))
            .replace("{{VIEW_JSON}}", &view_json);

        tracing::debug!(
            latitude = center.latitude(),
            longitude = center.longitude(),
            zoom,
            markers = markers.len(),
            "map rendered"
        );

        Ok(MapDocument {
            html,
            center: *center,
            zoom,
            marker_count: markers.len(),
        })
    }
}

fn check_position(what: &str, pair: &CoordinatePair) -> Result<(), GeoError> {
    pair.expect_system(CoordinateSystem::Wgs84)
        .and_then(|_| pair.validate())
        .map_err(|err| GeoError::Render(format!("{what}: {err}")))
}

/// Satellite Google Maps link for a point, labeled when the point has a label.
pub fn google_maps_url(point: &MapPoint) -> Result<String, GeoError> {
    let query = match &point.label {
        Some(label) => format!("{}@{},{}", label, point.latitude(), point.longitude()),
        None => format!("loc:{},{}", point.latitude(), point.longitude()),
    };
    let url = Url::parse_with_params(
        GOOGLE_MAPS_BASE,
        &[
            ("q", query.as_str()),
            ("t", "k"),
            ("hl", "hu"),
            ("z", GOOGLE_MAPS_ZOOM),
        ],
    )
    .map_err(|err| GeoError::Render(format!("failed to build map link: {err}")))?;
    Ok(url.into())
}

#[derive(Serialize)]
struct ViewData<'a> {
    center: [f64; 2],
    zoom: u8,
    tiles: TileData<'a>,
    markers: Vec<MarkerData>,
    click_for_marker: bool,
    decimals: usize,
}

#[derive(Serialize)]
struct TileData<'a> {
    url: &'a str,
    attribution: &'a str,
    max_zoom: u8,
}

#[derive(Serialize)]
struct MarkerData {
    lat: f64,
    lon: f64,
    tooltip: String,
    popup: String,
    label: Option<String>,
}

const LEAFLET_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" crossorigin="" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js" crossorigin=""></script>
  <style>
    html, body, #map { height: 100%; width: 100%; margin: 0; padding: 0; }
    .point-label div {
      font-size: 12pt;
      color: black;
      background-color: white;
      padding: 2px;
      border: 1px solid black;
      border-radius: 3px;
      white-space: nowrap;
    }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const view = {{VIEW_JSON}};
    const map = L.map("map").setView(view.center, view.zoom);
    L.tileLayer(view.tiles.url, {
      attribution: view.tiles.attribution,
      maxZoom: view.tiles.max_zoom,
    }).addTo(map);

    for (const m of view.markers) {
      L.marker([m.lat, m.lon]).bindTooltip(m.tooltip).bindPopup(m.popup).addTo(map);
      if (m.label) {
        L.marker([m.lat, m.lon], {
          interactive: false,
          icon: L.divIcon({
            className: "point-label",
            html: "<div>" + m.label + "</div>",
            iconSize: [100, 20],
            iconAnchor: [50, -30],
          }),
        }).addTo(map);
      }
    }

    if (view.click_for_marker) {
      map.on("click", (e) => {
        const lat = e.latlng.lat.toFixed(view.decimals);
        const lng = e.latlng.lng.toFixed(view.decimals);
        L.marker(e.latlng)
          .bindPopup("Latitude: " + lat + "<br>Longitude: " + lng)
          .addTo(map)
          .openPopup();
      });
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64, label: Option<&str>) -> MapPoint {
        MapPoint::new(CoordinatePair::wgs84(lat, lon), label.map(String::from)).unwrap()
    }

    #[test]
    fn render_centers_single_marker() {
        let doc = LeafletRenderer::default()
            .render(&point(47.476948, 19.047452, None), 13)
            .unwrap();

        assert_eq!(doc.marker_count(), 1);
        assert_eq!(doc.zoom(), 13);
        assert_eq!(doc.center(), CoordinatePair::wgs84(47.476948, 19.047452));
        assert!(doc.html().contains("\"center\":[47.476948,19.047452]"));
        assert!(doc.html().contains("47.47695, 19.04745"));
        assert!(doc.html().contains("World_Imagery"));
    }

    #[test]
    fn render_markers_draws_every_point() {
        let points = vec![point(47.5, 19.0, Some("A")), point(46.25, 20.14, Some("B"))];
        let doc = LeafletRenderer::default()
            .render_markers(&points[0].position, &points, 10)
            .unwrap();

        assert_eq!(doc.marker_count(), 2);
        assert!(doc.html().contains("\"lat\":46.25"));
    }

    #[test]
    fn base_map_has_no_markers() {
        let doc = LeafletRenderer::default()
            .render_base(&CoordinatePair::wgs84(47.504105491592426, 19.046773410517797), 13)
            .unwrap();

        assert_eq!(doc.marker_count(), 0);
        assert!(doc.html().contains("\"markers\":[]"));
    }

    #[test]
    fn labels_cannot_break_out_of_the_script() {
        let doc = LeafletRenderer::default()
            .render(&point(47.5, 19.0, Some("</script><script>alert(1)")), 13)
            .unwrap();

        assert!(!doc.html().contains("<script>alert"));
        assert_eq!(doc.html().matches("</script>").count(), 2);
    }

    #[test]
    fn invalid_points_are_render_errors() {
        let renderer = LeafletRenderer::default();
        let nan = CoordinatePair::wgs84(f64::NAN, 19.0);

        assert!(matches!(
            renderer.render_base(&nan, 13),
            Err(GeoError::Render(_))
        ));
        assert!(matches!(
            renderer.render_base(&CoordinatePair::eov(650000.0, 240000.0), 13),
            Err(GeoError::Render(_))
        ));
        assert!(matches!(
            renderer.render(&point(47.5, 19.0, None), MAX_ZOOM + 1),
            Err(GeoError::Render(_))
        ));
    }

    #[test]
    fn google_link_uses_loc_query() {
        let url = google_maps_url(&point(47.5, 19.25, None)).unwrap();
        assert!(url.starts_with("https://www.google.hu/maps/?q=loc%3A47.5%2C19.25"));
        assert!(url.contains("t=k"));

        let named = google_maps_url(&point(47.5, 19.25, Some("Home"))).unwrap();
        assert!(named.contains("q=Home%4047.5%2C19.25"));
    }
}
