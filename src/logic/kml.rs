// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! KML import/export of map points.
//!
//! Only point placemarks are read: `<name>` becomes the label, `<description>`
//! the note and `<Point><coordinates>` (`lon,lat[,alt]`) the position. Other
//! geometries are skipped. Saving writes a KML 2.2 document atomically.

use std::fs;
use std::io;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::errors::GeoError;
use crate::models::coords::CoordinatePair;
use crate::models::map_point::MapPoint;
use crate::utils::write_atomic;

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const DOCUMENT_NAME: &str = "EOV-WGS points";
const DOCUMENT_DESCRIPTION: &str = "Points exported from eovmap";

/// Read every point placemark of a KML file, in document order.
///
/// # Errors
///
/// [`GeoError::FileNotFound`] when the file is missing, [`GeoError::Format`]
/// when it is not a well-formed KML document with at least one valid point.
pub fn load(path: &Path) -> Result<Vec<MapPoint>, GeoError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(GeoError::FileNotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    let points = parse(&text)?;
    tracing::info!(path = %path.display(), points = points.len(), "KML loaded");
    Ok(points)
}

/// Write `points` as a KML document, replacing `path` in one step.
///
/// # Errors
///
/// Returns [`GeoError::Format`] for an empty point list, which could not be
/// loaded again, and [`GeoError::Io`] when the file cannot be written; the
/// previous content of `path` is then left untouched.
pub fn save(path: &Path, points: &[MapPoint]) -> Result<(), GeoError> {
    if points.is_empty() {
        return Err(GeoError::Format("no points to save".into()));
    }
    let bytes = to_kml(points)?;
    write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), points = points.len(), "KML saved");
    Ok(())
}

/// Placemark fields collected while its element is open.
#[derive(Default)]
struct PlacemarkDraft {
    name: Option<String>,
    description: Option<String>,
    coordinates: Option<String>,
    /// `<Point>` elements seen; only the first one's coordinates are kept.
    point_count: usize,
}

/// Parse KML text into map points.
pub fn parse(text: &str) -> Result<Vec<MapPoint>, GeoError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut draft: Option<PlacemarkDraft> = None;
    let mut placemarks = 0usize;
    let mut points = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(GeoError::Format(format!(
                    "malformed XML near byte {}: {}",
                    reader.buffer_position(),
                    err
                )));
            }
        };

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if open.is_empty() {
                    check_root(&name)?;
                }
                match name.as_slice() {
                    b"Placemark" => draft = Some(PlacemarkDraft::default()),
                    b"Point" => {
                        if let Some(d) = draft.as_mut() {
                            d.point_count += 1;
                        }
                    }
                    _ => {}
                }
                open.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if open.is_empty() {
                    check_root(name.as_ref())?;
                }
                if name.as_ref() == b"Placemark" {
                    placemarks += 1;
                    tracing::warn!(placemark = placemarks, "skipping empty placemark");
                }
            }
            Event::Text(t) => {
                let value = t
                    .unescape()
                    .map_err(|err| GeoError::Format(format!("bad text content: {err}")))?;
                collect_text(&open, draft.as_mut(), &value);
            }
            Event::CData(c) => {
                let value = String::from_utf8_lossy(&c).into_owned();
                collect_text(&open, draft.as_mut(), &value);
            }
            Event::End(_) => {
                if open.pop().as_deref() == Some(b"Placemark".as_slice()) {
                    placemarks += 1;
                    if let Some(finished) = draft.take()
                        && let Some(point) = finish_placemark(finished, placemarks)?
                    {
                        points.push(point);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(GeoError::Format(format!(
            "document ends inside <{}>",
            String::from_utf8_lossy(unclosed)
        )));
    }
    if points.is_empty() {
        return Err(GeoError::Format("no point placemarks found".into()));
    }
    Ok(points)
}

fn check_root(name: &[u8]) -> Result<(), GeoError> {
    if name == b"kml" {
        Ok(())
    } else {
        Err(GeoError::Format(format!(
            "root element is <{}>, expected <kml>",
            String::from_utf8_lossy(name)
        )))
    }
}

/// Route text to the placemark field owning the innermost open element.
fn collect_text(open: &[Vec<u8>], draft: Option<&mut PlacemarkDraft>, value: &str) {
    let Some(draft) = draft else {
        return;
    };
    let [.., parent, current] = open else {
        return;
    };
    let slot = match (parent.as_slice(), current.as_slice()) {
        (b"Placemark", b"name") => &mut draft.name,
        (b"Placemark", b"description") => &mut draft.description,
        (b"Point", b"coordinates") if draft.point_count == 1 => &mut draft.coordinates,
        _ => return,
    };
    slot.get_or_insert_with(String::new).push_str(value);
}

fn finish_placemark(draft: PlacemarkDraft, index: usize) -> Result<Option<MapPoint>, GeoError> {
    let coordinates = match (draft.point_count, draft.coordinates) {
        (count, Some(coordinates)) if count > 0 => coordinates,
        _ => {
            tracing::warn!(placemark = index, "skipping placemark without a point");
            return Ok(None);
        }
    };

    let position = parse_coordinates(&coordinates)
        .map_err(|msg| GeoError::Format(format!("placemark {index}: {msg}")))?;
    let point = MapPoint::new(position, draft.name)
        .map_err(|err| GeoError::Format(format!("placemark {index}: {err}")))?
        .with_note(draft.description);
    Ok(Some(point))
}

/// Parse the first `lon,lat[,alt]` tuple of a `<coordinates>` value.
///
/// Whitespace around the commas of a tuple is tolerated.
fn parse_coordinates(text: &str) -> Result<CoordinatePair, String> {
    let joined = text.split(',').map(str::trim).collect::<Vec<_>>().join(",");
    let tuple = joined
        .split_whitespace()
        .next()
        .ok_or_else(|| "empty coordinates".to_string())?;
    let mut parts = tuple.split(',');
    let (Some(lon), Some(lat)) = (parts.next(), parts.next()) else {
        return Err(format!("coordinates '{tuple}' are not lon,lat[,alt]"));
    };
    if parts.count() > 1 {
        return Err(format!("coordinates '{tuple}' are not lon,lat[,alt]"));
    }
    let number = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("'{s}' is not a number"))
    };
    Ok(CoordinatePair::wgs84(number(lat)?, number(lon)?))
}

fn to_kml(points: &[MapPoint]) -> Result<Vec<u8>, GeoError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("kml");
    root.push_attribute(("xmlns", KML_NAMESPACE));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("Document")))?;
    write_text_element(&mut writer, "name", DOCUMENT_NAME)?;
    write_text_element(&mut writer, "description", DOCUMENT_DESCRIPTION)?;

    for (index, point) in points.iter().enumerate() {
        writer.write_event(Event::Start(BytesStart::new("Placemark")))?;
        write_text_element(&mut writer, "name", &point.display_name(index))?;
        if let Some(note) = &point.note {
            write_text_element(&mut writer, "description", note)?;
        }
        writer.write_event(Event::Start(BytesStart::new("Point")))?;
        write_text_element(
            &mut writer,
            "coordinates",
            &format!("{},{},0", point.longitude(), point.latitude()),
        )?;
        writer.write_event(Event::End(BytesEnd::new("Point")))?;
        writer.write_event(Event::End(BytesEnd::new("Placemark")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Document")))?;
    writer.write_event(Event::End(BytesEnd::new("kml")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), GeoError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn point(lat: f64, lon: f64, label: Option<&str>) -> MapPoint {
        MapPoint::new(CoordinatePair::wgs84(lat, lon), label.map(String::from)).unwrap()
    }

    fn format_error(result: Result<Vec<MapPoint>, GeoError>) -> String {
        match result {
            Err(GeoError::Format(msg)) => msg,
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn save_then_load_keeps_points_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("points.kml");
        let points = vec![
            point(47.476948765, 19.047445252, Some("Gellért <hegy> & co")),
            point(46.2530, 20.1414, None).with_note(Some("EOV Y: 734354.19\nEOV X: 101529.87".into())),
            point(48.1031, 20.7784, Some("Miskolc")),
        ];

        save(&path, &points).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.len(), 3);
        for (saved, read) in points.iter().zip(&loaded) {
            assert!((saved.latitude() - read.latitude()).abs() < 1e-9);
            assert!((saved.longitude() - read.longitude()).abs() < 1e-9);
        }
        assert_eq!(loaded[0].label.as_deref(), Some("Gellért <hegy> & co"));
        assert_eq!(loaded[1].label.as_deref(), Some("Point 2"));
        assert_eq!(
            loaded[1].note.as_deref(),
            Some("EOV Y: 734354.19\nEOV X: 101529.87")
        );
        assert_eq!(loaded[2].label.as_deref(), Some("Miskolc"));
    }

    #[test]
    fn saved_document_is_kml_22() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("one.kml");

        save(&path, &[point(47.4979, 19.0402, Some("Budapest"))]).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<kml xmlns=\"http://www.opengis.net/kml/2.2\">"));
        assert!(text.contains("<coordinates>19.0402,47.4979,0</coordinates>"));
        assert!(text.contains("<name>Budapest</name>"));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.kml");

        assert!(matches!(load(&path), Err(GeoError::FileNotFound(p)) if p == path));
    }

    #[test]
    fn parse_reads_prefixed_elements_and_altitude() {
        let text = r#"<?xml version="1.0"?>
<kml:kml xmlns:kml="http://www.opengis.net/kml/2.2">
  <kml:Document>
    <kml:Placemark>
      <kml:name>Tihany</kml:name>
      <kml:Point>
        <kml:coordinates>
          17.8894,46.9137,112.5
        </kml:coordinates>
      </kml:Point>
    </kml:Placemark>
  </kml:Document>
</kml:kml>"#;

        let points = parse(text).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label.as_deref(), Some("Tihany"));
        assert_eq!(points[0].latitude(), 46.9137);
        assert_eq!(points[0].longitude(), 17.8894);
    }

    #[test]
    fn parse_skips_non_point_placemarks() {
        let text = r#"<kml><Document>
  <name>Mixed</name>
  <Placemark><name>Road</name><LineString><coordinates>19,47 19.1,47.1</coordinates></LineString></Placemark>
  <Placemark><name>Stop</name><description><![CDATA[<b>bus</b>]]></description><Point><coordinates>19.05,47.5</coordinates></Point></Placemark>
  <Placemark/>
</Document></kml>"#;

        let points = parse(text).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label.as_deref(), Some("Stop"));
        assert_eq!(points[0].note.as_deref(), Some("<b>bus</b>"));
    }

    #[test]
    fn parse_rejects_malformed_documents() {
        format_error(parse("not xml at all <"));
        format_error(parse("<kml><Document></kml>"));
        format_error(parse("<kml><Document><Placemark>"));

        let msg = format_error(parse("<gpx><wpt/></gpx>"));
        assert!(msg.contains("expected <kml>"));

        let msg = format_error(parse("<kml><Document/></kml>"));
        assert_eq!(msg, "no point placemarks found");
    }

    #[test]
    fn parse_rejects_bad_coordinates() {
        let bad_number = "<kml><Placemark><Point><coordinates>abc,47</coordinates></Point></Placemark></kml>";
        assert!(format_error(parse(bad_number)).contains("'abc' is not a number"));

        let out_of_range = "<kml><Placemark><Point><coordinates>19,95</coordinates></Point></Placemark></kml>";
        assert!(format_error(parse(out_of_range)).starts_with("placemark 1"));

        let single = "<kml><Placemark><Point><coordinates>19</coordinates></Point></Placemark></kml>";
        assert!(format_error(parse(single)).contains("not lon,lat"));
    }

    #[test]
    fn parse_takes_first_point_of_multi_geometry() {
        let text = r#"<kml><Document>
  <Placemark><name>A</name><Point><coordinates>19.5,47.25</coordinates></Point></Placemark>
  <Placemark>
    <name>Multi</name>
    <MultiGeometry>
      <Point><coordinates>19.0,47.0</coordinates></Point>
      <Point><coordinates>20.0,48.0</coordinates></Point>
    </MultiGeometry>
  </Placemark>
</Document></kml>"#;

        let points = parse(text).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[1].label.as_deref(), Some("Multi"));
        assert_eq!(points[1].latitude(), 47.0);
        assert_eq!(points[1].longitude(), 19.0);
    }

    #[test]
    fn parse_tolerates_spaces_inside_a_tuple() {
        let text = "<kml><Placemark><Point><coordinates>19.04, 47.49 ,0 19.1,47.1</coordinates></Point></Placemark></kml>";

        let points = parse(text).unwrap();

        assert_eq!(points[0].latitude(), 47.49);
        assert_eq!(points[0].longitude(), 19.04);
    }

    #[test]
    fn save_rejects_empty_point_list() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.kml");

        assert!(matches!(save(&path, &[]), Err(GeoError::Format(_))));
        assert!(!path.exists());
    }

    #[test]
    fn save_into_directory_path_is_io_error() {
        let tmp = TempDir::new().unwrap();

        let result = save(tmp.path(), &[point(47.5, 19.0, None)]);

        assert!(matches!(result, Err(GeoError::Io(_))));
    }
}
