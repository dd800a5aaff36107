// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! File name helpers for the save dialogs.

use std::path::PathBuf;

const FALLBACK_STEM: &str = "points";
const RESERVED_STEMS: [&str; 4] = ["con", "prn", "aux", "nul"];

/// Turn a point label into a lowercase, filesystem-safe file stem.
///
/// Unicode is transliterated with `deunicode` ("Kőszeg" → "koszeg"), anything
/// other than ASCII alphanumerics and `-` becomes `_`, runs of `_` collapse.
pub fn sanitize_stem(value: &str) -> String {
    let transliterated = deunicode::deunicode(value);
    let mut out = String::with_capacity(transliterated.len());

    for ch in transliterated.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || ch == '-' {
            ch.to_ascii_lowercase()
        } else {
            '_'
        };
        if mapped == '_' && (out.is_empty() || out.ends_with('_')) {
            continue;
        }
        out.push(mapped);
    }
    while out.ends_with('_') {
        out.pop();
    }

    let is_reserved = RESERVED_STEMS.contains(&out.as_str())
        || ((out.starts_with("com") || out.starts_with("lpt"))
            && out.len() == 4
            && out.ends_with(|c: char| c.is_ascii_digit()));
    if is_reserved {
        out.push('_');
    }
    if out.is_empty() {
        return FALLBACK_STEM.to_string();
    }
    out
}

/// Suggest a KML file name from the label of the first point.
pub fn suggested_kml_name(label: Option<&str>) -> String {
    format!("{}.kml", sanitize_stem(label.unwrap_or(FALLBACK_STEM)))
}

/// Force a specific extension onto a path when it is missing or different.
///
/// Keeps existing matching extension (case-insensitive); otherwise replaces it.
pub fn ensure_extension(mut path: PathBuf, extension: &str) -> PathBuf {
    let replace = !matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case(extension)
    );

    if replace {
        path.set_extension(extension);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_stem_transliterates_hungarian_accents() {
        assert_eq!(sanitize_stem("Kőszeg vár (északi kapu)"), "koszeg_var_eszaki_kapu");
    }

    #[test]
    fn sanitize_stem_collapses_separators() {
        assert_eq!(sanitize_stem("  Point / 12 .. b "), "point_12_b");
    }

    #[test]
    fn sanitize_stem_guards_reserved_and_empty_names() {
        assert_eq!(sanitize_stem("CON"), "con_");
        assert_eq!(sanitize_stem("com1"), "com1_");
        assert_eq!(sanitize_stem("..."), "points");
    }

    #[test]
    fn suggested_name_falls_back_without_label() {
        assert_eq!(suggested_kml_name(None), "points.kml");
        assert_eq!(suggested_kml_name(Some("Parlament")), "parlament.kml");
    }

    // Should leave an existing matching extension untouched, ignoring case.
    #[test]
    fn ensure_extension_preserves_matching_extension_case_insensitive() {
        let path = PathBuf::from("/tmp/points.KML");
        let result = ensure_extension(path.clone(), "kml");

        assert_eq!(result, path);
    }

    // Should replace an unmatched extension with the requested one.
    #[test]
    fn ensure_extension_replaces_when_different() {
        let result = ensure_extension(PathBuf::from("points.txt"), "kml");

        assert_eq!(result.extension().and_then(|e| e.to_str()), Some("kml"));
    }
}
