// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring the form, the displayed points and map commands.
//!
//! Every user action is computed against a snapshot of the model first and only
//! committed when all steps (parse, convert, render) succeeded, so a failed action
//! leaves fields, points and the map untouched. The replaced state is kept until the
//! map page has been written and is put back if that fails.

use std::path::PathBuf;

use anyhow::Context;

use crate::config::{AppConfig, MarkerMode};
use crate::errors::GeoError;
use crate::logic::kml;
use crate::logic::map::{LeafletRenderer, MapDocument, MapRenderer, google_maps_url};
use crate::logic::projection::{EovProjection, Projection};
use crate::models::coords::{CoordinatePair, CoordinateSystem};
use crate::models::map_point::MapPoint;
use crate::ui::components::coordinate_form::{self, EntryMode, FormAction, FormModel, FormMsg};
use crate::ui::components::point_list::PointListMsg;
use crate::utils::{ensure_extension, write_atomic};

/// Top-level application state.
pub struct AppModel {
    /// Input fields of both conversion directions.
    pub form: FormModel,
    /// Points currently drawn on the map.
    pub points: Vec<MapPoint>,
    /// Index into `points` of the point the form reflects.
    pub active: Option<usize>,
    /// Latest rendered map.
    pub document: Option<MapDocument>,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to display in modal.
    pub error: Option<String>,
    pub config: AppConfig,
    projection: Box<dyn Projection>,
    renderer: Box<dyn MapRenderer>,
    /// State replaced by the last view change, restored if its map cannot be shown.
    restore: Option<Snapshot>,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppModel {
    /// Model with the EOV projection and the Leaflet renderer configured from `config`.
    pub fn new(config: AppConfig) -> Self {
        let renderer = LeafletRenderer::new(&config.map);
        Self::with_engines(config, Box::new(EovProjection::default()), Box::new(renderer))
    }

    /// Model with explicit conversion and rendering engines; the base map is rendered immediately.
    pub fn with_engines(
        config: AppConfig,
        projection: Box<dyn Projection>,
        renderer: Box<dyn MapRenderer>,
    ) -> Self {
        let [lat, lon] = config.map.default_center;
        let (document, error) =
            match renderer.render_base(&CoordinatePair::wgs84(lat, lon), config.map.zoom) {
                Ok(document) => (Some(document), None),
                Err(err) => {
                    tracing::warn!("initial map not rendered: {err}");
                    (None, Some(err.to_string()))
                }
            };

        Self {
            form: FormModel::default(),
            points: Vec::new(),
            active: None,
            document,
            status: None,
            error,
            config,
            projection,
            renderer,
            restore: None,
        }
    }

    /// Active point, if any.
    pub fn active_point(&self) -> Option<&MapPoint> {
        self.active.and_then(|index| self.points.get(index))
    }
}

/// Application messages routed through the update function.
#[derive(Debug)]
pub enum Msg {
    Form(FormMsg),
    Points(PointListMsg),
    OpenKmlRequested(PathBuf),
    SaveKmlRequested(PathBuf),
    KmlDialogCancelled,
    KmlLoaded {
        path: PathBuf,
        result: Result<Vec<MapPoint>, String>,
    },
    /// Saved path and number of points written.
    KmlSaved(Result<(PathBuf, usize), String>),
    /// Open the current map in the browser again.
    ShowMapRequested,
    MapShown(Result<PathBuf, String>),
    UrlOpened(Result<String, String>),
    DismissError,
}

/// Commands represent side-effects executed between frames.
#[derive(Debug)]
pub enum Command {
    /// Write the map page to `target`, then open it when `launch` is set.
    ShowMap {
        document: MapDocument,
        target: PathBuf,
        launch: bool,
    },
    OpenUrl(String),
    LoadKml(PathBuf),
    SaveKml {
        path: PathBuf,
        points: Vec<MapPoint>,
    },
}

/// Fully computed result of a view-changing action, applied in one step.
struct ViewChange {
    form: FormModel,
    points: Vec<MapPoint>,
    active: usize,
    document: MapDocument,
    status: String,
}

/// Displayed state saved before a view change.
struct Snapshot {
    form: FormModel,
    points: Vec<MapPoint>,
    active: Option<usize>,
    document: Option<MapDocument>,
    status: Option<String>,
}

impl Snapshot {
    fn take(model: &AppModel) -> Self {
        Self {
            form: model.form.clone(),
            points: model.points.clone(),
            active: model.active,
            document: model.document.clone(),
            status: model.status.clone(),
        }
    }

    fn apply(self, model: &mut AppModel) {
        model.form = self.form;
        model.points = self.points;
        model.active = self.active;
        model.document = self.document;
        model.status = self.status;
    }
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::Form(m) => {
            if let Some(action) = coordinate_form::update(&mut model.form, m) {
                handle_form_action(model, action, cmds);
            }
        }
        Msg::Points(PointListMsg::Select(index)) => {
            if index >= model.points.len() {
                return;
            }
            let points = model.points.clone();
            match plan_selection(model, points, index) {
                Ok(change) => commit(model, change, false, cmds),
                Err(err) => surface_event(model, err.to_string(), true),
            }
        }
        Msg::Points(PointListMsg::Clear) => clear_points(model, cmds),
        Msg::OpenKmlRequested(path) => {
            model.status = Some(format!("Loading {}…", path.display()));
            cmds.push(Command::LoadKml(path));
        }
        Msg::SaveKmlRequested(path) => {
            if model.points.is_empty() {
                surface_event(model, "There are no points to save.".into(), true);
                return;
            }
            cmds.push(Command::SaveKml {
                path: ensure_extension(path, "kml"),
                points: model.points.clone(),
            });
        }
        Msg::KmlDialogCancelled => {
            model.status = Some("KML dialog cancelled.".into());
        }
        Msg::KmlLoaded { path, result } => match result {
            Ok(points) if points.is_empty() => surface_event(
                model,
                format!("{} contains no points.", path.display()),
                true,
            ),
            Ok(points) => {
                let count = points.len();
                match plan_selection(model, points, 0) {
                    Ok(mut change) => {
                        change.status = format!(
                            "Loaded {count} point(s) from {}. {}",
                            path.display(),
                            change.status
                        );
                        let launch = model.config.preview.open_browser;
                        commit(model, change, launch, cmds);
                    }
                    Err(err) => surface_event(model, err.to_string(), true),
                }
            }
            Err(err) => surface_event(model, format!("Failed to load KML: {err}"), true),
        },
        Msg::KmlSaved(result) => match result {
            Ok((path, count)) => surface_event(
                model,
                format!("Saved {count} point(s) to {}", path.display()),
                false,
            ),
            Err(err) => surface_event(model, format!("Failed to save KML: {err}"), true),
        },
        Msg::ShowMapRequested => match model.document.clone() {
            Some(document) => {
                model.restore = None;
                cmds.push(Command::ShowMap {
                    document,
                    target: model.config.preview.path.clone(),
                    launch: true,
                });
            }
            None => surface_event(model, "No map has been rendered yet.".into(), true),
        },
        Msg::MapShown(result) => match result {
            Ok(path) => {
                model.restore = None;
                tracing::info!(path = %path.display(), "map preview written");
            }
            Err(err) => {
                // The view change is only kept once its map is on screen.
                if let Some(previous) = model.restore.take() {
                    previous.apply(model);
                }
                surface_event(model, err, true);
            }
        },
        Msg::UrlOpened(result) => match result {
            Ok(url) => tracing::info!(%url, "opened external map"),
            Err(err) => surface_event(model, err, true),
        },
        Msg::DismissError => model.error = None,
    }
}

/// Execute a command and return the resulting message.
pub fn run_command(cmd: Command) -> Msg {
    match cmd {
        Command::ShowMap {
            document,
            target,
            launch,
        } => Msg::MapShown(show_map(&document, target, launch).map_err(|err| format!("{err:#}"))),
        Command::OpenUrl(url) => Msg::UrlOpened(
            open::that(&url)
                .map(|()| url)
                .map_err(|err| format!("Failed to open browser: {err}")),
        ),
        Command::LoadKml(path) => {
            let result = kml::load(&path).map_err(|err| err.to_string());
            Msg::KmlLoaded { path, result }
        }
        Command::SaveKml { path, points } => Msg::KmlSaved(
            kml::save(&path, &points)
                .map(|()| (path, points.len()))
                .map_err(|err| err.to_string()),
        ),
    }
}

fn show_map(document: &MapDocument, target: PathBuf, launch: bool) -> anyhow::Result<PathBuf> {
    write_atomic(&target, document.html().as_bytes())
        .with_context(|| format!("Failed to write map page {:?}", target))?;
    if launch {
        open::that(&target).with_context(|| format!("Failed to open map page {:?}", target))?;
    }
    Ok(target)
}

/// Update status and, for errors, the modal message.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        tracing::warn!("{message}");
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}

fn handle_form_action(model: &mut AppModel, action: FormAction, cmds: &mut Vec<Command>) {
    let planned = match action {
        FormAction::ConvertEov => plan_eov_conversion(model),
        FormAction::ConvertWgs => plan_wgs_conversion(model),
        FormAction::OpenGoogleMaps => {
            match plan_google_maps(model) {
                Ok((form, url)) => {
                    model.form = form;
                    model.status = Some(format!("Opening {url}"));
                    cmds.push(Command::OpenUrl(url));
                }
                Err(err) => surface_event(model, err.to_string(), true),
            }
            return;
        }
    };

    match planned {
        Ok(change) => {
            let launch = model.config.preview.open_browser;
            commit(model, change, launch, cmds);
        }
        Err(err) => surface_event(model, err.to_string(), true),
    }
}

fn commit(model: &mut AppModel, change: ViewChange, launch: bool, cmds: &mut Vec<Command>) {
    model.restore = Some(Snapshot::take(model));
    model.form = change.form;
    model.points = change.points;
    model.active = Some(change.active);
    model.error = None;
    model.status = Some(change.status);
    cmds.push(Command::ShowMap {
        document: change.document.clone(),
        target: model.config.preview.path.clone(),
        launch,
    });
    model.document = Some(change.document);
}

fn plan_eov_conversion(model: &AppModel) -> Result<ViewChange, GeoError> {
    let eov = CoordinatePair::parse(
        CoordinateSystem::Eov,
        &model.form.eov_easting,
        &model.form.eov_northing,
    )?;
    let wgs = model.projection.to_wgs84(&eov)?;

    let mut form = model.form.clone();
    form.set_wgs(&wgs, model.config.precision.wgs_decimals);
    let status = format!(
        "EOV {}, {} → WGS'84 {}, {}",
        model.form.eov_easting.trim(),
        model.form.eov_northing.trim(),
        form.latitude,
        form.longitude
    );
    plan_marker(model, form, &eov, wgs, status)
}

fn plan_wgs_conversion(model: &AppModel) -> Result<ViewChange, GeoError> {
    let (lat_text, lon_text) = model.form.wgs_text();
    let wgs = CoordinatePair::parse(CoordinateSystem::Wgs84, &lat_text, &lon_text)?;
    let eov = model.projection.to_eov(&wgs)?;

    let mut form = model.form.clone();
    form.latitude = lat_text.trim().to_string();
    form.longitude = lon_text.trim().to_string();
    form.set_eov(&eov, model.config.precision.eov_decimals);
    let status = format!(
        "WGS'84 {}, {} → EOV {}, {}",
        form.latitude, form.longitude, form.eov_easting, form.eov_northing
    );
    plan_marker(model, form, &eov, wgs, status)
}

/// Add the converted point according to the marker mode and render the result.
fn plan_marker(
    model: &AppModel,
    form: FormModel,
    eov: &CoordinatePair,
    wgs: CoordinatePair,
    status: String,
) -> Result<ViewChange, GeoError> {
    let point = MapPoint::new(wgs, form.label())?
        .with_note(Some(eov_note(eov, model.config.precision.eov_decimals)));

    let mut points = match model.config.markers {
        MarkerMode::Replace => Vec::with_capacity(1),
        MarkerMode::Accumulate => model.points.clone(),
    };
    points.push(point);
    let active = points.len() - 1;
    let document =
        model
            .renderer
            .render_markers(&points[active].position, &points, model.config.map.zoom)?;

    Ok(ViewChange {
        form,
        points,
        active,
        document,
        status,
    })
}

/// Make `points[index]` active: fill the form from it and center the map on it.
///
/// A point outside the EOV grid is still shown; its EOV fields are left empty.
fn plan_selection(
    model: &AppModel,
    points: Vec<MapPoint>,
    index: usize,
) -> Result<ViewChange, GeoError> {
    let point = &points[index];
    let mut form = model.form.clone();
    form.set_wgs(&point.position, model.config.precision.wgs_decimals);
    form.point_name = point.label.clone().unwrap_or_default();
    form.entry = EntryMode::WgsEntered;

    let name = point.display_name(index);
    let status = match model.projection.to_eov(&point.position) {
        Ok(eov) => {
            form.set_eov(&eov, model.config.precision.eov_decimals);
            format!("{name}: EOV {}, {}", form.eov_easting, form.eov_northing)
        }
        Err(err) => {
            form.clear_eov();
            format!("{name} has no EOV position: {err}")
        }
    };

    let document = model
        .renderer
        .render_markers(&point.position, &points, model.config.map.zoom)?;

    Ok(ViewChange {
        form,
        points,
        active: index,
        document,
        status,
    })
}

fn plan_google_maps(model: &AppModel) -> Result<(FormModel, String), GeoError> {
    let eov = CoordinatePair::parse(
        CoordinateSystem::Eov,
        &model.form.eov_easting,
        &model.form.eov_northing,
    )?;
    let wgs = model.projection.to_wgs84(&eov)?;
    let url = google_maps_url(&MapPoint::new(wgs, model.form.label())?)?;

    let mut form = model.form.clone();
    form.set_wgs(&wgs, model.config.precision.wgs_decimals);
    Ok((form, url))
}

fn clear_points(model: &mut AppModel, cmds: &mut Vec<Command>) {
    let center = match &model.document {
        Some(document) => document.center(),
        None => {
            let [lat, lon] = model.config.map.default_center;
            CoordinatePair::wgs84(lat, lon)
        }
    };
    match model.renderer.render_base(&center, model.config.map.zoom) {
        Ok(document) => {
            model.restore = Some(Snapshot::take(model));
            model.points.clear();
            model.active = None;
            model.status = Some("Points cleared.".into());
            cmds.push(Command::ShowMap {
                document: document.clone(),
                target: model.config.preview.path.clone(),
                launch: false,
            });
            model.document = Some(document);
        }
        Err(err) => surface_event(model, err.to_string(), true),
    }
}

fn eov_note(eov: &CoordinatePair, decimals: usize) -> String {
    let (easting, northing) = eov.format(decimals);
    format!("EOV Y: {easting}\nEOV X: {northing}")
}
