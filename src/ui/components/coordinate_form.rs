// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! EOV and WGS'84 input groups in an MVU-friendly shape.

use eframe::egui;

use crate::models::coords::{CoordinatePair, split_pasted_pair};

/// Which side of the form the user typed into last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryMode {
    #[default]
    EovEntered,
    WgsEntered,
}

/// Raw text of every form field plus the entry state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormModel {
    /// EOV Y.
    pub eov_easting: String,
    /// EOV X.
    pub eov_northing: String,
    pub latitude: String,
    pub longitude: String,
    /// Optional marker label.
    pub point_name: String,
    pub entry: EntryMode,
}

/// Messages emitted by the form view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMsg {
    EastingChanged(String),
    NorthingChanged(String),
    LatitudeChanged(String),
    LongitudeChanged(String),
    PointNameChanged(String),
    ConvertEov,
    ConvertWgs,
    /// Convert from whichever side was edited last.
    ConvertActive,
    OpenGoogleMaps,
}

/// Requests the parent has to carry out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormAction {
    ConvertEov,
    ConvertWgs,
    OpenGoogleMaps,
}

impl FormModel {
    /// WGS'84 text as `(latitude, longitude)`.
    ///
    /// A `"lat, lon"` pair pasted into the latitude field is split when the
    /// longitude field is empty.
    pub fn wgs_text(&self) -> (String, String) {
        if self.longitude.trim().is_empty()
            && let Some(pair) = split_pasted_pair(&self.latitude)
        {
            return pair;
        }
        (self.latitude.clone(), self.longitude.clone())
    }

    /// Label typed for the next marker, if any.
    pub fn label(&self) -> Option<String> {
        let name = self.point_name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Write an EOV pair into the EOV fields.
    pub fn set_eov(&mut self, eov: &CoordinatePair, decimals: usize) {
        (self.eov_easting, self.eov_northing) = eov.format(decimals);
    }

    /// Write a WGS'84 pair into the latitude/longitude fields.
    pub fn set_wgs(&mut self, wgs: &CoordinatePair, decimals: usize) {
        (self.latitude, self.longitude) = wgs.format(decimals);
    }

    pub fn clear_eov(&mut self) {
        self.eov_easting.clear();
        self.eov_northing.clear();
    }
}

/// Apply a message to the form. Returns an action for the parent when a button was pressed.
pub fn update(model: &mut FormModel, msg: FormMsg) -> Option<FormAction> {
    match msg {
        FormMsg::EastingChanged(text) => {
            model.eov_easting = text;
            model.entry = EntryMode::EovEntered;
            None
        }
        FormMsg::NorthingChanged(text) => {
            model.eov_northing = text;
            model.entry = EntryMode::EovEntered;
            None
        }
        FormMsg::LatitudeChanged(text) => {
            model.latitude = text;
            model.entry = EntryMode::WgsEntered;
            None
        }
        FormMsg::LongitudeChanged(text) => {
            model.longitude = text;
            model.entry = EntryMode::WgsEntered;
            None
        }
        FormMsg::PointNameChanged(text) => {
            model.point_name = text;
            None
        }
        FormMsg::ConvertEov => Some(FormAction::ConvertEov),
        FormMsg::ConvertWgs => Some(FormAction::ConvertWgs),
        FormMsg::ConvertActive => Some(match model.entry {
            EntryMode::EovEntered => FormAction::ConvertEov,
            EntryMode::WgsEntered => FormAction::ConvertWgs,
        }),
        FormMsg::OpenGoogleMaps => Some(FormAction::OpenGoogleMaps),
    }
}

/// Render both input groups and return any messages triggered by user interaction.
pub fn view(ui: &mut egui::Ui, model: &FormModel) -> Vec<FormMsg> {
    let mut msgs = Vec::new();

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.strong("EOV → WGS'84");
        ui.add_space(4.0);
        egui::Grid::new("eov_grid")
            .num_columns(2)
            .spacing(egui::vec2(8.0, 6.0))
            .show(ui, |ui| {
                ui.label("EOV Y");
                text_field(ui, &model.eov_easting, "e.g. 650000", &mut msgs, FormMsg::EastingChanged);
                ui.end_row();

                ui.label("EOV X");
                text_field(ui, &model.eov_northing, "e.g. 240000", &mut msgs, FormMsg::NorthingChanged);
                ui.end_row();

                ui.label("Point name");
                text_field(ui, &model.point_name, "optional", &mut msgs, FormMsg::PointNameChanged);
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui
                .button(format!("{} Show on map", egui_phosphor::regular::MAP_PIN))
                .clicked()
            {
                msgs.push(FormMsg::ConvertEov);
            }
            if ui
                .button(format!("{} Google Maps", egui_phosphor::regular::GLOBE))
                .on_hover_text("Open the converted point in the browser")
                .clicked()
            {
                msgs.push(FormMsg::OpenGoogleMaps);
            }
        });
    });

    ui.add_space(12.0);

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.strong("WGS'84 → EOV");
        ui.add_space(4.0);
        egui::Grid::new("wgs_grid")
            .num_columns(2)
            .spacing(egui::vec2(8.0, 6.0))
            .show(ui, |ui| {
                ui.label("Latitude");
                text_field(ui, &model.latitude, "e.g. 47.50393208", &mut msgs, FormMsg::LatitudeChanged);
                ui.end_row();

                ui.label("Longitude");
                text_field(ui, &model.longitude, "e.g. 19.0474447", &mut msgs, FormMsg::LongitudeChanged);
                ui.end_row();
            });
        ui.label(
            egui::RichText::new("Tip: paste \"lat, lon\" into Latitude to fill both fields.")
                .small()
                .color(egui::Color32::from_gray(110)),
        );

        ui.add_space(6.0);
        if ui
            .button(format!(
                "{} Convert to EOV",
                egui_phosphor::regular::ARROWS_LEFT_RIGHT
            ))
            .clicked()
        {
            msgs.push(FormMsg::ConvertWgs);
        }
    });

    msgs
}

/// Single-line field that reports edits and converts on Enter.
fn text_field(
    ui: &mut egui::Ui,
    value: &str,
    hint: &str,
    msgs: &mut Vec<FormMsg>,
    changed: fn(String) -> FormMsg,
) {
    let mut buffer = value.to_string();
    let response = ui.add(egui::TextEdit::singleline(&mut buffer).hint_text(hint));
    if response.changed() {
        msgs.push(changed(buffer));
    }
    if response.lost_focus() && ui.input(|inp| inp.key_pressed(egui::Key::Enter)) {
        msgs.push(FormMsg::ConvertActive);
    }
}
