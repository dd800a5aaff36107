// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! List of the points currently on the map.

use eframe::egui;

use crate::models::map_point::MapPoint;

/// Messages emitted by the point list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointListMsg {
    Select(usize),
    Clear,
}

/// Render the displayed points; the active one is highlighted.
pub fn view(ui: &mut egui::Ui, points: &[MapPoint], active: Option<usize>) -> Vec<PointListMsg> {
    let mut msgs = Vec::new();

    if points.is_empty() {
        ui.label(
            egui::RichText::new("No points yet. Convert a coordinate or open a KML file.")
                .color(egui::Color32::from_gray(110)),
        );
        return msgs;
    }

    egui::Grid::new("points_grid")
        .striped(true)
        .num_columns(3)
        .spacing(egui::vec2(12.0, 4.0))
        .show(ui, |ui| {
            for (index, point) in points.iter().enumerate() {
                let selected = active == Some(index);
                if ui
                    .selectable_label(selected, point.display_name(index))
                    .clicked()
                    && !selected
                {
                    msgs.push(PointListMsg::Select(index));
                }
                ui.monospace(format!("{:.6}", point.latitude()));
                ui.monospace(format!("{:.6}", point.longitude()));
                ui.end_row();
            }
        });

    ui.add_space(6.0);
    if ui
        .button(format!("{} Clear points", egui_phosphor::regular::TRASH))
        .clicked()
    {
        msgs.push(PointListMsg::Clear);
    }

    msgs
}
