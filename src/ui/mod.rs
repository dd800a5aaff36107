// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell for converting EOV and WGS'84 coordinates.
//! Handles layout, file dialogs and wiring to the MVU kernel.

pub mod components;

use std::collections::VecDeque;

use eframe::egui;

use crate::config::AppConfig;
use crate::mvu::{self, AppModel, Msg};
use crate::ui::components::{coordinate_form, point_list};
use crate::utils::{ensure_extension, suggested_kml_name};

/// Stateful egui application wrapping the MVU model.
pub struct EovMapApp {
    model: AppModel,
    inbox: Vec<Msg>,
}

impl EovMapApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            model: AppModel::new(config),
            inbox: Vec::new(),
        }
    }
}

impl eframe::App for EovMapApp {
    /// Required by eframe 0.34; all rendering is done in [`Self::update`].
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    /// Drives a single UI frame: applies queued messages, runs the commands they
    /// produce and renders the top bar, error modal, status bar and form panels.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_spacing(ctx);

        // Commands are short file writes and reads; run them inline and feed the result back.
        let mut queue: VecDeque<Msg> = std::mem::take(&mut self.inbox).into();
        while let Some(msg) = queue.pop_front() {
            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            queue.extend(commands.into_iter().map(mvu::run_command));
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("EOV-WGS");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_theme_controls(ui);
                    ui.separator();
                    self.render_kml_buttons(ui);
                    ui.separator();
                    self.render_map_button(ui);
                });
            });
            ui.add_space(4.0);
        });

        self.render_error_modal(ctx);

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);

            egui::ScrollArea::vertical().show(ui, |ui| {
                let form_msgs = coordinate_form::view(ui, &self.model.form);
                self.inbox.extend(form_msgs.into_iter().map(Msg::Form));
                ui.add_space(12.0);

                self.render_points_section(ui);
                ui.add_space(8.0);
            });
        });
    }
}

impl EovMapApp {
    fn ensure_spacing(&self, ctx: &egui::Context) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(6.0, 6.0);
        });
    }

    fn render_theme_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(2.0);
        egui::widgets::global_theme_preference_switch(ui);
    }

    /// Render the KML open/save buttons and run their file dialogs.
    ///
    /// Saving is disabled while no point is displayed. The chosen save path always
    /// ends in `.kml`; the suggested name comes from the first point's label.
    fn render_kml_buttons(&mut self, ui: &mut egui::Ui) {
        let save_enabled = !self.model.points.is_empty();
        let save = egui::Button::new(format!(
            "{} Save KML",
            egui_phosphor::regular::FLOPPY_DISK
        ));
        if ui
            .add_enabled(save_enabled, save)
            .on_disabled_hover_text("Convert or load a point first")
            .clicked()
        {
            let first_label = self.model.points.first().and_then(|p| p.label.as_deref());
            let dialog = rfd::FileDialog::new()
                .set_title("Save points as KML")
                .add_filter("KML", &["kml"])
                .set_file_name(suggested_kml_name(first_label));

            match dialog.save_file() {
                Some(path) => self
                    .inbox
                    .push(Msg::SaveKmlRequested(ensure_extension(path, "kml"))),
                None => self.inbox.push(Msg::KmlDialogCancelled),
            }
        }

        if ui
            .button(format!("{} Open KML", egui_phosphor::regular::FOLDER_OPEN))
            .clicked()
        {
            let dialog = rfd::FileDialog::new()
                .set_title("Open KML")
                .add_filter("KML", &["kml"]);

            match dialog.pick_file() {
                Some(path) => self.inbox.push(Msg::OpenKmlRequested(path)),
                None => self.inbox.push(Msg::KmlDialogCancelled),
            }
        }
    }

    fn render_map_button(&mut self, ui: &mut egui::Ui) {
        let button = egui::Button::new(format!("{} Open map", egui_phosphor::regular::MAP_TRIFOLD));
        if ui
            .add_enabled(self.model.document.is_some(), button)
            .on_hover_text("Open the current map in the browser")
            .clicked()
        {
            self.inbox.push(Msg::ShowMapRequested);
        }
    }

    /// Points shown on the map, with the active one highlighted.
    fn render_points_section(&mut self, ui: &mut egui::Ui) {
        let title = format!("Points ({})", self.model.points.len());
        egui::CollapsingHeader::new(title)
            .id_salt("points_section")
            .default_open(true)
            .show(ui, |ui| {
                let msgs = point_list::view(ui, &self.model.points, self.model.active);
                self.inbox.extend(msgs.into_iter().map(Msg::Points));
            });

        if let Some(point) = self.model.active_point()
            && let Some(note) = &point.note
        {
            ui.label(
                egui::RichText::new(note.replace('\n', "   "))
                    .small()
                    .color(egui::Color32::from_gray(110)),
            );
        }
    }

    /// Render a simple modal window for error messages.
    fn render_error_modal(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.model.error.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissError);
                    }
                });
        }
    }

    /// Render latest status message when present.
    fn render_status(&self, ui: &mut egui::Ui) {
        if let Some(text) = &self.model.status {
            ui.label(egui::RichText::new(text).color(egui::Color32::from_gray(68)));
        }
    }
}
