//! Selected event panel.

use eframe::egui;

use crate::core::catalog::{EventCatalog, TimelineEvent};
use crate::core::config::CalendarSettings;
use crate::core::format::format_event_time;

/// Actions that can be triggered from the details panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailsAction {
    /// Animate the viewport to the event
    Focus,
    /// Remove the event from the catalog
    Delete,
    /// Clear the selection
    Close,
}

/// Renders the title, time, category and description of one event.
pub struct DetailsRenderer<'a> {
    event: &'a TimelineEvent,
    catalog: &'a EventCatalog,
    calendar: &'a CalendarSettings,
}

impl<'a> DetailsRenderer<'a> {
    pub fn new(
        event: &'a TimelineEvent,
        catalog: &'a EventCatalog,
        calendar: &'a CalendarSettings,
    ) -> Self {
        Self {
            event,
            catalog,
            calendar,
        }
    }

    pub fn render(&self, ui: &mut egui::Ui) -> Option<DetailsAction> {
        let mut action = None;
        let event = self.event;

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(self.catalog.glyph_for(event)).size(28.0));
            ui.vertical(|ui| {
                ui.heading(&event.title);
                ui.label(
                    egui::RichText::new(format_event_time(event, self.calendar))
                        .monospace()
                        .color(egui::Color32::from_rgb(129, 140, 248)),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                if ui.small_button("✕").on_hover_text("Close").clicked() {
                    action = Some(DetailsAction::Close);
                }
            });
        });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} {}",
                self.catalog.category_glyph(&event.category),
                event.category
            ));
            ui.separator();
            ui.label(format!("Importance {}/10", event.importance));
        });

        if !event.description.is_empty() {
            ui.add_space(6.0);
            ui.add(egui::Label::new(&event.description).wrap());
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("🎯 Focus").clicked() {
                action = Some(DetailsAction::Focus);
            }
            if ui
                .button(egui::RichText::new("🗑 Delete").color(egui::Color32::from_rgb(244, 67, 54)))
                .clicked()
            {
                action = Some(DetailsAction::Delete);
            }
        });

        action
    }
}
