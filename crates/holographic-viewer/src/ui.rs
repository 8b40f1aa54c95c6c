//! Control panel: tracker status, calibration, axis inversion, camera mode
//! and model selection.

use glam::{Vec2, Vec3};

/// Everything the panel displays. Built fresh each frame.
pub struct PanelState<'a> {
    pub status: String,
    pub invert_x: bool,
    pub observer: bool,
    pub models: &'a [String],
    pub current_model: Option<&'a str>,
    pub eye: Vec3,
    pub calibration_offset: Vec2,
    pub load_error: Option<&'a str>,
}

/// User requests raised by the panel, applied by the app after the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Calibrate,
    SetInvertX(bool),
    SetObserver(bool),
    SelectModel(String),
}

pub fn draw_panel(ctx: &egui::Context, state: &PanelState<'_>) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::Window::new("Parallax")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.label(&state.status);
            ui.separator();

            if ui.button("Calibrate").on_hover_text("Look at the screen centre, then click").clicked() {
                actions.push(UiAction::Calibrate);
            }

            let mut invert_x = state.invert_x;
            if ui.checkbox(&mut invert_x, "Invert X").changed() {
                actions.push(UiAction::SetInvertX(invert_x));
            }

            let mut observer = state.observer;
            if ui.checkbox(&mut observer, "Observer camera").changed() {
                actions.push(UiAction::SetObserver(observer));
            }

            ui.separator();
            if state.models.is_empty() {
                ui.label("No .obj found");
            } else {
                egui::ComboBox::from_label("Model")
                    .selected_text(state.current_model.unwrap_or("-"))
                    .show_ui(ui, |ui| {
                        for name in state.models {
                            let selected = state.current_model == Some(name.as_str());
                            if ui.selectable_label(selected, name).clicked() && !selected {
                                actions.push(UiAction::SelectModel(name.clone()));
                            }
                        }
                    });
            }
            if let Some(err) = state.load_error {
                ui.colored_label(egui::Color32::LIGHT_RED, err);
            }

            ui.separator();
            ui.monospace(format!(
                "eye  x={:+.3} y={:+.3} z={:+.3}",
                state.eye.x, state.eye.y, state.eye.z
            ));
            ui.monospace(format!(
                "cal  x={:+.3} y={:+.3}",
                state.calibration_offset.x, state.calibration_offset.y
            ));
        });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(models: &[String]) -> PanelState<'_> {
        PanelState {
            status: "Waiting for tracker".into(),
            invert_x: false,
            observer: false,
            models,
            current_model: models.first().map(String::as_str),
            eye: Vec3::new(0.0, 0.0, 0.6),
            calibration_offset: Vec2::ZERO,
            load_error: None,
        }
    }

    #[test]
    fn idle_frame_raises_no_actions() {
        let ctx = egui::Context::default();
        let models = vec!["a.obj".to_string(), "b.obj".to_string()];
        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = draw_panel(ctx, &state(&models));
        });
        assert!(actions.is_empty());
    }

    #[test]
    fn empty_catalogue_still_draws() {
        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = draw_panel(ctx, &state(&[]));
        });
        assert!(actions.is_empty());
    }
}
