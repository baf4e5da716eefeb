//! Debug parameter panel: one slider per parameter definition.
//!
//! Sliders write straight into the shared store; the running scene picks
//! the new values up on its next tick.

use crate::params::ParameterStore;

/// Frame statistics shown under the sliders.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanelStatus {
    pub fps: f32,
    /// Scene seconds, pauses excluded.
    pub elapsed: f32,
    pub live_fish: usize,
    pub captured: u32,
    pub paused: bool,
}

/// Draw the panel window. Returns how many parameters were changed.
pub fn show(
    ctx: &egui::Context,
    title: &str,
    store: &ParameterStore,
    status: PanelStatus,
) -> usize {
    let mut changed = 0;
    egui::Window::new(title)
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            changed = parameter_sliders(ui, store);

            ui.separator();
            if ui.button("Reset to defaults").clicked() {
                store.reset();
                changed += 1;
            }

            ui.separator();
            ui.label(format!("{:.0} fps, {:.1} s", status.fps, status.elapsed));
            ui.label(format!(
                "{} swimming, {} caught",
                status.live_fish, status.captured
            ));
            if status.paused {
                ui.label(egui::RichText::new("paused").italics().weak());
            }
        });
    changed
}

/// Sliders for every parameter in declaration order.
pub fn parameter_sliders(ui: &mut egui::Ui, store: &ParameterStore) -> usize {
    let mut changed = 0;
    let entries: Vec<_> = store.entries().map(|(def, value)| (*def, value)).collect();

    for (def, value) in entries {
        let mut edited = value;
        let response = ui.add(
            egui::Slider::new(&mut edited, def.min..=def.max)
                .step_by(def.step as f64)
                .text(def.key),
        );
        if response.changed() {
            // The key comes from the store's own definitions.
            if store.set(def.key, def.quantize(edited)).is_ok() {
                changed += 1;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::water;

    #[test]
    fn test_panel_runs_headless_without_changes() {
        let store = water::init_parameter_store();
        let ctx = egui::Context::default();
        let mut changed = usize::MAX;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            changed = show(ctx, "shoal", &store, PanelStatus::default());
        });
        assert_eq!(changed, 0);
        for def in store.definitions().iter() {
            assert_eq!(store.get(def.key).unwrap(), def.default_value);
        }
    }
}
