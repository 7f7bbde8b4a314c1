//! Placement of surfaces per role, driven by content commits.

mod desktop;
mod panel;
mod popup;
mod split;

use crate::{
    Shell,
    action::ConfigureStates,
    errors::Result,
    output::{Edge, OutputId},
    scene::Layer,
    surface::{Role, SurfaceId},
};

impl Shell {
    /// Lays out the static parts of an output: the background at the
    /// origin, then the panels in edge order.
    pub(crate) fn compute_initial_layout(&mut self, output_id: OutputId) {
        let Some(output) = self.outputs.get_mut(output_id) else {
            return;
        };
        output.reset_area();
        let background = output.background;
        let panels: Vec<(Edge, SurfaceId)> = output
            .panels()
            .map(|(edge, slot)| (edge, slot.surface))
            .collect();

        match background {
            Some(background) => self.map_background(output_id, background),
            None => tracing::warn!(output = ?output_id, "output does not have a background"),
        }
        for (edge, panel) in panels {
            self.place_panel(output_id, edge, panel);
        }
        self.refresh_area(output_id);

        if let Some(output) = self.outputs.get(output_id) {
            tracing::info!(
                output = %output.name,
                x = output.area.loc.x,
                y = output.area.loc.y,
                width = output.area.size.w,
                height = output.area.size.h,
                "usable area"
            );
        }
        self.resize_active(output_id);
        self.scene.damage_output(output_id);
    }

    pub(crate) fn map_background(&mut self, output_id: OutputId, id: SurfaceId) {
        let Some(view) = self.surfaces.get(id).map(|surface| surface.view) else {
            return;
        };
        let Some(output) = self.outputs.get_mut(output_id) else {
            return;
        };
        let geometry = output.geometry;
        output.hide_curtain(&mut self.scene);

        self.scene.set_output(view, Some(output_id));
        self.scene.set_position(view, geometry.loc);
        self.scene.set_size(view, geometry.size);
        self.scene.insert(Layer::Background, view);
        tracing::debug!(x = geometry.loc.x, y = geometry.loc.y, "background mapped");
    }

    /// Asks the active desktop surface of an output to follow its usable area.
    pub(crate) fn resize_active(&mut self, output_id: OutputId) {
        let Some(output) = self.outputs.get(output_id) else {
            return;
        };
        let Some(active) = output.active else {
            return;
        };
        let size = output.area.size;
        let current = self.surfaces.get(active).map(|surface| surface.state.geometry.size);
        if current != Some(size) {
            self.send_configure(active, size, ConfigureStates::MAXIMIZED);
        }
    }

    /// Runs the per-role commit handling.
    pub(crate) fn layout_commit(&mut self, id: SurfaceId) -> Result<()> {
        let Some(surface) = self.surfaces.get(id) else {
            return Ok(());
        };
        let role = *surface.role();
        match role {
            Role::None => Ok(()),
            Role::Background(role) => {
                self.background_committed(role.output, id);
                Ok(())
            }
            Role::Panel(_) => {
                self.panel_committed(id);
                Ok(())
            }
            Role::Desktop(_) | Role::Remote(_) => {
                self.desktop_committed(id);
                Ok(())
            }
            Role::Popup(_) => {
                self.popup_committed(id);
                Ok(())
            }
            Role::Fullscreen(_) => self.fullscreen_committed(id),
            Role::Split(_) => {
                self.split_committed(id);
                Ok(())
            }
        }
    }

    fn background_committed(&mut self, output_id: OutputId, id: SurfaceId) {
        if !self.ready || self.is_mapped(id) {
            return;
        }
        let owns_slot = self
            .outputs
            .get(output_id)
            .is_some_and(|output| output.background == Some(id));
        if owns_slot {
            self.map_background(output_id, id);
        }
    }
}
