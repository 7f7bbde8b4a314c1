//! Activation and deactivation of applications per output.

use crate::{
    Shell,
    action::ConfigureStates,
    output::OutputId,
    protocols::desktop::AppState,
    scene::Layer,
    surface::{PopupState, RemoteRole, Role, Stage, SurfaceId},
};

impl Shell {
    /// Shows the application `app_id` on `output_id`.
    pub fn activate(&mut self, output_id: OutputId, app_id: &str) {
        let Some(id) = self.surfaces.find_by_app_id(app_id) else {
            tracing::debug!(%app_id, "activate: no such application");
            return;
        };
        if self.outputs.get(output_id).is_none() {
            tracing::debug!(%app_id, "activate: output is gone");
            return;
        }
        self.activate_surface(output_id, id);
    }

    pub(crate) fn activate_surface(&mut self, output_id: OutputId, id: SurfaceId) {
        if !self.policy_allows(id, Some(output_id), |policy, ctx| policy.surface_activate(ctx)) {
            return;
        }
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let Some(output) = self.outputs.get(output_id) else {
            return;
        };
        let role = *surface.role();
        let state = surface.state;
        let view = surface.view;

        match role {
            Role::Popup(_) => {
                self.show_popup(id);
                self.notify_state(id, AppState::Activated);
                return;
            }
            Role::None | Role::Background(_) | Role::Panel(_) => {
                tracing::debug!(role = %role.kind(), "activate: role cannot be activated");
                return;
            }
            Role::Split(_) | Role::Fullscreen(_) => {
                tracing::debug!(role = %role.kind(), "activate: surface is already resident");
                return;
            }
            Role::Desktop(_) => {}
            Role::Remote(remote) => {
                let active_on_bound = self
                    .outputs
                    .get(remote.output)
                    .is_some_and(|bound| bound.active == Some(id));
                if active_on_bound {
                    return;
                }
            }
        }

        if output.active == Some(id) {
            tracing::trace!(app_id = surface.app_id_or_default(), "already active");
            return;
        }

        let area = output.area;
        tracing::debug!(
            app_id = surface.app_id_or_default(),
            output = %output.name,
            "activating"
        );
        if let Some(desktop) = self.surfaces.get_mut(id).and_then(|s| s.desktop_mut()) {
            desktop.pending_output = Some(output_id);
        }

        if state.maximized && state.geometry.size == area.size {
            self.complete_activation(output_id, id);
            return;
        }

        self.send_configure(id, area.size, ConfigureStates::MAXIMIZED);
        if let Some(desktop) = self.surfaces.get_mut(id).and_then(|s| s.desktop_mut()) {
            desktop.stage = Stage::Resizing;
        }
        // Frame and configure events keep flowing while the view sits hidden.
        if !self.scene.in_stack(view) {
            self.scene.set_output(view, Some(output_id));
            self.scene.insert(Layer::Hidden, view);
            self.scene.damage_output(output_id);
        }
    }

    /// Makes `id` the active surface of `output_id`, replacing the current one.
    pub(crate) fn complete_activation(&mut self, output_id: OutputId, id: SurfaceId) {
        let Some(view) = self.surfaces.get(id).map(|surface| surface.view) else {
            return;
        };

        // Leave whatever output showed this surface so far.
        let elsewhere: Vec<OutputId> = self
            .outputs
            .iter()
            .filter(|(other, output)| *other != output_id && output.active == Some(id))
            .map(|(other, _)| other)
            .collect();
        for other in elsewhere {
            if let Some(output) = self.outputs.get_mut(other) {
                output.active = None;
                output.previous_active = Some(id);
                if output.background.is_none() {
                    output.show_curtain(&mut self.scene);
                }
            }
        }

        let Some(output) = self.outputs.get_mut(output_id) else {
            return;
        };
        let previous = output.active.filter(|previous| *previous != id);
        let origin = output.area_origin();
        let size = output.area.size;
        output.previous_active = previous;
        output.active = Some(id);
        output.hide_curtain(&mut self.scene);

        if let Some(previous) = previous
            && let Some(previous_view) = self.surfaces.get(previous).map(|s| s.view)
        {
            self.scene.remove(previous_view);
        }

        self.scene.set_output(view, Some(output_id));
        self.scene.set_position(view, origin);
        self.scene.set_size(view, size);
        self.scene.insert(Layer::Normal, view);

        if let Some(desktop) = self.surfaces.get_mut(id).and_then(|s| s.desktop_mut()) {
            desktop.last_output = Some(output_id);
            desktop.pending_output = None;
            desktop.stage = Stage::Committed;
        }
        self.damage_all_outputs();
        tracing::debug!(x = origin.x, y = origin.y, "activation complete");
        self.notify_state(id, AppState::Activated);
    }

    /// Hides the application `app_id`, bringing back what was shown before it.
    pub fn deactivate(&mut self, app_id: &str) {
        let Some(id) = self.surfaces.find_by_app_id(app_id) else {
            tracing::debug!(%app_id, "deactivate: no such application");
            return;
        };
        if !self.policy_allows(id, None, |policy, ctx| policy.surface_deactivate(ctx)) {
            return;
        }
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let view = surface.view;
        let role = *surface.role();

        match role {
            Role::Desktop(desktop) | Role::Remote(RemoteRole { desktop, .. }) => {
                let active_on = self.outputs.find_active(id);
                if desktop.pending_output.is_some() {
                    self.cancel_activation(id, active_on.is_some());
                }
                let Some(output_id) = active_on else {
                    tracing::debug!(%app_id, "deactivate: application is not active");
                    return;
                };
                let Some(output) = self.outputs.get_mut(output_id) else {
                    return;
                };
                let previous = output
                    .previous_active
                    .take()
                    .filter(|previous| *previous != id && self.surfaces.contains(*previous));
                output.active = None;
                self.scene.remove(view);
                self.notify_state(id, AppState::Deactivated);

                if let Some(previous) = previous {
                    self.activate_surface(output_id, previous);
                }
                if let Some(output) = self.outputs.get_mut(output_id)
                    && output.active.is_none()
                    && output.background.is_none()
                {
                    output.show_curtain(&mut self.scene);
                }
            }
            Role::Popup(_) => {
                self.scene.remove(view);
                if let Some(popup) = self.surfaces.get_mut(id).and_then(|s| s.popup_mut()) {
                    popup.state = PopupState::Hidden;
                }
                self.notify_state(id, AppState::Deactivated);
            }
            role => {
                tracing::debug!(%app_id, role = %role.kind(), "deactivate: nothing to do");
            }
        }
    }

    /// Stops an activation still waiting for the client to resize. A surface
    /// that was not shown anywhere goes back to being staged and hidden.
    fn cancel_activation(&mut self, id: SurfaceId, still_active: bool) {
        let Some(surface) = self.surfaces.get_mut(id) else {
            return;
        };
        let view = surface.view;
        let Some(desktop) = surface.desktop_mut() else {
            return;
        };
        desktop.pending_output = None;
        if still_active {
            desktop.stage = Stage::Committed;
            return;
        }
        desktop.stage = Stage::HiddenStaged;
        self.scene.remove(view);
        tracing::debug!("pending activation cancelled");
        self.notify_state(id, AppState::Deactivated);
    }
}
