use crate::{
    Shell,
    action::ConfigureStates,
    output::OutputId,
    pending::PendingKind,
    scene::Layer,
    surface::{Role, Stage, SurfaceFlags, SurfaceId},
};

impl Shell {
    /// Commit handling for desktop and remote surfaces.
    pub(super) fn desktop_committed(&mut self, id: SurfaceId) {
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        let Some(desktop) = surface.role().desktop() else {
            return;
        };
        let state = surface.state;

        if let Some(pending) = desktop.pending_output {
            let Some(output) = self.outputs.get(pending) else {
                return;
            };
            if state.maximized && state.geometry.size == output.area.size {
                self.complete_activation(pending, id);
            }
            return;
        }

        if desktop.stage == Stage::Committed {
            self.refresh_active(id);
            return;
        }
        if desktop.stage != Stage::Unstaged
            || surface
                .flags
                .intersects(SurfaceFlags::ACTIVATED_BY_DEFAULT | SurfaceFlags::CHECKED_PENDING)
        {
            return;
        }
        if !self.policy_allows(id, None, |policy, ctx| policy.surface_activate_by_default(ctx)) {
            return;
        }

        let Some(target) = self.default_output_for(id) else {
            tracing::debug!(
                app_id = surface.app_id_or_default(),
                "no output to show the application on yet"
            );
            return;
        };

        if self.config.activate_by_default {
            if let Some(surface) = self.surfaces.get_mut(id) {
                surface.flags.insert(SurfaceFlags::ACTIVATED_BY_DEFAULT);
            }
            self.activate_surface(target, id);
        } else {
            if let Some(surface) = self.surfaces.get_mut(id) {
                surface.flags.insert(SurfaceFlags::CHECKED_PENDING);
            }
            self.stage_hidden(target, id);
        }
    }

    /// Output a surface shows up on when nobody asked for a specific one:
    /// the output reserved for it as remote, else the one holding a background.
    fn default_output_for(&self, id: SurfaceId) -> Option<OutputId> {
        let surface = self.surfaces.get(id)?;
        if let Role::Remote(remote) = surface.role()
            && self.outputs.get(remote.output).is_some()
        {
            return Some(remote.output);
        }
        if let Some(app_id) = surface.app_id.as_deref()
            && let Some(registration) = self.pending.peek(PendingKind::Remote, app_id)
            && self.outputs.get(registration.output).is_some()
        {
            return Some(registration.output);
        }
        self.outputs.find_background_output()
    }

    /// Parks a surface on the hidden layer of `output_id`, sized to the
    /// usable area, without showing it.
    pub(crate) fn stage_hidden(&mut self, output_id: OutputId, id: SurfaceId) {
        let Some(size) = self.outputs.get(output_id).map(|output| output.area.size) else {
            return;
        };
        let Some(surface) = self.surfaces.get_mut(id) else {
            return;
        };
        let view = surface.view;
        if let Some(desktop) = surface.desktop_mut() {
            desktop.stage = Stage::HiddenStaged;
        }

        self.send_configure(id, size, ConfigureStates::MAXIMIZED);
        self.scene.set_output(view, Some(output_id));
        self.scene.insert(Layer::Hidden, view);
        self.scene.damage_output(output_id);
        tracing::debug!(?size, "surface staged on the hidden layer");
    }

    /// Keeps the view of an active surface in line with its latest commit.
    fn refresh_active(&mut self, id: SurfaceId) {
        let Some(output_id) = self.outputs.find_active(id) else {
            return;
        };
        let Some(origin) = self.outputs.get(output_id).map(|output| output.area_origin()) else {
            return;
        };
        let Some(surface) = self.surfaces.get(id) else {
            return;
        };
        self.scene.set_position(surface.view, origin);
        self.scene.set_size(surface.view, surface.state.geometry.size);
        self.scene.damage_output(output_id);
    }
}
