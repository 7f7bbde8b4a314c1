use crate::{
    Shell,
    errors::Result,
    protocols::desktop::AppState,
    surface::{ClientId, Role, RoleKind, SurfaceHandle, SurfaceState},
};

impl Shell {
    pub(super) fn surface_added(
        &mut self,
        handle: SurfaceHandle,
        client: ClientId,
        app_id: Option<String>,
    ) {
        if self.surfaces.by_handle(handle).is_some() {
            tracing::warn!(%handle, "surface added twice");
            return;
        }

        let view = self.scene.create_view();
        let id = self.surfaces.insert(handle, client, app_id, view);
        if !self.policy_allows(id, None, |policy, ctx| policy.surface_create(ctx)) {
            self.surfaces.remove(id);
            self.scene.destroy_view(view);
            tracing::debug!(%handle, "surface not managed, denied by policy");
            return;
        }
        tracing::debug!(%handle, %client, "surface added");
    }

    pub(super) fn surface_app_id(&mut self, handle: SurfaceHandle, app_id: Option<String>) {
        let Some(id) = self.surfaces.by_handle(handle) else {
            tracing::debug!(%handle, "app id for unknown surface");
            return;
        };
        // The role is picked on the next content commit.
        self.surfaces.set_app_id(id, app_id);
    }

    pub(super) fn surface_committed(
        &mut self,
        handle: SurfaceHandle,
        state: SurfaceState,
    ) -> Result<()> {
        let Some(id) = self.surfaces.by_handle(handle) else {
            tracing::trace!(%handle, "commit for unmanaged surface");
            return Ok(());
        };
        let Some(surface) = self.surfaces.get_mut(id) else {
            return Ok(());
        };
        surface.state = state;
        surface.committed = true;
        tracing::trace!(%handle, geometry = ?state.geometry, maximized = state.maximized, "commit");

        if !self.policy_allows(id, None, |policy, ctx| policy.surface_commit(ctx)) {
            return Ok(());
        }
        if self
            .surfaces
            .get(id)
            .is_some_and(|surface| matches!(surface.role(), Role::None))
            && !self.resolve_role(id)
        {
            return Ok(());
        }
        self.layout_commit(id)
    }

    /// Drops a surface and every reference an output holds to it.
    pub(super) fn surface_removed(&mut self, handle: SurfaceHandle) {
        let Some(id) = self.surfaces.by_handle(handle) else {
            tracing::debug!(%handle, "removal of unmanaged surface");
            return;
        };
        let Some(surface) = self.surfaces.remove(id) else {
            return;
        };
        let role = *surface.role();
        let kind = role.kind();
        tracing::debug!(%handle, role = %kind, app_id = ?surface.app_id, "surface removed");

        if let Some(app_id) = surface.app_id.as_deref()
            && !matches!(kind, RoleKind::None | RoleKind::Background | RoleKind::Panel)
        {
            self.emit_state(id, app_id, kind, role.output(), AppState::Destroyed);
        }
        // The view goes first so nothing below can map it again.
        self.scene.destroy_view(surface.view);

        match role {
            Role::None | Role::Popup(_) => {}
            Role::Background(background) => {
                if let Some(output) = self.outputs.get_mut(background.output)
                    && output.background == Some(id)
                {
                    output.background = None;
                    if output.active.is_none() {
                        output.show_curtain(&mut self.scene);
                    }
                }
            }
            Role::Panel(panel) => {
                if let Some(output) = self.outputs.get_mut(panel.output) {
                    output.release_edge(id);
                }
                self.refresh_area(panel.output);
                self.resize_active(panel.output);
            }
            Role::Desktop(_) | Role::Remote(_) => {
                for output_id in self.outputs.ids() {
                    let Some(output) = self.outputs.get_mut(output_id) else {
                        continue;
                    };
                    if output.active != Some(id) {
                        continue;
                    }
                    output.active = None;
                    let previous = output
                        .previous_active
                        .take()
                        .filter(|previous| *previous != id && self.surfaces.contains(*previous));
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
            }
            Role::Split(split) => self.teardown_split(split.output, id),
            Role::Fullscreen(fullscreen) => self.teardown_fullscreen(fullscreen.output, id),
        }

        for output_id in self.outputs.ids() {
            if let Some(output) = self.outputs.get_mut(output_id) {
                output.forget(id);
                output.release_edge(id);
            }
        }
        debug_assert!(
            !self.outputs.refers_to(id),
            "output still refers to a destroyed surface"
        );
        self.damage_all_outputs();
    }
}
