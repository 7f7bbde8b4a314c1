use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::{
    Shell, ShellError,
    action::ConfigureStates,
    errors::Result,
    output::Edge,
    pending::{AppRole, PendingRegistration},
    surface::{BackgroundRole, ClientId, PanelRole, Role, SurfaceHandle},
};

impl Shell {
    pub(super) fn bind_shell(&mut self, client: ClientId) -> Result<()> {
        match self.shell_client {
            Some(bound) if bound != client => Err(ShellError::ShellAlreadyBound),
            _ => {
                self.shell_client = Some(client);
                tracing::info!(%client, "shell client bound");
                Ok(())
            }
        }
    }

    /// The shell client disconnected: forget everything it set up and cover
    /// every output with its curtain.
    pub(super) fn shell_gone(&mut self) {
        tracing::info!("shell client gone, resetting outputs");
        for output_id in self.outputs.ids() {
            let Some(output) = self.outputs.get_mut(output_id) else {
                continue;
            };
            let mut dropped = Vec::new();
            dropped.extend(output.background.take());
            dropped.extend(output.active.take());
            output.previous_active = None;
            let panels: Vec<_> = output.panels().map(|(_, slot)| slot.surface).collect();
            for panel in panels {
                output.release_edge(panel);
                dropped.push(panel);
            }
            output.show_curtain(&mut self.scene);

            for id in dropped {
                if let Some(surface) = self.surfaces.get(id) {
                    self.scene.remove(surface.view);
                }
            }
            self.refresh_area(output_id);
            self.scene.damage_output(output_id);
        }
        self.shell_client = None;
        self.ready = false;
    }

    pub(super) fn shell_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        tracing::info!("shell client ready");

        for output_id in self.outputs.ids() {
            self.compute_initial_layout(output_id);
        }
        self.flush_unrooted();
    }

    pub(super) fn set_background(&mut self, handle: SurfaceHandle, output: &str) -> Result<()> {
        let id = self
            .surfaces
            .by_handle(handle)
            .ok_or(ShellError::InvalidSurface)?;
        let output_id = self
            .outputs
            .by_name(output)
            .ok_or_else(|| ShellError::UnknownOutput(output.to_owned()))?;
        let surface = self.surfaces.get(id).ok_or(ShellError::InvalidSurface)?;
        if !matches!(surface.role(), Role::None) {
            return Err(ShellError::RoleAlreadyAssigned {
                app_id: surface.app_id.clone(),
            });
        }
        let Some(out) = self.outputs.get_mut(output_id) else {
            return Err(ShellError::UnknownOutput(output.to_owned()));
        };
        if out.background.is_some() {
            return Err(ShellError::BackgroundExists {
                output: output.to_owned(),
            });
        }

        let size = out.geometry.size;
        self.surfaces
            .assign_role(id, Role::Background(BackgroundRole { output: output_id }))?;
        out.background = Some(id);
        tracing::debug!(%handle, %output, "background set");
        self.send_configure(id, size, ConfigureStates::MAXIMIZED);

        if self.ready {
            self.map_background(output_id, id);
        }
        Ok(())
    }

    pub(super) fn set_panel(&mut self, handle: SurfaceHandle, output: &str, edge: u32) -> Result<()> {
        let id = self
            .surfaces
            .by_handle(handle)
            .ok_or(ShellError::InvalidSurface)?;
        let output_id = self
            .outputs
            .by_name(output)
            .ok_or_else(|| ShellError::UnknownOutput(output.to_owned()))?;
        let surface = self.surfaces.get(id).ok_or(ShellError::InvalidSurface)?;
        if !matches!(surface.role(), Role::None) {
            return Err(ShellError::RoleAlreadyAssigned {
                app_id: surface.app_id.clone(),
            });
        }
        let edge = Edge::try_from(edge)?;
        let Some(out) = self.outputs.get_mut(output_id) else {
            return Err(ShellError::UnknownOutput(output.to_owned()));
        };
        out.claim_edge(edge, id)?;

        let size: Size<i32, Logical> = if edge.is_horizontal() {
            (out.geometry.size.w, 0).into()
        } else {
            (0, out.geometry.size.h).into()
        };
        self.surfaces.assign_role(
            id,
            Role::Panel(PanelRole {
                output: output_id,
                edge,
                deferred: false,
            }),
        )?;
        tracing::debug!(%handle, %output, %edge, "panel set");
        self.send_configure(id, size, ConfigureStates::empty());

        if self.ready {
            self.place_panel(output_id, edge, id);
            self.refresh_area(output_id);
            self.resize_active(output_id);
        }
        Ok(())
    }

    pub(super) fn activate_app(&mut self, app_id: &str, output: &str) {
        match self.outputs.by_name(output) {
            Some(output_id) => self.activate(output_id, app_id),
            None => tracing::debug!(%app_id, %output, "activate: unknown output"),
        }
    }

    pub(super) fn set_app_property(
        &mut self,
        app_id: String,
        role: u32,
        x: i32,
        y: i32,
        clip: Option<Rectangle<i32, Logical>>,
        output: &str,
    ) -> Result<()> {
        let role = AppRole::try_from(role)?;
        let Some(output_id) = self.outputs.by_name(output) else {
            tracing::debug!(%app_id, %output, "set_app_property: unknown output");
            return Ok(());
        };
        // An all-zero clip box means no clipping.
        let clip = clip.filter(|clip| !clip.is_empty());
        self.pending.insert(PendingRegistration::new(
            app_id,
            role,
            Point::from((x, y)),
            clip,
            output_id,
        ));
        Ok(())
    }

    pub(super) fn set_app_property_mode(&mut self, keep_pending: bool) {
        tracing::debug!(keep_pending, "pending registration mode changed");
        self.pending.set_keep_pending(keep_pending);
    }
}
