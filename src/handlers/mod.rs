mod compositor;
mod desktop;
mod output;
mod shell;

use smithay::utils::{Logical, Rectangle};

use crate::{
    Shell,
    errors::Result,
    surface::{ClientId, SurfaceHandle, SurfaceState},
};

/// Everything that can happen to the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A client bound the shell interface.
    BindShell { client: ClientId },
    /// The shell client went away.
    ShellGone,
    Ready,
    SetBackground {
        surface: SurfaceHandle,
        output: String,
    },
    SetPanel {
        surface: SurfaceHandle,
        output: String,
        edge: u32,
    },
    ActivateApp { app_id: String, output: String },
    DeactivateApp { app_id: String },
    SetAppProperty {
        app_id: String,
        role: u32,
        x: i32,
        y: i32,
        clip: Option<Rectangle<i32, Logical>>,
        output: String,
    },
    SetAppPropertyMode { keep_pending: bool },

    BindDesktopClient { client: ClientId },
    DesktopClientGone { client: ClientId },

    SurfaceAdded {
        surface: SurfaceHandle,
        client: ClientId,
        app_id: Option<String>,
    },
    SurfaceAppId {
        surface: SurfaceHandle,
        app_id: Option<String>,
    },
    SurfaceCommitted {
        surface: SurfaceHandle,
        state: SurfaceState,
    },
    SurfaceRemoved { surface: SurfaceHandle },

    OutputAdded {
        name: String,
        geometry: Rectangle<i32, Logical>,
    },
    OutputRemoved { name: String },
}

impl Shell {
    /// Single entry point for requests and lifecycle callbacks.
    ///
    /// Protocol misuse comes back as an error and leaves the state as it was.
    /// Requests naming unknown applications or outputs are logged and ignored.
    pub fn handle(&mut self, event: Event) -> Result<()> {
        tracing::trace!(?event, "handling event");
        let result = match event {
            Event::BindShell { client } => self.bind_shell(client),
            Event::ShellGone => {
                self.shell_gone();
                Ok(())
            }
            Event::Ready => {
                self.shell_ready();
                Ok(())
            }
            Event::SetBackground { surface, output } => self.set_background(surface, &output),
            Event::SetPanel {
                surface,
                output,
                edge,
            } => self.set_panel(surface, &output, edge),
            Event::ActivateApp { app_id, output } => {
                self.activate_app(&app_id, &output);
                Ok(())
            }
            Event::DeactivateApp { app_id } => {
                self.deactivate(&app_id);
                Ok(())
            }
            Event::SetAppProperty {
                app_id,
                role,
                x,
                y,
                clip,
                output,
            } => self.set_app_property(app_id, role, x, y, clip, &output),
            Event::SetAppPropertyMode { keep_pending } => {
                self.set_app_property_mode(keep_pending);
                Ok(())
            }
            Event::BindDesktopClient { client } => {
                self.bind_desktop_client(client);
                Ok(())
            }
            Event::DesktopClientGone { client } => {
                self.desktop_client_gone(client);
                Ok(())
            }
            Event::SurfaceAdded {
                surface,
                client,
                app_id,
            } => {
                self.surface_added(surface, client, app_id);
                Ok(())
            }
            Event::SurfaceAppId { surface, app_id } => {
                self.surface_app_id(surface, app_id);
                Ok(())
            }
            Event::SurfaceCommitted { surface, state } => self.surface_committed(surface, state),
            Event::SurfaceRemoved { surface } => {
                self.surface_removed(surface);
                Ok(())
            }
            Event::OutputAdded { name, geometry } => self.output_added(&name, geometry).map(|_| ()),
            Event::OutputRemoved { name } => {
                self.output_removed(&name);
                Ok(())
            }
        };

        if let Err(err) = &result {
            tracing::warn!(code = ?err.protocol_code(), "request failed: {err}");
        }
        result
    }
}
