use smithay::utils::{Logical, Rectangle, Size};

use crate::{
    Event, Result, Shell,
    action::{Action, ConfigureStates},
    config::RuntimeConfig,
    output::{Edge, OutputId, ShellOutput},
    policy::PolicyGate,
    protocols::desktop::{AppState, Notification},
    scene::{Layer, rect},
    surface::{ClientId, Role, SurfaceHandle, SurfaceId, SurfaceState},
};

pub const SHELL_CLIENT: ClientId = ClientId(1);
pub const OUTPUT: &str = "HDMI-A-1";

/// Drives a [`Shell`] the way a display server would, and plays the
/// clients' side of the configure handshakes.
pub struct Fixture {
    pub shell: Shell,
    /// Actions drained from the shell so far.
    pub actions: Vec<Action>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig {
            activate_by_default: true,
            ..RuntimeConfig::default()
        })
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            shell: Shell::new(config),
            actions: Vec::new(),
        }
    }

    pub fn with_policy(policy: impl PolicyGate + 'static) -> Self {
        let config = RuntimeConfig {
            activate_by_default: true,
            ..RuntimeConfig::default()
        };
        Self {
            shell: Shell::with_policy(config, Box::new(policy)),
            actions: Vec::new(),
        }
    }

    /// One 1920x1080 output with a background, shell client ready.
    pub fn booted() -> Self {
        let mut f = Self::new();
        f.add_output(OUTPUT, rect(0, 0, 1920, 1080));
        f.bind_shell();
        f.background(1, OUTPUT);
        f.ready();
        f
    }

    pub fn handle(&mut self, event: Event) -> Result<()> {
        let result = self.shell.handle(event);
        self.actions.extend(self.shell.take_actions());
        result
    }

    pub fn ok(&mut self, event: Event) {
        self.handle(event).unwrap();
    }

    pub fn add_output(&mut self, name: &str, geometry: Rectangle<i32, Logical>) -> OutputId {
        self.ok(Event::OutputAdded {
            name: name.to_owned(),
            geometry,
        });
        self.shell.output_by_name(name).unwrap()
    }

    pub fn output(&self, name: &str) -> &ShellOutput {
        let id = self.shell.output_by_name(name).unwrap();
        self.shell.outputs.get(id).unwrap()
    }

    pub fn bind_shell(&mut self) {
        self.ok(Event::BindShell {
            client: SHELL_CLIENT,
        });
    }

    pub fn ready(&mut self) {
        self.ok(Event::Ready);
    }

    pub fn add_surface(&mut self, handle: u64, client: ClientId, app_id: Option<&str>) {
        self.ok(Event::SurfaceAdded {
            surface: SurfaceHandle(handle),
            client,
            app_id: app_id.map(str::to_owned),
        });
    }

    /// Adds a client surface with its own connection.
    pub fn add_app(&mut self, handle: u64, app_id: &str) {
        self.add_surface(handle, ClientId(100 + handle), Some(app_id));
    }

    pub fn commit(&mut self, handle: u64, geometry: Rectangle<i32, Logical>) -> Result<()> {
        self.commit_state(
            handle,
            SurfaceState {
                geometry,
                ..SurfaceState::default()
            },
        )
    }

    pub fn commit_state(&mut self, handle: u64, state: SurfaceState) -> Result<()> {
        self.handle(Event::SurfaceCommitted {
            surface: SurfaceHandle(handle),
            state,
        })
    }

    /// Commits the last size the shell asked `handle` for, with the states
    /// it asked for.
    pub fn ack(&mut self, handle: u64) -> Result<()> {
        let (size, states) = self
            .last_configure(handle)
            .expect("no configure sent to surface");
        self.commit_state(
            handle,
            SurfaceState {
                geometry: Rectangle::from_size(size),
                maximized: states.contains(ConfigureStates::MAXIMIZED),
                fullscreen: states.contains(ConfigureStates::FULLSCREEN),
            },
        )
    }

    pub fn last_configure(&self, handle: u64) -> Option<(Size<i32, Logical>, ConfigureStates)> {
        self.configures(handle).last().copied()
    }

    pub fn configures(&self, handle: u64) -> Vec<(Size<i32, Logical>, ConfigureStates)> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                Action::Configure {
                    surface,
                    size,
                    states,
                } if *surface == SurfaceHandle(handle) => Some((*size, *states)),
                _ => None,
            })
            .collect()
    }

    /// `state_app` notifications received by `client`, in order.
    pub fn states_for(&self, client: ClientId, app_id: &str) -> Vec<AppState> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                Action::Notify {
                    recipient,
                    notification: Notification::StateApp { app_id: id, state, .. },
                } if *recipient == client && id == app_id => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn kills(&self) -> Vec<ClientId> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                Action::KillClient { client, .. } => Some(*client),
                _ => None,
            })
            .collect()
    }

    /// Background surface of the shell client, already at full size.
    pub fn background(&mut self, handle: u64, output: &str) {
        let size = self.output(output).geometry.size;
        self.add_surface(handle, SHELL_CLIENT, None);
        self.commit(handle, Rectangle::from_size(size)).unwrap();
        self.ok(Event::SetBackground {
            surface: SurfaceHandle(handle),
            output: output.to_owned(),
        });
    }

    /// Panel surface of the shell client with `extent` pixels of content.
    pub fn panel(&mut self, handle: u64, output: &str, edge: Edge, extent: i32) {
        let size = self.output(output).geometry.size;
        let geometry = if edge.is_horizontal() {
            rect(0, 0, size.w, extent)
        } else {
            rect(0, 0, extent, size.h)
        };
        self.add_surface(handle, SHELL_CLIENT, None);
        self.commit(handle, geometry).unwrap();
        self.ok(Event::SetPanel {
            surface: SurfaceHandle(handle),
            output: output.to_owned(),
            edge: edge_wire(edge),
        });
    }

    /// Application shown through the default activation and its handshake.
    pub fn launch(&mut self, handle: u64, app_id: &str) {
        self.add_app(handle, app_id);
        self.commit(handle, rect(0, 0, 800, 600)).unwrap();
        self.ack(handle).unwrap();
    }

    pub fn property(&mut self, app_id: &str, role: u32, output: &str) {
        self.ok(Event::SetAppProperty {
            app_id: app_id.to_owned(),
            role,
            x: 0,
            y: 0,
            clip: None,
            output: output.to_owned(),
        });
    }

    pub fn activate(&mut self, app_id: &str, output: &str) {
        self.ok(Event::ActivateApp {
            app_id: app_id.to_owned(),
            output: output.to_owned(),
        });
    }

    pub fn deactivate(&mut self, app_id: &str) {
        self.ok(Event::DeactivateApp {
            app_id: app_id.to_owned(),
        });
    }

    pub fn destroy(&mut self, handle: u64) {
        self.ok(Event::SurfaceRemoved {
            surface: SurfaceHandle(handle),
        });
    }

    pub fn id(&self, handle: u64) -> SurfaceId {
        self.shell.surface_by_handle(SurfaceHandle(handle)).unwrap()
    }

    pub fn role(&self, handle: u64) -> Role {
        *self.shell.surfaces.get(self.id(handle)).unwrap().role()
    }

    pub fn layer(&self, handle: u64) -> Option<Layer> {
        self.shell.view_of(self.id(handle)).and_then(|view| view.layer)
    }

    pub fn geometry(&self, handle: u64) -> Rectangle<i32, Logical> {
        self.shell.view_of(self.id(handle)).unwrap().geometry()
    }

    pub fn is_mapped(&self, handle: u64) -> bool {
        self.shell.is_mapped(self.id(handle))
    }
}

pub fn edge_wire(edge: Edge) -> u32 {
    match edge {
        Edge::Top => 0,
        Edge::Bottom => 1,
        Edge::Left => 2,
        Edge::Right => 3,
    }
}
