use smithay::utils::{Logical, Size};

use crate::{
    action::{Action, ConfigureStates},
    config::RuntimeConfig,
    output::{OutputId, OutputRegistry},
    pending::PendingQueues,
    policy::{AllowAll, PolicyContext, PolicyGate},
    protocols::desktop::{AppState, DesktopShellState},
    scene::{Scene, View},
    surface::{ClientId, RoleKind, SurfaceFlags, SurfaceHandle, SurfaceId, SurfaceRegistry},
};

/// Window-management state of the shell. Everything is mutated from the
/// event-loop thread through [`Shell::handle`].
pub struct Shell {
    pub config: RuntimeConfig,
    pub outputs: OutputRegistry,
    pub surfaces: SurfaceRegistry,
    pub pending: PendingQueues,
    pub scene: Scene,
    pub desktop_shell: DesktopShellState,
    /// Client bound to the shell interface, if any.
    pub shell_client: Option<ClientId>,
    pub ready: bool,

    policy: Box<dyn PolicyGate>,
    actions: Vec<Action>,
}

impl Shell {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_policy(config, Box::new(AllowAll))
    }

    pub fn with_policy(config: RuntimeConfig, policy: Box<dyn PolicyGate>) -> Self {
        let pending = PendingQueues::new(config.keep_pending);
        Self {
            config,
            outputs: OutputRegistry::default(),
            surfaces: SurfaceRegistry::default(),
            pending,
            scene: Scene::default(),
            desktop_shell: DesktopShellState::default(),
            shell_client: None,
            ready: false,
            policy,
            actions: Vec::new(),
        }
    }

    /// Drains the requests queued for clients since the last call.
    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    /// Drains the outputs that need a repaint.
    pub fn take_damage(&mut self) -> Vec<OutputId> {
        self.scene.take_damage()
    }

    pub fn surface_by_handle(&self, handle: SurfaceHandle) -> Option<SurfaceId> {
        self.surfaces.by_handle(handle)
    }

    pub fn output_by_name(&self, name: &str) -> Option<OutputId> {
        self.outputs.by_name(name)
    }

    pub fn view_of(&self, surface: SurfaceId) -> Option<&View> {
        let view = self.surfaces.get(surface)?.view;
        self.scene.view(view)
    }

    /// Whether the surface is shown to the user.
    pub fn is_mapped(&self, surface: SurfaceId) -> bool {
        self.surfaces
            .get(surface)
            .is_some_and(|surface| self.scene.is_mapped(surface.view))
    }

    pub(crate) fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub(crate) fn send_configure(
        &mut self,
        surface: SurfaceId,
        size: Size<i32, Logical>,
        states: ConfigureStates,
    ) {
        let Some(handle) = self.surfaces.get(surface).map(|surface| surface.handle) else {
            return;
        };
        tracing::trace!(%handle, ?size, ?states, "configure");
        self.actions.push(Action::Configure {
            surface: handle,
            size,
            states,
        });
    }

    pub(crate) fn kill_client(&mut self, client: ClientId, reason: String) {
        tracing::warn!(%client, %reason, "terminating client");
        self.actions.push(Action::KillClient { client, reason });
    }

    pub(crate) fn damage_all_outputs(&mut self) {
        for id in self.outputs.ids() {
            self.scene.damage_output(id);
        }
    }

    /// Asks the policy gate about `surface`. Unknown surfaces are denied.
    pub(crate) fn policy_allows(
        &self,
        surface: SurfaceId,
        output: Option<OutputId>,
        hook: impl Fn(&dyn PolicyGate, &PolicyContext<'_>) -> bool,
    ) -> bool {
        let Some(entry) = self.surfaces.get(surface) else {
            return false;
        };
        let ctx = PolicyContext {
            surface,
            app_id: entry.app_id.as_deref(),
            role: entry.kind(),
            output: output.or_else(|| entry.role().output()),
        };
        let allowed = hook(self.policy.as_ref(), &ctx);
        if !allowed {
            tracing::debug!(app_id = ?ctx.app_id, role = %ctx.role, "denied by policy");
        }
        allowed
    }

    /// Sends `state_app` for a live surface.
    pub(crate) fn notify_state(&mut self, surface: SurfaceId, state: AppState) {
        let Some(entry) = self.surfaces.get(surface) else {
            return;
        };
        let Some(app_id) = entry.app_id.clone() else {
            return;
        };
        let role = entry.kind();
        let output = entry.role().output();
        self.emit_state(surface, &app_id, role, output, state);
    }

    /// Sends `state_app` with explicit details, for surfaces that are
    /// already gone from the registry.
    pub(crate) fn emit_state(
        &mut self,
        surface: SurfaceId,
        app_id: &str,
        role: RoleKind,
        output: Option<OutputId>,
        state: AppState,
    ) {
        let ctx = PolicyContext {
            surface,
            app_id: Some(app_id),
            role,
            output,
        };
        if !self.policy.surface_advertise_state_change(&ctx) {
            tracing::debug!(%app_id, %state, "state change not advertised by policy");
            return;
        }
        tracing::debug!(%app_id, %state, %role, "state_app");
        let deliveries = self.desktop_shell.state_app(app_id, state, role);
        self.actions.extend(deliveries.into_iter().map(Action::from));
    }

    /// Sends `application` once for a desktop-family surface.
    pub(crate) fn advertise(&mut self, surface: SurfaceId) {
        let Some(entry) = self.surfaces.get_mut(surface) else {
            return;
        };
        if entry.flags.contains(SurfaceFlags::ADVERTISED) || !entry.kind().is_desktop_family() {
            return;
        }
        let Some(app_id) = entry.app_id.clone() else {
            return;
        };
        entry.flags.insert(SurfaceFlags::ADVERTISED);
        let deliveries = self.desktop_shell.application(&app_id);
        self.actions.extend(deliveries.into_iter().map(Action::from));
    }

    /// App ids of advertised surfaces, oldest surface first.
    pub(crate) fn advertised_app_ids(&self) -> Vec<String> {
        let mut advertised: Vec<(SurfaceId, &str)> = self
            .surfaces
            .iter()
            .filter(|(_, surface)| surface.flags.contains(SurfaceFlags::ADVERTISED))
            .filter_map(|(id, surface)| surface.app_id.as_deref().map(|app_id| (id, app_id)))
            .collect();
        advertised.sort_by_key(|(id, _)| self.surfaces.serial_of(*id));
        advertised
            .into_iter()
            .map(|(_, app_id)| app_id.to_owned())
            .collect()
    }
}
