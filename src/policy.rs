//! Policy gate consulted before state-changing operations.
//!
//! Every hook is a synchronous yes/no answer. Implementations must return
//! quickly: they run on the event-loop thread and stall the whole shell
//! while they decide.

use crate::{output::OutputId, surface::{RoleKind, SurfaceId}};

#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub surface: SurfaceId,
    pub app_id: Option<&'a str>,
    pub role: RoleKind,
    pub output: Option<OutputId>,
}

pub trait PolicyGate {
    /// A new client surface is about to be tracked by the shell.
    fn surface_create(&self, _ctx: &PolicyContext<'_>) -> bool {
        true
    }

    fn surface_commit(&self, _ctx: &PolicyContext<'_>) -> bool {
        true
    }

    fn surface_activate(&self, _ctx: &PolicyContext<'_>) -> bool {
        true
    }

    fn surface_deactivate(&self, _ctx: &PolicyContext<'_>) -> bool {
        true
    }

    /// A desktop surface committed without anybody asking for it to be shown.
    fn surface_activate_by_default(&self, _ctx: &PolicyContext<'_>) -> bool {
        true
    }

    /// A `state_app` notification is about to be sent to desktop clients.
    fn surface_advertise_state_change(&self, _ctx: &PolicyContext<'_>) -> bool {
        true
    }
}

/// Default gate: allows everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl PolicyGate for AllowAll {}
