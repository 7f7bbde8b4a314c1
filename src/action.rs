//! Outbound effects produced while handling events.
//!
//! The shell never talks to clients directly. Every request it makes is
//! queued here and drained by whoever owns the wire connection.

use std::fmt;

use bitflags::bitflags;
use smithay::utils::{Logical, Size};

use crate::{
    protocols::desktop::{Delivery, Notification},
    surface::{ClientId, SurfaceHandle},
};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ConfigureStates: u8 {
        const MAXIMIZED  = 0b01;
        const FULLSCREEN = 0b10;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Ask a surface to take `size` with the given window states.
    Configure {
        surface: SurfaceHandle,
        size: Size<i32, Logical>,
        states: ConfigureStates,
    },
    /// Terminate a client connection after a protocol violation.
    KillClient { client: ClientId, reason: String },
    Notify {
        recipient: ClientId,
        notification: Notification,
    },
}

impl From<Delivery> for Action {
    fn from(delivery: Delivery) -> Self {
        Action::Notify {
            recipient: delivery.recipient,
            notification: delivery.notification,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Configure {
                surface,
                size,
                states,
            } => write!(f, "configure {surface} {}x{} {states:?}", size.w, size.h),
            Action::KillClient { client, reason } => write!(f, "kill {client}: {reason}"),
            Action::Notify {
                recipient,
                notification: Notification::Application { app_id },
            } => write!(f, "notify {recipient}: application {app_id}"),
            Action::Notify {
                recipient,
                notification:
                    Notification::StateApp {
                        app_id, state, role, ..
                    },
            } => write!(f, "notify {recipient}: state_app {app_id} {state} ({role})"),
        }
    }
}
