//! Role hints announced with `set_app_property` before the surface exists.

use smithay::utils::{Logical, Point, Rectangle};

use crate::{ShellError, errors::Result, output::OutputId, surface::Orientation};

/// Application role as carried by `set_app_property`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRole {
    Popup,
    Fullscreen,
    SplitVertical,
    SplitHorizontal,
    Remote,
}

impl TryFrom<u32> for AppRole {
    type Error = ShellError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(AppRole::Popup),
            1 => Ok(AppRole::Fullscreen),
            2 => Ok(AppRole::SplitVertical),
            3 => Ok(AppRole::SplitHorizontal),
            4 => Ok(AppRole::Remote),
            other => Err(ShellError::InvalidRole(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingHint {
    Popup {
        anchor: Point<i32, Logical>,
        clip: Option<Rectangle<i32, Logical>>,
    },
    Split(Orientation),
    Fullscreen,
    Remote,
}

impl PendingHint {
    pub fn kind(&self) -> PendingKind {
        match self {
            PendingHint::Popup { .. } => PendingKind::Popup,
            PendingHint::Split(_) => PendingKind::Split,
            PendingHint::Fullscreen => PendingKind::Fullscreen,
            PendingHint::Remote => PendingKind::Remote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub app_id: String,
    pub output: OutputId,
    pub hint: PendingHint,
}

impl PendingRegistration {
    pub fn new(
        app_id: impl Into<String>,
        role: AppRole,
        anchor: Point<i32, Logical>,
        clip: Option<Rectangle<i32, Logical>>,
        output: OutputId,
    ) -> Self {
        let hint = match role {
            AppRole::Popup => PendingHint::Popup { anchor, clip },
            AppRole::Fullscreen => PendingHint::Fullscreen,
            AppRole::SplitVertical => PendingHint::Split(Orientation::Vertical),
            AppRole::SplitHorizontal => PendingHint::Split(Orientation::Horizontal),
            AppRole::Remote => PendingHint::Remote,
        };
        PendingRegistration {
            app_id: app_id.into(),
            output,
            hint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Popup,
    Split,
    Fullscreen,
    Remote,
}

impl PendingKind {
    /// Order in which the queues are consulted; first match wins.
    pub const PRIORITY: [PendingKind; 4] = [
        PendingKind::Popup,
        PendingKind::Split,
        PendingKind::Fullscreen,
        PendingKind::Remote,
    ];

    fn index(self) -> usize {
        match self {
            PendingKind::Popup => 0,
            PendingKind::Split => 1,
            PendingKind::Fullscreen => 2,
            PendingKind::Remote => 3,
        }
    }
}

#[derive(Debug, Default)]
pub struct PendingQueues {
    queues: [Vec<PendingRegistration>; 4],
    keep_pending: bool,
}

impl PendingQueues {
    pub fn new(keep_pending: bool) -> Self {
        PendingQueues {
            queues: Default::default(),
            keep_pending,
        }
    }

    pub fn insert(&mut self, registration: PendingRegistration) {
        tracing::debug!(
            app_id = %registration.app_id,
            kind = ?registration.hint.kind(),
            "pending registration added"
        );
        self.queues[registration.hint.kind().index()].push(registration);
    }

    /// Oldest registration for `app_id` in the highest-priority queue that
    /// has one. Consumed unless keep-pending mode is on.
    pub fn take(&mut self, app_id: &str) -> Option<PendingRegistration> {
        for kind in PendingKind::PRIORITY {
            let queue = &mut self.queues[kind.index()];
            let Some(position) = queue.iter().position(|entry| entry.app_id == app_id) else {
                continue;
            };
            if self.keep_pending {
                return Some(queue[position].clone());
            }
            return Some(queue.remove(position));
        }
        None
    }

    /// Looks at a queue without consuming anything.
    pub fn peek(&self, kind: PendingKind, app_id: &str) -> Option<&PendingRegistration> {
        self.queues[kind.index()]
            .iter()
            .find(|entry| entry.app_id == app_id)
    }

    pub fn keep_pending(&self) -> bool {
        self.keep_pending
    }

    /// Switching keep-pending off drops every registration.
    pub fn set_keep_pending(&mut self, keep_pending: bool) {
        self.keep_pending = keep_pending;
        if !keep_pending {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }

    /// Drops registrations pointing at a removed output.
    pub fn purge_output(&mut self, output: OutputId) {
        for queue in &mut self.queues {
            queue.retain(|entry| entry.output != output);
        }
    }

    pub fn len(&self) -> usize {
        self.queues.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn outputs(count: usize) -> Vec<OutputId> {
        let mut keys = SlotMap::<OutputId, ()>::with_key();
        (0..count).map(|_| keys.insert(())).collect()
    }

    fn registration(app_id: &str, role: AppRole, output: OutputId) -> PendingRegistration {
        PendingRegistration::new(app_id, role, Point::from((100, 50)), None, output)
    }

    #[test]
    fn app_role_wire_values() {
        assert_eq!(AppRole::try_from(0).unwrap(), AppRole::Popup);
        assert_eq!(AppRole::try_from(2).unwrap(), AppRole::SplitVertical);
        assert_eq!(AppRole::try_from(4).unwrap(), AppRole::Remote);
        assert!(matches!(AppRole::try_from(5), Err(ShellError::InvalidRole(5))));
    }

    #[test]
    fn registrations_are_consumed_once() {
        let output = outputs(1)[0];
        let mut queues = PendingQueues::new(false);
        queues.insert(registration("nav", AppRole::Popup, output));

        assert!(queues.take("nav").is_some());
        assert!(queues.take("nav").is_none());
        assert!(queues.is_empty());
    }

    #[test]
    fn keep_pending_reuses_registrations() {
        let output = outputs(1)[0];
        let mut queues = PendingQueues::new(true);
        queues.insert(registration("nav", AppRole::Fullscreen, output));

        assert_eq!(queues.take("nav").unwrap().hint, PendingHint::Fullscreen);
        assert_eq!(queues.take("nav").unwrap().hint, PendingHint::Fullscreen);

        queues.set_keep_pending(false);
        assert!(queues.is_empty());
        assert!(queues.take("nav").is_none());
    }

    #[test]
    fn priority_order_decides_between_queues() {
        let output = outputs(1)[0];
        let mut queues = PendingQueues::new(false);
        queues.insert(registration("nav", AppRole::Remote, output));
        queues.insert(registration("nav", AppRole::Fullscreen, output));
        queues.insert(registration("nav", AppRole::SplitHorizontal, output));
        queues.insert(registration("nav", AppRole::Popup, output));

        let order: Vec<PendingKind> = std::iter::from_fn(|| queues.take("nav"))
            .map(|entry| entry.hint.kind())
            .collect();
        assert_eq!(order, PendingKind::PRIORITY.to_vec());
    }

    #[test]
    fn same_queue_is_fifo_and_keyed_by_app_id() {
        let ids = outputs(2);
        let mut queues = PendingQueues::new(false);
        queues.insert(registration("media", AppRole::Remote, ids[0]));
        queues.insert(registration("nav", AppRole::Remote, ids[0]));
        queues.insert(registration("nav", AppRole::Remote, ids[1]));

        assert_eq!(queues.peek(PendingKind::Remote, "nav").unwrap().output, ids[0]);
        assert_eq!(queues.take("nav").unwrap().output, ids[0]);
        assert_eq!(queues.take("nav").unwrap().output, ids[1]);
        assert_eq!(queues.len(), 1);
    }

    #[test]
    fn removed_output_purges_its_registrations() {
        let ids = outputs(2);
        let mut queues = PendingQueues::new(true);
        queues.insert(registration("nav", AppRole::Popup, ids[0]));
        queues.insert(registration("media", AppRole::Remote, ids[1]));

        queues.purge_output(ids[0]);
        assert!(queues.take("nav").is_none());
        assert!(queues.take("media").is_some());
    }
}
