//! Sink for workspace change events.

use uuid::Uuid;

use crate::events::FileChangeEvent;

/// Receives structural and content change events after they are durable.
///
/// Implemented by the presence hub, which fans the event out to every
/// connection in the workspace room. Delivery is best-effort: the call
/// never fails and never blocks on I/O.
pub trait ChangeNotifier: Send + Sync + std::fmt::Debug + 'static {
    /// Push a change event to everyone watching the workspace.
    fn notify_file_changed(&self, workspace_id: Uuid, event: FileChangeEvent);
}

/// Notifier that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify_file_changed(&self, _workspace_id: Uuid, _event: FileChangeEvent) {}
}
