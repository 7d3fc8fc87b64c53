//! Navigation seam between the orchestration layer and whatever view
//! layer hosts it. The core never renders; it only asks to move.

use shared::domain::InstanceId;

pub trait Navigator: Send + Sync {
    /// Show the top-level instance list view.
    fn show_instance_list(&self);
    /// Show the namespace detail view for one instance.
    fn show_namespace_view(&self, instance_id: InstanceId);
}

/// Stands in where no view layer is attached.
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn show_instance_list(&self) {}
    fn show_namespace_view(&self, _instance_id: InstanceId) {}
}
