//! The host-visible proxy wrapper

use objstore_wire::InstanceId;

use crate::delete_queue::DeleteQueue;

/// A live, user-visible reference to an object that actually lives in the
/// kernel process.
///
/// Unlike `objstore_kernel::Proxy`, this holds no referent at all — the real
/// object is on the other side of the process boundary; this type is purely
/// an identity token plus the drop hook that lets the host notice when it is
/// no longer needed.
#[derive(Debug)]
pub struct HostProxy {
    instance_id: InstanceId,
    pending_delete: DeleteQueue,
}

impl HostProxy {
    pub(crate) fn new(instance_id: InstanceId, pending_delete: DeleteQueue) -> Self {
        HostProxy { instance_id, pending_delete }
    }

    /// The instance id this proxy refers to.
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }
}

impl Drop for HostProxy {
    fn drop(&mut self) {
        log::trace!("host proxy for {} collected", self.instance_id);
        self.pending_delete.mark_pending(self.instance_id.clone());
    }
}
