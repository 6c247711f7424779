//! Watch payloads delivered to the router.

use serde::{Deserialize, Serialize};

use appwatch_state::Pod;

/// Last-known state of a pod whose deletion was observed only
/// indirectly, e.g. after the watch was re-listed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tombstone {
    /// `namespace/name` of the deleted object.
    pub key: String,
    /// Final cached state, if the watch layer still had one.
    #[serde(default)]
    pub last_known: Option<Pod>,
}

/// Payload of a delete notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeletedPod {
    Live(Pod),
    FinalStateUnknown(Tombstone),
}

impl DeletedPod {
    /// Best-effort pod identity, or `None` for a tombstone without state.
    pub fn into_pod(self) -> Option<Pod> {
        match self {
            Self::Live(pod) => Some(pod),
            Self::FinalStateUnknown(tombstone) => tombstone.last_known,
        }
    }
}

impl From<Pod> for DeletedPod {
    fn from(pod: Pod) -> Self {
        Self::Live(pod)
    }
}

/// One pod lifecycle notification from the watch layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatchEvent {
    Added { pod: Pod },
    Updated { old: Pod, new: Pod },
    Deleted { object: DeletedPod },
}
