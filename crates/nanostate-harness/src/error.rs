use thiserror::Error;

use crate::harness::InstanceId;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("unknown or unmounted instance {id:?}")]
    UnknownInstance { id: InstanceId },

    #[error("flush exceeded {limit} renders; a component keeps scheduling itself")]
    RenderLoop { limit: usize },

    #[error("render {epoch} of instance {id:?} is stale and cannot be committed")]
    StaleRender { id: InstanceId, epoch: u64 },
}
