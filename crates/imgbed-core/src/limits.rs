use serde::{Deserialize, Serialize};

use crate::constants::{MAX_BATCH_COUNT, MAX_BATCH_SIZE, MAX_FILE_SIZE};

/// Per-file and per-batch limits enforced before any byte is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimits {
    pub max_file_size: u64,
    pub max_batch_size: u64,
    pub max_batch_count: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_batch_size: MAX_BATCH_SIZE,
            max_batch_count: MAX_BATCH_COUNT,
        }
    }
}
