use std::path::Path;
use tracing::debug;

use crate::contract::ArtifactVerifier;

/// Checks paths against the local filesystem. Existence only; contents are
/// never inspected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsVerifier;

impl ArtifactVerifier for FsVerifier {
    fn exists(&self, path: &Path) -> bool {
        let found = path.exists();
        debug!(path = %path.display(), found, "[VERIFY] Checked path");
        found
    }
}
