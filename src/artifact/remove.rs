//! Resource removal: delete whatever subset of artifacts exists, then strip
//! the documentation entries.

use crate::artifact::types::ArtifactPaths;
use crate::docs;
use crate::error::GenError;
use std::fs;

/// Remove `name`. The route descriptor gates the whole operation; the model
/// and controller specs are deleted only if individually present, since a
/// failed synthesis can leave partial state behind. File deletion is not
/// transactional with the document rewrite: a doc-sync failure after the
/// files are gone leaves the two path entries orphaned, and is only logged.
pub fn remove_resource(paths: &ArtifactPaths, name: &str) -> Result<(), GenError> {
    let route_path = paths.route(name);
    if !route_path.exists() {
        return Err(GenError::NotFound(name.to_string()));
    }
    fs::remove_file(&route_path)?;
    tracing::info!(route = %route_path.display(), "route descriptor removed");

    for path in [paths.model(name), paths.controller(name)] {
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::info!(artifact = %path.display(), "artifact removed");
        }
    }

    if let Err(e) = docs::remove_resource(&paths.docs(), name) {
        tracing::error!(error = %e, "failed to update API document");
    }
    Ok(())
}
