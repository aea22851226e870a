use thiserror::Error;

use crate::projection::ProjectionError;
use crate::store::StoreError;

pub type InsetResult<T> = std::result::Result<T, InsetError>;

/// Failure kinds of the inset subsystem. None of them is fatal to the primary
/// view: projection and view failures stay inside their own inset, a missing
/// bookmark only drops its row.
#[derive(Debug, Error)]
pub enum InsetError {
    #[error("bookmark '{name}' does not exist")]
    MissingBookmark { name: String },
    #[error("failed to project extent of '{name}' to wkid {wkid}: {source}")]
    Projection {
        name: String,
        wkid: u32,
        source: ProjectionError,
    },
    #[error("inset view '{name}' failed to initialize: {message}")]
    ViewInit { name: String, message: String },
    #[error("configuration store failed for '{app_id}'")]
    Persistence { app_id: String, source: StoreError },
    #[error("no configuration row for bookmark '{name}'")]
    UnknownRow { name: String },
}
