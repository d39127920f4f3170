use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Errors raised while resolving where the engine module lives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    #[error("unable to resolve the path of the running plug-in binary")]
    CannotResolveOwnPath,
}

/// Errors that can occur while bringing up or driving the engine.
///
/// None of these ever reach the plug-in host: the session records the failure,
/// stops advancing its lifecycle and renders silence from then on.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load engine module {path}: {reason}")]
    ModuleLoadFailed { path: PathBuf, reason: String },
    #[error("engine module is already in use by another session")]
    EngineBusy,
    #[error("engine initialisation failed with code {0}")]
    InitFailed(i32),
    #[error("engine refused to open slot {slot} (code {code})")]
    SlotOpenFailed { slot: i32, code: i32 },
    #[error("engine rejected song {path} (code {code})")]
    SongLoadFailed { path: PathBuf, code: i32 },
    #[error("engine session is not ready (state: {0:?})")]
    NotReady(SessionState),
}

impl EngineError {
    pub(crate) fn module_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        EngineError::ModuleLoadFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
