//! UI dispatch and window manager capabilities
//!
//! Lifecycle callbacks are expected on the host's UI dispatch thread.
//! Window-manager interaction is marshaled there through an async
//! hand-off and the caller awaits completion before returning.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ScreenId;

/// A unit of work posted to the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Posts tasks onto the host's UI dispatch thread.
pub trait UiDispatcher: Send + Sync {
    /// Queue a task; fails if the dispatcher has shut down
    fn post(&self, task: UiTask) -> Result<()>;
}

/// Host window manager, keyed by tracked screen handle.
#[async_trait]
pub trait WindowManager: Send + Sync {
    /// Show the screen in a regular window
    async fn show_window(&self, screen: ScreenId) -> Result<()>;

    /// Show the screen as a modal dialog, returning the dialog result
    async fn show_dialog(&self, screen: ScreenId) -> Result<Option<bool>>;
}
