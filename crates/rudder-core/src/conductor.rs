//! Window conduction and result hand-off
//!
//! Lifecycle callbacks belong on the host's UI dispatch thread. The
//! conductor marshals activation and window-manager calls there through
//! an async hand-off; result channels let a controller supply a value a
//! caller awaits, with cooperative cancellation.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use rudder_domain::error::{Error, Result};
use rudder_domain::ports::dispatch::{UiDispatcher, UiTask, WindowManager};
use rudder_domain::ports::screen::Screen;
use rudder_domain::types::ScreenId;

use crate::proxy::screen_proxy::SharedScreen;

/// Sending half of the UI task channel.
///
/// The receiving half is pumped by the host's UI thread; see
/// [`ui_channel`].
#[derive(Clone)]
pub struct UiHandle {
    sender: mpsc::UnboundedSender<UiTask>,
}

/// Create the UI task channel. The host owns the receiver and runs each
/// task on its dispatch thread.
pub fn ui_channel() -> (UiHandle, mpsc::UnboundedReceiver<UiTask>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (UiHandle { sender }, receiver)
}

impl UiHandle {
    /// Run a closure on the UI thread and await its result.
    pub async fn run_on_ui<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (done, completion) = oneshot::channel();
        self.post(Box::new(move || {
            // receiver gone means the caller gave up awaiting
            let _ = done.send(work());
        }))?;
        completion
            .await
            .map_err(|_| Error::canceled("ui task"))
    }
}

impl UiDispatcher for UiHandle {
    fn post(&self, task: UiTask) -> Result<()> {
        self.sender
            .send(task)
            .map_err(|_| Error::canceled("ui dispatch"))
    }
}

impl std::fmt::Debug for UiHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiHandle")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// Drives screens through windows, marshaling lifecycle calls onto the
/// UI thread.
pub struct WindowConductor {
    ui: UiHandle,
    manager: Arc<dyn WindowManager>,
}

impl WindowConductor {
    /// A conductor over the given UI handle and window manager
    pub fn new(ui: UiHandle, manager: Arc<dyn WindowManager>) -> Self {
        Self { ui, manager }
    }

    fn screen_id(screen: &SharedScreen) -> Result<ScreenId> {
        Ok(Self::lock(screen)?.id())
    }

    fn lock(screen: &SharedScreen) -> Result<std::sync::MutexGuard<'_, crate::proxy::ScreenProxy>> {
        screen
            .lock()
            .map_err(|_| Error::internal("screen mutex poisoned"))
    }

    async fn activate_on_ui(&self, screen: &SharedScreen) -> Result<()> {
        let screen = Arc::clone(screen);
        self.ui
            .run_on_ui(move || Self::lock(&screen)?.on_activate())
            .await?
    }

    /// Activate a screen and show it in a regular window
    pub async fn show_window(&self, screen: &SharedScreen) -> Result<()> {
        let id = Self::screen_id(screen)?;
        self.activate_on_ui(screen).await?;
        debug!(screen = %id, "Showing window");
        self.manager.show_window(id).await
    }

    /// Activate a screen, show it as a modal dialog and run the closing
    /// lifecycle when the dialog returns
    pub async fn show_dialog(&self, screen: &SharedScreen) -> Result<Option<bool>> {
        let id = Self::screen_id(screen)?;
        self.activate_on_ui(screen).await?;
        debug!(screen = %id, "Showing dialog");
        let dialog_result = self.manager.show_dialog(id).await?;
        self.close(screen, dialog_result).await?;
        Ok(dialog_result)
    }

    /// Run the closing lifecycle: deactivate-for-close, then close
    pub async fn close(&self, screen: &SharedScreen, dialog_result: Option<bool>) -> Result<()> {
        let screen = Arc::clone(screen);
        self.ui
            .run_on_ui(move || {
                let mut guard = Self::lock(&screen)?;
                guard.on_deactivate(true)?;
                guard.on_close(dialog_result)
            })
            .await?
    }
}

impl std::fmt::Debug for WindowConductor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowConductor").finish()
    }
}

/// Controller-side half of a result hand-off.
pub struct ResultSource<T> {
    sender: oneshot::Sender<T>,
}

impl<T> ResultSource<T> {
    /// Supply the result. Fails with `Canceled` if the caller stopped
    /// waiting.
    pub fn supply(self, value: T) -> Result<()> {
        self.sender
            .send(value)
            .map_err(|_| Error::canceled("result hand-off"))
    }
}

impl<T> std::fmt::Debug for ResultSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSource").finish()
    }
}

/// Caller-side half of a result hand-off.
pub struct PendingResult<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> PendingResult<T> {
    /// Await the result, faulting with `Canceled` when the token fires
    /// or the source is dropped without supplying a value.
    ///
    /// Screen state already applied before cancellation stays applied.
    pub async fn get(self, token: &CancellationToken) -> Result<T> {
        tokio::select! {
            () = token.cancelled() => Err(Error::canceled("pending result")),
            value = self.receiver => value.map_err(|_| Error::canceled("pending result")),
        }
    }
}

impl<T> std::fmt::Debug for PendingResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResult").finish()
    }
}

/// A connected result hand-off pair.
pub fn result_channel<T>() -> (ResultSource<T>, PendingResult<T>) {
    let (sender, receiver) = oneshot::channel();
    (ResultSource { sender }, PendingResult { receiver })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_on_ui_round_trips_through_the_pump() {
        let (ui, mut tasks) = ui_channel();
        let pump = tokio::spawn(async move {
            while let Some(task) = tasks.recv().await {
                task();
            }
        });

        let value = ui.run_on_ui(|| 6 * 7).await.unwrap();
        assert_eq!(value, 42);

        drop(ui);
        pump.await.unwrap();
    }

    #[tokio::test]
    async fn posting_after_shutdown_is_canceled() {
        let (ui, tasks) = ui_channel();
        drop(tasks);
        let err = ui.run_on_ui(|| ()).await.unwrap_err();
        assert!(matches!(
            err,
            rudder_domain::error::Error::Canceled { .. }
        ));
    }

    #[tokio::test]
    async fn pending_result_yields_the_supplied_value() {
        let (source, pending) = result_channel::<u32>();
        let token = CancellationToken::new();
        source.supply(7).unwrap();
        assert_eq!(pending.get(&token).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn cancellation_faults_the_pending_result() {
        let (_source, pending) = result_channel::<u32>();
        let token = CancellationToken::new();
        token.cancel();
        let err = pending.get(&token).await.unwrap_err();
        assert!(matches!(
            err,
            rudder_domain::error::Error::Canceled { .. }
        ));
    }

    #[tokio::test]
    async fn dropped_source_faults_the_pending_result() {
        let (source, pending) = result_channel::<u32>();
        drop(source);
        let token = CancellationToken::new();
        assert!(pending.get(&token).await.is_err());
    }
}
