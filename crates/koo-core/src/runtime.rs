//! Tokio driver for `DirectoryApp`
//!
//! The controller runs on one task. Events arrive over an mpsc channel; the
//! task sleeps until either the next command or the next timer deadline, and
//! syncs the controller clock to real elapsed time before every step.

use crate::app::{DirectoryApp, PageView, UiEvent, VisitOutcome};
use crate::error::RuntimeError;
use crate::notify::{NotificationId, NotificationKind};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

const CHANNEL_CAPACITY: usize = 64;

/// Commands sent to the controller task
#[derive(Debug)]
enum Command {
    Event(UiEvent),
    Notify(String, NotificationKind, oneshot::Sender<NotificationId>),
    Visit(String, oneshot::Sender<VisitOutcome>),
    View(oneshot::Sender<PageView>),
    Shutdown,
}

/// Handle for talking to a running controller
#[derive(Debug, Clone)]
pub struct AppHandle {
    sender: mpsc::Sender<Command>,
}

impl AppHandle {
    /// Deliver a user event
    pub async fn send(&self, event: UiEvent) -> Result<(), RuntimeError> {
        self.command(Command::Event(event)).await
    }

    /// Show a notification
    pub async fn notify(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Result<NotificationId, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.command(Command::Notify(message.into(), kind, tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    /// Follow a card link
    pub async fn visit(&self, url: impl Into<String>) -> Result<VisitOutcome, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.command(Command::Visit(url.into(), tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    /// Current page snapshot
    pub async fn view(&self) -> Result<PageView, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.command(Command::View(tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    /// Stop the task; the join handle yields the controller
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.command(Command::Shutdown).await
    }

    async fn command(&self, command: Command) -> Result<(), RuntimeError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}

/// Run a controller on its own task
///
/// The task ends on `shutdown` or when every handle is dropped, returning
/// the controller.
#[must_use]
pub fn spawn_app(app: DirectoryApp) -> (AppHandle, JoinHandle<DirectoryApp>) {
    let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
    let task = tokio::spawn(run(app, receiver));
    (AppHandle { sender }, task)
}

async fn run(mut app: DirectoryApp, mut receiver: mpsc::Receiver<Command>) -> DirectoryApp {
    let started = Instant::now();
    let base = app.now();
    let clock = move || base + started.elapsed();

    loop {
        let wake = app
            .next_deadline()
            .map(|deadline| started + deadline.saturating_sub(base));

        tokio::select! {
            command = receiver.recv() => {
                app.advance_to(clock());
                match command {
                    Some(Command::Event(event)) => app.handle(event),
                    Some(Command::Notify(message, kind, reply)) => {
                        let _ = reply.send(app.notify(message, kind));
                    }
                    Some(Command::Visit(url, reply)) => {
                        let _ = reply.send(app.visit(&url));
                    }
                    Some(Command::View(reply)) => {
                        let _ = reply.send(app.view());
                    }
                    Some(Command::Shutdown) | None => break,
                }
            }
            () = sleep_until(wake) => {
                app.advance_to(clock());
            }
        }
    }

    tracing::debug!("Directory app task stopped at {:?}", clock());
    app
}

async fn sleep_until(wake: Option<Instant>) {
    match wake {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::directory::Directory;
    use std::time::Duration;

    fn started_app() -> DirectoryApp {
        let mut app = DirectoryApp::new(SiteConfig::default(), Directory::bundled());
        app.initialize(None);
        app
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_fires_in_real_time() {
        let (handle, task) = spawn_app(started_app());

        handle.send(UiEvent::SearchInput("aly".into())).await.unwrap();
        assert_eq!(handle.view().await.unwrap().visible_count(), 6);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(handle.view().await.unwrap().visible_count(), 1);

        handle.shutdown().await.unwrap();
        let app = task.await.unwrap();
        assert_eq!(app.outcome().visible_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn notifications_expire_without_input() {
        let (handle, task) = spawn_app(started_app());

        handle.notify("Hola", NotificationKind::Info).await.unwrap();
        assert_eq!(handle.view().await.unwrap().notifications.len(), 1);

        tokio::time::sleep(Duration::from_millis(5300)).await;
        assert!(handle.view().await.unwrap().notifications.is_empty());

        drop(handle);
        let app = task.await.unwrap();
        assert_eq!(app.next_deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn visit_goes_through_the_task() {
        let (handle, _task) = spawn_app(started_app());
        assert_eq!(handle.visit("ftp://x").await.unwrap(), VisitOutcome::Refused);
        assert_eq!(
            handle.visit("https://spoo.me/sv5").await.unwrap(),
            VisitOutcome::Open("https://spoo.me/sv5".into())
        );
    }

    #[tokio::test]
    async fn closed_task_reports_error() {
        let (handle, task) = spawn_app(started_app());
        handle.shutdown().await.unwrap();
        task.await.unwrap();
        assert_eq!(handle.view().await.unwrap_err(), RuntimeError::Closed);
    }
}
