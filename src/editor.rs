use std::time::Duration;

use tokio::sync::watch;

/// Handle to the rich-text detail editor.
///
/// The editor comes up asynchronously (in the terminal client, once the
/// screen has been set up). Instead of polling for it, callers await the
/// ready signal once, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct EditorHandle {
    ready: watch::Receiver<bool>,
    buffer: String,
}

/// Owned by whatever brings the editor up; fires the ready signal.
#[derive(Debug)]
pub struct EditorInit {
    ready: watch::Sender<bool>,
}

impl EditorInit {
    pub fn mark_ready(&self) {
        // receivers may already be gone when the editor closes early
        let _ = self.ready.send(true);
    }
}

/// Creates an editor handle that is not yet ready, plus the signal that
/// makes it ready.
pub fn editor_channel() -> (EditorHandle, EditorInit) {
    let (tx, rx) = watch::channel(false);
    (
        EditorHandle {
            ready: rx,
            buffer: String::new(),
        },
        EditorInit { ready: tx },
    )
}

impl EditorHandle {
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Waits for the editor to come up. Returns false if it did not within
    /// `timeout` or its initializer went away.
    pub async fn wait_ready(&mut self, timeout: Duration) -> bool {
        if self.is_ready() {
            return true;
        }
        match tokio::time::timeout(timeout, self.ready.wait_for(|ready| *ready)).await {
            Ok(Ok(_)) => true,
            Ok(Err(_)) => {
                tracing::warn!("Editor closed before becoming ready");
                false
            }
            Err(_) => {
                tracing::warn!("Editor not ready after {:?}", timeout);
                false
            }
        }
    }

    /// Loads content once the editor is ready. On timeout the content is
    /// not loaded and the caller keeps its own copy.
    pub async fn load(&mut self, html: &str, timeout: Duration) -> bool {
        if !self.wait_ready(timeout).await {
            return false;
        }
        self.buffer = html.to_string();
        true
    }

    pub fn content(&self) -> &str {
        &self.buffer
    }

    pub fn push(&mut self, c: char) {
        self.buffer.push(c);
    }

    pub fn pop(&mut self) {
        self.buffer.pop();
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
