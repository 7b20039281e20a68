//! Per-page progress events.

use crossbeam_channel::Sender;

/// Progress notification for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// Processing of the page began
    Started { page: u32 },
    /// The page plan is complete
    Finished { page: u32, blocks: usize, unresolved: usize },
    /// The page was not completed because the job was cancelled
    Skipped { page: u32 },
}

impl PageEvent {
    /// Page number the event refers to.
    pub fn page(&self) -> u32 {
        match self {
            PageEvent::Started { page }
            | PageEvent::Finished { page, .. }
            | PageEvent::Skipped { page } => *page,
        }
    }
}

/// Optional event sink shared by page workers.
#[derive(Debug, Clone, Default)]
pub(crate) struct Progress {
    sender: Option<Sender<PageEvent>>,
}

impl Progress {
    pub(crate) fn new(sender: Option<Sender<PageEvent>>) -> Self {
        Self { sender }
    }

    /// Send an event; a disconnected receiver is ignored.
    pub(crate) fn emit(&self, event: PageEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                log::debug!("Progress receiver dropped; page {} event discarded", event.page());
            }
        }
    }
}
