//! Worker bridge for catalog and resolver jobs.
//!
//! Jobs are async but egui's update() is synchronous. Each job runs on
//! its own task (a `spawn_local` future on the web, a thread driven by
//! `pollster` natively) and its completion comes back over a channel.

use super::cache::{FetchDone, FetchJob};
use crate::overlay::{ResolveDone, ResolveJob};
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// A finished job.
#[derive(Debug)]
pub enum WorkerMessage {
    Fetched(FetchDone),
    Resolved(ResolveDone),
}

pub struct WorkerChannel {
    sender: Sender<WorkerMessage>,
    receiver: Receiver<WorkerMessage>,
}

impl Default for WorkerChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Runs a full catalog fetch in the background.
    #[cfg(target_arch = "wasm32")]
    pub fn fetch(&self, ctx: egui::Context, job: FetchJob) {
        let sender = self.sender.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let done = job.run(&super::http::GlooFetcher::new()).await;
            let _ = sender.send(WorkerMessage::Fetched(done));
            ctx.request_repaint();
        });
    }

    /// Runs a full catalog fetch on a worker thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn fetch(&self, ctx: egui::Context, job: FetchJob) {
        let sender = self.sender.clone();

        std::thread::spawn(move || {
            let done = match super::http::BlockingFetcher::new() {
                Ok(fetcher) => pollster::block_on(job.run(&fetcher)),
                Err(e) => job.fail(e),
            };
            let _ = sender.send(WorkerMessage::Fetched(done));
            ctx.request_repaint();
        });
    }

    /// Resolves a selected candidate in the background.
    #[cfg(target_arch = "wasm32")]
    pub fn resolve(&self, ctx: egui::Context, job: ResolveJob) {
        let sender = self.sender.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let done = job.run(&super::http::GlooFetcher::new()).await;
            let _ = sender.send(WorkerMessage::Resolved(done));
            ctx.request_repaint();
        });
    }

    /// Resolves a selected candidate on a worker thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn resolve(&self, ctx: egui::Context, job: ResolveJob) {
        let sender = self.sender.clone();

        std::thread::spawn(move || {
            let done = match super::http::BlockingFetcher::new() {
                Ok(fetcher) => pollster::block_on(job.run(&fetcher)),
                Err(e) => job.fail(e),
            };
            let _ = sender.send(WorkerMessage::Resolved(done));
            ctx.request_repaint();
        });
    }

    /// Non-blocking check for a finished job.
    pub fn try_recv(&self) -> Option<WorkerMessage> {
        self.receiver.try_recv().ok()
    }
}
