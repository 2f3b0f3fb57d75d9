//! Running API calls off the caller's thread.
//!
//! # Design
//! Each submitted call is an independent unit of work on tokio's blocking
//! pool; its single outcome is handed to a completion callback. Calls share
//! nothing but the service they run against (`Api` or `Account`), which is
//! `Sync`. There is no cancellation: a caller that stopped listening simply
//! ignores the callback.

use std::io;
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

pub struct Dispatcher<S> {
    service: Arc<S>,
    runtime: Runtime,
}

impl<S: Send + Sync + 'static> Dispatcher<S> {
    pub fn new(service: S) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("aischool-api")
            .enable_all()
            .build()?;
        Ok(Self {
            service: Arc::new(service),
            runtime,
        })
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run `call` in the background and pass its result to `on_complete`.
    pub fn submit<R, F, C>(&self, call: F, on_complete: C) -> JoinHandle<()>
    where
        R: Send + 'static,
        F: FnOnce(&S) -> R + Send + 'static,
        C: FnOnce(R) + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        self.runtime
            .spawn_blocking(move || on_complete(call(&service)))
    }
}
