//! DuelChess - Background Search
//!
//! Runs a single `choose_move` on its own thread so the caller stays
//! responsive. The thread owns its copy of the position and the engine; the
//! result comes back through a one-slot channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;

use crate::error::{ChessError, Result};
use crate::position::{Move, Position};
use crate::search::{SearchEngine, SearchResult};

/// Handle to a search running in the background
pub struct SearchHandle {
    receiver: Receiver<Result<SearchResult>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<SearchEngine>>,
    /// Result already taken off the channel by `poll`
    delivered: Option<SearchResult>,
}

/// Start `engine.choose_move(position, legal_moves)` on a new thread.
/// The engine is handed back by [`SearchHandle::wait_with_engine`] or
/// [`SearchHandle::into_engine`].
pub fn spawn_search(mut engine: SearchEngine, position: Position, legal_moves: Vec<Move>) -> SearchHandle {
    let (sender, receiver) = mpsc::sync_channel(1);
    let stop = engine.stop_handle();

    let thread = thread::spawn(move || {
        let result = engine.choose_move(&position, &legal_moves);
        // The receiver may already be gone; nothing to report to then.
        if sender.send(result).is_err() {
            debug!("search result dropped, handle no longer listening");
        }
        engine
    });

    SearchHandle {
        receiver,
        stop,
        thread: Some(thread),
        delivered: None,
    }
}

impl SearchHandle {
    /// Non-blocking check. `Ok(None)` while the search is still running.
    /// Once the result has arrived every later call returns it again.
    pub fn poll(&mut self) -> Result<Option<SearchResult>> {
        if let Some(result) = self.delivered {
            return Ok(Some(result));
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                let result = result?;
                self.delivered = Some(result);
                Ok(Some(result))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ChessError::WorkerDisconnected),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.delivered.is_some() || self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Block until the search finishes
    pub fn wait(self) -> Result<SearchResult> {
        self.wait_with_engine().map(|(result, _)| result)
    }

    /// Block until the search finishes and take the engine back for reuse
    pub fn wait_with_engine(mut self) -> Result<(SearchResult, SearchEngine)> {
        let result = match self.delivered.take() {
            Some(result) => Ok(result),
            None => self
                .receiver
                .recv()
                .map_err(|_| ChessError::WorkerDisconnected)?,
        };
        let engine = self.join()?;
        Ok((result?, engine))
    }

    /// Wait for the thread and take the engine back, discarding any result
    /// not yet collected.
    pub fn into_engine(mut self) -> Result<SearchEngine> {
        self.join()
    }

    /// Ask the search to stop. It still finishes its first root move and
    /// returns the best fully evaluated one. A cancel that comes too late is
    /// cleared when the engine is taken back.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn join(&mut self) -> Result<SearchEngine> {
        let engine = self
            .thread
            .take()
            .ok_or(ChessError::WorkerDisconnected)?
            .join()
            .map_err(|_| ChessError::WorkerDisconnected)?;
        // a late cancel must not carry over into the engine's next search
        self.stop.store(false, Ordering::SeqCst);
        Ok(engine)
    }
}
