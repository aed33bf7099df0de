// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command frame dispatch and response assembly
//!
//! [`App`] wraps an [`Engine`], decoding raw command frames to [`Event`]s
//! and encoding [`Output`]s (or errors) to `[data][status]` responses.
//! Framing errors leave the request in progress untouched, all other
//! failures discard it.

use ledger_ton_apdu::{Command, StatusWord, DEFAULT_APDU_CLA, TON_APDU_CLA};

use crate::engine::{Decision, Driver, Engine, Error, Event, Output, PendingDecision, Review};

/// Result of handling a command frame
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Reply {
    /// Response of the provided length (data and status) is ready to send
    Response(usize),
    /// Response deferred pending a user decision on the presented [`Review`]
    Deferred,
}

/// Application, dispatching command frames to an [`Engine`]
pub struct App<DRV: Driver> {
    engine: Engine<DRV>,
    review: Option<Review>,
}

impl<DRV: Driver> App<DRV> {
    /// Create a new application with the provided driver
    pub const fn new(drv: DRV) -> Self {
        Self {
            engine: Engine::new(drv),
            review: None,
        }
    }

    /// Handle a received command frame, writing any response to `tx`
    pub fn handle_apdu(&mut self, rx: &[u8], tx: &mut [u8]) -> Reply {
        #[cfg(feature = "log")]
        log::trace!("rx: {:02x?}", rx);

        let cmd = match Command::parse(rx) {
            Ok(c) => c,
            Err(_e) => {
                #[cfg(feature = "log")]
                log::warn!("malformed frame: {:?}", _e);

                return Reply::Response(write_status(tx, 0, StatusWord::MalformedFrame));
            }
        };

        let r = match cmd.cla {
            TON_APDU_CLA | DEFAULT_APDU_CLA => self.dispatch(&cmd),
            _ => {
                self.reset();
                Err(Error::ClaNotSupported)
            }
        };

        match r {
            Ok(Output::Review(review)) => {
                #[cfg(feature = "log")]
                log::info!("review: {} ({:?})", review.title, review.handle);

                self.review = Some(review);
                Reply::Deferred
            }
            r => Reply::Response(self.respond(r, tx)),
        }
    }

    /// Fetch the presented review, if any
    pub fn review(&self) -> Option<&Review> {
        self.review.as_ref()
    }

    /// Provide the user's decision for a presented review, writing the
    /// deferred response to `tx` and returning the response length
    pub fn decide(&mut self, handle: PendingDecision, decision: Decision, tx: &mut [u8]) -> usize {
        self.review = None;

        let r = self.engine.resume(handle, decision);

        self.respond(r, tx)
    }

    /// Fetch the wrapped engine
    pub fn engine(&self) -> &Engine<DRV> {
        &self.engine
    }

    /// Discard any request in progress
    pub fn reset(&mut self) {
        self.review = None;
        self.engine.reset();
    }

    fn dispatch(&mut self, cmd: &Command) -> Result<Output, Error> {
        let evt = match Event::parse(cmd) {
            Ok(v) => v,
            Err(e) => {
                #[cfg(feature = "log")]
                log::warn!("command decode failed: {:?}", e);

                self.reset();
                return Err(e);
            }
        };

        // Any new command supersedes a presented review
        self.review = None;

        self.engine.update(&evt)
    }

    fn respond(&mut self, r: Result<Output, Error>, tx: &mut [u8]) -> usize {
        let e = match r.map(|o| o.encode(tx)) {
            Ok(Ok(n)) => match StatusWord::Success.write_response(tx, n) {
                Ok(len) => return len,
                Err(_) => {
                    self.reset();
                    Error::EncodingFailure
                }
            },
            Ok(Err(_)) => {
                self.reset();
                Error::EncodingFailure
            }
            Err(e) => {
                // Clear review where the engine has discarded the request
                self.review = None;
                e
            }
        };

        #[cfg(feature = "log")]
        log::debug!("error response: {:?} ({})", e, e.status());

        write_status(tx, 0, e.status())
    }
}

/// Write a status word following `n` bytes of data, returning the response length
fn write_status(tx: &mut [u8], n: usize, sw: StatusWord) -> usize {
    match sw.write_response(tx, n) {
        Ok(len) => len,
        // Buffers shorter than a status word can carry no response
        Err(_) => 0,
    }
}
