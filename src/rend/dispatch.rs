// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Rendezvous relay-command dispatcher (§4.4).
//!
//! A flat table keyed by command code, not virtual dispatch — the handler
//! set is closed and known at compile time, so a `match` on [`RelayCommand`]
//! is the whole dispatcher. The handlers themselves (introduction-point
//! establishment, introduce1/2 forwarding, rendezvous setup and acks) live
//! in downstream subsystems this crate does not own; [`RelayHandlers`] is
//! the seam they plug into.

use tracing::trace;

/// A rendezvous-related relay command code, as it appears on the wire.
///
/// Discriminants match the values the cell-parsing layer already assigns
/// them; an unrecognized code is a caller contract violation; by the time a
/// command reaches this dispatcher, the cell layer has already filtered for
/// these nine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum RelayCommand {
    /// Establish an introduction point.
    EstablishIntro = 32,
    /// Establish a rendezvous point.
    EstablishRendezvous = 33,
    /// Forward an INTRODUCE1 cell to the introduction point.
    Introduce1 = 34,
    /// Deliver an INTRODUCE2 cell to the hidden service.
    Introduce2 = 35,
    /// Forward a RENDEZVOUS1 cell to the client's rendezvous point.
    Rendezvous1 = 36,
    /// Deliver a RENDEZVOUS2 cell to the client.
    Rendezvous2 = 37,
    /// Notify the service that its introduction point is established.
    IntroEstablished = 38,
    /// Notify the client that its rendezvous point is established.
    RendezvousEstablished = 39,
    /// Acknowledge an INTRODUCE1 cell back to the client.
    IntroduceAck = 40,
}

impl RelayCommand {
    /// Map a raw wire command code to a known rendezvous command.
    ///
    /// Returns `None` for any code outside the nine this subsystem handles;
    /// the caller (which has already filtered by cell type) is expected
    /// never to hand this dispatcher an unknown code — see [`dispatch`].
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            32 => Self::EstablishIntro,
            33 => Self::EstablishRendezvous,
            34 => Self::Introduce1,
            35 => Self::Introduce2,
            36 => Self::Rendezvous1,
            37 => Self::Rendezvous2,
            38 => Self::IntroEstablished,
            39 => Self::RendezvousEstablished,
            40 => Self::IntroduceAck,
            _ => return None,
        })
    }
}

/// The downstream handler set a circuit must provide (§4.4 table, §6.4).
///
/// Each method receives the raw cell payload and its length and returns a
/// status code the dispatcher passes through unexamined — `dispatch` itself
/// cannot fail; only the handler can.
pub trait RelayHandlers {
    /// Handle `ESTABLISH_INTRO`.
    fn establish_intro(&mut self, payload: &[u8], length: usize) -> i32;
    /// Handle `ESTABLISH_RENDEZVOUS`.
    fn establish_rendezvous(&mut self, payload: &[u8], length: usize) -> i32;
    /// Handle `INTRODUCE1`.
    fn introduce1(&mut self, payload: &[u8], length: usize) -> i32;
    /// Handle `INTRODUCE2`.
    fn introduce2(&mut self, payload: &[u8], length: usize) -> i32;
    /// Handle `RENDEZVOUS1`.
    fn rendezvous1(&mut self, payload: &[u8], length: usize) -> i32;
    /// Handle `RENDEZVOUS2`.
    fn rendezvous2(&mut self, payload: &[u8], length: usize) -> i32;
    /// Handle `INTRO_ESTABLISHED`.
    fn intro_established(&mut self, payload: &[u8], length: usize) -> i32;
    /// Handle `RENDEZVOUS_ESTABLISHED`.
    fn rendezvous_established(&mut self, payload: &[u8], length: usize) -> i32;
    /// Handle `INTRODUCE_ACK`.
    fn introduce_ack(&mut self, payload: &[u8], length: usize) -> i32;
}

/// Route a rendezvous relay cell to the matching handler on `handlers`.
///
/// # Panics
/// `command` not mapping to a [`RelayCommand`] is a contract violation by
/// the caller (the cell-parsing layer is expected to have already filtered
/// for rendezvous commands). This mirrors the original's `tor_assert(0)` in
/// its `default:` branch: the dispatcher does not return an error code for
/// this case because there is no well-defined recovery.
pub fn dispatch<H: RelayHandlers>(handlers: &mut H, command: i32, length: usize, payload: &[u8]) -> i32 {
    let command = RelayCommand::from_code(command)
        .unwrap_or_else(|| panic!("unknown rendezvous relay command code {command}"));

    trace!(?command, length, "dispatching rendezvous relay cell");
    match command {
        RelayCommand::EstablishIntro => handlers.establish_intro(payload, length),
        RelayCommand::EstablishRendezvous => handlers.establish_rendezvous(payload, length),
        RelayCommand::Introduce1 => handlers.introduce1(payload, length),
        RelayCommand::Introduce2 => handlers.introduce2(payload, length),
        RelayCommand::Rendezvous1 => handlers.rendezvous1(payload, length),
        RelayCommand::Rendezvous2 => handlers.rendezvous2(payload, length),
        RelayCommand::IntroEstablished => handlers.intro_established(payload, length),
        RelayCommand::RendezvousEstablished => handlers.rendezvous_established(payload, length),
        RelayCommand::IntroduceAck => handlers.introduce_ack(payload, length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingHandlers {
        calls: RefCell<Vec<(&'static str, usize)>>,
    }

    impl RelayHandlers for RecordingHandlers {
        fn establish_intro(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls.borrow_mut().push(("establish_intro", length));
            0
        }
        fn establish_rendezvous(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls.borrow_mut().push(("establish_rendezvous", length));
            0
        }
        fn introduce1(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls.borrow_mut().push(("introduce1", length));
            0
        }
        fn introduce2(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls.borrow_mut().push(("introduce2", length));
            0
        }
        fn rendezvous1(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls.borrow_mut().push(("rendezvous1", length));
            0
        }
        fn rendezvous2(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls.borrow_mut().push(("rendezvous2", length));
            0
        }
        fn intro_established(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls.borrow_mut().push(("intro_established", length));
            0
        }
        fn rendezvous_established(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls
                .borrow_mut()
                .push(("rendezvous_established", length));
            0
        }
        fn introduce_ack(&mut self, _payload: &[u8], length: usize) -> i32 {
            self.calls.borrow_mut().push(("introduce_ack", length));
            0
        }
    }

    #[test]
    fn every_known_command_reaches_its_handler() {
        let cases: &[(i32, &str)] = &[
            (32, "establish_intro"),
            (33, "establish_rendezvous"),
            (34, "introduce1"),
            (35, "introduce2"),
            (36, "rendezvous1"),
            (37, "rendezvous2"),
            (38, "intro_established"),
            (39, "rendezvous_established"),
            (40, "introduce_ack"),
        ];
        for &(code, name) in cases {
            let mut h = RecordingHandlers::default();
            dispatch(&mut h, code, 7, b"payload");
            assert_eq!(h.calls.borrow().as_slice(), &[(name, 7)]);
        }
    }

    #[test]
    #[should_panic(expected = "unknown rendezvous relay command code 999")]
    fn unknown_command_panics() {
        let mut h = RecordingHandlers::default();
        dispatch(&mut h, 999, 0, b"");
    }

    #[test]
    fn from_code_rejects_adjacent_unrelated_commands() {
        assert_eq!(RelayCommand::from_code(31), None);
        assert_eq!(RelayCommand::from_code(41), None);
    }
}
