//! Game session state machine
//!
//! ```text
//! AwaitingConnection ──connect()──► Running ──Back pressed──► Terminated
//!         │
//!         └── no controller ──► SessionError::ControllerNotConnected
//! ```
//!
//! All game state (score, current challenge, edge detector) lives in the
//! session value and is only touched by the loop that owns it. Rumble pulses
//! run detached and never feed back into it.

use std::io::Write;

use chrono::{DateTime, Local};
use statum::{machine, state};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use super::challenge::{Challenge, ChallengeGenerator};
use super::error::SessionError;
use super::score::ScoreState;
use crate::config::{CONTROLLER_SLOT, FRAME_RATE};
use crate::console::{self, Verdict};
use crate::controller::{Buttons, ControllerSource, EdgeDetector};
use crate::haptics::Pulse;

/// What a finished session looked like, for the logs
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub ticks: u64,
    pub late_frames: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing new was pressed
    Idle,
    Hit,
    Miss,
    /// Exit button pressed, the loop stops
    Exit,
}

#[state]
#[derive(Debug, Clone)]
pub enum SessionState {
    AwaitingConnection,
    Running,
    Terminated(SessionSummary),
}

#[machine]
#[derive(Debug)]
pub struct Session<S: SessionState> {
    // Input and rumble
    controller: Box<dyn ControllerSource>,

    // Press detection with hold suppression
    edges: EdgeDetector,

    challenges: ChallengeGenerator,

    // Button the player has to press now
    challenge: Challenge,

    score: ScoreState,

    // Loop bookkeeping, the clock starts once the controller is confirmed
    started_at: Option<DateTime<Local>>,
    ticks: u64,
    late_frames: u64,
}

impl<S: SessionState> Session<S> {
    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn challenge(&self) -> Challenge {
        self.challenge
    }
}

impl Session<AwaitingConnection> {
    pub fn create(controller: Box<dyn ControllerSource>, mut challenges: ChallengeGenerator) -> Self {
        let challenge = challenges.next();
        debug!("Creating session, first challenge {:?}", challenge);

        Self::new(
            controller,
            EdgeDetector::new(),
            challenges,
            challenge,
            ScoreState::default(),
            None,
            0, // ticks
            0, // late_frames
        )
    }

    /// Checks the controller once and starts the game if it is there
    ///
    /// A missing controller is final, there is no retry.
    pub fn connect<W: Write>(mut self, out: &mut W) -> Result<Session<Running>, SessionError> {
        if !self.controller.is_connected() {
            warn!("No controller in slot {}", CONTROLLER_SLOT);
            console::connection_status(out, false)?;
            return Err(SessionError::ControllerNotConnected(CONTROLLER_SLOT));
        }

        self.controller.vibrate(Pulse::CONNECTED);
        console::connection_status(out, true)?;
        console::prompt(out, self.challenge)?;

        let started_at = Local::now();
        self.started_at = Some(started_at);
        info!("Session started at {}", started_at.format("%H:%M:%S.%3f"));
        Ok(self.transition())
    }
}

impl Session<Running> {
    /// One frame: sample, detect a press, score it
    pub fn tick<W: Write>(&mut self, out: &mut W) -> Result<TickOutcome, SessionError> {
        self.ticks += 1;

        let sample = self.controller.sample();
        let Some(event) = self.edges.observe(sample) else {
            return Ok(TickOutcome::Idle);
        };

        if event.contains(Buttons::BACK) {
            info!("Exit button pressed after {} ticks", self.ticks);
            console::end_of_session(out)?;
            return Ok(TickOutcome::Exit);
        }

        let outcome = if event == self.challenge.mask() {
            self.score.record_hit();
            self.controller.vibrate(Pulse::HIT);
            console::verdict(out, self.challenge, Verdict::Ok)?;

            self.challenge = self.challenges.next();
            debug!("Hit, next challenge {:?}", self.challenge);
            TickOutcome::Hit
        } else {
            self.score.record_miss();
            self.controller.vibrate(Pulse::MISS);
            console::verdict(out, self.challenge, Verdict::Ko)?;

            debug!(
                "Miss: wanted {:?}, got {:?} ({:?})",
                self.challenge,
                event,
                Challenge::from_mask(event)
            );
            TickOutcome::Miss
        };

        console::prompt(out, self.challenge)?;
        Ok(outcome)
    }

    /// Ticks at [`FRAME_RATE`] until the exit button is pressed
    ///
    /// Deadlines accumulate from the start instant, so time spent inside a
    /// tick does not push later frames back.
    pub async fn run<W: Write>(mut self, out: &mut W) -> Result<Session<Terminated>, SessionError> {
        let frame_gap = Duration::from_millis(1000 / FRAME_RATE);
        info!("Entering game loop with {:?} frames", frame_gap);

        let mut next_frame = Instant::now();
        loop {
            next_frame += frame_gap;

            if self.tick(out)? == TickOutcome::Exit {
                break;
            }

            if Instant::now() > next_frame {
                self.late_frames += 1;
                debug!("Frame {} overran its deadline", self.ticks);
            }

            sleep_until(next_frame).await;
        }

        Ok(self.finish())
    }

    pub fn finish(self) -> Session<Terminated> {
        let ended_at = Local::now();
        let summary = SessionSummary {
            started_at: self.started_at.unwrap_or(ended_at),
            ended_at,
            ticks: self.ticks,
            late_frames: self.late_frames,
        };

        info!(
            "Session finished: {} hits, {} misses, {} ticks ({} late) in {}s",
            self.score.hits,
            self.score.misses,
            summary.ticks,
            summary.late_frames,
            (summary.ended_at - summary.started_at).num_seconds()
        );
        self.transition_with(summary)
    }
}

impl Session<Terminated> {
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.get_state_data()
    }

    /// Prints the final `misses/hits` tally
    pub fn report<W: Write>(&self, out: &mut W) -> Result<(), SessionError> {
        console::tally(out, &self.score)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::strip_ansi;
    use crate::controller::scripted::{ScriptRecord, ScriptedController};
    use crate::controller::UnavailableController;

    fn running(
        script: Vec<(u32, Buttons)>,
        challenge: Challenge,
    ) -> (Session<Running>, ScriptRecord, Vec<u8>) {
        let controller = ScriptedController::new(true, script);
        let record = controller.record();
        let mut out = Vec::new();

        let mut session = Session::create(Box::new(controller), ChallengeGenerator::seeded(1))
            .connect(&mut out)
            .unwrap();
        session.challenge = challenge;
        (session, record, out)
    }

    #[test]
    fn missing_controller_ends_before_any_tick() {
        let controller = ScriptedController::new(false, vec![(1, Buttons::A)]);
        let record = controller.record();
        let mut out = Vec::new();

        let result =
            Session::create(Box::new(controller), ChallengeGenerator::seeded(1)).connect(&mut out);

        assert!(matches!(
            result,
            Err(SessionError::ControllerNotConnected(CONTROLLER_SLOT))
        ));
        assert_eq!(strip_ansi(&out), "Disconnected\n");
        assert_eq!(record.samples_taken(), 0);
        assert!(record.pulses().is_empty());
    }

    #[test]
    fn unstartable_backend_reports_disconnected() {
        let controller = UnavailableController::new("no backend for this platform");
        let mut out = Vec::new();

        let result =
            Session::create(Box::new(controller), ChallengeGenerator::seeded(1)).connect(&mut out);

        assert!(matches!(
            result,
            Err(SessionError::ControllerNotConnected(CONTROLLER_SLOT))
        ));
        assert_eq!(strip_ansi(&out), "Disconnected\n");
    }

    #[test]
    fn session_clock_starts_at_connection() {
        let controller = ScriptedController::new(true, vec![(1, Buttons::BACK)]);
        let mut out = Vec::new();

        let session = Session::create(Box::new(controller), ChallengeGenerator::seeded(1));
        std::thread::sleep(Duration::from_millis(5));
        let before_connect = Local::now();

        let mut running = session.connect(&mut out).unwrap();
        assert_eq!(running.tick(&mut out).unwrap(), TickOutcome::Exit);
        let finished = running.finish();

        let summary = finished.summary().unwrap();
        assert!(summary.started_at >= before_connect);
        assert!(summary.ended_at >= summary.started_at);
    }

    #[test]
    fn connecting_confirms_with_a_pulse_and_prompts() {
        let (session, record, out) = running(vec![], Challenge::A);
        let first = ChallengeGenerator::seeded(1).next();

        assert_eq!(record.pulses(), vec![Pulse::CONNECTED]);
        assert_eq!(strip_ansi(&out), format!("Connected\n{}", first.label()));
        assert_eq!(session.score(), ScoreState::default());
    }

    #[test]
    fn repeated_packet_scores_once() {
        let (mut session, _record, mut out) = running(
            vec![(1, Buttons::A), (1, Buttons::A), (2, Buttons::empty())],
            Challenge::A,
        );

        let outcomes: Vec<_> = (0..3).map(|_| session.tick(&mut out).unwrap()).collect();

        assert_eq!(
            outcomes,
            vec![TickOutcome::Hit, TickOutcome::Idle, TickOutcome::Idle]
        );
        assert_eq!(session.score(), ScoreState { hits: 1, misses: 0 });
    }

    #[test]
    fn still_held_button_scores_once() {
        let (mut session, _record, mut out) = running(
            vec![(1, Buttons::B), (2, Buttons::B), (3, Buttons::B)],
            Challenge::A,
        );

        for _ in 0..3 {
            session.tick(&mut out).unwrap();
        }
        assert_eq!(session.score(), ScoreState { hits: 0, misses: 1 });
    }

    #[test]
    fn wrong_button_is_a_miss_and_keeps_the_challenge() {
        let (mut session, record, mut out) = running(vec![(1, Buttons::B)], Challenge::A);
        out.clear();

        assert_eq!(session.tick(&mut out).unwrap(), TickOutcome::Miss);
        assert_eq!(session.score(), ScoreState { hits: 0, misses: 1 });
        assert_eq!(session.challenge(), Challenge::A);
        assert_eq!(record.pulses().last(), Some(&Pulse::MISS));
        assert_eq!(strip_ansi(&out), "  KO\nA");
    }

    #[test]
    fn combo_containing_the_target_is_a_miss() {
        let (mut session, _record, mut out) =
            running(vec![(1, Buttons::A | Buttons::B)], Challenge::A);

        assert_eq!(session.tick(&mut out).unwrap(), TickOutcome::Miss);
    }

    #[test]
    fn trigger_challenge_hits_on_synthetic_bit() {
        let (mut session, record, mut out) =
            running(vec![(4, Buttons::LEFT_TRIGGER)], Challenge::LeftTrigger);

        assert_eq!(session.tick(&mut out).unwrap(), TickOutcome::Hit);
        assert_eq!(record.pulses().last(), Some(&Pulse::HIT));
    }

    #[test]
    fn back_button_exits_even_in_a_combo() {
        let (mut session, _record, mut out) =
            running(vec![(1, Buttons::BACK | Buttons::A)], Challenge::A);

        assert_eq!(session.tick(&mut out).unwrap(), TickOutcome::Exit);
        assert_eq!(session.score(), ScoreState::default());
    }

    #[test]
    fn consecutive_hits_prompt_drawn_challenges_in_order() {
        let mut expected = ChallengeGenerator::seeded(99);
        let first = expected.next();
        let second = expected.next();
        let third = expected.next();

        let controller = ScriptedController::new(
            true,
            vec![
                (1, first.mask()),
                (2, Buttons::empty()),
                (3, second.mask()),
            ],
        );
        let mut out = Vec::new();
        let mut session = Session::create(Box::new(controller), ChallengeGenerator::seeded(99))
            .connect(&mut out)
            .unwrap();

        for _ in 0..3 {
            session.tick(&mut out).unwrap();
        }

        assert_eq!(session.score(), ScoreState { hits: 2, misses: 0 });
        let pad = |c: Challenge| " ".repeat(3 - c.label().len());
        assert_eq!(
            strip_ansi(&out),
            format!(
                "Connected\n{}{}OK\n{}{}OK\n{}",
                first.label(),
                pad(first),
                second.label(),
                pad(second),
                third.label()
            )
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_ends_on_back_and_prints_tally_last() {
        let (session, _record, mut out) = running(
            vec![(1, Buttons::B), (2, Buttons::empty()), (3, Buttons::BACK)],
            Challenge::A,
        );

        let finished = session.run(&mut out).await.unwrap();
        finished.report(&mut out).unwrap();

        let text = strip_ansi(&out);
        assert!(text.ends_with("A\nErrors: 1/0\n"), "{text:?}");
        assert_eq!(finished.summary().map(|s| s.ticks), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn run_paces_ticks_by_frame_deadline() {
        let (session, record, mut out) = running(
            vec![
                (1, Buttons::empty()),
                (2, Buttons::empty()),
                (3, Buttons::empty()),
                (4, Buttons::BACK),
            ],
            Challenge::A,
        );
        let start = Instant::now();

        session.run(&mut out).await.unwrap();

        let frame = Duration::from_millis(1000 / FRAME_RATE);
        let elapsed = Instant::now() - start;
        assert!(elapsed >= frame * 3, "{elapsed:?}");
        assert!(elapsed < frame * 4, "{elapsed:?}");
        assert_eq!(record.samples_taken(), 4);
    }
}
