//! Tick driver
//!
//! Owns the [`GameSession`] and is its only writer. Commands from
//! collaborators arrive on an unbounded queue and are held until the next
//! tick boundary, then applied in arrival order before the session advances.
//! After each tick the driver publishes an immutable [`Snapshot`] on a watch
//! channel and forwards the tick's events.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::game::{Command, GameEvent, GamePhase, GameSession, Snapshot};

/// Collaborator side of a running [`TickDriver`]
pub struct DriverHandle {
    /// Input queue; dropping every sender stops the driver
    pub commands: mpsc::UnboundedSender<Command>,
    /// Latest snapshot, replaced once per tick
    pub snapshots: watch::Receiver<Arc<Snapshot>>,
    pub events: mpsc::UnboundedReceiver<GameEvent>,
}

pub struct TickDriver {
    session: GameSession,
    commands: mpsc::UnboundedReceiver<Command>,
    queued: Vec<Command>,
    snapshots: watch::Sender<Arc<Snapshot>>,
    events: mpsc::UnboundedSender<GameEvent>,
}

impl TickDriver {
    pub fn new(session: GameSession) -> (Self, DriverHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(session.snapshot()));

        let driver = Self {
            session,
            commands: command_rx,
            queued: Vec::new(),
            snapshots: snapshot_tx,
            events: event_tx,
        };
        let handle = DriverHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_rx,
        };
        (driver, handle)
    }

    /// Run until every command sender is dropped, then hand the session back
    pub async fn run(mut self) -> GameSession {
        let mut period = self.session.driver_interval();
        let mut timer = Self::timer(Instant::now(), period);
        let mut last_tick = Instant::now();

        info!("tick driver started at {:?} per tick", period);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.queued.push(command),
                    None => break,
                },

                now = timer.tick() => {
                    let elapsed = now.saturating_duration_since(last_tick);
                    last_tick = now;
                    self.run_tick(elapsed);

                    let next = self.session.driver_interval();
                    if next != period {
                        debug!("tick period changed {:?} -> {:?}", period, next);
                        period = next;
                        timer = Self::timer(now + period, period);
                    }
                }
            }
        }

        info!("tick driver stopped after {} ticks", self.session.tick());
        self.session
    }

    fn timer(start: Instant, period: Duration) -> Interval {
        let mut timer = interval_at(start, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    }

    /// One atomic step: queued commands, update, publish
    fn run_tick(&mut self, elapsed: Duration) {
        let mut started = false;
        for command in self.queued.drain(..) {
            if self.session.apply(command) {
                started |= command == Command::Start;
            } else {
                debug!("ignored {:?} in {:?}", command, self.session.phase());
            }
        }

        // Time that passed before a start does not count against the countdown
        let elapsed = if started && self.session.phase() == GamePhase::Countdown {
            Duration::ZERO
        } else {
            elapsed
        };
        self.session.update(elapsed);

        self.snapshots
            .send_replace(Arc::new(self.session.snapshot()));
        for event in self.session.take_events() {
            // Nobody listening is fine
            let _ = self.events.send(event);
        }
    }
}
