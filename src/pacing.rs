use std::time::Duration;

pub const PRE_REQUEST_SECS: u64 = 6;
pub const BACKOFF_SECS: u64 = 10;
pub const BETWEEN_TEAMS_SECS: u64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pause {
    /// Taken before every request attempt, including the first.
    PreRequest,
    /// Taken after a failed attempt when another attempt remains.
    Backoff,
    /// Taken by the orchestrator after each team.
    BetweenTeams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub pre_request: Duration,
    pub backoff: Duration,
    pub between_teams: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            pre_request: Duration::from_secs(PRE_REQUEST_SECS),
            backoff: Duration::from_secs(BACKOFF_SECS),
            between_teams: Duration::from_secs(BETWEEN_TEAMS_SECS),
        }
    }
}

impl Schedule {
    pub fn zero() -> Self {
        Self {
            pre_request: Duration::ZERO,
            backoff: Duration::ZERO,
            between_teams: Duration::ZERO,
        }
    }

    pub fn duration(&self, kind: Pause) -> Duration {
        match kind {
            Pause::PreRequest => self.pre_request,
            Pause::Backoff => self.backoff,
            Pause::BetweenTeams => self.between_teams,
        }
    }
}

pub trait Pacer {
    fn pause(&self, kind: Pause);
}

/// Blocks the calling thread for the scheduled duration of each pause.
#[derive(Debug, Clone, Default)]
pub struct SleepPacer {
    schedule: Schedule,
}

impl SleepPacer {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule }
    }
}

impl Pacer for SleepPacer {
    fn pause(&self, kind: Pause) {
        let wait = self.schedule.duration(kind);
        if wait.is_zero() {
            return;
        }
        log::debug!("pausing {:?} for {}s", kind, wait.as_secs_f32());
        std::thread::sleep(wait);
    }
}
