use crate::identity::domain::face_identity::FaceIdentity;

/// Whether a target identity is currently being watched for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Armed(String),
}

/// Compares admitted identities against a user-supplied target string.
///
/// The target is re-read every tick; an empty string disarms the watcher.
/// Comparison is exact and case-sensitive, so a target typed in upper case
/// never matches the lowercase hex identities.
#[derive(Debug)]
pub struct TargetWatcher {
    state: WatchState,
}

impl TargetWatcher {
    pub fn new() -> Self {
        Self {
            state: WatchState::Idle,
        }
    }

    pub fn set_target(&mut self, target: &str) {
        let next = if target.is_empty() {
            WatchState::Idle
        } else {
            WatchState::Armed(target.to_string())
        };
        if next != self.state {
            match &next {
                WatchState::Idle => log::info!("Target cleared"),
                WatchState::Armed(t) => log::info!("Watching for target {t}"),
            }
            self.state = next;
        }
    }

    /// True when armed and `identity` equals the target exactly.
    pub fn check(&self, identity: &FaceIdentity) -> bool {
        match &self.state {
            WatchState::Idle => false,
            WatchState::Armed(target) => identity.as_str() == target,
        }
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }
}

impl Default for TargetWatcher {
    fn default() -> Self {
        Self::new()
    }
}
