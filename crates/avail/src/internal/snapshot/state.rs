use serde::Serialize;

/// Node state, resolved once from the comma separated state list of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeState {
    Free,
    Busy,
    Offline,
    Down,
    Unknown,
}

impl NodeState {
    pub fn parse(value: &str) -> Self {
        let tokens: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        let has = |name: &str| tokens.iter().any(|token| *token == name);

        if tokens.is_empty() {
            NodeState::Unknown
        } else if has("down") {
            NodeState::Down
        } else if has("offline") {
            NodeState::Offline
        } else if tokens.iter().all(|token| *token == "free") {
            NodeState::Free
        } else if tokens.iter().any(|token| {
            matches!(
                *token,
                "busy" | "job-busy" | "job-exclusive" | "resv-exclusive"
            )
        }) {
            NodeState::Busy
        } else {
            NodeState::Unknown
        }
    }

    #[inline]
    pub fn is_free(self) -> bool {
        self == NodeState::Free
    }
}

/// Exclusivity mode of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SharingPolicy {
    #[default]
    DefaultShared,
    DefaultExcl,
    DefaultExclhost,
    ForceExcl,
    ForceExclhost,
    IgnoreExcl,
}

impl SharingPolicy {
    /// Unrecognized policies are treated as shared.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "default_excl" => SharingPolicy::DefaultExcl,
            "default_exclhost" => SharingPolicy::DefaultExclhost,
            "force_excl" => SharingPolicy::ForceExcl,
            "force_exclhost" => SharingPolicy::ForceExclhost,
            "ignore_excl" => SharingPolicy::IgnoreExcl,
            other => {
                if other != "default_shared" {
                    log::debug!("Unknown sharing policy '{other}', assuming default_shared");
                }
                SharingPolicy::DefaultShared
            }
        }
    }

    /// A claim on an exclusive node takes the whole node.
    #[inline]
    pub fn is_exclusive(self) -> bool {
        matches!(self, SharingPolicy::DefaultExcl | SharingPolicy::ForceExcl)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JobState {
    Queued,
    Held,
    Waiting,
    Transit,
    Moved,
    Running,
    Exiting,
    Suspended,
    UserSuspended,
    Begun,
    Finished,
    Expired,
}

impl JobState {
    pub fn parse(value: &str) -> Option<Self> {
        let state = match value.trim() {
            "Q" => JobState::Queued,
            "H" => JobState::Held,
            "W" => JobState::Waiting,
            "T" => JobState::Transit,
            "M" => JobState::Moved,
            "R" => JobState::Running,
            "E" => JobState::Exiting,
            "S" => JobState::Suspended,
            "U" => JobState::UserSuspended,
            "B" => JobState::Begun,
            "F" => JobState::Finished,
            "X" => JobState::Expired,
            _ => return None,
        };
        Some(state)
    }

    /// The job already holds (or held) resources on its nodes.
    pub fn has_started(self) -> bool {
        matches!(
            self,
            JobState::Running
                | JobState::Exiting
                | JobState::Suspended
                | JobState::UserSuspended
                | JobState::Begun
                | JobState::Finished
                | JobState::Expired
        )
    }
}
