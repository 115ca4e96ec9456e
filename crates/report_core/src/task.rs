use std::fmt;

/// Identifies one form submission. Messages carrying an older id are stale.
pub type SessionId = u64;

/// Opaque server-side identifier of a report generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Failed,
}

/// One `/progress/{id}` reply. `progress >= 100` means done, negative means
/// the job failed on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub progress: i64,
    pub message: String,
}

impl ProgressSnapshot {
    pub fn new(progress: i64, message: impl Into<String>) -> Self {
        Self {
            progress,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub status: TaskStatus,
    pub progress: i64,
    pub message: String,
}

impl Task {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            progress: 0,
            message: String::new(),
        }
    }

    /// Overwrites progress and message with the snapshot; nothing is merged.
    pub(crate) fn apply(&mut self, snapshot: &ProgressSnapshot) {
        self.progress = snapshot.progress;
        self.message.clone_from(&snapshot.message);
        self.status = if snapshot.progress >= 100 {
            TaskStatus::Done
        } else if snapshot.progress < 0 {
            TaskStatus::Failed
        } else {
            TaskStatus::InProgress
        };
    }

    /// Progress clamped to a displayable percentage.
    pub fn percent(&self) -> u8 {
        self.progress.clamp(0, 100) as u8
    }
}

/// Opaque multipart form payload, fields kept in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
