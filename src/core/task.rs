use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use super::types::FileOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InProgress,
    Done(FileOutcome),
}

/// One discovered file. Owned by a single worker once claimed.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub state: TaskState,
    pub media_key: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FileTask {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let name = display_name(&path);
        Self {
            path,
            name,
            size,
            state: TaskState::Pending,
            media_key: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn is_valid_transition(from: &TaskState, to: &TaskState) -> bool {
        matches!(
            (from, to),
            (TaskState::Pending, TaskState::InProgress) | (TaskState::InProgress, TaskState::Done(_))
        )
    }

    pub fn start(&mut self) {
        debug_assert!(Self::is_valid_transition(&self.state, &TaskState::InProgress));
        self.state = TaskState::InProgress;
        self.started_at = Some(Utc::now());
    }

    pub fn finish(&mut self, outcome: FileOutcome, media_key: Option<String>) {
        let next = TaskState::Done(outcome);
        debug_assert!(Self::is_valid_transition(&self.state, &next));
        self.state = next;
        self.media_key = media_key;
        self.completed_at = Some(Utc::now());
    }

    pub fn outcome(&self) -> Option<&FileOutcome> {
        match &self.state {
            TaskState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
