//! Follow-up task statuses and priorities.

define_text_enum! {
    /// Lifecycle status of a task.
    TaskStatus ("task status") {
        Open = "Open",
        InProgress = "In Progress",
        Completed = "Completed",
        Cancelled = "Cancelled",
    }
}

define_text_enum! {
    /// Task priority.
    TaskPriority ("task priority") {
        Low = "Low",
        Medium = "Medium",
        High = "High",
    }
}

/// Whether a status change completes the task (and should stamp `completed_at`).
pub fn is_completion(old: TaskStatus, new: TaskStatus) -> bool {
    old != TaskStatus::Completed && new == TaskStatus::Completed
}

/// Whether a status change reopens a completed task (and should clear `completed_at`).
pub fn is_reopening(old: TaskStatus, new: TaskStatus) -> bool {
    old == TaskStatus::Completed && new != TaskStatus::Completed
}
