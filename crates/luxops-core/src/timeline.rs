//! Run of show.

use crate::{Task, TaskStatus};

/// Flip a task between done and not done. A late task counts as not done.
/// Returns the new status, or `None` if no task has that id.
pub fn toggle_task(tasks: &mut [Task], id: &str) -> Option<TaskStatus> {
    let task = tasks.iter_mut().find(|t| t.id == id)?;
    task.status = match task.status {
        TaskStatus::Completed => TaskStatus::Pending,
        TaskStatus::Pending | TaskStatus::Late => TaskStatus::Completed,
    };
    Some(task.status)
}

/// Tasks ordered by their "HH:MM" start. Stable for equal times.
pub fn sorted_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| a.time.cmp(&b.time));
    sorted
}

/// The task to do now: the first open task whose predecessor is done.
pub fn next_task(tasks: &[Task]) -> Option<&Task> {
    let sorted = sorted_tasks(tasks);
    sorted.iter().enumerate().find_map(|(i, task)| {
        let open = task.status != TaskStatus::Completed;
        let unblocked = i == 0 || sorted[i - 1].status == TaskStatus::Completed;
        (open && unblocked).then_some(*task)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn toggles_both_ways() {
        let mut tasks = demo::tasks();
        assert_eq!(toggle_task(&mut tasks, "2"), Some(TaskStatus::Completed));
        assert_eq!(toggle_task(&mut tasks, "2"), Some(TaskStatus::Pending));
        assert_eq!(toggle_task(&mut tasks, "404"), None);
    }

    #[test]
    fn late_toggles_to_completed() {
        let mut tasks = demo::tasks();
        tasks[2].status = TaskStatus::Late;
        assert_eq!(toggle_task(&mut tasks, "3"), Some(TaskStatus::Completed));
    }

    #[test]
    fn sorts_by_time() {
        let mut tasks = demo::tasks();
        tasks.reverse();
        let order: Vec<&str> = sorted_tasks(&tasks).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "3"]);
    }

    #[test]
    fn next_follows_completed() {
        let mut tasks = demo::tasks();
        assert_eq!(next_task(&tasks).map(|t| t.id.as_str()), Some("2"));
        toggle_task(&mut tasks, "2");
        assert_eq!(next_task(&tasks).map(|t| t.id.as_str()), Some("3"));
        toggle_task(&mut tasks, "3");
        assert!(next_task(&tasks).is_none());
        assert!(next_task(&[]).is_none());
    }

    #[test]
    fn first_open_task_is_next() {
        let mut tasks = demo::tasks();
        tasks[0].status = TaskStatus::Pending;
        assert_eq!(next_task(&tasks).map(|t| t.id.as_str()), Some("1"));
    }
}
