use super::*;

#[test]
fn status_wire_names() {
    assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), "IN_PROGRESS");
    assert_eq!(serde_json::from_str::<TaskStatus>("\"CANCELLED\"").unwrap(), TaskStatus::Cancelled);
}

#[test]
fn display_matches_wire_names() {
    for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done, TaskStatus::Cancelled] {
        assert_eq!(serde_json::to_value(status).unwrap(), status.to_string());
    }
    for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High, TaskPriority::Urgent] {
        assert_eq!(serde_json::to_value(priority).unwrap(), priority.to_string());
    }
}

#[test]
fn update_task_serializes_only_set_fields() {
    let changes = UpdateTask { priority: Some(TaskPriority::Urgent), ..UpdateTask::default() };
    assert_eq!(serde_json::to_value(&changes).unwrap(), serde_json::json!({ "priority": "URGENT" }));
}

#[test]
fn create_task_uses_camel_case() {
    let task = CreateTask {
        title: "Renew passport".into(),
        description: None,
        priority: TaskPriority::Medium,
        due_date: Some("2024-09-01".into()),
        tags: Vec::new(),
        document_id: None,
    };
    assert_eq!(
        serde_json::to_value(&task).unwrap(),
        serde_json::json!({ "title": "Renew passport", "priority": "MEDIUM", "dueDate": "2024-09-01" })
    );
}
