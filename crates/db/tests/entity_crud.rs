//! Students, applications, and tasks against a real database.

use admissions_core::application::ApplicationStatus;
use admissions_core::entity::{EntityKind, EntityRef};
use admissions_core::error::CoreError;
use admissions_core::pagination::PageRequest;
use admissions_core::task::TaskStatus;
use admissions_db::error::RepoError;
use admissions_db::models::application::{ApplicationFilter, CreateApplication, UpdateApplication};
use admissions_db::models::student::{CreateStudent, StudentDocument, StudentFilter, UpdateStudent};
use admissions_db::models::task::{CreateTask, TaskFilter, UpdateTask};
use admissions_db::repositories::{ApplicationRepo, StudentRepo, TaskRepo, TimelineRepo};
use assert_matches::assert_matches;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_student(first: &str, last: &str, email: &str) -> CreateStudent {
    CreateStudent {
        first_name: first.to_string(),
        last_name: Some(last.to_string()),
        email: Some(email.to_string()),
        ..Default::default()
    }
}

fn new_application(student_id: i64) -> CreateApplication {
    CreateApplication {
        student_id,
        degree_id: None,
        faculty_id: None,
        specialty_id: None,
        academic_year_id: None,
        semester_id: None,
        status: None,
        notes: None,
    }
}

fn new_task(owner: EntityRef, title: &str) -> CreateTask {
    CreateTask {
        entity_type: owner.kind,
        entity_id: owner.id,
        title: title.to_string(),
        description: None,
        due_date: None,
        priority: None,
        status: None,
        assigned_to: None,
    }
}

async fn event_types(pool: &PgPool, entity: EntityRef) -> Vec<String> {
    TimelineRepo::list_for_entity(pool, entity, PageRequest::new(None, Some(100)))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect()
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_crud(pool: PgPool) {
    let student = StudentRepo::create(&pool, &new_student("Sara", "Hassan", "sara@x.com"), None)
        .await
        .unwrap();
    assert_eq!(student.student_id, "STU-0001");
    assert!(student.documents.0.is_empty());

    let update = UpdateStudent {
        gpa: Some(3.7),
        ..Default::default()
    };
    let updated = StudentRepo::update(&pool, student.id, &update, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.gpa, Some(3.7));
    assert_eq!(updated.email.as_deref(), Some("sara@x.com"));

    let search = StudentFilter {
        search: Some("sara hassan".to_string()),
    };
    assert_eq!(StudentRepo::count(&pool, &search).await.unwrap(), 1);

    assert!(StudentRepo::delete(&pool, student.id, None).await.unwrap());
    assert!(StudentRepo::find_by_id(&pool, student.id).await.unwrap().is_none());
    assert_eq!(
        event_types(&pool, EntityRef::student(student.id)).await,
        ["deleted", "updated", "created"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_email_is_unique(pool: PgPool) {
    StudentRepo::create(&pool, &new_student("Sara", "Hassan", "dup@x.com"), None)
        .await
        .unwrap();
    let err = StudentRepo::create(&pool, &new_student("Other", "Person", "dup@x.com"), None)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_students_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_documents(pool: PgPool) {
    let student = StudentRepo::create(&pool, &new_student("Sara", "Hassan", "sara@x.com"), None)
        .await
        .unwrap();

    for name in ["Passport", "Transcript"] {
        let doc = StudentDocument {
            name: name.to_string(),
            file_url: format!("https://files.example.com/{name}.pdf"),
            uploaded_at: None,
        };
        StudentRepo::add_document(&pool, student.id, doc, Some("maria"))
            .await
            .unwrap()
            .unwrap();
    }

    let removed = StudentRepo::remove_document(&pool, student.id, 0, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.documents.0.len(), 1);
    assert_eq!(removed.documents.0[0].name, "Transcript");
    assert!(removed.documents.0[0].uploaded_at.is_some());

    let missing = StudentRepo::remove_document(&pool, student.id, 5, None).await;
    assert_matches!(
        missing,
        Err(RepoError::Core(CoreError::NotFound { entity: "Document", id: 5 }))
    );

    let huge = StudentRepo::remove_document(&pool, student.id, usize::MAX, None).await;
    assert_matches!(
        huge,
        Err(RepoError::Core(CoreError::NotFound { entity: "Document", id: i64::MAX }))
    );

    let events = TimelineRepo::list_for_entity(&pool, EntityRef::student(student.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(events[0].description.as_deref(), Some("Document removed: Passport"));
    assert_eq!(events[1].description.as_deref(), Some("Document added: Transcript"));
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_application_lifecycle(pool: PgPool) {
    let student = StudentRepo::create(&pool, &new_student("Sara", "Hassan", "sara@x.com"), None)
        .await
        .unwrap();
    let app = ApplicationRepo::create(&pool, &new_application(student.id), None)
        .await
        .unwrap();
    assert_eq!(app.application_id, "APP-0001");
    assert_eq!(app.status, ApplicationStatus::Draft);

    let update = UpdateApplication {
        status: Some(ApplicationStatus::Submitted),
        ..Default::default()
    };
    let updated = ApplicationRepo::update(&pool, app.id, &update, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ApplicationStatus::Submitted);

    let filter = ApplicationFilter {
        student_id: Some(student.id),
        status: Some(ApplicationStatus::Submitted),
    };
    assert_eq!(ApplicationRepo::count(&pool, &filter).await.unwrap(), 1);
    assert_eq!(
        event_types(&pool, EntityRef::application(app.id)).await,
        ["status_changed", "created"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_application_for_missing_student(pool: PgPool) {
    let err = ApplicationRepo::create(&pool, &new_application(404), None)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23503"));

    // The failed insert gave its code back.
    let student = StudentRepo::create(&pool, &new_student("Sara", "Hassan", "sara@x.com"), None)
        .await
        .unwrap();
    let app = ApplicationRepo::create(&pool, &new_application(student.id), None)
        .await
        .unwrap();
    assert_eq!(app.application_id, "APP-0001");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_delete_cascades(pool: PgPool) {
    let student = StudentRepo::create(&pool, &new_student("Sara", "Hassan", "sara@x.com"), None)
        .await
        .unwrap();
    let app = ApplicationRepo::create(&pool, &new_application(student.id), None)
        .await
        .unwrap();
    let app_task = TaskRepo::create(&pool, &new_task(EntityRef::application(app.id), "Review"), None)
        .await
        .unwrap();
    let student_task = TaskRepo::create(&pool, &new_task(EntityRef::student(student.id), "Call"), None)
        .await
        .unwrap();

    StudentRepo::delete(&pool, student.id, None).await.unwrap();

    assert!(ApplicationRepo::find_by_id(&pool, app.id).await.unwrap().is_none());
    assert!(TaskRepo::find_by_id(&pool, app_task.id).await.unwrap().is_none());
    assert!(TaskRepo::find_by_id(&pool, student_task.id).await.unwrap().is_none());
    assert_eq!(
        event_types(&pool, EntityRef::application(app.id)).await[0],
        "deleted"
    );
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_requires_existing_owner(pool: PgPool) {
    let result = TaskRepo::create(&pool, &new_task(EntityRef::lead(77), "Follow up"), None).await;
    assert_matches!(
        result,
        Err(RepoError::Core(CoreError::NotFound { entity: "Lead", id: 77 }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_completion(pool: PgPool) {
    let student = StudentRepo::create(&pool, &new_student("Sara", "Hassan", "sara@x.com"), None)
        .await
        .unwrap();
    let owner = EntityRef::student(student.id);
    let task = TaskRepo::create(&pool, &new_task(owner, "Collect transcript"), Some("maria"))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Open);
    assert!(task.completed_at.is_none());

    let complete = UpdateTask {
        status: Some(TaskStatus::Completed),
        ..Default::default()
    };
    let done = TaskRepo::update(&pool, task.id, &complete, None)
        .await
        .unwrap()
        .unwrap();
    assert!(done.completed_at.is_some());

    let reopen = UpdateTask {
        status: Some(TaskStatus::InProgress),
        ..Default::default()
    };
    let reopened = TaskRepo::update(&pool, task.id, &reopen, None)
        .await
        .unwrap()
        .unwrap();
    assert!(reopened.completed_at.is_none());

    assert!(TaskRepo::delete(&pool, task.id, None).await.unwrap());
    assert_eq!(
        event_types(&pool, owner).await,
        ["task_deleted", "task_updated", "task_completed", "task_created", "created"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_filters(pool: PgPool) {
    let a = StudentRepo::create(&pool, &new_student("Sara", "Hassan", "sara@x.com"), None)
        .await
        .unwrap();
    let b = StudentRepo::create(&pool, &new_student("Omar", "Said", "omar@x.com"), None)
        .await
        .unwrap();
    let mut assigned = new_task(EntityRef::student(a.id), "Call");
    assigned.assigned_to = Some("maria".to_string());
    TaskRepo::create(&pool, &assigned, None).await.unwrap();
    TaskRepo::create(&pool, &new_task(EntityRef::student(a.id), "Email"), None)
        .await
        .unwrap();
    TaskRepo::create(&pool, &new_task(EntityRef::student(b.id), "Visit"), None)
        .await
        .unwrap();

    let for_a = TaskFilter {
        entity_type: Some(EntityKind::Student),
        entity_id: Some(a.id),
        ..Default::default()
    };
    assert_eq!(TaskRepo::count(&pool, &for_a).await.unwrap(), 2);

    let for_maria = TaskFilter {
        assigned_to: Some("maria".to_string()),
        ..Default::default()
    };
    let tasks = TaskRepo::list(&pool, &for_maria, PageRequest::default()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Call");
}
