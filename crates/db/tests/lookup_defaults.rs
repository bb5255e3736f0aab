//! Lookup values and the one-default-per-kind rule.

use admissions_core::error::CoreError;
use admissions_core::lookup::LookupKind;
use admissions_db::error::RepoError;
use admissions_db::models::lookup::{CreateLookupValue, UpdateLookupValue};
use admissions_db::repositories::LookupRepo;
use assert_matches::assert_matches;
use sqlx::PgPool;

fn value(name: &str) -> CreateLookupValue {
    CreateLookupValue {
        name: name.to_string(),
        ..Default::default()
    }
}

async fn defaults(pool: &PgPool, kind: LookupKind) -> Vec<String> {
    LookupRepo::list(pool, kind, true)
        .await
        .unwrap()
        .into_iter()
        .filter(|v| v.is_default)
        .map(|v| v.name)
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_default_moves_flag(pool: PgPool) {
    let kind = LookupKind::Degree;
    let mut a = value("Bachelor");
    a.is_default = Some(true);
    let a = LookupRepo::create(&pool, kind, &a).await.unwrap();
    let b = LookupRepo::create(&pool, kind, &value("Master")).await.unwrap();
    assert!(a.is_default);
    assert!(!b.is_default);

    let b = LookupRepo::set_default(&pool, kind, b.id).await.unwrap();
    assert!(b.is_default);
    assert_eq!(defaults(&pool, kind).await, ["Master"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_default_replaces_existing(pool: PgPool) {
    let kind = LookupKind::Semester;
    for name in ["Fall", "Spring"] {
        let mut input = value(name);
        input.is_default = Some(true);
        LookupRepo::create(&pool, kind, &input).await.unwrap();
    }
    assert_eq!(defaults(&pool, kind).await, ["Spring"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_defaults_are_per_kind(pool: PgPool) {
    let mut degree = value("Bachelor");
    degree.is_default = Some(true);
    LookupRepo::create(&pool, LookupKind::Degree, &degree).await.unwrap();
    let mut city = value("Cairo");
    city.is_default = Some(true);
    LookupRepo::create(&pool, LookupKind::City, &city).await.unwrap();

    assert_eq!(defaults(&pool, LookupKind::Degree).await, ["Bachelor"]);
    assert_eq!(defaults(&pool, LookupKind::City).await, ["Cairo"]);
    let found = LookupRepo::find_default(&pool, LookupKind::City).await.unwrap().unwrap();
    assert_eq!(found.name, "Cairo");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inactive_value_cannot_be_default(pool: PgPool) {
    let kind = LookupKind::Language;
    let mut inactive = value("Latin");
    inactive.is_active = Some(false);
    let inactive = LookupRepo::create(&pool, kind, &inactive).await.unwrap();

    let result = LookupRepo::set_default(&pool, kind, inactive.id).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));

    let mut both = value("Greek");
    both.is_active = Some(false);
    both.is_default = Some(true);
    let result = LookupRepo::create(&pool, kind, &both).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivating_default_clears_flag(pool: PgPool) {
    let kind = LookupKind::Faculty;
    let mut input = value("Engineering");
    input.is_default = Some(true);
    let created = LookupRepo::create(&pool, kind, &input).await.unwrap();

    let update = UpdateLookupValue {
        is_active: Some(false),
        ..Default::default()
    };
    let updated = LookupRepo::update(&pool, kind, created.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert!(!updated.is_active);
    assert!(!updated.is_default);
    assert!(LookupRepo::find_default(&pool, kind).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_to_default(pool: PgPool) {
    let kind = LookupKind::AcademicYear;
    let mut first = value("2026/2027");
    first.is_default = Some(true);
    LookupRepo::create(&pool, kind, &first).await.unwrap();
    let second = LookupRepo::create(&pool, kind, &value("2027/2028")).await.unwrap();

    let update = UpdateLookupValue {
        is_default: Some(true),
        sort_order: Some(5),
        ..Default::default()
    };
    let updated = LookupRepo::update(&pool, kind, second.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert!(updated.is_default);
    assert_eq!(updated.sort_order, 5);
    assert_eq!(defaults(&pool, kind).await, ["2027/2028"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_default_creates_on_empty_kind(pool: PgPool) {
    let kind = LookupKind::Semester;
    let mut first = value("Fall 2027");
    first.is_default = Some(true);
    let mut second = value("Spring 2028");
    second.is_default = Some(true);

    let (a, b) = tokio::join!(
        LookupRepo::create(&pool, kind, &first),
        LookupRepo::create(&pool, kind, &second),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let winner = LookupRepo::list(&pool, kind, true)
        .await
        .unwrap()
        .into_iter()
        .filter(|v| v.is_default)
        .map(|v| v.id)
        .collect::<Vec<_>>();
    assert_eq!(winner.len(), 1);
    assert!(winner[0] == a.id || winner[0] == b.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_index_rejects_second_default(pool: PgPool) {
    sqlx::query("INSERT INTO lookup_values (kind, name, is_default) VALUES ('city', 'Cairo', TRUE)")
        .execute(&pool)
        .await
        .unwrap();
    let err = sqlx::query(
        "INSERT INTO lookup_values (kind, name, is_default) VALUES ('city', 'Alexandria', TRUE)",
    )
    .execute(&pool)
    .await
    .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_lookup_values_default"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_hides_inactive_and_sorts(pool: PgPool) {
    let kind = LookupKind::Specialty;
    let mut z = value("Zoology");
    z.sort_order = Some(1);
    LookupRepo::create(&pool, kind, &z).await.unwrap();
    let mut a = value("Anatomy");
    a.sort_order = Some(2);
    LookupRepo::create(&pool, kind, &a).await.unwrap();
    let mut hidden = value("Alchemy");
    hidden.is_active = Some(false);
    LookupRepo::create(&pool, kind, &hidden).await.unwrap();

    let active: Vec<String> = LookupRepo::list(&pool, kind, false)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(active, ["Zoology", "Anatomy"]);
    assert_eq!(LookupRepo::list(&pool, kind, true).await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_name_violates_unique(pool: PgPool) {
    let kind = LookupKind::City;
    LookupRepo::create(&pool, kind, &value("Cairo")).await.unwrap();
    let result = LookupRepo::create(&pool, kind, &value("Cairo")).await;
    assert_matches!(result, Err(RepoError::Database(sqlx::Error::Database(e))) => {
        assert_eq!(e.constraint(), Some("uq_lookup_values_name"));
    });

    // Same name under another kind is fine.
    LookupRepo::create(&pool, LookupKind::Language, &value("Cairo")).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_and_delete_respect_kind(pool: PgPool) {
    let created = LookupRepo::create(&pool, LookupKind::City, &value("Cairo")).await.unwrap();
    assert!(LookupRepo::find_by_id(&pool, LookupKind::Degree, created.id)
        .await
        .unwrap()
        .is_none());
    assert!(!LookupRepo::delete(&pool, LookupKind::Degree, created.id).await.unwrap());
    assert!(LookupRepo::delete(&pool, LookupKind::City, created.id).await.unwrap());
}
