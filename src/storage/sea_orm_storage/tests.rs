use super::SeaOrmStorage;
use crate::config::DatabaseConfig;
use crate::models::{
    classes::requests::CreateClassRequest,
    courses::requests::CourseInput,
    evaluations::{
        entities::{Cohort, EvaluationKey, RawScores},
        requests::CreateBonusItemRequest,
    },
    students::requests::{CreateStudentRequest, StudentListQuery, StudentProfileInput},
    users::{
        entities::{UserRole, UserStatus},
        requests::NewUser,
    },
};
use crate::scoring::EvaluationPolicy;
use crate::storage::Storage;

const YEAR: &str = "2023-2024";

async fn storage() -> SeaOrmStorage {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        pool_size: 1,
        timeout: 5,
    };
    SeaOrmStorage::new_async(&config).await.unwrap()
}

fn profile(name: &str, class_id: Option<i64>) -> StudentProfileInput {
    StudentProfileInput {
        name: name.to_string(),
        class_id,
        major: "计算机科学与技术".to_string(),
        gender: None,
        birthdate: None,
        hometown: None,
        id_card: None,
        phone: None,
        email: None,
        address: None,
        enrollment_date: None,
        status: None,
    }
}

fn account(student_id: i64) -> NewUser {
    NewUser {
        username: student_id.to_string(),
        password_hash: "hash".to_string(),
        role: UserRole::Student,
        status: UserStatus::Active,
        display_name: None,
        related_student_id: Some(student_id),
    }
}

async fn add_class(storage: &SeaOrmStorage, name: &str) -> i64 {
    storage
        .create_class(CreateClassRequest {
            class_name: name.to_string(),
            major: None,
            description: None,
        })
        .await
        .unwrap()
        .id
}

async fn add_student(storage: &SeaOrmStorage, student_id: i64, class_id: Option<i64>) {
    storage
        .create_student(
            CreateStudentRequest {
                student_id,
                profile: profile(&format!("学生{student_id}"), class_id),
            },
            account(student_id),
        )
        .await
        .unwrap();
}

fn key(student_id: i64) -> EvaluationKey {
    EvaluationKey {
        student_id,
        academic_year: YEAR.to_string(),
        semester: 1,
    }
}

fn cohort() -> Cohort {
    Cohort {
        academic_year: YEAR.to_string(),
        semester: 1,
    }
}

fn moral_only(score: f64) -> RawScores {
    RawScores {
        moral_score: Some(score),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_upsert_overwrites_all_raw_fields() {
    let storage = storage().await;
    let policy = EvaluationPolicy::default();
    add_student(&storage, 2023001, None).await;

    let first = storage
        .upsert_evaluation(
            key(2023001),
            RawScores {
                moral_score: Some(10.0),
                physical_score: Some(8.0),
                ..Default::default()
            },
            &policy,
        )
        .await
        .unwrap();
    assert_eq!(first.total_score, 18.0);

    let second = storage
        .upsert_evaluation(key(2023001), moral_only(12.0), &policy)
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.scores.moral_score, Some(12.0));
    assert_eq!(second.scores.physical_score, None);
    assert_eq!(second.total_score, 12.0);

    let records = storage.list_cohort(&cohort(), None).await.unwrap();
    assert_eq!(records.len(), 1);

    let by_key = storage.get_evaluation_by_key(&key(2023001)).await.unwrap();
    assert_eq!(by_key.map(|r| r.id), Some(first.id));
    let other_semester = EvaluationKey {
        semester: 2,
        ..key(2023001)
    };
    assert!(
        storage
            .get_evaluation_by_key(&other_semester)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_upsert_unknown_student_is_not_found() {
    let storage = storage().await;
    let err = storage
        .upsert_evaluation(key(999), moral_only(1.0), &EvaluationPolicy::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E008");
}

#[tokio::test]
async fn test_bonus_append_recomputes_totals() {
    let storage = storage().await;
    let policy = EvaluationPolicy::default();
    add_student(&storage, 2023001, None).await;

    let record = storage
        .upsert_evaluation(key(2023001), moral_only(10.0), &policy)
        .await
        .unwrap();

    let (item, updated) = storage
        .append_bonus_item(
            record.id,
            CreateBonusItemRequest {
                category: "竞赛".to_string(),
                item_name: "数学建模省一等奖".to_string(),
                score: 2.5,
                description: None,
            },
            &policy,
        )
        .await
        .unwrap();
    assert_eq!(item.evaluation_id, record.id);
    assert_eq!(updated.innovation_total_score, 2.5);
    assert_eq!(updated.total_score, 12.5);

    let (_, updated) = storage
        .append_bonus_item(
            record.id,
            CreateBonusItemRequest {
                category: "志愿服务".to_string(),
                item_name: "社区志愿".to_string(),
                score: 1.0,
                description: Some("40 小时".to_string()),
            },
            &policy,
        )
        .await
        .unwrap();
    assert_eq!(updated.social_total_score, 1.0);
    assert_eq!(updated.total_score, 13.5);

    let items = storage.list_bonus_items(record.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category, "竞赛");

    // 覆盖原始分项后加分明细仍计入总分
    let resubmitted = storage
        .upsert_evaluation(key(2023001), moral_only(20.0), &policy)
        .await
        .unwrap();
    assert_eq!(resubmitted.total_score, 23.5);
}

#[tokio::test]
async fn test_bonus_on_missing_evaluation_is_not_found() {
    let storage = storage().await;
    let err = storage
        .append_bonus_item(
            42,
            CreateBonusItemRequest {
                category: "竞赛".to_string(),
                item_name: "测试".to_string(),
                score: 1.0,
                description: None,
            },
            &EvaluationPolicy::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E008");
}

#[tokio::test]
async fn test_recalculate_rankings_assigns_and_is_idempotent() {
    let storage = storage().await;
    let policy = EvaluationPolicy::default();
    let class_id = add_class(&storage, "计科2101").await;
    add_student(&storage, 100, Some(class_id)).await;
    add_student(&storage, 150, Some(class_id)).await;
    add_student(&storage, 200, None).await;

    for (student_id, score) in [(100, 90.0), (150, 75.0), (200, 90.0)] {
        storage
            .upsert_evaluation(key(student_id), moral_only(score), &policy)
            .await
            .unwrap();
    }

    let ranked = storage.recalculate_rankings(&cohort(), &policy).await.unwrap();
    assert_eq!(ranked, 3);

    let first = storage.list_rankings(&cohort(), None, 50).await.unwrap();
    let order: Vec<(i64, Option<i32>, Option<i32>)> = first
        .iter()
        .map(|v| (v.record.student_id, v.record.grade_rank, v.record.class_rank))
        .collect();
    assert_eq!(
        order,
        vec![
            (100, Some(1), Some(1)),
            (200, Some(2), None),
            (150, Some(3), Some(2)),
        ]
    );
    assert_eq!(first[0].class_name.as_deref(), Some("计科2101"));

    storage.recalculate_rankings(&cohort(), &policy).await.unwrap();
    let second = storage.list_rankings(&cohort(), None, 50).await.unwrap();
    let again: Vec<(i64, Option<i32>, Option<i32>)> = second
        .iter()
        .map(|v| (v.record.student_id, v.record.grade_rank, v.record.class_rank))
        .collect();
    assert_eq!(order, again);

    let limited = storage.list_rankings(&cohort(), None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);

    let class_rows = storage
        .list_export_rows(&cohort(), Some(class_id))
        .await
        .unwrap();
    let class_order: Vec<i64> = class_rows.iter().map(|v| v.record.student_id).collect();
    assert_eq!(class_order, vec![100, 150]);
}

#[tokio::test]
async fn test_recalculate_empty_cohort_is_noop() {
    let storage = storage().await;
    let ranked = storage
        .recalculate_rankings(&cohort(), &EvaluationPolicy::default())
        .await
        .unwrap();
    assert_eq!(ranked, 0);
}

#[tokio::test]
async fn test_detail_view_joins_identity_and_bonus_items() {
    let storage = storage().await;
    let policy = EvaluationPolicy::default();
    let class_id = add_class(&storage, "软工2102").await;
    add_student(&storage, 300, Some(class_id)).await;

    let record = storage
        .upsert_evaluation(key(300), moral_only(5.0), &policy)
        .await
        .unwrap();
    storage
        .append_bonus_item(
            record.id,
            CreateBonusItemRequest {
                category: "学生干部".to_string(),
                item_name: "班长".to_string(),
                score: 1.0,
                description: None,
            },
            &policy,
        )
        .await
        .unwrap();

    let detail = storage
        .get_evaluation_detail(&key(300))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.view.student_name, "学生300");
    assert_eq!(detail.view.class_id, Some(class_id));
    assert_eq!(detail.view.class_name.as_deref(), Some("软工2102"));
    assert_eq!(detail.view.record.total_score, 6.0);
    assert_eq!(detail.view.record.scores.gpa, None);
    assert_eq!(detail.bonus_items.len(), 1);

    assert!(storage.get_evaluation_detail(&key(301)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_student_lifecycle() {
    let storage = storage().await;
    let class_id = add_class(&storage, "数学2101").await;
    add_student(&storage, 400, Some(class_id)).await;

    let err = storage
        .create_student(
            CreateStudentRequest {
                student_id: 400,
                profile: profile("重复", None),
            },
            account(400),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E010");

    let user = storage.get_user_by_username("400").await.unwrap().unwrap();
    assert_eq!(user.related_student_id, Some(400));

    let found = storage
        .list_students_with_pagination(StudentListQuery {
            page: 1,
            size: 10,
            search: Some("数学".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(found.pagination.total, 1);

    assert!(storage.delete_student(400).await.unwrap());
    let student = storage.get_student_by_id(400).await.unwrap().unwrap();
    assert_eq!(student.status.to_string(), "deleted");
    let user = storage.get_user_by_username("400").await.unwrap().unwrap();
    assert!(!user.is_active());

    let listed = storage
        .list_students_with_pagination(StudentListQuery {
            page: 1,
            size: 10,
            search: None,
        })
        .await
        .unwrap();
    assert_eq!(listed.pagination.total, 0);
}

#[tokio::test]
async fn test_duplicate_course_code_conflicts() {
    let storage = storage().await;
    let input = CourseInput {
        course_code: "CS101".to_string(),
        course_name: "程序设计基础".to_string(),
        credits: 4.0,
        hours: 64,
        course_type: None,
        department: Some("计算机学院".to_string()),
        prerequisites: None,
        description: None,
        status: None,
    };
    let course = storage.create_course(input.clone()).await.unwrap();
    let err = storage.create_course(input).await.unwrap_err();
    assert_eq!(err.code(), "E010");

    assert!(storage.delete_course(course.id).await.unwrap());
    let closed = storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(closed.status.to_string(), "closed");
}

#[tokio::test]
async fn test_rerun_overwrites_previous_ranks() {
    let storage = storage().await;
    let policy = EvaluationPolicy::default();
    let class_id = add_class(&storage, "物理2101").await;
    add_student(&storage, 100, Some(class_id)).await;
    add_student(&storage, 150, Some(class_id)).await;

    storage
        .upsert_evaluation(key(100), moral_only(90.0), &policy)
        .await
        .unwrap();
    storage
        .upsert_evaluation(key(150), moral_only(75.0), &policy)
        .await
        .unwrap();
    storage.recalculate_rankings(&cohort(), &policy).await.unwrap();

    // 分数变化后重新排名，名次随之改变
    storage
        .upsert_evaluation(key(150), moral_only(95.0), &policy)
        .await
        .unwrap();
    storage.recalculate_rankings(&cohort(), &policy).await.unwrap();

    let ranked = storage.list_rankings(&cohort(), None, 50).await.unwrap();
    let order: Vec<(i64, Option<i32>, Option<i32>)> = ranked
        .iter()
        .map(|v| (v.record.student_id, v.record.grade_rank, v.record.class_rank))
        .collect();
    assert_eq!(order, vec![(150, Some(1), Some(1)), (100, Some(2), Some(2))]);
}

#[tokio::test]
async fn test_deleted_class_clears_class_rank_on_rerun() {
    let storage = storage().await;
    let policy = EvaluationPolicy::default();
    let class_id = add_class(&storage, "化学2101").await;
    add_student(&storage, 500, Some(class_id)).await;

    storage
        .upsert_evaluation(key(500), moral_only(80.0), &policy)
        .await
        .unwrap();
    storage.recalculate_rankings(&cohort(), &policy).await.unwrap();
    let before = storage.get_evaluation_by_key(&key(500)).await.unwrap().unwrap();
    assert_eq!(before.class_rank, Some(1));

    assert!(storage.delete_class(class_id).await.unwrap());
    storage.recalculate_rankings(&cohort(), &policy).await.unwrap();

    let after = storage.get_evaluation_by_key(&key(500)).await.unwrap().unwrap();
    assert_eq!(after.class_rank, None);
    assert_eq!(after.grade_rank, Some(1));
}

#[tokio::test]
async fn test_upsert_for_deleted_student_is_rejected() {
    let storage = storage().await;
    add_student(&storage, 600, None).await;
    assert!(storage.delete_student(600).await.unwrap());

    let err = storage
        .upsert_evaluation(key(600), moral_only(1.0), &EvaluationPolicy::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E007");
    assert!(storage.get_evaluation_by_key(&key(600)).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_key_upserts_last_writer_wins() {
    let path = std::env::temp_dir().join(format!(
        "gradesys-concurrent-{}-{}.db",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        pool_size: 8,
        timeout: 30,
    };
    let storage = SeaOrmStorage::new_async(&config).await.unwrap();
    add_student(&storage, 700, None).await;

    for round in 0..2 {
        let mut handles = Vec::new();
        for i in 0..8 {
            let storage = storage.clone();
            let score = f64::from(round * 10 + i);
            handles.push(tokio::spawn(async move {
                storage
                    .upsert_evaluation(key(700), moral_only(score), &EvaluationPolicy::default())
                    .await
            }));
        }
        let ranking = {
            let storage = storage.clone();
            tokio::spawn(async move {
                storage
                    .recalculate_rankings(&cohort(), &EvaluationPolicy::default())
                    .await
            })
        };

        for handle in handles {
            let saved = handle.await.unwrap().unwrap();
            assert_eq!(saved.student_id, 700);
        }
        ranking.await.unwrap().unwrap();
    }

    let records = storage.list_cohort(&cohort(), None).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    let moral = record.scores.moral_score.unwrap();
    assert!((10.0..18.0).contains(&moral));
    assert_eq!(record.total_score, moral);

    drop(storage);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
