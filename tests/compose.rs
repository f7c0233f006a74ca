//! View composition: ordering, derived fields, and failure handling.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tutor_admin::model::{AskQuestion, Campus, Exercise, OrderTeacher, Student, Teacher};
use tutor_admin::service::AdminEntity;
use tutor_admin::state::Stores;
use tutor_admin::{Accessor, AppError, SortSpec};

struct School {
    stores: Stores,
    amy: i64,
    zoe: i64,
    wang: i64,
    fractions: i64,
}

async fn school() -> School {
    let stores = Stores::in_memory();
    let north = stores
        .campuses
        .insert(&Campus {
            cname: "North".into(),
            caddress: "1 North Rd".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let amy = stores
        .students
        .insert(&Student {
            sname: "amy".into(),
            snickname: "Amy".into(),
            cid: Some(north),
            ..Default::default()
        })
        .await
        .unwrap();
    let zoe = stores
        .students
        .insert(&Student {
            sname: "zoe".into(),
            snickname: "Zoe".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let wang = stores
        .teachers
        .insert(&Teacher {
            tname: "wang".into(),
            tnickname: "Mr. Wang".into(),
            cid: Some(north),
            ..Default::default()
        })
        .await
        .unwrap();
    let fractions = stores
        .exercises
        .insert(&Exercise {
            tid: wang,
            etitle: "Fractions".into(),
            econtent: "1/2 + 1/3".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    School {
        stores,
        amy,
        zoe,
        wang,
        fractions,
    }
}

async fn ask(school: &School, sid: i64, minute: u32) -> i64 {
    school
        .stores
        .ask_questions
        .insert(&AskQuestion {
            sid,
            tid: school.wang,
            eid: school.fractions,
            aqtime: Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap(),
            aqremark: format!("q{}", minute),
            ..Default::default()
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn student_views_carry_campus_name_or_nothing() {
    let school = school().await;
    let views = Student::composer(&school.stores)
        .compose_list(&[], SortSpec::default())
        .await
        .unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].record.sid, school.amy);
    assert_eq!(views[0].derived_str("Cname"), Some("North"));
    assert_eq!(views[1].record.sid, school.zoe);
    assert!(views[1].derived.get("Cname").is_none());
}

#[tokio::test]
async fn view_serializes_flat() {
    let school = school().await;
    let view = Teacher::composer(&school.stores).compose_one(school.wang).await.unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["Tid"], school.wang);
    assert_eq!(json["Tnickname"], "Mr. Wang");
    assert_eq!(json["Cname"], "North");
}

#[tokio::test]
async fn views_keep_primary_order_in_parallel() {
    let school = school().await;
    for minute in 0..20 {
        let sid = if minute % 2 == 0 { school.amy } else { school.zoe };
        ask(&school, sid, minute).await;
    }
    let sort = SortSpec::parse(Some("Aqtime"), Some("desc"));
    let expected = school.stores.ask_questions.fetch_all(sort).await.unwrap();

    let views = AskQuestion::composer(&school.stores)
        .concurrency(4)
        .compose_list(&[], sort)
        .await
        .unwrap();
    assert_eq!(views.len(), expected.len());
    for (view, record) in views.iter().zip(&expected) {
        assert_eq!(&view.record, record);
        assert_eq!(view.derived_str("Etitle"), Some("Fractions"));
        let nickname = if record.sid == school.amy { "Amy" } else { "Zoe" };
        assert_eq!(view.derived_str("Snickname"), Some(nickname));
    }
}

#[tokio::test]
async fn dangling_reference_fails_compose_one() {
    let school = school().await;
    let question = ask(&school, school.zoe, 5).await;
    school.stores.students.delete(school.zoe).await.unwrap();

    let err = AskQuestion::composer(&school.stores)
        .compose_one(question)
        .await
        .unwrap_err();
    match err {
        AppError::Enrichment {
            kind,
            key,
            field,
            ref source,
        } => {
            assert_eq!(kind, "ask_question");
            assert_eq!(key, question);
            assert_eq!(field, "sid");
            assert!(matches!(**source, AppError::NotFound { .. }));
        }
        other => panic!("expected enrichment failure, got {:?}", other),
    }
}

#[tokio::test]
async fn one_failure_discards_the_whole_list() {
    for concurrency in [1, 8] {
        let school = school().await;
        ask(&school, school.amy, 1).await;
        ask(&school, school.zoe, 2).await;
        ask(&school, school.amy, 3).await;
        school.stores.students.delete(school.zoe).await.unwrap();

        let result = AskQuestion::composer(&school.stores)
            .concurrency(concurrency)
            .compose_list(&[], SortSpec::default())
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err.root(), AppError::NotFound { .. }), "concurrency {}", concurrency);
    }
}

#[tokio::test]
async fn missing_primary_is_not_found() {
    let school = school().await;
    let err = OrderTeacher::composer(&school.stores).compose_one(42).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { key: 42, .. }));
}

#[tokio::test]
async fn order_teacher_views_name_both_sides() {
    let school = school().await;
    school
        .stores
        .order_teachers
        .insert(&OrderTeacher {
            sid: school.amy,
            tid: school.wang,
            ottime: Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap(),
            otremark: "weekly".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let views = OrderTeacher::composer(&school.stores)
        .compose_list(&[("sid", school.amy)], SortSpec::default())
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].derived_str("Snickname"), Some("Amy"));
    assert_eq!(views[0].derived_str("Tnickname"), Some("Mr. Wang"));
}

#[tokio::test]
async fn composer_reads_through_its_accessor() {
    let school = school().await;
    let composer = Campus::composer(&school.stores);
    assert!(Arc::ptr_eq(composer.accessor(), &school.stores.campuses));
    let views = composer.compose_list(&[], SortSpec::default()).await.unwrap();
    assert!(views[0].derived.is_empty());
}
