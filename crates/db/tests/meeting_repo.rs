//! Integration tests for meetings, their attachments and report documents.

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::PgPool;

use minutes_db::models::agenda::CreateAgenda;
use minutes_db::models::attached_file::{AttachmentOwner, NewAttachedFile};
use minutes_db::models::meeting::{CreateMeeting, MeetingFilter, UpdateMeeting};
use minutes_db::repositories::{AgendaRepo, AttachedFileRepo, MeetingRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_meeting(number: &str, title: &str, day: u32) -> CreateMeeting {
    CreateMeeting {
        meeting_number: Some(number.to_string()),
        meeting_title: Some(title.to_string()),
        meeting_date: NaiveDate::from_ymd_opt(2025, 3, day),
        meeting_time: Some("09:30".to_string()),
        location: Some("ห้องประชุม 1".to_string()),
        department: Some("IT".to_string()),
    }
}

fn new_file(name: &str) -> NewAttachedFile {
    NewAttachedFile {
        file_name: name.to_string(),
        file_path: format!("/uploads/meeting_1_00000000_{name}"),
        file_size: 100,
        file_type: Some("application/pdf".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_starts_without_report(pool: PgPool) {
    let meeting = MeetingRepo::create(&pool, &new_meeting("1/2568", "Budget", 1), "sec")
        .await
        .unwrap();

    assert_eq!(meeting.file_path, "");
    assert_eq!(meeting.file_size, 0);
    assert!(!meeting.has_report());
    assert_eq!(meeting.created_by.as_deref(), Some("sec"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_meeting_number_violates_unique_constraint(pool: PgPool) {
    MeetingRepo::create(&pool, &new_meeting("1/2568", "A", 1), "sec")
        .await
        .unwrap();

    assert!(MeetingRepo::number_taken(&pool, "1/2568", None).await.unwrap());

    let err = MeetingRepo::create(&pool, &new_meeting("1/2568", "B", 2), "sec")
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db)
        if db.constraint() == Some("uq_meeting_reports_meeting_number"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_number_taken_ignores_the_excluded_row(pool: PgPool) {
    let meeting = MeetingRepo::create(&pool, &new_meeting("2/2568", "A", 1), "sec")
        .await
        .unwrap();

    assert!(!MeetingRepo::number_taken(&pool, "2/2568", Some(meeting.id))
        .await
        .unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_orders_by_date_and_filters(pool: PgPool) {
    MeetingRepo::create(&pool, &new_meeting("1/2568", "งบประมาณ", 1), "sec")
        .await
        .unwrap();
    let later = MeetingRepo::create(&pool, &new_meeting("2/2568", "Staffing", 9), "sec")
        .await
        .unwrap();

    let all = MeetingRepo::list(&pool, &MeetingFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, later.id, "newest meeting date first");

    let found = MeetingRepo::list(
        &pool,
        &MeetingFilter {
            search: Some("งบ".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].meeting_number, "1/2568");
}

/// `%` and `_` in a search term match themselves, not any text.
#[sqlx::test(migrations = "./migrations")]
async fn test_search_matches_like_metacharacters_literally(pool: PgPool) {
    MeetingRepo::create(&pool, &new_meeting("1/2568", "ลดงบ 50%", 1), "sec")
        .await
        .unwrap();
    MeetingRepo::create(&pool, &new_meeting("2/2568", "ลดงบ 500 บาท", 2), "sec")
        .await
        .unwrap();
    MeetingRepo::create(&pool, &new_meeting("3/2568", "plan_a", 3), "sec")
        .await
        .unwrap();
    MeetingRepo::create(&pool, &new_meeting("4/2568", "planXa", 4), "sec")
        .await
        .unwrap();

    let search = |term: &str| MeetingFilter {
        search: Some(term.into()),
        ..Default::default()
    };

    let percent = MeetingRepo::list(&pool, &search("50%")).await.unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].meeting_number, "1/2568");

    let underscore = MeetingRepo::list(&pool, &search("plan_")).await.unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].meeting_number, "3/2568");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_applies_only_supplied_fields(pool: PgPool) {
    let meeting = MeetingRepo::create(&pool, &new_meeting("1/2568", "Old", 1), "sec")
        .await
        .unwrap();

    let input = UpdateMeeting {
        meeting_title: Some("New".into()),
        ..Default::default()
    };
    let updated = MeetingRepo::update(&pool, meeting.id, &input, "sec2")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.meeting_title, "New");
    assert_eq!(updated.meeting_number, "1/2568");
    assert_eq!(updated.updated_by.as_deref(), Some("sec2"));

    assert!(MeetingRepo::update(&pool, 9999, &input, "sec")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_report_status_follows_set_and_clear(pool: PgPool) {
    let meeting = MeetingRepo::create(&pool, &new_meeting("1/2568", "A", 1), "sec")
        .await
        .unwrap();

    let with_report = MeetingRepo::set_report(&pool, meeting.id, "/uploads/r.pdf", 2048, "sec")
        .await
        .unwrap()
        .unwrap();
    assert!(with_report.has_report());

    let reported = MeetingRepo::list_with_stats(
        &pool,
        &MeetingFilter {
            has_report: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(reported.len(), 1);
    assert!(reported[0].has_report);

    let cleared = MeetingRepo::clear_report(&pool, meeting.id, "sec")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.file_path, "");
    assert_eq!(cleared.file_size, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_agenda_count_ignores_inactive_agendas(pool: PgPool) {
    MeetingRepo::create(&pool, &new_meeting("1/2568", "A", 1), "sec")
        .await
        .unwrap();

    let agenda = |n: &str| CreateAgenda {
        meeting_number: Some("1/2568".into()),
        agenda_number: Some(n.into()),
        agenda_topic: Some("topic".into()),
        agenda_type: Some("เพื่อทราบ".into()),
        submitting_department: Some("IT".into()),
        description: None,
    };
    AgendaRepo::create(&pool, &agenda("1"), "sec").await.unwrap();
    let second = AgendaRepo::create(&pool, &agenda("2"), "sec").await.unwrap();
    AgendaRepo::soft_delete(&pool, second.id).await.unwrap();

    let stats = MeetingRepo::list_with_stats(&pool, &MeetingFilter::default())
        .await
        .unwrap();
    assert_eq!(stats[0].agenda_count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_cascades_to_attachments(pool: PgPool) {
    let meeting = MeetingRepo::create(&pool, &new_meeting("1/2568", "A", 1), "sec")
        .await
        .unwrap();
    AttachedFileRepo::insert_many(
        &pool,
        AttachmentOwner::Meeting(meeting.id),
        &[new_file("a.pdf"), new_file("b.pdf")],
        "sec",
    )
    .await
    .unwrap();

    let paths = AttachedFileRepo::paths_for_meetings(&pool, &[meeting.id])
        .await
        .unwrap();
    assert_eq!(paths.len(), 2);

    let deleted = MeetingRepo::delete(&pool, meeting.id).await.unwrap();
    assert_eq!(deleted.map(|m| m.id), Some(meeting.id));

    let remaining = AttachedFileRepo::list_for(&pool, AttachmentOwner::Meeting(meeting.id))
        .await
        .unwrap();
    assert!(remaining.is_empty());

    assert!(MeetingRepo::delete(&pool, meeting.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_delete_returns_only_existing_rows(pool: PgPool) {
    let a = MeetingRepo::create(&pool, &new_meeting("1/2568", "A", 1), "sec")
        .await
        .unwrap();
    let b = MeetingRepo::create(&pool, &new_meeting("2/2568", "B", 2), "sec")
        .await
        .unwrap();

    let deleted = MeetingRepo::bulk_delete(&pool, &[a.id, b.id, 424242])
        .await
        .unwrap();
    assert_eq!(deleted.len(), 2);
    assert!(MeetingRepo::list(&pool, &MeetingFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stored_file_listing_covers_every_kind(pool: PgPool) {
    let meeting = MeetingRepo::create(&pool, &new_meeting("1/2568", "A", 1), "sec")
        .await
        .unwrap();
    MeetingRepo::set_report(&pool, meeting.id, "/uploads/report.pdf", 10, "sec")
        .await
        .unwrap();
    AttachedFileRepo::insert_many(
        &pool,
        AttachmentOwner::Meeting(meeting.id),
        &[new_file("m.pdf")],
        "sec",
    )
    .await
    .unwrap();
    let agenda = AgendaRepo::create(
        &pool,
        &CreateAgenda {
            meeting_number: Some("1/2568".into()),
            agenda_number: Some("1".into()),
            agenda_topic: Some("t".into()),
            agenda_type: Some("x".into()),
            submitting_department: Some("IT".into()),
            description: None,
        },
        "mgr",
    )
    .await
    .unwrap();
    AttachedFileRepo::insert_many(
        &pool,
        AttachmentOwner::Agenda(agenda.id),
        &[new_file("a.pdf")],
        "mgr",
    )
    .await
    .unwrap();

    let files = AttachedFileRepo::list_stored_files(&pool).await.unwrap();
    let mut kinds: Vec<&str> = files.iter().map(|f| f.kind.as_str()).collect();
    kinds.sort();
    assert_eq!(kinds, vec!["agenda_file", "meeting_file", "meeting_report"]);

    let report = files.iter().find(|f| f.kind == "meeting_report").unwrap();
    assert_eq!(report.file_name, "report.pdf");
}
