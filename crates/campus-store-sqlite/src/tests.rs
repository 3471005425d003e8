//! Integration tests for `SqliteStore` against an in-memory database.

use campus_core::{
  catalog::{NewSubject, SubjectFilter},
  chat::{ChatQuery, NewChatMessage},
  store::SchoolStore,
  user::{NewUser, Role},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn message(channel: &str, text: &str) -> NewChatMessage {
  NewChatMessage::new(Some(channel), "jdoe", Some("J. Doe"), text).unwrap()
}

fn student(login: &str) -> NewUser {
  NewUser::new(login, "Some Student", Some("student"), Some(5), None).unwrap()
}

async fn ledger_rows(s: &SqliteStore, login: &str) -> i64 {
  let login = login.to_owned();
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(
        "SELECT COUNT(*) FROM student_time_limits WHERE student_login = ?1",
        rusqlite::params![login],
        |r| r.get(0),
      )?)
    })
    .await
    .unwrap()
}

// ─── Chat ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_assigns_id_and_timestamp() {
  let s = store().await;

  let first = s.append_message(message("school", "hello")).await.unwrap();
  let second = s.append_message(message("school", "again")).await.unwrap();

  assert_eq!(first.chat_type, "school");
  assert_eq!(first.message_text, "hello");
  assert!(second.id > first.id);
  assert!(second.created_at >= first.created_at);
}

#[tokio::test]
async fn list_returns_oldest_first() {
  let s = store().await;
  for text in ["one", "two", "three"] {
    s.append_message(message("school", text)).await.unwrap();
  }

  let msgs = s.list_messages(ChatQuery::default()).await.unwrap();
  let texts: Vec<_> = msgs.iter().map(|m| m.message_text.as_str()).collect();
  assert_eq!(texts, ["one", "two", "three"]);
  assert!(msgs.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn list_keeps_the_newest_window() {
  let s = store().await;
  for i in 0..5 {
    s.append_message(message("school", &format!("m{i}"))).await.unwrap();
  }

  let query = ChatQuery { chat_type: "school".into(), limit: 2 };
  let msgs = s.list_messages(query).await.unwrap();
  let texts: Vec<_> = msgs.iter().map(|m| m.message_text.as_str()).collect();
  assert_eq!(texts, ["m3", "m4"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_stay_ordered() {
  let s = store().await;
  let tasks: Vec<_> = (0..20)
    .map(|i| {
      let s = s.clone();
      tokio::spawn(async move {
        s.append_message(message("school", &format!("m{i}"))).await
      })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let query = ChatQuery { chat_type: "school".into(), limit: 50 };
  let msgs = s.list_messages(query).await.unwrap();
  assert_eq!(msgs.len(), 20);
  assert!(msgs.windows(2).all(|w| {
    (w[0].created_at, w[0].id) < (w[1].created_at, w[1].id)
  }));
}

#[tokio::test]
async fn channels_are_isolated() {
  let s = store().await;
  s.append_message(message("school", "public")).await.unwrap();
  s.append_message(message("teacher_1", "private")).await.unwrap();

  let school = s.list_messages(ChatQuery::default()).await.unwrap();
  assert_eq!(school.len(), 1);
  assert_eq!(school[0].message_text, "public");

  let query = ChatQuery { chat_type: "teacher_1".into(), limit: 10 };
  let teacher = s.list_messages(query).await.unwrap();
  assert_eq!(teacher.len(), 1);
  assert_eq!(teacher[0].message_text, "private");
}

#[tokio::test]
async fn append_never_goes_back_in_time() {
  let s = store().await;

  // A message stamped in the future simulates a clock that later steps back.
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO chat_messages (chat_type, sender_login, sender_name, message_text, created_at)
         VALUES ('school', 'jdoe', '', 'from the future', '2999-01-01T00:00:00.000000Z')",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let appended = s.append_message(message("school", "now")).await.unwrap();
  assert_eq!(appended.created_at.to_rfc3339(), "2999-01-01T00:00:00+00:00");

  let msgs = s.list_messages(ChatQuery::default()).await.unwrap();
  assert_eq!(msgs.last().unwrap().message_text, "now");

  // Other channels are unaffected.
  let other = s.append_message(message("teacher_1", "elsewhere")).await.unwrap();
  assert!(other.created_at < appended.created_at);
}

#[tokio::test]
async fn zero_limit_returns_nothing() {
  let s = store().await;
  s.append_message(message("school", "hi")).await.unwrap();
  let msgs = s
    .list_messages(ChatQuery { chat_type: "school".into(), limit: 0 })
    .await
    .unwrap();
  assert!(msgs.is_empty());
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn creating_a_student_provisions_quota() {
  let s = store().await;

  let user = s
    .create_user(NewUser::new("s1", "S One", Some("student"), None, None).unwrap())
    .await
    .unwrap();
  assert_eq!(user.role, Role::Student);
  assert_eq!(user.created_by, "admin");

  let ledger = s.quota_for("s1".into()).await.unwrap().unwrap();
  assert_eq!(ledger.student_login, "s1");
  assert_eq!(ledger.daily_limit_minutes, 80);
  assert_eq!(ledger_rows(&s, "s1").await, 1);
}

#[tokio::test]
async fn admins_and_teachers_get_no_quota() {
  let s = store().await;
  s.create_user(NewUser::new("a1", "Admin", Some("admin"), None, None).unwrap())
    .await
    .unwrap();
  s.create_user(NewUser::new("t1", "Teacher", Some("teacher"), None, None).unwrap())
    .await
    .unwrap();

  assert!(s.quota_for("a1".into()).await.unwrap().is_none());
  assert!(s.quota_for("t1".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_login_is_rejected_without_second_ledger_row() {
  let s = store().await;
  s.create_user(student("s1")).await.unwrap();

  let err = s.create_user(student("s1")).await.unwrap_err();
  assert!(matches!(err, Error::LoginTaken(ref l) if l == "s1"), "{err}");

  assert_eq!(ledger_rows(&s, "s1").await, 1);
  assert_eq!(s.list_users().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_of_one_login_provision_once() {
  let s = store().await;
  let tasks: Vec<_> = (0..8)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move { s.create_user(student("s1")).await })
    })
    .collect();

  let mut created = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => created += 1,
      Err(Error::LoginTaken(login)) => assert_eq!(login, "s1"),
      Err(e) => panic!("unexpected error: {e}"),
    }
  }

  assert_eq!(created, 1);
  assert_eq!(ledger_rows(&s, "s1").await, 1);
  assert_eq!(s.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn existing_custom_limit_is_not_overwritten() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO student_time_limits (student_login, daily_limit_minutes) VALUES ('s2', 120)",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  s.create_user(student("s2")).await.unwrap();

  let ledger = s.quota_for("s2".into()).await.unwrap().unwrap();
  assert_eq!(ledger.daily_limit_minutes, 120);
  assert_eq!(ledger_rows(&s, "s2").await, 1);
}

#[tokio::test]
async fn failed_quota_write_rolls_back_user_row() {
  let s = store().await;

  // Make the ledger insert fail so the second half of the cascade errors.
  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER reject_quota BEFORE INSERT ON student_time_limits
         BEGIN SELECT RAISE(ABORT, 'ledger unavailable'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.create_user(student("s3")).await.unwrap_err();
  assert!(err.to_string().contains("ledger unavailable"), "{err}");

  assert!(s.list_users().await.unwrap().is_empty());
  assert!(s.quota_for("s3".into()).await.unwrap().is_none());

  // Non-students never touch the ledger and still succeed.
  s.create_user(NewUser::new("t1", "Teacher", Some("teacher"), None, None).unwrap())
    .await
    .unwrap();
}

#[tokio::test]
async fn list_users_newest_first_without_created_by() {
  let s = store().await;
  s.create_user(student("first")).await.unwrap();
  s.create_user(student("second")).await.unwrap();
  s.create_user(NewUser::new("third", "T", Some("teacher"), None, None).unwrap())
    .await
    .unwrap();

  let users = s.list_users().await.unwrap();
  let logins: Vec<_> = users.iter().map(|u| u.login.as_str()).collect();
  assert_eq!(logins, ["third", "second", "first"]);
  assert_eq!(users[1].grade, Some(5));
  assert_eq!(users[0].role, Role::Teacher);
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

async fn seed_catalog(s: &SqliteStore) {
  for (name, grade, quarter) in [
    ("Physics", 5, 2),
    ("Algebra", 5, 2),
    ("History", 5, 1),
    ("Biology", 6, 2),
  ] {
    s.add_subject(NewSubject {
      name: name.into(),
      grade,
      quarter,
      description: None,
    })
    .await
    .unwrap();
  }
}

#[tokio::test]
async fn filter_subjects_by_grade_and_quarter() {
  let s = store().await;
  seed_catalog(&s).await;

  let subjects = s
    .filter_subjects(SubjectFilter { grade: Some(5), quarter: Some(2) })
    .await
    .unwrap();
  let names: Vec<_> = subjects.iter().map(|s| s.name.as_str()).collect();
  assert_eq!(names, ["Algebra", "Physics"]);
  assert!(subjects.iter().all(|s| s.grade == 5 && s.quarter == 2));
}

#[tokio::test]
async fn unfiltered_catalog_is_ordered() {
  let s = store().await;
  seed_catalog(&s).await;

  let subjects = s.filter_subjects(SubjectFilter::default()).await.unwrap();
  let names: Vec<_> = subjects.iter().map(|s| s.name.as_str()).collect();
  assert_eq!(names, ["History", "Algebra", "Physics", "Biology"]);

  let q2 = s
    .filter_subjects(SubjectFilter { grade: None, quarter: Some(2) })
    .await
    .unwrap();
  assert_eq!(q2.len(), 3);
}
