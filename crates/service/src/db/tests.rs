use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::json;

use super::label_service::{self, LabelPatch, NewLabel};
use super::task_service::{self, NewTask, TaskFilter, TaskPatch};
use super::user_service::{self, ProfilePatch};
use crate::errors::ServiceError;
use crate::test_support::{get_db, make_user};
use crate::views;

fn at(s: &str) -> Option<DateTime<chrono::FixedOffset>> {
    Some(DateTime::parse_from_rfc3339(s).unwrap())
}

fn new_task(title: &str, due: Option<&str>) -> NewTask {
    NewTask { title: title.into(), due_date: due.and_then(at), ..Default::default() }
}

#[tokio::test]
async fn tasks_are_ordered_and_filtered() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let u = make_user(&db, "svc_order").await;

    let undated = task_service::create_task(&db, u.id, new_task("undated", None)).await?;
    let late = task_service::create_task(&db, u.id, new_task("late", Some("2024-03-09T10:00:00Z"))).await?;
    let early = task_service::create_task(&db, u.id, new_task("early", Some("2024-03-03T00:00:00Z"))).await?;

    let all = task_service::list_tasks(&db, u.id, &TaskFilter::default()).await?;
    let ids: Vec<i32> = all.iter().map(|t| t.task.id).collect();
    assert_eq!(ids, vec![early.task.id, late.task.id, undated.task.id]);

    // inclusive on both ends, undated excluded
    let bounded = TaskFilter { start: at("2024-03-03T00:00:00Z"), end: at("2024-03-09T10:00:00Z"), is_done: None };
    let ids: Vec<i32> = task_service::list_tasks(&db, u.id, &bounded).await?.iter().map(|t| t.task.id).collect();
    assert_eq!(ids, vec![early.task.id, late.task.id]);

    let inverted = TaskFilter { start: bounded.end, end: bounded.start, is_done: None };
    assert!(matches!(task_service::list_tasks(&db, u.id, &inverted).await, Err(ServiceError::Validation(_))));

    user_service::delete_user(&db, u.id).await?;
    Ok(())
}

#[tokio::test]
async fn tasks_are_private_to_their_owner() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let owner = make_user(&db, "svc_owner").await;
    let other = make_user(&db, "svc_other").await;

    let t = task_service::create_task(&db, owner.id, new_task("mine", None)).await?;
    assert!(matches!(task_service::get_task(&db, other.id, t.task.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(task_service::delete_task(&db, other.id, t.task.id).await, Err(ServiceError::NotFound(_))));
    assert!(task_service::list_tasks(&db, other.id, &TaskFilter::default()).await?.is_empty());
    assert!(task_service::get_task(&db, owner.id, t.task.id).await.is_ok());

    user_service::delete_user(&db, owner.id).await?;
    user_service::delete_user(&db, other.id).await?;
    Ok(())
}

#[tokio::test]
async fn patch_updates_only_given_fields() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let u = make_user(&db, "svc_patch").await;
    let t = task_service::create_task(&db, u.id, new_task("draft", Some("2024-03-05T09:00:00Z"))).await?;

    let patch: TaskPatch = serde_json::from_value(json!({"is_done": true}))?;
    let done = task_service::update_task(&db, u.id, t.task.id, patch).await?;
    assert!(done.task.is_done);
    assert_eq!(done.task.title, "draft");
    assert!(done.task.due_date.is_some());

    let patch: TaskPatch = serde_json::from_value(json!({"due_date": null, "title": "  final "}))?;
    let cleared = task_service::update_task(&db, u.id, t.task.id, patch).await?;
    assert!(cleared.task.due_date.is_none());
    assert_eq!(cleared.task.title, "final");

    let patch: TaskPatch = serde_json::from_value(json!({"title": "   "}))?;
    assert!(matches!(task_service::update_task(&db, u.id, t.task.id, patch).await, Err(ServiceError::Validation(_))));

    user_service::delete_user(&db, u.id).await?;
    Ok(())
}

#[tokio::test]
async fn label_sets_replace_atomically() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let u = make_user(&db, "svc_labels").await;
    let stranger = make_user(&db, "svc_stranger").await;

    let work = label_service::create_label(&db, u.id, NewLabel { name: "work".into(), color: Some("#FF0000".into()), is_column: true }).await?;
    assert_eq!(work.color, "#ff0000");
    let home = label_service::create_label(&db, u.id, NewLabel { name: "home".into(), ..Default::default() }).await?;
    assert_eq!(home.color, models::label::DEFAULT_COLOR);
    let foreign = label_service::create_label(&db, stranger.id, NewLabel { name: "theirs".into(), ..Default::default() }).await?;

    let t = task_service::create_task(
        &db,
        u.id,
        NewTask { title: "tagged".into(), label_ids: Some(vec![work.id]), ..Default::default() },
    )
    .await?;
    assert_eq!(t.labels, vec![work.id]);

    let set = task_service::set_task_labels(&db, u.id, t.task.id, vec![home.id, work.id, home.id]).await?;
    assert_eq!(set.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(), vec!["home", "work"]);

    let err = task_service::set_task_labels(&db, u.id, t.task.id, vec![work.id, foreign.id]).await;
    assert!(matches!(err, Err(ServiceError::Validation(_))));
    assert_eq!(task_service::task_labels(&db, u.id, t.task.id).await?.len(), 2);

    let tagged = label_service::label_tasks(&db, u.id, work.id).await?;
    assert_eq!(tagged.iter().map(|t| t.task.id).collect::<Vec<_>>(), vec![t.task.id]);

    label_service::delete_label(&db, u.id, work.id).await?;
    assert_eq!(task_service::get_task(&db, u.id, t.task.id).await?.labels, vec![home.id]);

    let renamed = label_service::update_label(&db, u.id, home.id, LabelPatch { name: Some("house".into()), ..Default::default() }).await?;
    assert_eq!(renamed.name, "house");
    assert!(matches!(label_service::get_label(&db, stranger.id, home.id).await, Err(ServiceError::NotFound(_))));

    user_service::delete_user(&db, u.id).await?;
    user_service::delete_user(&db, stranger.id).await?;
    Ok(())
}

#[tokio::test]
async fn profile_update_and_delete() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let u = make_user(&db, "svc_profile").await;

    let p = user_service::update_profile(&db, u.id, ProfilePatch { first_name: Some(" Ann ".into()), last_name: None }).await?;
    assert_eq!(p.first_name, "Ann");
    assert_eq!(p.last_name, "User");
    let bad = user_service::update_profile(&db, u.id, ProfilePatch { last_name: Some("".into()), ..Default::default() }).await;
    assert!(matches!(bad, Err(ServiceError::Validation(_))));

    task_service::create_task(&db, u.id, new_task("goes away", None)).await?;
    user_service::delete_user(&db, u.id).await?;
    assert!(matches!(user_service::get_profile(&db, u.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(user_service::delete_user(&db, u.id).await, Err(ServiceError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn views_group_tasks() -> anyhow::Result<()> {
    let Some(db) = get_db().await else { return Ok(()) };
    let u = make_user(&db, "svc_views").await;
    let col = label_service::create_label(&db, u.id, NewLabel { name: "col".into(), color: None, is_column: true }).await?;

    let monday = task_service::create_task(&db, u.id, new_task("monday", Some("2024-03-04T12:00:00Z"))).await?;
    task_service::create_task(&db, u.id, new_task("next week", Some("2024-03-11T12:00:00Z"))).await?;
    task_service::create_task(
        &db,
        u.id,
        NewTask { title: "in column".into(), label_ids: Some(vec![col.id]), ..Default::default() },
    )
    .await?;
    let recent = Utc::now() - Duration::days(1);
    let done = task_service::create_task(
        &db,
        u.id,
        NewTask { title: "done".into(), due_date: Some(recent.fixed_offset()), is_done: Some(true), ..Default::default() },
    )
    .await?;
    // outside the seven-day Done window
    let stale = Utc::now() - Duration::days(8);
    task_service::create_task(
        &db,
        u.id,
        NewTask { title: "done long ago".into(), due_date: Some(stale.fixed_offset()), is_done: Some(true), ..Default::default() },
    )
    .await?;

    let week = views::week_view(&db, u.id, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(), 0).await?;
    assert_eq!(week.days.len(), 7);
    assert_eq!(week.days[1].tasks.iter().map(|t| t.task.id).collect::<Vec<_>>(), vec![monday.task.id]);
    assert_eq!(week.days.iter().map(|d| d.tasks.len()).sum::<usize>(), 1);

    let month = views::month_view(&db, u.id, 2024, 3, 0).await?;
    assert_eq!(month.days.iter().map(|d| d.tasks.len()).sum::<usize>(), 2);
    assert!(views::month_view(&db, u.id, 2024, 13, 0).await.is_err());

    let list = views::list_view(&db, u.id, Utc::now()).await?;
    let sizes: Vec<(String, usize)> = list.columns.iter().map(|c| (c.name.clone(), c.tasks.len())).collect();
    assert_eq!(sizes, vec![("Unlabeled".into(), 2), ("col".into(), 1), ("Done".into(), 1)]);
    let done_ids: Vec<i32> = list.columns[2].tasks.iter().map(|t| t.task.id).collect();
    assert_eq!(done_ids, vec![done.task.id]);

    user_service::delete_user(&db, u.id).await?;
    Ok(())
}
