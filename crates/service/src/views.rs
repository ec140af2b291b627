//! Week, month and list views assembled on the server.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::instrument;

use models::label;

use crate::calendar::{self, CalendarError};
use crate::db::label_service;
use crate::db::task_service::{self, TaskFilter, TaskWithLabels};
use crate::errors::ServiceError;

/// Header text on label colours brighter than this is drawn black.
pub const BRIGHTNESS_THRESHOLD: u8 = 120;
pub const DONE_WINDOW_DAYS: i64 = 7;

impl From<CalendarError> for ServiceError {
    fn from(e: CalendarError) -> Self { ServiceError::Validation(e.to_string()) }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayTasks {
    pub date: NaiveDate,
    pub tasks: Vec<TaskWithLabels>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub utc_offset_minutes: i32,
    pub days: Vec<DayTasks>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListColumn {
    pub name: String,
    pub label_id: Option<i32>,
    pub color: Option<String>,
    pub text_color: Option<&'static str>,
    pub tasks: Vec<TaskWithLabels>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub columns: Vec<ListColumn>,
}

/// Buckets dated tasks onto `days` by their local date. Tasks outside the grid are dropped.
pub fn group_by_day(days: &[NaiveDate], tasks: Vec<TaskWithLabels>, offset: FixedOffset) -> Vec<DayTasks> {
    let mut buckets: BTreeMap<NaiveDate, Vec<TaskWithLabels>> = days.iter().map(|d| (*d, Vec::new())).collect();
    for t in tasks {
        let Some(due) = t.task.due_date else { continue };
        if let Some(bucket) = buckets.get_mut(&calendar::local_date(&due, offset)) {
            bucket.push(t);
        }
    }
    buckets.into_iter().map(|(date, tasks)| DayTasks { date, tasks }).collect()
}

fn text_color(color: &str) -> &'static str {
    if label::brightness(color) > BRIGHTNESS_THRESHOLD { "black" } else { "white" }
}

/// `open` and `done` keep their incoming order inside each column.
pub fn build_columns(labels: &[label::Model], open: &[TaskWithLabels], done: Vec<TaskWithLabels>) -> Vec<ListColumn> {
    let mut columns = Vec::with_capacity(labels.len() + 2);
    columns.push(ListColumn {
        name: "Unlabeled".into(),
        label_id: None,
        color: None,
        text_color: None,
        tasks: open.iter().filter(|t| t.labels.is_empty()).cloned().collect(),
    });
    for l in labels.iter().filter(|l| l.is_column) {
        columns.push(ListColumn {
            name: l.name.clone(),
            label_id: Some(l.id),
            color: Some(l.color.clone()),
            text_color: Some(text_color(&l.color)),
            tasks: open.iter().filter(|t| t.labels.contains(&l.id)).cloned().collect(),
        });
    }
    columns.push(ListColumn { name: "Done".into(), label_id: None, color: None, text_color: None, tasks: done });
    columns
}

async fn grid(db: &DatabaseConnection, user_id: i32, days: Vec<NaiveDate>, offset_minutes: i32) -> Result<GridView, ServiceError> {
    let offset = calendar::offset_from_minutes(offset_minutes)?;
    let (Some(first), Some(last)) = (days.first().copied(), days.last().copied()) else {
        return Err(ServiceError::Validation("empty date range".into()));
    };
    let (start, end) = calendar::day_range(first, last, offset)?;
    let filter = TaskFilter { start: Some(start), end: Some(end), is_done: None };
    let tasks = task_service::list_tasks(db, user_id, &filter).await?;
    Ok(GridView { start: first, end: last, utc_offset_minutes: offset_minutes, days: group_by_day(&days, tasks, offset) })
}

/// The Sunday..Saturday week containing `date`.
#[instrument(skip(db))]
pub async fn week_view(db: &DatabaseConnection, user_id: i32, date: NaiveDate, offset_minutes: i32) -> Result<GridView, ServiceError> {
    grid(db, user_id, calendar::week_of(date)?.to_vec(), offset_minutes).await
}

#[instrument(skip(db))]
pub async fn month_view(db: &DatabaseConnection, user_id: i32, year: i32, month: u32, offset_minutes: i32) -> Result<GridView, ServiceError> {
    grid(db, user_id, calendar::month_grid(year, month)?, offset_minutes).await
}

#[instrument(skip(db))]
pub async fn list_view(db: &DatabaseConnection, user_id: i32, now: DateTime<Utc>) -> Result<ListView, ServiceError> {
    let labels = label_service::list_labels(db, user_id).await?;
    let open = task_service::list_tasks(db, user_id, &TaskFilter { is_done: Some(false), ..Default::default() }).await?;
    let done_since = (now - Duration::days(DONE_WINDOW_DAYS)).fixed_offset();
    let done = task_service::list_tasks(
        db,
        user_id,
        &TaskFilter { start: Some(done_since), end: None, is_done: Some(true) },
    )
    .await?;
    Ok(ListView { columns: build_columns(&labels, &open, done) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::task;

    fn task_at(id: i32, due: Option<&str>, labels: Vec<i32>) -> TaskWithLabels {
        let now = Utc::now().fixed_offset();
        TaskWithLabels {
            task: task::Model {
                id,
                user_id: 1,
                title: format!("task {id}"),
                description: String::new(),
                due_date: due.map(|s| DateTime::parse_from_rfc3339(s).unwrap()),
                is_done: false,
                created_at: now,
                updated_at: now,
            },
            labels,
        }
    }

    fn label(id: i32, name: &str, color: &str, is_column: bool) -> label::Model {
        let now = Utc::now().fixed_offset();
        label::Model { id, user_id: 1, name: name.into(), color: color.into(), is_column, created_at: now, updated_at: now }
    }

    #[test]
    fn tasks_land_on_their_local_day() {
        let days = calendar::week_of(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()).unwrap();
        let tasks = vec![
            task_at(1, Some("2024-03-06T02:00:00Z"), vec![]),
            task_at(2, Some("2024-03-06T15:00:00Z"), vec![]),
            task_at(3, None, vec![]),
            task_at(4, Some("2024-04-01T12:00:00Z"), vec![]),
        ];
        let offset = calendar::offset_from_minutes(-300).unwrap();
        let grouped = group_by_day(&days, tasks, offset);
        assert_eq!(grouped.len(), 7);
        let tue = &grouped[2];
        assert_eq!(tue.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(tue.tasks.iter().map(|t| t.task.id).collect::<Vec<_>>(), vec![1]);
        let wed = &grouped[3];
        assert_eq!(wed.tasks.iter().map(|t| t.task.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(grouped.iter().map(|d| d.tasks.len()).sum::<usize>(), 2);
    }

    #[test]
    fn list_columns_split_by_label() {
        let labels = vec![label(10, "work", "#ffffff", true), label(11, "misc", "#000000", false), label(12, "home", "#102030", true)];
        let open = vec![task_at(1, None, vec![]), task_at(2, None, vec![10]), task_at(3, None, vec![10, 12]), task_at(4, None, vec![11])];
        let done = vec![task_at(5, Some("2024-03-06T02:00:00Z"), vec![10])];
        let cols = build_columns(&labels, &open, done);

        let names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Unlabeled", "work", "home", "Done"]);
        let ids = |c: &ListColumn| c.tasks.iter().map(|t| t.task.id).collect::<Vec<_>>();
        assert_eq!(ids(&cols[0]), vec![1]);
        assert_eq!(ids(&cols[1]), vec![2, 3]);
        assert_eq!(ids(&cols[2]), vec![3]);
        assert_eq!(ids(&cols[3]), vec![5]);
        assert_eq!(cols[1].text_color, Some("black"));
        assert_eq!(cols[2].text_color, Some("white"));
        assert_eq!(cols[1].label_id, Some(10));
    }

    #[test]
    fn calendar_errors_are_validation() {
        let e: ServiceError = CalendarError::InvalidOffset(9999).into();
        assert!(matches!(e, ServiceError::Validation(_)));
    }
}
