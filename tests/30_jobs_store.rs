//! Live-database coverage for the job gateway. Each test opens a
//! single-connection pool and creates session-temporary tables that shadow
//! any real ones, so runs are isolated and leave nothing behind. The whole
//! suite is skipped when DATABASE_URL is not set or not reachable.

use std::time::Duration;

use anyhow::Result;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use jobboard_api::models::job::{JobFilter, JobStore, JobStoreError, JobUpdate, NewJob};

async fn store() -> Option<JobStore> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&url)
        .await
        .ok()?;

    // Temporary tables resolve ahead of the public schema for this session
    sqlx::query("CREATE TEMP TABLE companies (handle TEXT PRIMARY KEY, name TEXT NOT NULL)")
        .execute(&pool)
        .await
        .ok()?;
    sqlx::query(
        "CREATE TEMP TABLE jobs (
           id SERIAL PRIMARY KEY,
           title TEXT NOT NULL,
           salary INTEGER,
           equity NUMERIC,
           company_handle TEXT NOT NULL REFERENCES companies ON DELETE CASCADE)",
    )
    .execute(&pool)
    .await
    .ok()?;
    sqlx::query("INSERT INTO companies (handle, name) VALUES ('c1', 'C1 Inc')")
        .execute(&pool)
        .await
        .ok()?;

    Some(JobStore::new(pool))
}

fn job(title: &str, salary: Option<i32>, equity: Option<Decimal>) -> NewJob {
    NewJob {
        title: title.to_string(),
        salary,
        equity,
        company_handle: "c1".to_string(),
    }
}

#[tokio::test]
async fn create_then_get_round_trip() -> Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let created = store
        .create(&job("Engineer", Some(1000), Some(Decimal::new(1, 1))))
        .await?;
    assert!(created.id > 0);
    assert_eq!(created.title, "Engineer");
    assert_eq!(created.salary, Some(1000));
    assert_eq!(created.equity, Some(Decimal::new(1, 1)));
    assert_eq!(created.company_handle, "c1");

    let fetched = store.get(created.id).await?;
    assert_eq!(fetched, created);
    Ok(())
}

#[tokio::test]
async fn duplicate_create_is_invalid_input() -> Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    store
        .create(&job("Engineer", Some(1000), Some(Decimal::new(1, 1))))
        .await?;
    let err = store
        .create(&job("Engineer", Some(1000), Some(Decimal::new(1, 1))))
        .await
        .unwrap_err();
    assert!(matches!(err, JobStoreError::InvalidInput(_)), "got {err:?}");

    // NULL salary/equity compare equal in the duplicate check
    store.create(&job("Intern", None, None)).await?;
    let err = store.create(&job("Intern", None, None)).await.unwrap_err();
    assert!(matches!(err, JobStoreError::InvalidInput(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn create_with_unknown_company_is_invalid_input() -> Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let mut data = job("Engineer", None, None);
    data.company_handle = "nope".to_string();
    let err = store.create(&data).await.unwrap_err();
    assert!(matches!(err, JobStoreError::InvalidInput(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn find_all_filters_by_salary_and_equity() -> Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    store
        .create(&job("j1", Some(1000), Some(Decimal::new(1, 1))))
        .await?;
    store
        .create(&job("j2", Some(2000), Some(Decimal::new(2, 1))))
        .await?;
    store
        .create(&job("j3", Some(3000), Some(Decimal::new(3, 1))))
        .await?;

    let filter = JobFilter {
        min_salary: Some(2900),
        has_equity: Some(true),
        ..Default::default()
    };
    let jobs = store.find_all(&filter).await?;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "j3");

    // no filters: everything, ordered by title ascending
    let all = store.find_all(&JobFilter::default()).await?;
    let titles: Vec<&str> = all.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, vec!["j1", "j2", "j3"]);
    Ok(())
}

#[tokio::test]
async fn update_changes_only_supplied_fields() -> Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let created = store
        .create(&job("Engineer", Some(1000), Some(Decimal::new(1, 1))))
        .await?;
    let updated = store
        .update(
            created.id,
            &JobUpdate {
                title: Some(Some("Senior Engineer".to_string())),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.title, "Senior Engineer");
    assert_eq!(updated.salary, Some(1000));
    assert_eq!(updated.equity, created.equity);
    assert_eq!(updated.id, created.id);
    Ok(())
}

#[tokio::test]
async fn update_missing_or_empty_is_rejected() -> Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let err = store
        .update(
            9999,
            &JobUpdate {
                salary: Some(Some(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, JobStoreError::NotFound(_)), "got {err:?}");

    let created = store.create(&job("Engineer", None, None)).await?;
    let err = store
        .update(created.id, &JobUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, JobStoreError::InvalidInput(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn remove_then_get_is_not_found() -> Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let created = store.create(&job("Engineer", None, None)).await?;
    store.remove(created.id).await?;

    let err = store.get(created.id).await.unwrap_err();
    assert!(matches!(err, JobStoreError::NotFound(_)), "got {err:?}");

    let err = store.remove(created.id).await.unwrap_err();
    assert!(matches!(err, JobStoreError::NotFound(_)), "got {err:?}");
    Ok(())
}
