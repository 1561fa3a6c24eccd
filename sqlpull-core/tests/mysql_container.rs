//! End-to-end query extraction against a MySQL container.
//!
//! These tests start a MySQL server through testcontainers and need a
//! running Docker daemon. Run them with `cargo nextest run --run-ignored all`.

#![cfg(feature = "mysql")]

use sqlpull_core::{
    ConnectionDescriptor, Credentials, MySqlClient, QueryClient, QueryConfig, Result,
    SqlPullError,
};
use sqlx::{Connection, Executor, MySqlConnection};
use std::time::Duration;
use testcontainers_modules::{mysql::Mysql, testcontainers::runners::AsyncRunner};

/// Waits until the server accepts connections.
async fn wait_for_mysql_ready(database_url: &str, max_attempts: u32) -> Result<()> {
    for attempt in 1..=max_attempts {
        if let Ok(mut conn) = MySqlConnection::connect(database_url).await {
            let ready = conn.execute("SELECT 1").await.is_ok();
            let _ = conn.close().await;
            if ready {
                return Ok(());
            }
        }
        if attempt < max_attempts {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }
    Err(SqlPullError::connection_failed(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("MySQL failed to become ready after {} attempts", max_attempts),
    )))
}

async fn seed(database_url: &str) {
    let mut conn = MySqlConnection::connect(database_url).await.unwrap();
    conn.execute(
        "CREATE TABLE people (id INT PRIMARY KEY, name VARCHAR(64), born DATE, note TEXT)",
    )
    .await
    .unwrap();
    conn.execute(
        "INSERT INTO people VALUES \
         (1, 'ada', '1815-12-10', NULL), \
         (2, NULL, NULL, 'null'), \
         (3, 'grace, rear admiral', '1906-12-09', '')",
    )
    .await
    .unwrap();
    conn.close().await.unwrap();
}

fn client(port: u16, output_dir: &std::path::Path) -> MySqlClient {
    let descriptor = ConnectionDescriptor::new(
        format!("jdbc:mysql://127.0.0.1:{}/", port),
        "test",
        "prefer",
        Credentials::new("root".to_string(), String::new()),
    )
    .unwrap();
    MySqlClient::new(&descriptor)
        .unwrap()
        .with_config(QueryConfig::default().with_output_dir(output_dir).with_fetch_size(2))
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_realize_query_against_mysql() -> Result<()> {
    let mysql = Mysql::default().start().await.unwrap();
    let port = mysql.get_host_port_ipv4(3306).await.unwrap();
    let database_url = format!("mysql://root@127.0.0.1:{}/test", port);
    wait_for_mysql_ready(&database_url, 30).await?;
    seed(&database_url).await;

    let dir = tempfile::tempdir().unwrap();
    let client = client(port, dir.path());

    let path = client
        .realize_query("SELECT id, name, born, note FROM people ORDER BY id")
        .await?;
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "id,name,born,note\n\
         1,ada,1815-12-10,\n\
         2,,,null\n\
         3,\"grace, rear admiral\",1906-12-09,\n"
    );

    let empty = client
        .realize_query("SELECT id, name FROM people WHERE id > 100")
        .await?;
    assert_eq!(std::fs::read_to_string(&empty).unwrap(), "id,name\n");

    let session = client
        .realize_query("SELECT @@autocommit AS autocommit")
        .await?;
    assert_eq!(std::fs::read_to_string(&session).unwrap(), "autocommit\n0\n");

    let times = client
        .realize_query(
            "SELECT CAST('08:30:00' AS TIME) AS t1, CAST('838:59:59' AS TIME) AS t2, \
             CAST('-01:30:00' AS TIME) AS t3",
        )
        .await?;
    assert_eq!(
        std::fs::read_to_string(&times).unwrap(),
        "t1,t2,t3\n08:30:00,838:59:59,-1:30:00\n"
    );

    let update = client
        .realize_query("UPDATE people SET note = 'x' WHERE id = 1")
        .await?;
    assert!(!update.exists());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_realize_query_reports_sql_errors() -> Result<()> {
    let mysql = Mysql::default().start().await.unwrap();
    let port = mysql.get_host_port_ipv4(3306).await.unwrap();
    let database_url = format!("mysql://root@127.0.0.1:{}/test", port);
    wait_for_mysql_ready(&database_url, 30).await?;

    let dir = tempfile::tempdir().unwrap();
    let err = client(port, dir.path())
        .realize_query("SELECT * FROM missing_table")
        .await
        .unwrap_err();

    assert!(matches!(err, SqlPullError::QueryExecution { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_realize_query_unreachable_server() {
    let dir = tempfile::tempdir().unwrap();
    let err = client(1, dir.path())
        .realize_query("SELECT 1")
        .await
        .unwrap_err();

    assert!(matches!(err, SqlPullError::Connection { .. }));
}
