use anyhow::{Context, Result};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPoolOptions, PgStatement};
use sqlx::{Executor, PgPool, Postgres, Statement};
use std::future::Future;
use std::pin::Pin;
use tracing::info;

use crate::target::{UpdateSession, UpdateTarget};

/// Statement every worker prepares once and reuses for the whole run.
const UPDATE_ROW_SQL: &str = "UPDATE foo SET updated_at = now() WHERE id = 1";

/// Open a connection pool sized so every worker can hold its own connection.
pub async fn connect_pool(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .context("Unable to connect to database")?;
    Ok(pool)
}

/// Drop and recreate the target table, then seed it with the single row all
/// workers update. Safe to run repeatedly; each call leaves exactly one row.
pub async fn reset_schema(pool: &PgPool) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS foo")
        .execute(pool)
        .await
        .context("error dropping table")?;

    sqlx::query("CREATE TABLE foo (id SERIAL PRIMARY KEY, updated_at TIMESTAMP DEFAULT now())")
        .execute(pool)
        .await
        .context("error creating table")?;

    sqlx::query("INSERT INTO foo (updated_at) VALUES (now())")
        .execute(pool)
        .await
        .context("error inserting initial row")?;

    info!("Table foo recreated and initialized with one row");
    Ok(())
}

/// Postgres-backed update target sharing one pool across workers.
pub struct PgUpdateTarget {
    pool: PgPool,
}

impl PgUpdateTarget {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UpdateTarget for PgUpdateTarget {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn start_session<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn UpdateSession>>> + Send + 'a>> {
        Box::pin(async move {
            let mut conn = self
                .pool
                .acquire()
                .await
                .context("Failed to acquire connection for worker")?;
            let stmt = (&mut *conn)
                .prepare(UPDATE_ROW_SQL)
                .await
                .context("Error preparing update statement")?;

            Ok(Box::new(PgUpdateSession { conn, stmt }) as Box<dyn UpdateSession>)
        })
    }
}

struct PgUpdateSession {
    conn: PoolConnection<Postgres>,
    stmt: PgStatement<'static>,
}

impl UpdateSession for PgUpdateSession {
    fn execute_update<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.stmt.query().execute(&mut *self.conn).await?;
            Ok(())
        })
    }
}
