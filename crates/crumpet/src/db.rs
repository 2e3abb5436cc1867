mod builder;
pub use builder::Builder;

mod config;
pub use config::Config;

use crate::{value, Model};

use crumpet_core::schema::ModelSchema;
use crumpet_core::stmt::{Record, Value};
use crumpet_core::{Error, Result};
use crumpet_sql::Templates;

use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Pool};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A registered entity type: its compiled schema and the four statement
/// templates synthesized from it.
pub(crate) struct RegisteredModel {
    pub(crate) schema: ModelSchema,
    pub(crate) templates: Templates,
}

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    pool: Pool,
    models: HashMap<TypeId, RegisteredModel>,
    /// Registration order, for table creation.
    order: Vec<TypeId>,
    closed: AtomicBool,
}

/// A database handle: the schema registry plus a shared connection pool.
///
/// Cloning is cheap and clones share the pool. Each operation checks out
/// its own pooled connection and checks it back in on every exit path, so
/// concurrent callers never interfere through the handle.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn from_parts(
        pool: Pool,
        models: HashMap<TypeId, RegisteredModel>,
        order: Vec<TypeId>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                pool,
                models,
                order,
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn model<M: Model>(&self) -> Result<&RegisteredModel> {
        self.shared
            .models
            .get(&TypeId::of::<M>())
            .ok_or_else(|| Error::model_not_registered(std::any::type_name::<M>()))
    }

    /// The compiled schema for a registered entity type.
    pub fn schema_of<M: Model>(&self) -> Result<&ModelSchema> {
        Ok(&self.model::<M>()?.schema)
    }

    async fn conn(&self) -> Result<Conn> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(Error::PoolClosed);
        }
        self.shared
            .pool
            .get_conn()
            .await
            .map_err(Error::connection_pool)
    }

    /// Runs a read statement and returns its rows as ordered records, at
    /// most `limit` of them when given.
    pub async fn select(
        &self,
        sql: &str,
        args: &[Value],
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        debug!(%sql, "select");
        check_args(sql, args)?;

        let mut conn = self.conn().await?;
        let stmt = conn.prep(sql).await.map_err(Error::driver)?;
        let rows: Vec<mysql_async::Row> = conn
            .exec(&stmt, value::to_params(args))
            .await
            .map_err(Error::driver)?;

        let take = limit.unwrap_or(rows.len());
        let mut records = Vec::with_capacity(take.min(rows.len()));
        for row in rows.into_iter().take(take) {
            records.push(value::record_from_row(row)?);
        }

        debug!(rows = records.len(), "rows returned");
        Ok(records)
    }

    /// Runs a write statement and returns the affected-row count.
    ///
    /// With `autocommit` off, the statement runs inside an explicit
    /// transaction: committed on success, rolled back on any failure before
    /// the original error is re-raised. The connection returns to the pool
    /// on every exit path.
    pub async fn execute(&self, sql: &str, args: &[Value], autocommit: bool) -> Result<u64> {
        debug!(%sql, autocommit, "execute");
        check_args(sql, args)?;

        let mut conn = self.conn().await?;

        if !autocommit {
            conn.query_drop("START TRANSACTION")
                .await
                .map_err(Error::driver)?;
        }

        match run_write(&mut conn, sql, args, !autocommit).await {
            Ok(affected) => {
                debug!(affected, "rows affected");
                Ok(affected)
            }
            Err(err) => {
                if !autocommit {
                    if let Err(rollback_err) = conn.query_drop("ROLLBACK").await {
                        // The caller sees the original failure; the broken
                        // connection is still dropped back to the pool.
                        warn!(error = %rollback_err, "rollback failed");
                    }
                }
                Err(err)
            }
        }
    }

    /// Creates the table for every registered entity type, in registration
    /// order. One-shot setup; existing tables are left untouched.
    pub async fn create_tables(&self) -> Result<()> {
        for type_id in &self.shared.order {
            let model = &self.shared.models[type_id];
            let sql = crumpet_sql::create_table(&model.schema);
            self.execute(&sql, &[], true).await?;
        }
        Ok(())
    }

    /// Marks the handle closed and drains the pool.
    ///
    /// Idempotent. Every operation issued after the first close fails with
    /// the pool-not-available error.
    pub async fn close(&self) -> Result<()> {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        info!("closing database connection pool");
        self.shared
            .pool
            .clone()
            .disconnect()
            .await
            .map_err(Error::driver)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("models", &self.shared.models.len())
            .field("closed", &self.shared.closed.load(Ordering::Relaxed))
            .finish()
    }
}

async fn run_write(conn: &mut Conn, sql: &str, args: &[Value], commit: bool) -> Result<u64> {
    let stmt = conn.prep(sql).await.map_err(Error::driver)?;
    let affected = conn
        .exec_iter(&stmt, value::to_params(args))
        .await
        .map_err(Error::driver)?
        .affected_rows();

    if commit {
        conn.query_drop("COMMIT").await.map_err(Error::driver)?;
    }

    Ok(affected)
}

/// Positional arguments must match the statement's placeholders exactly.
fn check_args(sql: &str, args: &[Value]) -> Result<()> {
    let expected = crumpet_sql::placeholder_count(sql);
    if expected != args.len() {
        return Err(Error::placeholder_mismatch(expected, args.len()));
    }
    Ok(())
}
