use super::{Config, Db, RegisteredModel};
use crate::Model;

use crumpet_core::schema::{ModelDef, ModelSchema};
use crumpet_core::{Error, Result};
use crumpet_sql::Templates;

use mysql_async::Pool;
use std::any::TypeId;
use std::collections::HashMap;
use tracing::info;

/// Builds a [`Db`]: entity registration, definition validation, pool
/// construction.
#[derive(Default)]
pub struct Builder {
    defs: Vec<(TypeId, ModelDef)>,
}

impl Builder {
    /// Registers an entity type. Its declaration is compiled and validated
    /// when [`connect`](Builder::connect) runs.
    pub fn register<M: Model>(&mut self) -> &mut Self {
        self.defs.push((TypeId::of::<M>(), M::definition()));
        self
    }

    /// Compiles every registered definition, builds the connection pool and
    /// verifies the backend is reachable.
    ///
    /// Definition errors surface here, before any I/O. An unreachable
    /// backend fails this call, not the first query.
    pub async fn connect(&mut self, config: &Config) -> Result<Db> {
        let mut models = HashMap::with_capacity(self.defs.len());
        let mut order = Vec::with_capacity(self.defs.len());

        for (type_id, def) in self.defs.drain(..) {
            let schema = ModelSchema::build(def)?;
            let templates = Templates::build(&schema);
            if models
                .insert(type_id, RegisteredModel { schema, templates })
                .is_none()
            {
                order.push(type_id);
            }
        }

        let pool = Pool::new(config.opts()?);

        if let Err(err) = verify(&pool).await {
            let _ = pool.disconnect().await;
            return Err(err);
        }

        info!(
            host = %config.host,
            port = config.port,
            models = order.len(),
            "database connection pool ready"
        );

        Ok(Db::from_parts(pool, models, order))
    }
}

/// Checks out one connection and pings it.
async fn verify(pool: &Pool) -> Result<()> {
    let mut conn = pool.get_conn().await.map_err(Error::connection_pool)?;
    conn.ping().await.map_err(Error::connection_pool)
}
