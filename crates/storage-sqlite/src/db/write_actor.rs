//! Single writer for SQLite.
//!
//! All mutations are funnelled through one dedicated thread that owns a pooled
//! connection and runs each job inside an immediate transaction. Writes are
//! therefore serialized, and a read-then-write sequence inside one job is
//! atomic with respect to every other write.

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use faire_sync_core::errors::{Error, Result};

use crate::errors::{StorageError, TransactionError};

type Job = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Cloneable handle used by repositories to submit write jobs.
#[derive(Clone)]
pub struct WriteHandle {
    sender: mpsc::UnboundedSender<Job>,
}

impl WriteHandle {
    /// Runs `job` on the writer thread inside a transaction and returns its
    /// result. An `Err` from the job rolls the transaction back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel::<Result<T>>();

        let wrapped: Job = Box::new(move |conn: &mut SqliteConnection| {
            let result = conn
                .immediate_transaction::<T, TransactionError, _>(|tx_conn| {
                    job(tx_conn).map_err(TransactionError::Core)
                })
                .map_err(Error::from);
            let _ = reply_tx.send(result);
        });

        self.sender
            .send(wrapped)
            .map_err(|_| StorageError::Writer("writer thread has stopped".to_string()))?;

        reply_rx
            .await
            .map_err(|_| StorageError::Writer("writer dropped the job".to_string()))?
    }
}

/// Starts the writer thread. It exits once every [`WriteHandle`] is dropped.
pub fn spawn_writer(pool: Pool<ConnectionManager<SqliteConnection>>) -> WriteHandle {
    let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

    std::thread::Builder::new()
        .name("sqlite-writer".to_string())
        .spawn(move || {
            let mut conn = match pool.get() {
                Ok(conn) => conn,
                Err(e) => {
                    error!("[Storage] Writer could not acquire a connection: {}", e);
                    return;
                }
            };
            debug!("[Storage] Writer thread started");
            while let Some(job) = receiver.blocking_recv() {
                job(&mut *conn);
            }
            debug!("[Storage] Writer thread stopped");
        })
        .map(|_| ())
        .unwrap_or_else(|e| error!("[Storage] Failed to spawn writer thread: {}", e));

    WriteHandle { sender }
}
