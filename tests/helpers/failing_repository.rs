// Repository wrapper that fails writes on demand

use async_trait::async_trait;
use contas_obra::core::{AppError, Record, Repository, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub struct FailingRepository<T: Record> {
    inner: Arc<dyn Repository<T>>,
    fail_insert: AtomicBool,
    fail_update: AtomicBool,
    updates: AtomicUsize,
    failing_update: AtomicUsize,
}

impl<T: Record> FailingRepository<T> {
    pub fn wrap(inner: Arc<dyn Repository<T>>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_insert: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            updates: AtomicUsize::new(0),
            failing_update: AtomicUsize::new(0),
        })
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    /// Fail only the `n`-th update (1-based) issued from now on
    pub fn fail_nth_update(&self, n: usize) {
        self.updates.store(0, Ordering::SeqCst);
        self.failing_update.store(n, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, operation: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(AppError::store(format!(
                "{} on {} unavailable",
                operation,
                T::TABLE
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<T: Record> Repository<T> for FailingRepository<T> {
    async fn insert(&self, draft: T::Draft) -> Result<T> {
        Self::check(&self.fail_insert, "insert")?;
        self.inner.insert(draft).await
    }

    async fn insert_batch(&self, drafts: Vec<T::Draft>) -> Result<Vec<T>> {
        Self::check(&self.fail_insert, "insert")?;
        self.inner.insert_batch(drafts).await
    }

    async fn select(&self, filter: &T::Filter) -> Result<Vec<T>> {
        self.inner.select(filter).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<T>> {
        self.inner.find_by_id(id).await
    }

    async fn update(&self, id: i64, patch: T::Patch) -> Result<T> {
        Self::check(&self.fail_update, "update")?;
        let n = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.failing_update.load(Ordering::SeqCst) {
            return Err(AppError::store(format!("update #{} on {} unavailable", n, T::TABLE)));
        }
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.inner.delete(id).await
    }

    async fn delete_where(&self, filter: &T::Filter) -> Result<u64> {
        self.inner.delete_where(filter).await
    }
}
