use async_trait::async_trait;

use crate::core::Result;
use crate::modules::reports::models::{ResumoNotasParcelas, TotalDeNotas};

/// A typed row of one record-store table.
///
/// `Draft` is what callers insert (no identifier yet), `Patch` is a partial
/// update where `None` fields are left untouched, and `Filter` narrows a
/// select. `Filter::default()` matches every row.
pub trait Record: Clone + Send + Sync + 'static {
    type Draft: Clone + Send + Sync + 'static;
    type Patch: Clone + Send + Sync + 'static;
    type Filter: Clone + Default + Send + Sync + 'static;

    /// Table name in the record store
    const TABLE: &'static str;

    fn id(&self) -> i64;
}

/// Generic create/read/update/delete against one record-store table.
/// Every table of the store implements this trait for its record type.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Insert a record and return it with its assigned identifier
    async fn insert(&self, draft: T::Draft) -> Result<T>;

    /// Insert several records, returning them in input order
    async fn insert_batch(&self, drafts: Vec<T::Draft>) -> Result<Vec<T>> {
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            created.push(self.insert(draft).await?);
        }
        Ok(created)
    }

    /// Records matching the filter, in the table's natural order
    async fn select(&self, filter: &T::Filter) -> Result<Vec<T>>;

    /// Find a record by its identifier
    async fn find_by_id(&self, id: i64) -> Result<Option<T>>;

    /// Apply a partial update; fails with NotFound for unknown ids
    async fn update(&self, id: i64, patch: T::Patch) -> Result<T>;

    /// Delete a record by its identifier
    async fn delete(&self, id: i64) -> Result<()>;

    /// Delete every record matching the filter, returning how many went away
    async fn delete_where(&self, filter: &T::Filter) -> Result<u64>;
}

/// Read-only aggregate views maintained by the record store
#[async_trait]
pub trait SummaryViews: Send + Sync {
    /// Sum of `valor_total` across all notas
    async fn total_de_notas(&self) -> Result<TotalDeNotas>;

    /// Stock / in-use / invoiced / payable totals
    async fn resumo_notas_parcelas(&self) -> Result<ResumoNotasParcelas>;
}
