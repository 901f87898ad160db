//! In-memory record store for development and tests
//!
//! Every table is a `BTreeMap` keyed by identifier behind an `RwLock`.
//! Uniqueness constraints are not enforced here; services check them first.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use crate::core::{AppError, Record, Repository, Result, SummaryViews};
use crate::modules::audit::models::LogEntry;
use crate::modules::auth::models::User;
use crate::modules::installments::models::{Installment, InstallmentStatus};
use crate::modules::invoices::models::{Invoice, MaterialStatus};
use crate::modules::locations::models::Location;
use crate::modules::reports::models::{ResumoNotasParcelas, TotalDeNotas};
use crate::modules::suppliers::models::Supplier;

/// Row behavior the in-memory table needs from a record type
pub trait MemoryRecord: Record {
    fn from_draft(id: i64, draft: Self::Draft) -> Self;

    fn apply(&mut self, patch: Self::Patch);

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Orders (and pages) a selection; identifier order by default
    fn arrange(rows: &mut Vec<Self>, _filter: &Self::Filter) {
        rows.sort_by_key(|row| row.id());
    }
}

struct TableState<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

/// One table of the in-memory store
pub struct InMemoryTable<T> {
    state: Arc<RwLock<TableState<T>>>,
}

impl<T> Clone for InMemoryTable<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: MemoryRecord> InMemoryTable<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(TableState {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Every row in identifier order, unfiltered
    pub fn snapshot(&self) -> Result<Vec<T>> {
        let state = self
            .state
            .read()
            .map_err(|e| AppError::store(format!("Failed to acquire read lock: {}", e)))?;
        Ok(state.rows.values().cloned().collect())
    }
}

impl<T: MemoryRecord> Default for InMemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: MemoryRecord> Repository<T> for InMemoryTable<T> {
    async fn insert(&self, draft: T::Draft) -> Result<T> {
        let mut state = self
            .state
            .write()
            .map_err(|e| AppError::store(format!("Failed to acquire write lock: {}", e)))?;

        let id = state.next_id;
        state.next_id += 1;
        let row = T::from_draft(id, draft);
        state.rows.insert(id, row.clone());

        Ok(row)
    }

    async fn select(&self, filter: &T::Filter) -> Result<Vec<T>> {
        let state = self
            .state
            .read()
            .map_err(|e| AppError::store(format!("Failed to acquire read lock: {}", e)))?;

        let mut rows: Vec<T> = state
            .rows
            .values()
            .filter(|row| row.matches(filter))
            .cloned()
            .collect();
        T::arrange(&mut rows, filter);

        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<T>> {
        let state = self
            .state
            .read()
            .map_err(|e| AppError::store(format!("Failed to acquire read lock: {}", e)))?;

        Ok(state.rows.get(&id).cloned())
    }

    async fn update(&self, id: i64, patch: T::Patch) -> Result<T> {
        let mut state = self
            .state
            .write()
            .map_err(|e| AppError::store(format!("Failed to acquire write lock: {}", e)))?;

        let row = state
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("{} {} not found", T::TABLE, id)))?;
        row.apply(patch);

        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| AppError::store(format!("Failed to acquire write lock: {}", e)))?;

        state
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("{} {} not found", T::TABLE, id)))
    }

    async fn delete_where(&self, filter: &T::Filter) -> Result<u64> {
        let mut state = self
            .state
            .write()
            .map_err(|e| AppError::store(format!("Failed to acquire write lock: {}", e)))?;

        let before = state.rows.len();
        state.rows.retain(|_, row| !row.matches(filter));

        Ok((before - state.rows.len()) as u64)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl MemoryRecord for Invoice {
    fn from_draft(id: i64, draft: Self::Draft) -> Self {
        Invoice {
            id,
            invoice_number: draft.invoice_number,
            supplier: draft.supplier,
            total_value: draft.total_value,
            issue_date: draft.issue_date,
            location_id: draft.location_id,
            material_status: draft.material_status,
            description: draft.description,
            is_installment: draft.is_installment,
            installment_count: draft.installment_count,
            days_to_first: draft.days_to_first,
            interval_days: draft.interval_days,
            created_at: draft.created_at,
        }
    }

    fn apply(&mut self, patch: Self::Patch) {
        if let Some(location_id) = patch.location_id {
            self.location_id = location_id;
        }
        if let Some(material_status) = patch.material_status {
            self.material_status = material_status;
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.supplier.as_ref().map_or(true, |s| &self.supplier == s)
            && filter
                .invoice_number
                .as_ref()
                .map_or(true, |n| &self.invoice_number == n)
            && filter.location_id.map_or(true, |l| self.location_id == l)
            && filter
                .material_status
                .map_or(true, |m| self.material_status == m)
    }

    fn arrange(rows: &mut Vec<Self>, _filter: &Self::Filter) {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    }
}

impl MemoryRecord for Installment {
    fn from_draft(id: i64, draft: Self::Draft) -> Self {
        Installment {
            id,
            invoice_id: draft.invoice_id,
            number: draft.number,
            value: draft.value,
            due_date: draft.due_date,
            status: draft.status,
            payment_date: None,
            material_status: draft.material_status,
        }
    }

    fn apply(&mut self, patch: Self::Patch) {
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(payment_date) = patch.payment_date {
            self.payment_date = Some(payment_date);
        }
        if let Some(material_status) = patch.material_status {
            self.material_status = material_status;
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.invoice_id.map_or(true, |id| self.invoice_id == id)
            && filter.status.map_or(true, |s| self.status == s)
            && filter.due_from.map_or(true, |from| self.due_date >= from)
            && filter.due_before.map_or(true, |before| self.due_date < before)
    }

    fn arrange(rows: &mut Vec<Self>, _filter: &Self::Filter) {
        rows.sort_by_key(|row| (row.invoice_id, row.number));
    }
}

impl MemoryRecord for Supplier {
    fn from_draft(id: i64, draft: Self::Draft) -> Self {
        Supplier {
            id,
            name: draft.name,
            cnpj: draft.cnpj,
            phone: draft.phone,
            salesperson: draft.salesperson,
            created_at: draft.created_at,
        }
    }

    fn apply(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(cnpj) = patch.cnpj {
            self.cnpj = cnpj;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(salesperson) = patch.salesperson {
            self.salesperson = salesperson;
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.name.as_ref().map_or(true, |n| contains_ci(&self.name, n))
            && filter.cnpj.as_ref().map_or(true, |c| &self.cnpj == c)
            && filter.salesperson.as_ref().map_or(true, |s| {
                self.salesperson
                    .as_deref()
                    .map_or(false, |mine| contains_ci(mine, s))
            })
    }

    fn arrange(rows: &mut Vec<Self>, _filter: &Self::Filter) {
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    }
}

impl MemoryRecord for Location {
    fn from_draft(id: i64, draft: Self::Draft) -> Self {
        Location {
            id,
            name: draft.name,
            created_at: draft.created_at,
        }
    }

    fn apply(&mut self, patch: Infallible) {
        match patch {}
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.name.as_ref().map_or(true, |n| &self.name == n)
    }

    fn arrange(rows: &mut Vec<Self>, _filter: &Self::Filter) {
        rows.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

impl MemoryRecord for User {
    fn from_draft(id: i64, draft: Self::Draft) -> Self {
        User {
            id,
            name: draft.name,
            email: draft.email,
            cpf: draft.cpf,
            role: draft.role,
            company: draft.company,
            active: draft.active,
            created_at: draft.created_at,
        }
    }

    fn apply(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(company) = patch.company {
            self.company = Some(company);
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.email.as_ref().map_or(true, |e| &self.email == e)
            && filter
                .cpf
                .as_ref()
                .map_or(true, |c| self.cpf.as_ref() == Some(c))
    }

    fn arrange(rows: &mut Vec<Self>, _filter: &Self::Filter) {
        rows.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

impl MemoryRecord for LogEntry {
    fn from_draft(id: i64, draft: Self::Draft) -> Self {
        LogEntry {
            id,
            user_id: draft.user_id,
            action: draft.action,
            table: draft.table,
            record_id: draft.record_id,
            before: draft.before,
            after: draft.after,
            created_at: draft.created_at,
        }
    }

    fn apply(&mut self, patch: Infallible) {
        match patch {}
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.user_id.map_or(true, |u| self.user_id == Some(u))
            && filter.action.map_or(true, |a| self.action == a)
            && filter.table.as_ref().map_or(true, |t| &self.table == t)
    }

    fn arrange(rows: &mut Vec<Self>, filter: &Self::Filter) {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let page: Vec<Self> = rows
            .drain(..)
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect();
        *rows = page;
    }
}

/// Aggregate views computed from the in-memory invoice and installment tables
pub struct InMemoryViews {
    invoices: InMemoryTable<Invoice>,
    installments: InMemoryTable<Installment>,
}

impl InMemoryViews {
    pub fn new(invoices: InMemoryTable<Invoice>, installments: InMemoryTable<Installment>) -> Self {
        Self {
            invoices,
            installments,
        }
    }
}

#[async_trait]
impl SummaryViews for InMemoryViews {
    async fn total_de_notas(&self) -> Result<TotalDeNotas> {
        let total_de_notas = self
            .invoices
            .snapshot()?
            .iter()
            .map(|invoice| invoice.total_value)
            .sum();

        Ok(TotalDeNotas { total_de_notas })
    }

    async fn resumo_notas_parcelas(&self) -> Result<ResumoNotasParcelas> {
        let installments = self.installments.snapshot()?;
        let sum_where = |keep: &dyn Fn(&Installment) -> bool| -> Decimal {
            installments.iter().filter(|i| keep(i)).map(|i| i.value).sum()
        };

        Ok(ResumoNotasParcelas {
            total_em_estoque: sum_where(&|i| i.material_status == MaterialStatus::Estoque),
            total_em_uso: sum_where(&|i| i.material_status == MaterialStatus::EmUso),
            total_de_notas: self.total_de_notas().await?.total_de_notas,
            total_a_pagar: sum_where(&|i| i.status != InstallmentStatus::Paga),
        })
    }
}
