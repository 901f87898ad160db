//! Record store: one typed repository per table plus the aggregate views

pub mod in_memory;

use sqlx::MySqlPool;
use std::sync::Arc;

use crate::core::{Repository, SummaryViews};
use crate::modules::audit::models::LogEntry;
use crate::modules::audit::repositories::MySqlLogRepository;
use crate::modules::auth::models::User;
use crate::modules::auth::repositories::MySqlUserRepository;
use crate::modules::installments::models::Installment;
use crate::modules::installments::repositories::MySqlInstallmentRepository;
use crate::modules::invoices::models::Invoice;
use crate::modules::invoices::repositories::MySqlInvoiceRepository;
use crate::modules::locations::models::Location;
use crate::modules::locations::repositories::MySqlLocationRepository;
use crate::modules::reports::repositories::MySqlSummaryViews;
use crate::modules::suppliers::models::Supplier;
use crate::modules::suppliers::repositories::MySqlSupplierRepository;

pub use in_memory::{InMemoryTable, InMemoryViews, MemoryRecord};

/// Every table of the record store behind its trait object
#[derive(Clone)]
pub struct Store {
    pub invoices: Arc<dyn Repository<Invoice>>,
    pub installments: Arc<dyn Repository<Installment>>,
    pub suppliers: Arc<dyn Repository<Supplier>>,
    pub locations: Arc<dyn Repository<Location>>,
    pub users: Arc<dyn Repository<User>>,
    pub logs: Arc<dyn Repository<LogEntry>>,
    pub views: Arc<dyn SummaryViews>,
}

impl Store {
    pub fn mysql(pool: MySqlPool) -> Self {
        Self {
            invoices: Arc::new(MySqlInvoiceRepository::new(pool.clone())),
            installments: Arc::new(MySqlInstallmentRepository::new(pool.clone())),
            suppliers: Arc::new(MySqlSupplierRepository::new(pool.clone())),
            locations: Arc::new(MySqlLocationRepository::new(pool.clone())),
            users: Arc::new(MySqlUserRepository::new(pool.clone())),
            logs: Arc::new(MySqlLogRepository::new(pool.clone())),
            views: Arc::new(MySqlSummaryViews::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let invoices = InMemoryTable::<Invoice>::new();
        let installments = InMemoryTable::<Installment>::new();

        Self {
            views: Arc::new(InMemoryViews::new(invoices.clone(), installments.clone())),
            invoices: Arc::new(invoices),
            installments: Arc::new(installments),
            suppliers: Arc::new(InMemoryTable::<Supplier>::new()),
            locations: Arc::new(InMemoryTable::<Location>::new()),
            users: Arc::new(InMemoryTable::<User>::new()),
            logs: Arc::new(InMemoryTable::<LogEntry>::new()),
        }
    }
}
