//! Service wiring shared by the HTTP server and the integration tests

use actix_web::web;
use std::sync::Arc;

use crate::core::BusinessClock;
use crate::modules::audit::services::AuditLogger;
use crate::modules::auth::services::{
    AccessCodeVerifier, AuthService, IdentityProvider, SessionRegistry,
};
use crate::modules::installments::services::{InstallmentService, StatusResolver};
use crate::modules::invoices::services::InvoiceService;
use crate::modules::locations::services::LocationService;
use crate::modules::reports::services::ReportService;
use crate::modules::suppliers::services::SupplierService;
use crate::modules::{audit, auth, health, installments, invoices, locations, reports, suppliers};
use crate::storage::Store;

/// Every service built over one record store
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub clock: BusinessClock,
    pub sessions: SessionRegistry,
    pub audit: Arc<AuditLogger>,
    pub installments: Arc<InstallmentService>,
    pub invoices: Arc<InvoiceService>,
    pub suppliers: Arc<SupplierService>,
    pub locations: Arc<LocationService>,
    pub reports: Arc<ReportService>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        store: Store,
        clock: BusinessClock,
        provider: Arc<dyn IdentityProvider>,
        access_code: AccessCodeVerifier,
        admin_role: &str,
    ) -> Self {
        let audit = AuditLogger::new(store.logs.clone(), clock);
        let sessions = SessionRegistry::new();

        let installments = InstallmentService::new(
            store.installments.clone(),
            store.invoices.clone(),
            audit.clone(),
            StatusResolver::new(clock),
        );
        let invoices = InvoiceService::new(
            store.invoices.clone(),
            store.locations.clone(),
            installments.clone(),
            audit.clone(),
            clock,
        );
        let suppliers = SupplierService::new(store.suppliers.clone(), audit.clone(), clock);
        let locations = LocationService::new(
            store.locations.clone(),
            store.invoices.clone(),
            audit.clone(),
            clock,
        );
        let reports = ReportService::new(
            store.invoices.clone(),
            installments.clone(),
            store.views.clone(),
        );
        let auth = AuthService::new(
            store.users.clone(),
            provider,
            access_code,
            sessions.clone(),
            audit.clone(),
            clock,
            admin_role,
        );

        Self {
            store,
            clock,
            sessions,
            audit: Arc::new(audit),
            installments: Arc::new(installments),
            invoices: Arc::new(invoices),
            suppliers: Arc::new(suppliers),
            locations: Arc::new(locations),
            reports: Arc::new(reports),
            auth: Arc::new(auth),
        }
    }

    /// Register shared data, `/health`, `/ready` and the `/api` routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.store.clone()))
            .app_data(web::Data::new(self.audit.clone()))
            .app_data(web::Data::new(self.installments.clone()))
            .app_data(web::Data::new(self.invoices.clone()))
            .app_data(web::Data::new(self.suppliers.clone()))
            .app_data(web::Data::new(self.locations.clone()))
            .app_data(web::Data::new(self.reports.clone()))
            .app_data(web::Data::new(self.auth.clone()))
            .configure(health::controllers::configure)
            .service(
                web::scope("/api")
                    .configure(auth::controllers::configure)
                    .configure(invoices::controllers::configure)
                    .configure(installments::controllers::configure_installments)
                    .configure(installments::controllers::configure_previews)
                    .configure(suppliers::controllers::configure)
                    .configure(locations::controllers::configure)
                    .configure(reports::controllers::configure)
                    .configure(audit::controllers::configure),
            );
    }
}
