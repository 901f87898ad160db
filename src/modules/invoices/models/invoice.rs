// Invoice (nota fiscal) model
//
// A supplier bill with a total value, optionally split into installments.
// (invoice_number, supplier) is unique; the total is always positive and the
// issue date never lies in the future.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money::{self, AmountInput};
use crate::core::{Record, Violations};
use crate::modules::installments::models::ScheduleTerms;

/// Largest installment count accepted for one invoice
pub const MAX_INSTALLMENTS: u32 = 24;
/// Default days between the issue date and the first installment
pub const DEFAULT_DAYS_TO_FIRST: u32 = 30;
/// Default days between consecutive installments
pub const DEFAULT_INTERVAL_DAYS: u32 = 30;

/// Physical disposition of purchased material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialStatus {
    /// In stock
    #[default]
    #[serde(rename = "ESTOQUE")]
    Estoque,
    /// In use on site
    #[serde(rename = "EM_USO")]
    EmUso,
}

impl MaterialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialStatus::Estoque => "ESTOQUE",
            MaterialStatus::EmUso => "EM_USO",
        }
    }
}

impl std::fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MaterialStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ESTOQUE" => Ok(MaterialStatus::Estoque),
            "EM_USO" => Ok(MaterialStatus::EmUso),
            _ => Err(format!("Invalid material status: {}", s)),
        }
    }
}

/// Persisted invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    /// Supplier name as chosen when the invoice was registered
    pub supplier: String,
    pub total_value: Decimal,
    pub issue_date: NaiveDate,
    pub location_id: i64,
    /// Only meaningful when the invoice is not installment-based
    pub material_status: MaterialStatus,
    pub description: Option<String>,
    pub is_installment: bool,
    pub installment_count: u32,
    pub days_to_first: u32,
    pub interval_days: u32,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Parameters that produced (or would reproduce) this invoice's schedule
    pub fn schedule_terms(&self) -> ScheduleTerms {
        ScheduleTerms {
            total_value: self.total_value,
            count: self.installment_count,
            days_to_first: self.days_to_first,
            interval_days: self.interval_days,
            issue_date: self.issue_date,
        }
    }
}

/// Insert payload for the `notas` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub supplier: String,
    pub total_value: Decimal,
    pub issue_date: NaiveDate,
    pub location_id: i64,
    pub material_status: MaterialStatus,
    pub description: Option<String>,
    pub is_installment: bool,
    pub installment_count: u32,
    pub days_to_first: u32,
    pub interval_days: u32,
    pub created_at: DateTime<Utc>,
}

/// Targeted field updates allowed after creation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub location_id: Option<i64>,
    pub material_status: Option<MaterialStatus>,
}

impl InvoicePatch {
    pub fn is_empty(&self) -> bool {
        self.location_id.is_none() && self.material_status.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceFilter {
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
    pub location_id: Option<i64>,
    pub material_status: Option<MaterialStatus>,
}

impl Record for Invoice {
    type Draft = NewInvoice;
    type Patch = InvoicePatch;
    type Filter = InvoiceFilter;

    const TABLE: &'static str = "notas";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Invoice registration form as submitted by a user.
///
/// Every field is optional so that missing values become violations instead
/// of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceForm {
    pub invoice_number: Option<String>,
    pub supplier: Option<String>,
    pub total_value: Option<AmountInput>,
    pub issue_date: Option<NaiveDate>,
    pub location_id: Option<i64>,
    #[serde(default)]
    pub material_status: MaterialStatus,
    pub description: Option<String>,
    #[serde(default)]
    pub is_installment: bool,
    pub installment_count: Option<u32>,
    pub days_to_first: Option<u32>,
    pub interval_days: Option<u32>,
}

/// A form that passed field validation (duplicates not yet checked)
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
    pub invoice: NewInvoice,
    pub terms: ScheduleTerms,
}

impl InvoiceForm {
    /// Checks every field rule and returns all violations at once.
    pub fn validate(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<ValidatedInvoice, Violations> {
        let mut violations = Violations::new();

        let invoice_number = non_blank(&self.invoice_number);
        if invoice_number.is_none() {
            violations.push("Número da nota é obrigatório");
        }

        let supplier = non_blank(&self.supplier);
        if supplier.is_none() {
            violations.push("Fornecedor é obrigatório");
        }

        let total_value = match &self.total_value {
            None => {
                violations.push("Valor total deve ser maior que zero");
                None
            }
            Some(input) => match input.resolve() {
                Ok(value) if value > Decimal::ZERO => Some(money::round_cents(value)),
                Ok(_) => {
                    violations.push("Valor total deve ser maior que zero");
                    None
                }
                Err(err) => {
                    match err.violations() {
                        Some(v) => v.messages().iter().for_each(|m| violations.push(m.clone())),
                        None => violations.push(err.to_string()),
                    }
                    None
                }
            },
        };

        match self.issue_date {
            None => violations.push("Data de emissão é obrigatória"),
            Some(date) if date > today => {
                violations.push("Data de emissão não pode ser futura")
            }
            Some(_) => {}
        }

        if self.location_id.is_none() {
            violations.push("Local de aplicação é obrigatório");
        }

        let (count, days_to_first, interval_days) = if self.is_installment {
            (
                self.installment_count.unwrap_or(1),
                self.days_to_first.unwrap_or(DEFAULT_DAYS_TO_FIRST),
                self.interval_days.unwrap_or(DEFAULT_INTERVAL_DAYS),
            )
        } else {
            (1, 0, 0)
        };

        if self.is_installment {
            if !(1..=MAX_INSTALLMENTS).contains(&count) {
                violations.push(format!(
                    "Número de parcelas deve estar entre 1 e {}",
                    MAX_INSTALLMENTS
                ));
            }
            if days_to_first == 0 {
                violations.push("Dias até a primeira parcela deve ser maior que zero");
            }
            if interval_days == 0 {
                violations.push("Intervalo entre parcelas deve ser maior que zero");
            }
        }

        match (invoice_number, supplier, total_value, self.issue_date, self.location_id) {
            (Some(number), Some(supplier), Some(total), Some(issue_date), Some(location_id))
                if violations.is_empty() =>
            {
                let terms = ScheduleTerms {
                    total_value: total,
                    count,
                    days_to_first,
                    interval_days,
                    issue_date,
                };
                Ok(ValidatedInvoice {
                    invoice: NewInvoice {
                        invoice_number: number,
                        supplier,
                        total_value: total,
                        issue_date,
                        location_id,
                        material_status: self.material_status,
                        description: non_blank(&self.description),
                        is_installment: self.is_installment,
                        installment_count: count,
                        days_to_first,
                        interval_days,
                        created_at: now,
                    },
                    terms,
                })
            }
            _ => Err(violations),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
