use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::tax_id::{format_cnpj, is_complete_cnpj};
use crate::core::{Record, Violations};

/// Supplier (fornecedor) of construction material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    /// Masked CNPJ (`12.345.678/0001-90`), unique
    pub cnpj: String,
    pub phone: String,
    pub salesperson: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub cnpj: String,
    pub phone: String,
    pub salesperson: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub cnpj: Option<String>,
    pub phone: Option<String>,
    /// `Some(None)` clears the salesperson
    pub salesperson: Option<Option<String>>,
}

/// `name` and `salesperson` match case-insensitive substrings; `cnpj` is exact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierFilter {
    pub name: Option<String>,
    pub cnpj: Option<String>,
    pub salesperson: Option<String>,
}

impl SupplierFilter {
    pub fn by_cnpj(cnpj: impl Into<String>) -> Self {
        Self {
            cnpj: Some(cnpj.into()),
            ..Default::default()
        }
    }
}

impl Record for Supplier {
    type Draft = NewSupplier;
    type Patch = SupplierPatch;
    type Filter = SupplierFilter;

    const TABLE: &'static str = "fornecedores";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Supplier registration form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierForm {
    pub name: Option<String>,
    pub cnpj: Option<String>,
    pub phone: Option<String>,
    pub salesperson: Option<String>,
}

/// Form fields after validation, CNPJ masked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSupplier {
    pub name: String,
    pub cnpj: String,
    pub phone: String,
    pub salesperson: Option<String>,
}

impl ValidatedSupplier {
    pub fn into_new(self, created_at: DateTime<Utc>) -> NewSupplier {
        NewSupplier {
            name: self.name,
            cnpj: self.cnpj,
            phone: self.phone,
            salesperson: self.salesperson,
            created_at,
        }
    }

    pub fn into_patch(self) -> SupplierPatch {
        SupplierPatch {
            name: Some(self.name),
            cnpj: Some(self.cnpj),
            phone: Some(self.phone),
            salesperson: Some(self.salesperson),
        }
    }
}

impl SupplierForm {
    /// Field rules only; the CNPJ uniqueness check needs the store.
    pub fn validate(&self) -> Result<ValidatedSupplier, Violations> {
        let mut violations = Violations::new();

        let name = trimmed(&self.name);
        if name.is_none() {
            violations.push("Nome do fornecedor é obrigatório");
        }

        let cnpj = trimmed(&self.cnpj).map(|c| format_cnpj(&c)).filter(|c| !c.is_empty());
        match &cnpj {
            None => violations.push("CNPJ é obrigatório"),
            Some(c) if !is_complete_cnpj(c) => violations.push("CNPJ deve ter 14 dígitos"),
            Some(_) => {}
        }

        let phone = trimmed(&self.phone);
        if phone.is_none() {
            violations.push("Telefone é obrigatório");
        }

        match (name, cnpj, phone) {
            (Some(name), Some(cnpj), Some(phone)) if violations.is_empty() => Ok(ValidatedSupplier {
                name,
                cnpj,
                phone,
                salesperson: trimmed(&self.salesperson),
            }),
            _ => Err(violations),
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
