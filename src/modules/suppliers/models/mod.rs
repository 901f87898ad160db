mod supplier;

pub use supplier::{
    NewSupplier, Supplier, SupplierFilter, SupplierForm, SupplierPatch, ValidatedSupplier,
};
