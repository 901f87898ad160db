use serde::Serialize;

/// A side effect that failed without affecting the primary mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditWarning {
    pub action: String,
    pub table: String,
    pub message: String,
}

/// Result of a mutation together with any best-effort failures
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AuditWarning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: Option<AuditWarning>) -> Self {
        self.warnings.extend(warning);
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
