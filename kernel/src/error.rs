use std::fmt::{Display, Formatter};

use error_stack::Context;

/// A single schema violation inside an event payload.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldViolation {
    field: &'static str,
    kind: ViolationKind,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ViolationKind {
    Missing,
    WrongType { expected: &'static str },
    UnknownVariant,
}

impl FieldViolation {
    pub fn new(field: &'static str, kind: ViolationKind) -> Self {
        Self { field, kind }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn kind(&self) -> &ViolationKind {
        &self.kind
    }
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "Invalid input < {} >: required", self.field),
            ViolationKind::WrongType { expected } => {
                write!(f, "Invalid input < {} >: expected {expected}", self.field)
            }
            ViolationKind::UnknownVariant => {
                write!(f, "Invalid option < {} >", self.field)
            }
        }
    }
}

#[derive(Debug)]
pub enum KernelError {
    /// Payload failed schema checks. Carries every violated field, not just
    /// the first one found.
    Validation(Vec<FieldViolation>),
    AlreadyExists { user_id: String },
    NotFound { user_id: String },
    InvalidField { field: &'static str },
    Decode,
    Store,
    Config,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Validation(violations) => {
                write!(f, "Payload validation failed: ")?;
                for (index, violation) in violations.iter().enumerate() {
                    if index > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{violation}")?;
                }
                Ok(())
            }
            KernelError::AlreadyExists { user_id } => {
                write!(f, "User limit already exists for user id: {user_id}")
            }
            KernelError::NotFound { user_id } => {
                write!(f, "User limit does not exist for user id: {user_id}")
            }
            KernelError::InvalidField { field } => {
                write!(f, "User Limit property < {field} > is not a positive number")
            }
            KernelError::Decode => write!(f, "Failed to decode stream record"),
            KernelError::Store => write!(f, "Storage operation failed"),
            KernelError::Config => write!(f, "Invalid or incomplete configuration"),
        }
    }
}

impl Context for KernelError {}
