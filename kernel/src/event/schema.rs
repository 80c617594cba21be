use error_stack::Report;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{FieldViolation, KernelError, ViolationKind};

/// Collects every schema violation in a raw payload before any of it is
/// consumed. `finish` fails with `KernelError::Validation` listing all of
/// them, matching the all-fields-reported contract of the payload schemas.
pub struct Schema<'a> {
    map: Option<&'a Map<String, Value>>,
    violations: Vec<FieldViolation>,
}

impl<'a> Schema<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self {
            map: raw.as_object(),
            violations: Vec::new(),
        }
    }

    pub fn require_string(&mut self, field: &'static str) {
        match self.lookup(field) {
            None => self.missing(field),
            Some(value) if !value.is_string() => self.wrong_type(field, "string"),
            Some(_) => {}
        }
    }

    pub fn require_number(&mut self, field: &'static str) {
        match self.lookup(field) {
            None => self.missing(field),
            Some(value) if !value.is_number() => self.wrong_type(field, "number"),
            Some(_) => {}
        }
    }

    /// Enum membership check: the field must be a string naming a variant of
    /// `T`.
    pub fn require_variant<T: DeserializeOwned>(&mut self, field: &'static str) {
        match self.lookup(field) {
            None => self.missing(field),
            Some(value) if !value.is_string() => self.wrong_type(field, "string"),
            Some(value) => {
                if serde_json::from_value::<T>(value.clone()).is_err() {
                    self.violations
                        .push(FieldViolation::new(field, ViolationKind::UnknownVariant));
                }
            }
        }
    }

    pub fn finish(self) -> error_stack::Result<(), KernelError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(Report::new(KernelError::Validation(self.violations)))
        }
    }

    fn lookup(&self, field: &'static str) -> Option<&'a Value> {
        self.map.and_then(|map| map.get(field))
    }

    fn missing(&mut self, field: &'static str) {
        self.violations
            .push(FieldViolation::new(field, ViolationKind::Missing));
    }

    fn wrong_type(&mut self, field: &'static str, expected: &'static str) {
        self.violations
            .push(FieldViolation::new(field, ViolationKind::WrongType { expected }));
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use crate::entity::LimitPeriod;
    use crate::event::Schema;
    use crate::{KernelError, ViolationKind};

    #[test]
    fn collects_every_violation() {
        let raw = json!({ "userId": 42, "period": "FORTNIGHT" });
        let mut schema = Schema::new(&raw);
        schema.require_string("userId");
        schema.require_number("nextResetTime");
        schema.require_variant::<LimitPeriod>("period");

        let report = schema.finish().expect_err("must fail");
        let KernelError::Validation(violations) = report.current_context() else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].field(), "userId");
        assert!(matches!(
            violations[1].kind(),
            ViolationKind::Missing
        ));
        assert!(matches!(
            violations[2].kind(),
            ViolationKind::UnknownVariant
        ));
    }

    #[test]
    fn non_object_payload_reports_all_fields_missing() {
        let raw = json!(null);
        let mut schema = Schema::new(&raw);
        schema.require_string("userId");
        schema.require_string("brandId");

        let report = schema.finish().expect_err("must fail");
        let KernelError::Validation(violations) = report.current_context() else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn valid_fields_pass() -> error_stack::Result<(), KernelError> {
        let raw = json!({ "userId": "u1", "nextResetTime": 0, "period": "DAY" });
        let mut schema = Schema::new(&raw);
        schema.require_string("userId");
        schema.require_number("nextResetTime");
        schema.require_variant::<LimitPeriod>("period");
        schema.finish()
    }
}
