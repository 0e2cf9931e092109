//! Security rule families. All report severity 5; secret and SQL scans are
//! marked expensive and skipped on files above the configured size cutoff.

pub mod injection;
pub mod secrets;
pub mod xss;

use crate::debt::Rule;

/// Security rules in catalog order.
pub fn rules() -> Vec<Box<dyn Rule>> {
    let mut rules = Vec::new();
    rules.extend(injection::python_sql_rules());
    rules.extend(secrets::python_rules());
    rules.extend(injection::code_injection_rules());
    rules.extend(xss::rules());
    rules.extend(injection::javascript_sql_rules());
    rules.extend(secrets::javascript_rules());
    rules
}
