//! Operator semantics and the multi-value comparison loop.

use crate::types::Operator;
use crate::value::Value;
use std::cmp::Ordering;
use tracing::trace;

/// Result of comparing one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComparisonOutcome {
    pub met: bool,
    /// Stop the loop if this comparison is met.
    pub short_circuit_on_true: bool,
    /// Stop the loop if this comparison is not met.
    pub short_circuit_on_false: bool,
}

impl ComparisonOutcome {
    fn decided(operator: Operator, met: bool) -> Self {
        let (on_true, on_false) = operator.short_circuit();
        Self {
            met,
            short_circuit_on_true: on_true,
            short_circuit_on_false: on_false,
        }
    }

    /// A comparison that was not carried out.
    pub fn skipped() -> Self {
        Self::default()
    }

    /// Returns true if the loop should stop after this outcome.
    pub fn stops(&self) -> bool {
        (self.met && self.short_circuit_on_true) || (!self.met && self.short_circuit_on_false)
    }
}

/// Result of the comparison loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopResult {
    pub met: bool,
    /// Number of values compared before the loop stopped.
    pub inspected: usize,
}

/// Compares one value against the reference values.
pub fn compare(operator: Operator, actual: &Value, expected: &Value, expected2: &Value) -> ComparisonOutcome {
    let met = match operator {
        Operator::Equal => actual.loose_eq(expected),
        Operator::NotEqual => !actual.loose_eq(expected),
        Operator::Contains | Operator::NotContains if expected.is_empty() => {
            return ComparisonOutcome::skipped();
        }
        Operator::Contains => actual.to_text().contains(&expected.to_text()),
        Operator::NotContains => !actual.to_text().contains(&expected.to_text()),
        Operator::Empty => actual.is_empty(),
        Operator::NotEmpty => !actual.is_empty(),
        Operator::Less => ordered(actual, expected) == Some(Ordering::Less),
        Operator::Greater => ordered(actual, expected) == Some(Ordering::Greater),
        Operator::Between => {
            matches!(actual.loose_cmp(expected), Some(Ordering::Greater | Ordering::Equal))
                && matches!(actual.loose_cmp(expected2), Some(Ordering::Less | Ordering::Equal))
        }
        Operator::InArray => expected
            .to_text()
            .split(',')
            .any(|token| actual.loose_eq(&Value::from(token))),
        Operator::InArrayContains => {
            let haystack = actual.to_text();
            expected
                .to_text()
                .split(',')
                .filter(|token| !token.is_empty())
                .any(|token| haystack.contains(token))
        }
    };

    ComparisonOutcome::decided(operator, met)
}

/// Numeric values order loosely, everything else by byte length.
fn ordered(actual: &Value, expected: &Value) -> Option<Ordering> {
    if actual.is_numeric() {
        actual.loose_cmp(expected)
    } else {
        Some(actual.to_text().len().cmp(&expected.to_text().len()))
    }
}

/// Compares every value until the operator's short-circuit rule stops the loop.
///
/// Without a stop the last value decides. An empty list is never met.
pub fn compare_all(operator: Operator, actual: &[Value], expected: &Value, expected2: &Value) -> LoopResult {
    let mut result = LoopResult {
        met: false,
        inspected: 0,
    };

    for value in actual {
        let outcome = compare(operator, value, expected, expected2);
        result.met = outcome.met;
        result.inspected += 1;

        trace!(operator = operator.as_str(), value = %value, met = outcome.met, "compared value");

        if outcome.stops() {
            break;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    fn met(operator: Operator, actual: Value, expected: &str) -> bool {
        compare(operator, &actual, &text(expected), &Value::empty()).met
    }

    #[test]
    fn test_equal_and_not_equal() {
        assert!(met(Operator::Equal, text("5"), "5"));
        assert!(met(Operator::Equal, Value::Int(5), "5.0"));
        assert!(!met(Operator::Equal, text("a"), "A"));
        assert!(met(Operator::NotEqual, text("a"), "b"));
    }

    #[test]
    fn test_contains_skips_empty_check() {
        let outcome = compare(Operator::Contains, &text("anything"), &Value::empty(), &Value::empty());
        assert_eq!(outcome, ComparisonOutcome::skipped());

        let outcome = compare(Operator::NotContains, &text("anything"), &text("0"), &Value::empty());
        assert_eq!(outcome, ComparisonOutcome::skipped());

        assert!(met(Operator::Contains, text("hello world"), "lo w"));
        assert!(met(Operator::NotContains, text("hello"), "xyz"));
    }

    #[test]
    fn test_empty() {
        assert!(met(Operator::Empty, text("0"), ""));
        assert!(met(Operator::Empty, Value::Int(0), ""));
        assert!(!met(Operator::Empty, text("a"), ""));
        assert!(met(Operator::NotEmpty, text("a"), ""));
    }

    #[test]
    fn test_less_greater() {
        assert!(met(Operator::Less, text("9"), "10"));
        assert!(met(Operator::Greater, Value::Int(11), "10"));
        // non-numeric text compares by length
        assert!(met(Operator::Less, text("abc"), "abcd"));
        assert!(met(Operator::Greater, text("abcde"), "zz"));
        assert!(!met(Operator::Greater, text("ab"), "zz"));
    }

    #[test]
    fn test_between() {
        let between = |actual: &str| compare(Operator::Between, &text(actual), &text("1"), &text("10")).met;
        assert!(between("5"));
        assert!(between("1"));
        assert!(between("10"));
        assert!(!between("15"));

        // missing upper bound compares against empty text
        assert!(!compare(Operator::Between, &text("5"), &text("1"), &Value::empty()).met);
    }

    #[test]
    fn test_in_array() {
        assert!(met(Operator::InArray, text("tue"), "mon,tue,wed"));
        assert!(!met(Operator::InArray, text("tu"), "mon,tue,wed"));
        assert!(met(Operator::InArray, Value::Int(2), "1,2"));
        assert!(met(Operator::InArrayContains, text("tuesday"), "mon,tue"));
        assert!(!met(Operator::InArrayContains, text("friday"), ",mon"));
    }

    #[test]
    fn test_in_array_contains_ignores_empty_tokens() {
        assert!(!met(Operator::InArrayContains, text("xyz"), "a,"));
        assert!(!met(Operator::InArrayContains, text("xyz"), ",,"));
        assert!(met(Operator::InArrayContains, text("xyz"), "a,,y"));
    }

    #[test]
    fn test_loop_stops_on_first_true() {
        let values = vec![text("a"), text("b"), text("c")];
        let result = compare_all(Operator::Equal, &values, &text("b"), &Value::empty());
        assert_eq!(result, LoopResult { met: true, inspected: 2 });
    }

    #[test]
    fn test_loop_stops_on_first_false() {
        let values = vec![text("a"), text("b"), text("c")];
        let result = compare_all(Operator::NotEqual, &values, &text("b"), &Value::empty());
        assert_eq!(result, LoopResult { met: false, inspected: 2 });
    }

    #[test]
    fn test_loop_last_value_decides() {
        let values = vec![text("x"), text("")];
        let result = compare_all(Operator::Contains, &values, &Value::empty(), &Value::empty());
        assert_eq!(result, LoopResult { met: false, inspected: 2 });

        let values = vec![text("a"), text("b")];
        let result = compare_all(Operator::Equal, &values, &text("z"), &Value::empty());
        assert_eq!(result, LoopResult { met: false, inspected: 2 });
    }

    #[test]
    fn test_loop_empty_list() {
        let result = compare_all(Operator::NotEmpty, &[], &Value::empty(), &Value::empty());
        assert_eq!(result, LoopResult { met: false, inspected: 0 });
    }
}
