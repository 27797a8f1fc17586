use serde::{Deserialize, Serialize};

use crate::field::RuleField;
use crate::rule::Operand;
use crate::value::Value;

/// Every operator a rule can carry. Wire names are the snake_case strings
/// stored in persisted shelf definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Equals,
    NotEquals,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanEqualTo,
    LessThan,
    LessThanEqualTo,
    InBetween,
    IsEmpty,
    IsNotEmpty,
    IncludesAny,
    ExcludesAll,
    IncludesAll,
}

/// Operator families determine which operand shape a rule carries and which
/// fields an operator is offered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    /// Valid for every field.
    Base,
    /// Set membership against a term list.
    MultiValue,
    /// Substring / prefix / suffix checks on text fields.
    Text,
    /// Ordering comparisons on number, decimal and date fields.
    Comparison,
}

impl RuleOperator {
    pub fn family(&self) -> OperatorFamily {
        match self {
            RuleOperator::Equals
            | RuleOperator::NotEquals
            | RuleOperator::IsEmpty
            | RuleOperator::IsNotEmpty => OperatorFamily::Base,
            RuleOperator::IncludesAny | RuleOperator::ExcludesAll | RuleOperator::IncludesAll => {
                OperatorFamily::MultiValue
            }
            RuleOperator::Contains
            | RuleOperator::DoesNotContain
            | RuleOperator::StartsWith
            | RuleOperator::EndsWith => OperatorFamily::Text,
            RuleOperator::GreaterThan
            | RuleOperator::GreaterThanEqualTo
            | RuleOperator::LessThan
            | RuleOperator::LessThanEqualTo
            | RuleOperator::InBetween => OperatorFamily::Comparison,
        }
    }

    /// Whether a rule builder should offer this operator for `field`. The
    /// evaluator never calls this: an incompatible pair simply evaluates to
    /// false.
    pub fn valid_for(&self, field: RuleField) -> bool {
        use crate::field::FieldKind;
        let desc = field.descriptor();
        match self.family() {
            OperatorFamily::Base => true,
            OperatorFamily::MultiValue => desc.multi_valued,
            OperatorFamily::Text => matches!(desc.kind, FieldKind::Text | FieldKind::Untyped),
            OperatorFamily::Comparison => matches!(
                desc.kind,
                FieldKind::Number | FieldKind::Decimal | FieldKind::Date
            ),
        }
    }

    /// Evaluate this operator for a normalized subject and operand. `terms`
    /// is the set-family view of the field (lowercase term list); only the
    /// multi-value operators read it.
    ///
    /// Never panics and never errors: any shape mismatch between operator
    /// and operand resolves to false (true for the negated operators whose
    /// positive check failed), so a half-edited rule just matches nothing.
    pub fn apply(&self, subject: &Value, operand: &Operand, terms: &[String]) -> bool {
        match self {
            RuleOperator::Equals => eval_equals(subject, operand),
            RuleOperator::NotEquals => !eval_equals(subject, operand),
            RuleOperator::Contains => eval_text(subject, operand, |s, n| s.contains(n)),
            RuleOperator::DoesNotContain => !eval_text(subject, operand, |s, n| s.contains(n)),
            RuleOperator::StartsWith => eval_text(subject, operand, |s, n| s.starts_with(n)),
            RuleOperator::EndsWith => eval_text(subject, operand, |s, n| s.ends_with(n)),
            RuleOperator::GreaterThan => eval_compare(subject, operand, |o| o.is_gt()),
            RuleOperator::GreaterThanEqualTo => eval_compare(subject, operand, |o| o.is_ge()),
            RuleOperator::LessThan => eval_compare(subject, operand, |o| o.is_lt()),
            RuleOperator::LessThanEqualTo => eval_compare(subject, operand, |o| o.is_le()),
            RuleOperator::InBetween => eval_between(subject, operand),
            RuleOperator::IsEmpty => is_empty(subject),
            RuleOperator::IsNotEmpty => !is_empty(subject),
            RuleOperator::IncludesAny => {
                let wanted = operand_terms(operand);
                wanted.iter().any(|w| terms.contains(w))
            }
            RuleOperator::IncludesAll => {
                let wanted = operand_terms(operand);
                !wanted.is_empty() && wanted.iter().all(|w| terms.contains(w))
            }
            RuleOperator::ExcludesAll => {
                let wanted = operand_terms(operand);
                wanted.iter().all(|w| !terms.contains(w))
            }
        }
    }
}

fn eval_equals(subject: &Value, operand: &Operand) -> bool {
    match subject {
        // A list subject matches when any element equals any operand term.
        Value::List(items) => {
            let wanted = operand_terms(operand);
            items
                .iter()
                .filter_map(Value::as_term)
                .any(|item| wanted.contains(&item))
        }
        _ => match operand {
            Operand::Scalar(v) => match (subject, v) {
                (Value::Date(a), Value::Date(b)) => a == b,
                (Value::Number(a), Value::Number(b)) => a == b,
                (Value::Text(a), Value::Text(b)) => a == b,
                _ => false,
            },
            _ => false,
        },
    }
}

fn eval_text(subject: &Value, operand: &Operand, pred: fn(&str, &str) -> bool) -> bool {
    let needle = match operand {
        Operand::Scalar(Value::Text(s)) => s,
        _ => return false,
    };
    match subject {
        Value::Text(s) => pred(s, needle),
        Value::List(items) => items.iter().any(|item| match item {
            Value::Text(s) => pred(s, needle),
            _ => false,
        }),
        _ => false,
    }
}

fn eval_compare(
    subject: &Value,
    operand: &Operand,
    check: fn(std::cmp::Ordering) -> bool,
) -> bool {
    let bound = match operand {
        Operand::Scalar(v) => v,
        _ => return false,
    };
    if let (Value::Date(a), Value::Date(b)) = (subject, bound) {
        return check(a.cmp(b));
    }
    // NaN on either side yields no ordering, hence false.
    match subject.coerce_number().partial_cmp(&bound.coerce_number()) {
        Some(ordering) => check(ordering),
        None => false,
    }
}

fn eval_between(subject: &Value, operand: &Operand) -> bool {
    let (start, end) = match operand {
        Operand::Range(start, end) => (start, end),
        _ => return false,
    };
    if subject.is_null() || start.is_null() || end.is_null() {
        return false;
    }
    if let (Value::Date(s), Value::Date(a), Value::Date(b)) = (subject, start, end) {
        return a <= s && s <= b;
    }
    let (s, a, b) = (
        subject.coerce_number(),
        start.coerce_number(),
        end.coerce_number(),
    );
    a <= s && s <= b
}

fn is_empty(subject: &Value) -> bool {
    match subject {
        Value::Null => true,
        Value::Text(s) => s.trim().is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Number(_) | Value::Date(_) => false,
    }
}

/// Operand as a lowercase term list; a scalar collapses to a singleton.
fn operand_terms(operand: &Operand) -> Vec<String> {
    match operand {
        Operand::Set(values) => values.iter().filter_map(Value::as_term).collect(),
        Operand::Scalar(v) => v.as_term().into_iter().collect(),
        Operand::None | Operand::Range(..) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string()).normalize()
    }

    fn scalar(v: Value) -> Operand {
        Operand::Scalar(v.normalize())
    }

    #[test]
    fn test_equals_is_case_insensitive() {
        let subject = text("Fantasy");
        let operand = scalar(Value::Text("fantasy".to_string()));
        assert!(RuleOperator::Equals.apply(&subject, &operand, &[]));
        assert!(!RuleOperator::NotEquals.apply(&subject, &operand, &[]));
    }

    #[test]
    fn test_equals_on_dates() {
        let d = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        assert!(RuleOperator::Equals.apply(&Value::Date(d), &scalar(Value::Date(d)), &[]));
        let other = NaiveDate::from_ymd_opt(2020, 5, 2).unwrap();
        assert!(!RuleOperator::Equals.apply(&Value::Date(d), &scalar(Value::Date(other)), &[]));
    }

    #[test]
    fn test_equals_list_subject_is_membership() {
        let subject = Value::List(vec![text("sci-fi"), text("drama")]);
        assert!(RuleOperator::Equals.apply(&subject, &scalar(text("Drama")), &[]));
        assert!(!RuleOperator::Equals.apply(&subject, &scalar(text("Horror")), &[]));
        assert!(RuleOperator::NotEquals.apply(&subject, &scalar(text("Horror")), &[]));
    }

    #[test]
    fn test_equals_mismatched_types_is_false() {
        assert!(!RuleOperator::Equals.apply(
            &Value::Number(300.0),
            &scalar(Value::Text("300zzz".to_string())),
            &[]
        ));
        assert!(!RuleOperator::Equals.apply(&Value::Null, &scalar(text("anything")), &[]));
    }

    #[test]
    fn test_contains_family() {
        let subject = text("The Left Hand of Darkness");
        assert!(RuleOperator::Contains.apply(&subject, &scalar(text("hand")), &[]));
        assert!(RuleOperator::StartsWith.apply(&subject, &scalar(text("the")), &[]));
        assert!(RuleOperator::EndsWith.apply(&subject, &scalar(text("darkness")), &[]));
        assert!(!RuleOperator::Contains.apply(&subject, &scalar(text("ocean")), &[]));

        // Non-string operand: contains fails closed, its negation holds.
        let numeric_operand = scalar(Value::Number(5.0));
        assert!(!RuleOperator::Contains.apply(&subject, &numeric_operand, &[]));
        assert!(RuleOperator::DoesNotContain.apply(&subject, &numeric_operand, &[]));

        // Non-string subject.
        assert!(!RuleOperator::Contains.apply(&Value::Number(5.0), &scalar(text("5")), &[]));
    }

    #[test]
    fn test_contains_over_list() {
        let subject = Value::List(vec![text("Frank Herbert"), text("Ursula K. Le Guin")]);
        assert!(RuleOperator::Contains.apply(&subject, &scalar(text("herbert")), &[]));
        assert!(RuleOperator::StartsWith.apply(&subject, &scalar(text("ursula")), &[]));
        assert!(!RuleOperator::Contains.apply(&subject, &scalar(text("asimov")), &[]));
    }

    #[test]
    fn test_numeric_comparisons() {
        let subject = Value::Number(301.0);
        assert!(RuleOperator::GreaterThan.apply(&subject, &scalar(Value::Number(300.0)), &[]));
        assert!(!RuleOperator::GreaterThan.apply(
            &Value::Number(300.0),
            &scalar(Value::Number(300.0)),
            &[]
        ));
        assert!(RuleOperator::GreaterThanEqualTo.apply(
            &Value::Number(300.0),
            &scalar(Value::Number(300.0)),
            &[]
        ));
        assert!(RuleOperator::LessThan.apply(&subject, &scalar(Value::Number(400.0)), &[]));
        assert!(RuleOperator::LessThanEqualTo.apply(&subject, &scalar(Value::Number(301.0)), &[]));
    }

    #[test]
    fn test_nan_comparisons_are_false() {
        // Non-numeric operand coerces to NaN; every comparison fails.
        let subject = Value::Number(10.0);
        let operand = scalar(Value::Text("lots".to_string()));
        assert!(!RuleOperator::GreaterThan.apply(&subject, &operand, &[]));
        assert!(!RuleOperator::LessThan.apply(&subject, &operand, &[]));
        // Null subject likewise.
        assert!(!RuleOperator::GreaterThan.apply(&Value::Null, &scalar(Value::Number(1.0)), &[]));
        // List subjects fall through to NaN.
        let list = Value::List(vec![Value::Number(5.0)]);
        assert!(!RuleOperator::GreaterThan.apply(&list, &scalar(Value::Number(1.0)), &[]));
    }

    #[test]
    fn test_date_comparisons() {
        let may = Value::Date(NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
        let june = scalar(Value::Date(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()));
        assert!(RuleOperator::LessThan.apply(&may, &june, &[]));
        assert!(!RuleOperator::GreaterThan.apply(&may, &june, &[]));
    }

    #[test]
    fn test_in_between_is_inclusive() {
        let range = Operand::Range(Value::Number(5.0), Value::Number(10.0));
        assert!(RuleOperator::InBetween.apply(&Value::Number(5.0), &range, &[]));
        assert!(RuleOperator::InBetween.apply(&Value::Number(10.0), &range, &[]));
        assert!(RuleOperator::InBetween.apply(&Value::Number(7.0), &range, &[]));
        assert!(!RuleOperator::InBetween.apply(&Value::Number(4.999), &range, &[]));
        assert!(!RuleOperator::InBetween.apply(&Value::Number(10.001), &range, &[]));
    }

    #[test]
    fn test_in_between_requires_all_values() {
        let open_range = Operand::Range(Value::Number(5.0), Value::Null);
        assert!(!RuleOperator::InBetween.apply(&Value::Number(7.0), &open_range, &[]));
        let range = Operand::Range(Value::Number(5.0), Value::Number(10.0));
        assert!(!RuleOperator::InBetween.apply(&Value::Null, &range, &[]));
    }

    #[test]
    fn test_in_between_on_dates() {
        let d = |y, m, day| Value::Date(NaiveDate::from_ymd_opt(y, m, day).unwrap());
        let range = Operand::Range(d(2020, 1, 1), d(2020, 12, 31));
        assert!(RuleOperator::InBetween.apply(&d(2020, 1, 1), &range, &[]));
        assert!(RuleOperator::InBetween.apply(&d(2020, 6, 15), &range, &[]));
        assert!(!RuleOperator::InBetween.apply(&d(2021, 1, 1), &range, &[]));
    }

    #[test]
    fn test_is_empty() {
        assert!(RuleOperator::IsEmpty.apply(&Value::Null, &Operand::None, &[]));
        assert!(RuleOperator::IsEmpty.apply(&text("   "), &Operand::None, &[]));
        assert!(RuleOperator::IsEmpty.apply(&Value::List(vec![]), &Operand::None, &[]));
        assert!(!RuleOperator::IsEmpty.apply(&Value::Number(0.0), &Operand::None, &[]));
        assert!(!RuleOperator::IsEmpty.apply(&text("x"), &Operand::None, &[]));
        assert!(RuleOperator::IsNotEmpty.apply(&text("x"), &Operand::None, &[]));
        assert!(!RuleOperator::IsNotEmpty.apply(&Value::Null, &Operand::None, &[]));
    }

    #[test]
    fn test_set_semantics() {
        let terms: Vec<String> = vec!["sci-fi".to_string(), "drama".to_string()];
        let set = |names: &[&str]| {
            Operand::Set(names.iter().map(|n| text(n)).collect::<Vec<_>>())
        };

        let subject = Value::Null; // set operators never read the subject
        assert!(RuleOperator::IncludesAll.apply(&subject, &set(&["Sci-Fi", "Drama"]), &terms));
        assert!(!RuleOperator::IncludesAll.apply(&subject, &set(&["Sci-Fi", "Horror"]), &terms));
        assert!(RuleOperator::ExcludesAll.apply(&subject, &set(&["Horror"]), &terms));
        assert!(!RuleOperator::ExcludesAll.apply(&subject, &set(&["Drama"]), &terms));
        assert!(RuleOperator::IncludesAny.apply(&subject, &set(&["Horror", "Drama"]), &terms));
        assert!(!RuleOperator::IncludesAny.apply(&subject, &set(&["Horror"]), &terms));
    }

    #[test]
    fn test_set_semantics_scalar_operand() {
        let terms = vec!["epub".to_string()];
        let operand = scalar(text("EPUB"));
        assert!(RuleOperator::IncludesAny.apply(&Value::Null, &operand, &terms));
        assert!(!RuleOperator::ExcludesAll.apply(&Value::Null, &operand, &terms));
    }

    #[test]
    fn test_mismatched_operand_shapes_fail_closed() {
        let subject = Value::Number(5.0);
        assert!(!RuleOperator::Equals.apply(&subject, &Operand::None, &[]));
        assert!(!RuleOperator::GreaterThan.apply(
            &subject,
            &Operand::Set(vec![Value::Number(1.0)]),
            &[]
        ));
        assert!(!RuleOperator::InBetween.apply(&subject, &scalar(Value::Number(5.0)), &[]));
    }

    #[test]
    fn test_valid_for() {
        use crate::field::RuleField;
        assert!(RuleOperator::Equals.valid_for(RuleField::Title));
        assert!(RuleOperator::Contains.valid_for(RuleField::Title));
        assert!(!RuleOperator::Contains.valid_for(RuleField::PageCount));
        assert!(RuleOperator::GreaterThan.valid_for(RuleField::PageCount));
        assert!(RuleOperator::InBetween.valid_for(RuleField::PublishedDate));
        assert!(!RuleOperator::GreaterThan.valid_for(RuleField::Title));
        assert!(RuleOperator::IncludesAny.valid_for(RuleField::Categories));
        assert!(RuleOperator::IncludesAny.valid_for(RuleField::ReadStatus));
        assert!(!RuleOperator::IncludesAny.valid_for(RuleField::PageCount));
    }
}
