use crate::field::RuleField;
use crate::operator::RuleOperator;
use crate::value::Value;

/// Comparison value(s) attached to a rule. The shape is fixed when the rule
/// is built (by the codec or a constructor), so the evaluator never has to
/// sniff whether `value` holds a scalar or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand, for is_empty / is_not_empty.
    None,
    Scalar(Value),
    /// Inclusive bounds for in_between.
    Range(Value, Value),
    /// Term list for the set operators.
    Set(Vec<Value>),
}

/// A leaf predicate: one field, one operator, the operand(s) the operator
/// family calls for.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub field: RuleField,
    pub operator: RuleOperator,
    pub operand: Operand,
}

impl Rule {
    pub fn new(field: RuleField, operator: RuleOperator, operand: Operand) -> Self {
        Rule {
            field,
            operator,
            operand,
        }
    }

    pub fn scalar(field: RuleField, operator: RuleOperator, value: Value) -> Self {
        Rule::new(field, operator, Operand::Scalar(value))
    }

    pub fn range(field: RuleField, operator: RuleOperator, start: Value, end: Value) -> Self {
        Rule::new(field, operator, Operand::Range(start, end))
    }

    pub fn set(field: RuleField, operator: RuleOperator, values: Vec<Value>) -> Self {
        Rule::new(field, operator, Operand::Set(values))
    }

    pub fn bare(field: RuleField, operator: RuleOperator) -> Self {
        Rule::new(field, operator, Operand::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupJoin {
    And,
    Or,
}

impl GroupJoin {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupJoin::And => "and",
            GroupJoin::Or => "or",
        }
    }

    /// Wire parsing: anything that is not "or" joins with AND, matching the
    /// historical default for shelves saved without a join.
    pub fn from_wire(s: Option<&str>) -> GroupJoin {
        match s {
            Some(s) if s.eq_ignore_ascii_case("or") => GroupJoin::Or,
            _ => GroupJoin::And,
        }
    }
}

/// An internal tree node: children are rules and/or nested groups, folded
/// with the group's join.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: Option<String>,
    pub join: GroupJoin,
    pub rules: Vec<RuleNode>,
}

impl Group {
    pub fn new(join: GroupJoin, rules: Vec<RuleNode>) -> Self {
        Group {
            name: None,
            join,
            rules,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    Rule(Rule),
    Group(Group),
}

impl From<Rule> for RuleNode {
    fn from(rule: Rule) -> Self {
        RuleNode::Rule(rule)
    }
}

impl From<Group> for RuleNode {
    fn from(group: Group) -> Self {
        RuleNode::Group(group)
    }
}
