use crate::book::Book;
use crate::operator::OperatorFamily;
use crate::rule::{Group, GroupJoin, Operand, Rule, RuleNode};
use crate::shelf::MagicShelf;
use crate::value::Value;

/// Evaluate a rule tree against one book. Pure: no state is kept between
/// calls and neither argument is mutated, so concurrent callers can share
/// the same tree freely.
///
/// Children fold left to right with the group's join; the iterator
/// adapters short-circuit, which is safe because every leaf is
/// side-effect-free. An empty group resolves to the join's identity
/// (AND: true, OR: false).
pub fn evaluate_group(book: &Book, group: &Group) -> bool {
    let eval_node = |node: &RuleNode| match node {
        RuleNode::Group(child) => evaluate_group(book, child),
        RuleNode::Rule(rule) => evaluate_rule(book, rule),
    };
    match group.join {
        GroupJoin::And => group.rules.iter().all(eval_node),
        GroupJoin::Or => group.rules.iter().any(eval_node),
    }
}

/// Evaluate a single leaf predicate: extract the field, normalize both
/// sides, dispatch to the operator.
pub fn evaluate_rule(book: &Book, rule: &Rule) -> bool {
    let subject = rule.field.extract(book).normalize();
    let operand = normalize_operand(&rule.operand);
    // The set operators compare against the field's term-list view, which
    // exists even for fields whose default extractor is scalar.
    let terms = if rule.operator.family() == OperatorFamily::MultiValue {
        rule.field.extract_terms(book)
    } else {
        Vec::new()
    };
    let matched = rule.operator.apply(&subject, &operand, &terms);
    log::trace!(
        "rule {:?} {:?} on book {} -> {}",
        rule.field,
        rule.operator,
        book.id,
        matched
    );
    matched
}

fn normalize_operand(operand: &Operand) -> Operand {
    match operand {
        Operand::None => Operand::None,
        Operand::Scalar(v) => Operand::Scalar(v.clone().normalize()),
        Operand::Range(start, end) => {
            Operand::Range(start.clone().normalize(), end.clone().normalize())
        }
        Operand::Set(values) => {
            Operand::Set(values.iter().cloned().map(Value::normalize).collect())
        }
    }
}

/// Evaluates one shelf definition against books. Thin wrapper over
/// `evaluate_group` for the listing, counting and dashboard consumers.
pub struct ShelfEngine {
    shelf: MagicShelf,
}

impl ShelfEngine {
    pub fn new(shelf: MagicShelf) -> Self {
        ShelfEngine { shelf }
    }

    pub fn shelf(&self) -> &MagicShelf {
        &self.shelf
    }

    pub fn matches(&self, book: &Book) -> bool {
        evaluate_group(book, &self.shelf.group)
    }

    pub fn filter<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        let matched: Vec<&Book> = books.iter().filter(|b| self.matches(b)).collect();
        log::debug!(
            "shelf '{}' matched {} of {} books",
            self.shelf.name,
            matched.len(),
            books.len()
        );
        matched
    }

    pub fn count(&self, books: &[Book]) -> usize {
        books.iter().filter(|b| self.matches(b)).count()
    }
}
