pub mod book;
pub mod codec;
pub mod engine;
pub mod field;
pub mod operator;
pub mod rule;
pub mod shelf;
pub mod value;

pub use book::{Book, BookMetadata, ReadStatus};
pub use codec::{deserialize_group, serialize_group};
pub use engine::{evaluate_group, evaluate_rule, ShelfEngine};
pub use field::{FieldDescriptor, FieldKind, RuleField};
pub use operator::{OperatorFamily, RuleOperator};
pub use rule::{Group, GroupJoin, Operand, Rule, RuleNode};
pub use shelf::MagicShelf;
pub use value::Value;
