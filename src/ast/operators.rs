/// Built-in JSON Logic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinOperator {
    // Data access
    /// Field reference (`var`)
    Var,
    /// Null check over fields (`missing`)
    Missing,
    /// Threshold null check (`missing_some`)
    MissingSome,

    // Logical
    /// Equality (`==`)
    Equal,
    /// Strict equality (`===`)
    StrictEqual,
    /// Inequality (`!=`)
    NotEqual,
    /// Strict inequality (`!==`)
    StrictNotEqual,
    /// Negation (`!`)
    Not,
    /// Truthiness cast (`!!`)
    Truthy,
    /// Conjunction (`and`)
    And,
    /// Disjunction (`or`)
    Or,
    /// Conditional (`if`)
    If,
    /// Ternary alias of `if` (`?:`)
    Ternary,

    // Comparison
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,

    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `max`
    Max,
    /// `min`
    Min,

    // String
    /// Concatenation (`cat`)
    Cat,
    /// Substring (`substr`)
    Substr,

    // Array
    /// Membership or containment (`in`)
    In,
    /// `map`
    Map,
    /// `filter`
    Filter,
    /// `reduce`
    Reduce,
    /// `all`
    All,
    /// `some`
    Some,
    /// `none`
    None,
    /// Array concatenation (`merge`)
    Merge,
}

/// Operator groups, as documented and dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorGroup {
    DataAccess,
    Logical,
    Comparison,
    Arithmetic,
    String,
    Array,
}

impl OperatorGroup {
    pub const ALL: [OperatorGroup; 6] = [
        OperatorGroup::DataAccess,
        OperatorGroup::Logical,
        OperatorGroup::Comparison,
        OperatorGroup::Arithmetic,
        OperatorGroup::String,
        OperatorGroup::Array,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperatorGroup::DataAccess => "data",
            OperatorGroup::Logical => "logical",
            OperatorGroup::Comparison => "comparison",
            OperatorGroup::Arithmetic => "arithmetic",
            OperatorGroup::String => "string",
            OperatorGroup::Array => "array",
        }
    }

    /// Built-in operators in this group, in table order.
    pub fn operators(self) -> impl Iterator<Item = BuiltinOperator> {
        BuiltinOperator::ALL
            .into_iter()
            .filter(move |op| op.group() == self)
    }
}

impl BuiltinOperator {
    pub const ALL: [BuiltinOperator; 34] = [
        BuiltinOperator::Var,
        BuiltinOperator::Missing,
        BuiltinOperator::MissingSome,
        BuiltinOperator::Equal,
        BuiltinOperator::StrictEqual,
        BuiltinOperator::NotEqual,
        BuiltinOperator::StrictNotEqual,
        BuiltinOperator::Not,
        BuiltinOperator::Truthy,
        BuiltinOperator::And,
        BuiltinOperator::Or,
        BuiltinOperator::If,
        BuiltinOperator::Ternary,
        BuiltinOperator::Greater,
        BuiltinOperator::GreaterEqual,
        BuiltinOperator::Less,
        BuiltinOperator::LessEqual,
        BuiltinOperator::Add,
        BuiltinOperator::Subtract,
        BuiltinOperator::Multiply,
        BuiltinOperator::Divide,
        BuiltinOperator::Modulo,
        BuiltinOperator::Max,
        BuiltinOperator::Min,
        BuiltinOperator::Cat,
        BuiltinOperator::Substr,
        BuiltinOperator::In,
        BuiltinOperator::Map,
        BuiltinOperator::Filter,
        BuiltinOperator::Reduce,
        BuiltinOperator::All,
        BuiltinOperator::Some,
        BuiltinOperator::None,
        BuiltinOperator::Merge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinOperator::Var => "var",
            BuiltinOperator::Missing => "missing",
            BuiltinOperator::MissingSome => "missing_some",
            BuiltinOperator::Equal => "==",
            BuiltinOperator::StrictEqual => "===",
            BuiltinOperator::NotEqual => "!=",
            BuiltinOperator::StrictNotEqual => "!==",
            BuiltinOperator::Not => "!",
            BuiltinOperator::Truthy => "!!",
            BuiltinOperator::And => "and",
            BuiltinOperator::Or => "or",
            BuiltinOperator::If => "if",
            BuiltinOperator::Ternary => "?:",
            BuiltinOperator::Greater => ">",
            BuiltinOperator::GreaterEqual => ">=",
            BuiltinOperator::Less => "<",
            BuiltinOperator::LessEqual => "<=",
            BuiltinOperator::Add => "+",
            BuiltinOperator::Subtract => "-",
            BuiltinOperator::Multiply => "*",
            BuiltinOperator::Divide => "/",
            BuiltinOperator::Modulo => "%",
            BuiltinOperator::Max => "max",
            BuiltinOperator::Min => "min",
            BuiltinOperator::Cat => "cat",
            BuiltinOperator::Substr => "substr",
            BuiltinOperator::In => "in",
            BuiltinOperator::Map => "map",
            BuiltinOperator::Filter => "filter",
            BuiltinOperator::Reduce => "reduce",
            BuiltinOperator::All => "all",
            BuiltinOperator::Some => "some",
            BuiltinOperator::None => "none",
            BuiltinOperator::Merge => "merge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BuiltinOperator::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn group(self) -> OperatorGroup {
        use BuiltinOperator::*;
        match self {
            Var | Missing | MissingSome => OperatorGroup::DataAccess,
            Equal | StrictEqual | NotEqual | StrictNotEqual | Not | Truthy | And | Or | If
            | Ternary => OperatorGroup::Logical,
            Greater | GreaterEqual | Less | LessEqual => OperatorGroup::Comparison,
            Add | Subtract | Multiply | Divide | Modulo | Max | Min => OperatorGroup::Arithmetic,
            Cat | Substr => OperatorGroup::String,
            In | Map | Filter | Reduce | All | Some | None | Merge => OperatorGroup::Array,
        }
    }
}

/// Names reserved by built-in operators. Custom operators may not use them.
pub const BUILTIN_OPERATOR_NAMES: [&str; 34] = [
    "var", "missing", "missing_some", "==", "===", "!=", "!==", "!", "!!", "and", "or", "if",
    "?:", ">", ">=", "<", "<=", "+", "-", "*", "/", "%", "max", "min", "cat", "substr", "in",
    "map", "filter", "reduce", "all", "some", "none", "merge",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_OPERATOR_NAMES.contains(&name)
}
