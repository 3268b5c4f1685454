//! Symbolic values referenced by machine operands
//!
//! Operands never own the entities they point at. They hold a [`ValueId`]
//! handle into a table owned by the IR layer, which must outlive every
//! instruction that references it.

use std::fmt;

/// Handle to an externally owned symbolic value (definition site, label, global)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

impl ValueId {
    /// Creates a handle with the given raw index
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// What kind of IR entity a value is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A function symbol
    Function,
    /// A basic block label
    BasicBlock,
    /// The result of an IR instruction
    Instruction,
    /// A function argument
    Argument,
    /// A global variable or data symbol
    Global,
    /// A constant
    Constant,
}

impl ValueKind {
    /// Functions and blocks are branch targets and render as labels
    pub fn is_label(self) -> bool {
        matches!(self, ValueKind::Function | ValueKind::BasicBlock)
    }
}

/// Read-only lookup into the table that owns symbolic values
pub trait ValueLookup {
    /// Display name, if the value has one
    fn name(&self, id: ValueId) -> Option<&str>;

    /// Kind of entity behind the handle
    fn kind(&self, id: ValueId) -> ValueKind;
}

#[derive(Debug, Clone)]
struct ValueData {
    name: Option<String>,
    kind: ValueKind,
}

/// Simple arena of symbolic values
#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    values: Vec<ValueData>,
}

impl ValueTable {
    /// Create an empty value table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value
    pub fn add(&mut self, name: &str, kind: ValueKind) -> ValueId {
        self.push(Some(name.to_string()), kind)
    }

    /// Add a value that has no display name
    pub fn add_unnamed(&mut self, kind: ValueKind) -> ValueId {
        self.push(None, kind)
    }

    fn push(&mut self, name: Option<String>, kind: ValueKind) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(ValueData { name, kind });
        id
    }

    /// Number of values in the table
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no values were added
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn data(&self, id: ValueId) -> &ValueData {
        match self.values.get(id.0 as usize) {
            Some(data) => data,
            None => panic!("value {} is not owned by this table", id),
        }
    }
}

impl ValueLookup for ValueTable {
    fn name(&self, id: ValueId) -> Option<&str> {
        self.data(id).name.as_deref()
    }

    fn kind(&self, id: ValueId) -> ValueKind {
        self.data(id).kind
    }
}
