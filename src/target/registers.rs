//! Register numbering and naming
//!
//! Physical and virtual registers share one number space. Numbers below
//! [`RegisterInfo::first_virtual_register`] are physical registers with a
//! target name; everything at or above it is virtual.

use std::fmt;

/// Register number (physical or virtual, told apart by magnitude)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(pub u32);

impl Reg {
    /// Creates a register with the given number
    pub fn new(num: u32) -> Self {
        Self(num)
    }
}

impl From<u32> for Reg {
    fn from(num: u32) -> Self {
        Reg(num)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Register naming service used when rendering
pub trait RegisterInfo {
    /// Human name of a physical register, `None` when the target leaves
    /// `reg` unnamed
    fn name(&self, reg: Reg) -> Option<&str>;

    /// First number that denotes a virtual register
    fn first_virtual_register(&self) -> u32;

    /// True if `reg` is below the virtual numbering threshold
    fn is_physical(&self, reg: Reg) -> bool {
        reg.0 < self.first_virtual_register()
    }
}

/// Register catalogue: names indexed by register number
#[derive(Debug, Clone)]
pub struct RegisterTable {
    names: Vec<String>,
    first_virtual: u32,
}

impl RegisterTable {
    /// Build a catalogue; `first_virtual` must not be below the name count
    pub fn new<I, S>(names: I, first_virtual: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        assert!(
            names.len() as u32 <= first_virtual,
            "{} named registers overlap virtual numbering at {}",
            names.len(),
            first_virtual
        );
        Self {
            names,
            first_virtual,
        }
    }

    /// Number of named physical registers
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no registers are named
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Find a register by name
    pub fn lookup(&self, name: &str) -> Option<Reg> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| Reg(i as u32))
    }
}

impl RegisterInfo for RegisterTable {
    fn name(&self, reg: Reg) -> Option<&str> {
        self.names.get(reg.0 as usize).map(String::as_str)
    }

    fn first_virtual_register(&self) -> u32 {
        self.first_virtual
    }
}
