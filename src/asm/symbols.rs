//! # Assembler Symbol Table
//!
//! Maps identifiers to 16-bit addresses. Predefined symbols live in a
//! compile-time perfect hash map; labels and variables go into a runtime
//! map owned by the table.
//!
//! Variables are allocated sequentially starting at address 16, in the
//! order pass 2 first references them.

use std::collections::HashMap;

use phf::phf_map;

/// First RAM address handed out to user variables.
const VARIABLE_BASE: u16 = 16;

/// Symbols built into the Hack platform.
static PREDEFINED: phf::Map<&'static str, u16> = phf_map! {
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,

    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,

    "SCREEN" => 16384,
    "KBD" => 24576,
};

#[derive(Debug)]
pub struct SymbolTable {
    user: HashMap<String, u16>,
    next_variable: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            user: HashMap::with_capacity(32),
            next_variable: VARIABLE_BASE,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        PREDEFINED.contains_key(symbol) || self.user.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<u16> {
        PREDEFINED
            .get(symbol)
            .copied()
            .or_else(|| self.user.get(symbol).copied())
    }

    /// Bind a label from pass 1. Shadowing a predefined symbol or an
    /// already-bound label is rejected; `Err` carries the earlier address.
    pub fn bind_label(&mut self, symbol: &str, address: u16) -> Result<(), u16> {
        if let Some(existing) = self.get(symbol) {
            return Err(existing);
        }
        self.user.insert(symbol.to_string(), address);
        Ok(())
    }

    /// Resolve a symbolic A-command operand during pass 2, allocating the
    /// next free variable address on first sight.
    pub fn resolve_or_alloc(&mut self, symbol: &str) -> u16 {
        if let Some(&addr) = PREDEFINED.get(symbol) {
            return addr;
        }
        if let Some(&addr) = self.user.get(symbol) {
            return addr;
        }
        let addr = self.next_variable;
        self.next_variable += 1;
        self.user.insert(symbol.to_string(), addr);
        addr
    }
}
