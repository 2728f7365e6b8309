/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The two disjoint symbol tables: code labels (populated in Pass A by
//! stripping `(NAME)` declarations) and data variables (populated
//! lazily in Pass B, on each symbol's first appearance in an
//! `@symbol` operand that isn't already a label or a predefined name).

use crate::errors::AssemblyError;
use std::collections::HashMap;

pub type SymbolTable = HashMap<String, u16>;

/// SP, LCL, ARG, THIS, THAT, R0-R15, SCREEN, KBD.
pub fn predefined_symbols() -> SymbolTable {
    let mut table = SymbolTable::new();
    table.insert("SP".to_string(), 0);
    table.insert("LCL".to_string(), 1);
    table.insert("ARG".to_string(), 2);
    table.insert("THIS".to_string(), 3);
    table.insert("THAT".to_string(), 4);
    for i in 0..16u16 {
        table.insert(format!("R{i}"), i);
    }
    table.insert("SCREEN".to_string(), 16384);
    table.insert("KBD".to_string(), 24576);
    table
}

/// Records `name` at `address` in `labels`, rejecting a second
/// declaration of the same name anywhere in the program.
pub fn declare_label(labels: &mut SymbolTable, name: &str, address: u16, line: i64) -> Result<(), AssemblyError> {
    if labels.contains_key(name) {
        return Err(AssemblyError::symbol(line, format!("Duplicate label declaration: `{name}`")));
    }
    labels.insert(name.to_string(), address);
    Ok(())
}

/// Resolves `name` to an address, allocating the next free variable slot
/// (starting at 16) on first use if it's neither a label nor predefined.
pub fn resolve_or_allocate(
    labels: &SymbolTable,
    predefined: &SymbolTable,
    variables: &mut SymbolTable,
    next_variable: &mut u16,
    name: &str,
) -> u16 {
    if let Some(addr) = labels.get(name) {
        return *addr;
    }
    if let Some(addr) = predefined.get(name) {
        return *addr;
    }
    if let Some(addr) = variables.get(name) {
        return *addr;
    }
    let addr = *next_variable;
    variables.insert(name.to_string(), addr);
    *next_variable += 1;
    addr
}
