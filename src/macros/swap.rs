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

//! `SWAP`.

use crate::ast::{clean, dereference_chain, Destination};
use crate::errors::AssemblyError;

fn read(d: &Destination) -> String {
    match d {
        Destination::Registers(s) => format!("D={}", s.chars().next().unwrap()),
        Destination::Address { loc, depth } => {
            let deref = dereference_chain(*depth);
            if deref.is_empty() {
                format!("@{loc}\nD=M")
            } else {
                format!("@{loc}\n{deref}\nD=M")
            }
        }
    }
}

fn write(d: &Destination) -> String {
    match d {
        Destination::Registers(s) => format!("{}=D", s.chars().next().unwrap()),
        Destination::Address { loc, depth } => {
            let deref = dereference_chain(*depth);
            if deref.is_empty() {
                format!("@{loc}\nM=D")
            } else {
                format!("@{loc}\n{deref}\nM=D")
            }
        }
    }
}

/// `$SWAP(D1, D2)`. Both operands must each name exactly one register, or
/// an address. Register/register swaps never touch `A` (pure arithmetic
/// exchange); any pairing involving an address goes through `__aux` since
/// there's no way to hold two live addresses in `A` at once.
pub fn expand_swap(d1: &Destination, d2: &Destination, o: i64) -> Result<String, AssemblyError> {
    for d in [d1, d2] {
        if let Destination::Registers(s) = d {
            if s.len() != 1 {
                return Err(AssemblyError::macro_err(
                    o,
                    format!("SWAP operands must each name a single register or address, got `{s}`"),
                ));
            }
        }
    }
    if d1 == d2 {
        return Ok(String::new());
    }
    if let (Destination::Registers(r1), Destination::Registers(r2)) = (d1, d2) {
        let a = r1.chars().next().unwrap();
        let b = r2.chars().next().unwrap();
        return Ok(clean(&format!("{b}={b}+{a}\n{a}={b}-{a}\n{b}={b}-{a}")));
    }
    let body = format!(
        "{}\n@__aux\nM=D\n{}\n{}\n@__aux\nD=M\n{}",
        read(d1),
        read(d2),
        write(d1),
        write(d2),
    );
    Ok(clean(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_same_destination_is_a_no_op() {
        let d = Destination::Registers("D".to_string());
        assert_eq!(expand_swap(&d, &d, 1).unwrap(), "");
    }

    #[test]
    fn swap_rejects_multi_register_operand() {
        let d1 = Destination::Registers("AD".to_string());
        let d2 = Destination::Registers("D".to_string());
        assert!(expand_swap(&d1, &d2, 1).is_err());
    }

    #[test]
    fn swap_register_register_never_touches_a() {
        let d1 = Destination::Registers("D".to_string());
        let d2 = Destination::Registers("M".to_string());
        let out = expand_swap(&d1, &d2, 1).unwrap();
        assert!(!out.contains('@'));
    }
}
