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

//! `LD` and `ADD`/`SUB`.

use crate::ast::{clean, dereference_chain, wrap_i16, Argument, Destination, Register};
use crate::errors::AssemblyError;
use crate::macros::common::{load_value, restore_a, save_a, write_const_to_dst, write_d_to_dst};

/// `$LD(DST, SRC)`. Three shapes, checked in order:
///   1. SRC is a one-op value and DST is a register set: `DST=SRC` directly.
///   2. DST is an address and SRC is a register: load the register into D
///      and write it, without preserving A.
///   3. General case: stash A, load SRC into D, restore A, write DST.
pub fn expand_ld(dst: &Destination, src: &Argument) -> String {
    if src.is_oneop() {
        if let Destination::Registers(regs) = dst {
            return format!("{regs}={}", src.oneop_token());
        }
    }
    if let (Destination::Address { loc, depth }, Argument::Register(r)) = (dst, src) {
        let deref = dereference_chain(*depth);
        let write = if deref.is_empty() {
            format!("@{loc}\nM=D")
        } else {
            format!("@{loc}\n{deref}\nM=D")
        };
        return clean(&format!("D={}\n{write}", r.letter()));
    }

    let load = load_value(src);
    let body = match dst {
        Destination::Registers(regs) => {
            format!("{}\n{load}\n{}\n{regs}=D", save_a(), restore_a())
        }
        Destination::Address { .. } => {
            let write = write_d_to_dst(dst);
            format!("{}\n{load}\n{write}\n{}", save_a(), restore_a())
        }
    };
    clean(&body)
}

/// Loads `arg1`'s value into `D`, preserving `A` unless `arg1` is `D`
/// itself and `dst` does not include `M` (in which case A-preservation is
/// documented as not attempted: P2 for that one combination). Returns the
/// instruction text and whether A was in fact preserved.
fn stage_arg1(arg1: &Argument, dst: &Destination) -> (String, bool) {
    match arg1 {
        Argument::Register(Register::D) => {
            if dst.contains(Register::M) {
                ("M=D\nD=A\n@__aux\nAM=D\nD=M".to_string(), true)
            } else {
                (String::new(), false)
            }
        }
        Argument::Register(Register::A) => (save_a().to_string(), true),
        Argument::Register(Register::M) => (
            format!("{}\n{}\nD=M", save_a(), restore_a()),
            true,
        ),
        Argument::Constant(n) => (
            format!("{}\n{}", save_a(), load_value(&Argument::Constant(*n))),
            true,
        ),
        Argument::Address { .. } => (format!("{}\n{}", save_a(), load_value(arg1)), true),
    }
}

/// The text that folds `arg2`'s contribution into `D` via `op` (`+`/`-`).
/// Always self-contained: doesn't assume anything about the current `A`.
fn stage_arg2(op: char, arg2: &Argument) -> String {
    match arg2 {
        Argument::Register(r) => format!("D{op}{}", r.letter()),
        Argument::Constant(n) if (-1..=1).contains(n) => format!("D{op}{n}"),
        Argument::Constant(n) => {
            let a_load = if *n >= 0 {
                format!("@{n}")
            } else {
                format!("@{}\nA=!A", -1 - n)
            };
            format!("{a_load}\nD=D{op}A")
        }
        Argument::Address { loc, depth } => {
            let deref = dereference_chain(*depth);
            let addr = if deref.is_empty() {
                format!("@{loc}")
            } else {
                format!("@{loc}\n{deref}")
            };
            format!("{addr}\nD{op}M")
        }
    }
}

/// `$ADD(DST, ARG1, ARG2)` / `$SUB(DST, ARG1, ARG2)`. No operand-kind
/// combination is rejected; `A` is preserved except for the one documented
/// case (ARG1 is D, DST doesn't include M).
pub fn expand_add_sub(is_add: bool, dst: &Destination, arg1: &Argument, arg2: &Argument) -> String {
    if let (Argument::Constant(a), Argument::Constant(b)) = (arg1, arg2) {
        let sum = if is_add { *a as i64 + *b as i64 } else { *a as i64 - *b as i64 };
        return write_const_to_dst(dst, wrap_i16(sum));
    }

    let op = if is_add { '+' } else { '-' };
    let (preamble, preserved) = stage_arg1(arg1, dst);
    let combine = stage_arg2(op, arg2);

    let mut body = String::new();
    if !preamble.is_empty() {
        body.push_str(&preamble);
        body.push('\n');
    }
    body.push_str(&combine);
    body.push('\n');

    match dst {
        Destination::Registers(regs) => {
            if preserved {
                body.push_str(restore_a());
                body.push('\n');
            }
            body.push_str(&format!("{regs}=D"));
        }
        Destination::Address { loc, depth } => {
            let deref = dereference_chain(*depth);
            let write = if deref.is_empty() {
                format!("@{loc}\nM=D")
            } else {
                format!("@{loc}\n{deref}\nM=D")
            };
            body.push_str(&write);
            if preserved {
                body.push('\n');
                body.push_str(restore_a());
            }
        }
    }
    clean(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ld_one_op_into_register_is_direct() {
        let dst = Destination::Registers("D".to_string());
        let src = Argument::Register(Register::A);
        assert_eq!(expand_ld(&dst, &src), "D=A");
    }

    #[test]
    fn add_folds_constants() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_add_sub(true, &dst, &Argument::Constant(32760), &Argument::Constant(100));
        assert!(out.contains("D="));
    }

    #[test]
    fn sub_preserves_a_when_arg1_is_register_a() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_add_sub(false, &dst, &Argument::Register(Register::A), &Argument::Constant(5));
        assert!(out.contains("__aux"));
    }
}
