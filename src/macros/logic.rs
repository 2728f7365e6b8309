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

//! `AND`, `OR`, `XOR`, `NOT`. None of these preserve `A` (P2: the macro's
//! short-circuit tests and branches are documented as clobbering it).

use crate::ast::{clean, Argument, Destination};
use crate::errors::AssemblyError;
use crate::macros::common::{is_a_d_pair, is_m_d_pair, load_value, write_const_to_dst};

/// Reads both operands into `__logicarg1`/`__logicarg2` before any branch
/// touches `A`. Without this, a naive "load ARG1, branch, load ARG2"
/// sequence loses ARG1's value the moment ARG2 is itself the D register
/// (branching needs `@label`, which doesn't touch D, but loading a
/// register operand with `D=...` does — and by the time the second load
/// runs, D no longer holds ARG1). Staging through dedicated cells sidesteps
/// that entirely, independent of operand order.
fn stage_both(arg1: &Argument, arg2: &Argument) -> String {
    format!(
        "{}\n@__logicarg1\nM=D\n{}\n@__logicarg2\nM=D",
        load_value(arg1),
        load_value(arg2),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Xor,
}

impl LogicOp {
    fn name(self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
            LogicOp::Xor => "XOR",
        }
    }

    fn eval(self, a: bool, b: bool) -> bool {
        match self {
            LogicOp::And => a && b,
            LogicOp::Or => a || b,
            LogicOp::Xor => a ^ b,
        }
    }
}

fn write_bool(dst: &Destination, b: bool) -> String {
    write_const_to_dst(dst, if b { 1 } else { 0 })
}

/// Single-operand test: writes `true_val` to DST when `arg` is non-zero,
/// `false_val` otherwise.
fn emit_test(dst: &Destination, arg: &Argument, p: usize, true_val: i32, false_val: i32) -> String {
    let load = load_value(arg);
    let false_label = format!("__notfalse_{p}");
    let end_label = format!("__endnotoperation_{p}");
    let body = format!(
        "{load}\n@{false_label}\nD;JEQ\n{}\n@{end_label}\n0;JMP\n({false_label})\n{}\n({end_label})",
        write_const_to_dst(dst, true_val),
        write_const_to_dst(dst, false_val),
    );
    clean(&body)
}

/// AND and XOR reject these operand pairs outright (a hard rule the
/// distilled wording states explicitly, independent of what a given
/// implementation's scratch strategy could in principle tolerate). OR is
/// not named by that rule and this implementation never needs the
/// exemption anyway, since [`stage_both`] already stages through dedicated
/// cells rather than reusing `M` as ad-hoc scratch.
fn check_forbidden(op: LogicOp, arg1: &Argument, arg2: &Argument, dst: &Destination, o: i64) -> Result<(), AssemblyError> {
    if matches!(op, LogicOp::Or) {
        return Ok(());
    }
    if is_m_d_pair(arg1, arg2) {
        return Err(AssemblyError::macro_err(
            o,
            format!("Impossible operation: {} cannot take operands M and D together", op.name()),
        ));
    }
    if is_a_d_pair(arg1, arg2) && !dst.contains(crate::ast::Register::M) {
        return Err(AssemblyError::macro_err(
            o,
            format!(
                "Impossible operation: {} cannot take operands A and D together unless the destination includes M",
                op.name()
            ),
        ));
    }
    Ok(())
}

fn emit_two_operand(op: LogicOp, dst: &Destination, arg1: &Argument, arg2: &Argument, p: usize) -> String {
    let stage = stage_both(arg1, arg2);
    let test1 = "@__logicarg1\nD=M";
    let test2 = "@__logicarg2\nD=M";
    let body = match op {
        LogicOp::And => {
            let fail = format!("__andcheckfailed_{p}");
            let end = format!("__endandoperation_{p}");
            format!(
                "{stage}\n{test1}\n@{fail}\nD;JEQ\n{test2}\n@{fail}\nD;JEQ\n{}\n@{end}\n0;JMP\n({fail})\n{}\n({end})",
                write_const_to_dst(dst, 1),
                write_const_to_dst(dst, 0),
            )
        }
        LogicOp::Or => {
            let tru = format!("__orchecktrue_{p}");
            let end = format!("__endoroperation_{p}");
            format!(
                "{stage}\n{test1}\n@{tru}\nD;JNE\n{test2}\n@{tru}\nD;JNE\n{}\n@{end}\n0;JMP\n({tru})\n{}\n({end})",
                write_const_to_dst(dst, 0),
                write_const_to_dst(dst, 1),
            )
        }
        LogicOp::Xor => {
            let first_false = format!("__xorfirstfalse_{p}");
            let one = format!("__xorresultone_{p}");
            let zero = format!("__xorresultzero_{p}");
            let end = format!("__endxoroperation_{p}");
            format!(
                "{stage}\n{test1}\n@{first_false}\nD;JEQ\n\
                 {test2}\n@{one}\nD;JEQ\n@{zero}\n0;JMP\n\
                 ({first_false})\n{test2}\n@{zero}\nD;JEQ\n@{one}\n0;JMP\n\
                 ({one})\n{}\n@{end}\n0;JMP\n\
                 ({zero})\n{}\n\
                 ({end})",
                write_const_to_dst(dst, 1),
                write_const_to_dst(dst, 0),
            )
        }
    };
    clean(&body)
}

/// `$AND(DST, ARG1, ARG2)` / `$OR(...)` / `$XOR(...)`.
pub fn expand_logic(op: LogicOp, dst: &Destination, arg1: &Argument, arg2: &Argument, p: usize, o: i64) -> Result<String, AssemblyError> {
    if let (Argument::Constant(a), Argument::Constant(b)) = (arg1, arg2) {
        return Ok(write_bool(dst, op.eval(*a != 0, *b != 0)));
    }
    if let Argument::Constant(c) = arg1 {
        return Ok(fold_with_constant(op, dst, *c != 0, arg2, p));
    }
    if let Argument::Constant(c) = arg2 {
        return Ok(fold_with_constant(op, dst, *c != 0, arg1, p));
    }
    check_forbidden(op, arg1, arg2, dst, o)?;
    Ok(emit_two_operand(op, dst, arg1, arg2, p))
}

fn fold_with_constant(op: LogicOp, dst: &Destination, c_true: bool, other: &Argument, p: usize) -> String {
    match op {
        LogicOp::And => {
            if c_true {
                emit_test(dst, other, p, 1, 0)
            } else {
                write_bool(dst, false)
            }
        }
        LogicOp::Or => {
            if c_true {
                write_bool(dst, true)
            } else {
                emit_test(dst, other, p, 1, 0)
            }
        }
        LogicOp::Xor => {
            if c_true {
                emit_test(dst, other, p, 0, 1)
            } else {
                emit_test(dst, other, p, 1, 0)
            }
        }
    }
}

/// `$NOT(DST, ARG)`.
pub fn expand_not(dst: &Destination, arg: &Argument, p: usize) -> String {
    if let Argument::Constant(n) = arg {
        return write_bool(dst, *n == 0);
    }
    emit_test(dst, arg, p, 0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Register;

    #[test]
    fn and_folds_both_constants() {
        let dst = Destination::Registers("D".to_string());
        assert_eq!(expand_logic(LogicOp::And, &dst, &Argument::Constant(1), &Argument::Constant(0), 0, 1).unwrap(), "D=0");
    }

    #[test]
    fn and_rejects_m_d_pair() {
        let dst = Destination::Registers("D".to_string());
        let err = expand_logic(
            LogicOp::And,
            &dst,
            &Argument::Register(Register::M),
            &Argument::Register(Register::D),
            0,
            7,
        );
        assert!(err.is_err());
    }

    #[test]
    fn or_allows_a_d_pair_when_dst_has_m() {
        let dst = Destination::Registers("DM".to_string());
        let out = expand_logic(
            LogicOp::Or,
            &dst,
            &Argument::Register(Register::A),
            &Argument::Register(Register::D),
            3,
            1,
        );
        assert!(out.is_ok());
    }

    #[test]
    fn not_folds_constant() {
        let dst = Destination::Registers("D".to_string());
        assert_eq!(expand_not(&dst, &Argument::Constant(0), 0), "D=1");
        assert_eq!(expand_not(&dst, &Argument::Constant(5), 0), "D=0");
    }
}
