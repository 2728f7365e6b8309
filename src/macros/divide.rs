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

//! `DIV`: truncating signed division, `X / 0 = 0`, via a shift-subtract
//! over absolute values with the sign reapplied at the end.

use crate::ast::{clean, wrap_i16, Argument, Destination};
use crate::errors::AssemblyError;
use crate::macros::common::{load_value, write_const_to_dst, write_d_to_dst};

/// Loads `arg`'s value once and stores it raw into `dest_cell`, then flips
/// the `__divsign` flag (a running `1`/`-1` multiplier, negated via the
/// ALU's `-D` comp) and negates `dest_cell` in place if the stored value
/// was negative. `arg` is loaded exactly once — re-invoking `load_value`
/// a second time after the `__divsign` touch has repointed `A` would read
/// the wrong cell for any `arg` whose load depends on `A`'s prior value
/// (`Register(A)`, or `Register(M)` with no `@` of its own).
fn abs_and_flip_sign(arg: &Argument, dest_cell: &str, tag: &str) -> String {
    let load = load_value(arg);
    let nonneg = format!("__div_{tag}nonneg", tag = tag);
    format!(
        "{load}\n@{dest_cell}\nM=D\n@{nonneg}\nD;JGE\n\
         @__divsign\nD=M\nM=-D\n@{dest_cell}\nD=M\nD=-D\n@{dest_cell}\nM=D\n({nonneg})"
    )
}

/// `$DIV(DST, ARG1, ARG2)`.
pub fn expand_div(dst: &Destination, arg1: &Argument, arg2: &Argument, p: usize) -> String {
    if let (Argument::Constant(a), Argument::Constant(b)) = (arg1, arg2) {
        let quotient = if *b == 0 {
            0
        } else {
            let sign: i64 = if (*a < 0) != (*b < 0) { -1 } else { 1 };
            sign * ((*a as i64).abs() / (*b as i64).abs())
        };
        return clean(&write_const_to_dst(dst, wrap_i16(quotient)));
    }

    let mut body = String::new();
    body.push_str("@__divsign\nM=1\n");
    body.push_str(&abs_and_flip_sign(arg1, "__divarg1", &format!("{p}x")));
    body.push('\n');
    body.push_str(&abs_and_flip_sign(arg2, "__divarg2", &format!("{p}y")));
    body.push_str("\n@__divresult\nM=0\n");

    let bypass = format!("__div_bypass_{p}");
    body.push_str(&format!("@__divarg2\nD=M\n@{bypass}\nD;JEQ\n"));

    // table[k] = __divarg2 * 2^k for k = 0..14, built ascending by doubling
    // a running accumulator and copying it out after each step.
    body.push_str("@__divarg2\nD=M\n@__divhelper\nM=D\n@__divhelper_0\nM=D\n");
    for k in 1..15u32 {
        body.push_str(&format!(
            "@__divhelper\nD=M\nM=D+M\nD=M\n@__divhelper_{k}\nM=D\n"
        ));
    }

    // greedy subtraction, descending: consume the table from k=14 down to 0.
    for k in (0..15u32).rev() {
        let skip = format!("__div_skip_{p}_{k}");
        let weight = 1i64 << k;
        body.push_str(&format!(
            "@__divhelper_{k}\nD=M\n@__divarg1\nD=M-D\n@{skip}\nD;JLT\n\
             @__divarg1\nM=D\n@__divresult\nD=M\n@{weight}\nD=D+A\n@__divresult\nM=D\n({skip})\n"
        ));
    }

    let sign_check = format!("__div_signcheck_{p}");
    let sign_done = format!("__div_signdone_{p}");
    body.push_str(&format!(
        "({bypass})\n@__divsign\nD=M\n@{sign_check}\nD;JGE\n\
         @__divresult\nD=M\nD=-D\n@{sign_done}\n0;JMP\n\
         ({sign_check})\n@__divresult\nD=M\n\
         ({sign_done})\n"
    ));
    body.push_str(&write_d_to_dst(dst));
    clean(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Register;

    #[test]
    fn div_folds_constants() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_div(&dst, &Argument::Constant(-7), &Argument::Constant(2));
        assert_eq!(out, "@2\nA=!A\nD=A");
    }

    #[test]
    fn div_by_constant_zero_folds_to_zero() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_div(&dst, &Argument::Constant(9), &Argument::Constant(0));
        assert_eq!(out, "D=0");
    }

    #[test]
    fn abs_and_flip_sign_stores_register_m_before_touching_divsign() {
        // the operand must be read into D and stashed in dest_cell before
        // __divsign is ever touched, since Register(M)'s load has no `@` of
        // its own and would otherwise read back whatever __divsign last
        // pointed A at.
        let out = abs_and_flip_sign(&Argument::Register(Register::M), "__divarg1", "t");
        let store_pos = out.find("__divarg1\nM=D").unwrap();
        let sign_pos = out.find("__divsign").unwrap();
        assert!(store_pos < sign_pos);
    }

    #[test]
    fn div_general_case_uses_scratch_cells() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_div(&dst, &Argument::Register(Register::A), &Argument::Register(Register::M));
        assert!(out.contains("__divarg1") && out.contains("__divresult"));
    }
}
