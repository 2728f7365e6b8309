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

//! `MULT`, implemented as a shift-and-add over `__multarg1`/`__multarg2`
//! (signed 16-bit, wrapping). Bit 15 (the sign bit) is folded in last,
//! after the 0..14 addition loop, rather than handled first as a
//! preamble — mathematically equivalent (addition is commutative) and
//! simpler to generate with the same four scratch cells.

use crate::ast::{clean, wrap_i16, Argument, Destination};
use crate::errors::AssemblyError;
use crate::macros::common::{is_m_d_pair, load_value, write_d_to_dst};

/// Multiplies the values currently stored in the named cells `a_cell` and
/// `b_cell`, writing the product into `dst_cell`. `tag` must be unique
/// across every call within a single expansion run (label uniqueness).
/// Shared between the top-level `$MULT` macro and `POW`'s square-and-
/// multiply loop.
pub(crate) fn multiply_cells(dst_cell: &str, a_cell: &str, b_cell: &str, tag: &str) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "@{a_cell}\nD=M\n@__multarg1\nM=D\n@{b_cell}\nD=M\n@__multarg2\nM=D\n\
         @__multresult\nM=0\n@__multarg2\nD=M\n@__multhelper\nM=D\n"
    ));
    for k in 0..15u32 {
        let skip = format!("__mult_skip_{tag}_{k}");
        let mask = 1i32 << k;
        body.push_str(&format!(
            "@__multarg1\nD=M\n@{mask}\nD=D&A\n@{skip}\nD;JEQ\n\
             @__multhelper\nD=M\n@__multresult\nM=M+D\n({skip})\n"
        ));
        if k < 14 {
            body.push_str("@__multhelper\nD=M\nM=D+M\n");
        }
    }
    let sign_ok = format!("__mult_signok_{tag}");
    body.push_str(&format!(
        "@__multarg1\nD=M\n@{sign_ok}\nD;JGE\n\
         @__multhelper\nD=M\nM=D+M\n@__multhelper\nD=M\n@__multresult\nM=M-D\n({sign_ok})\n"
    ));
    body.push_str(&format!("@__multresult\nD=M\n@{dst_cell}\nM=D\n"));
    body
}

/// `$MULT(DST, ARG1, ARG2)`.
pub fn expand_mult(dst: &Destination, arg1: &Argument, arg2: &Argument, p: usize, o: i64) -> Result<String, AssemblyError> {
    if let (Argument::Constant(a), Argument::Constant(b)) = (arg1, arg2) {
        let product = wrap_i16(*a as i64 * *b as i64);
        return Ok(clean(&crate::macros::common::write_const_to_dst(dst, product)));
    }
    if is_m_d_pair(arg1, arg2) {
        return Err(AssemblyError::macro_err(
            o,
            "Impossible operation: MULT cannot take operands M and D together".to_string(),
        ));
    }
    let mut body = String::new();
    body.push_str(&load_value(arg1));
    body.push_str("\n@__multarg1\nM=D\n");
    body.push_str(&load_value(arg2));
    body.push_str("\n@__multarg2\nM=D\n");
    body.push_str(&multiply_cells("__multresult", "__multarg1", "__multarg2", &p.to_string()));
    body.push_str("@__multresult\nD=M\n");
    body.push_str(&write_d_to_dst(dst));
    Ok(clean(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Register;

    #[test]
    fn mult_folds_constants() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_mult(&dst, &Argument::Constant(7), &Argument::Constant(6), 0, 1).unwrap();
        assert_eq!(out, "@42\nD=A");
    }

    #[test]
    fn mult_rejects_m_d_pair() {
        let dst = Destination::Registers("D".to_string());
        let err = expand_mult(
            &dst,
            &Argument::Register(Register::M),
            &Argument::Register(Register::D),
            0,
            9,
        );
        assert!(err.is_err());
    }

    #[test]
    fn mult_general_case_uses_scratch_cells() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_mult(&dst, &Argument::Register(Register::A), &Argument::Constant(7), 2, 1).unwrap();
        assert!(out.contains("__multarg1") && out.contains("__multresult"));
    }

    #[test]
    fn multiply_cells_doubles_helper_one_extra_time_for_the_sign_fix() {
        // 14 doublings carry the running power-of-two through the 0..14 loop,
        // plus one more to reach b*2^15 before the negative-a_cell correction
        // subtracts it — 15 total occurrences of the doubling instruction.
        let body = multiply_cells("__multresult", "__multarg1", "__multarg2", "t");
        assert_eq!(body.matches("M=D+M").count(), 15);
    }
}
