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

//! `POW`: `X^Y` by repeated squaring. Special values are folded at
//! expansion time whenever they're known as constants; everything else
//! goes through a single self-contained runtime routine (rather than
//! recursively emitting `$MULT`/`$IF`/`$LOOP` text for a further
//! expansion pass — both approaches produce the same primitive output,
//! and this one is less delicate to get right by hand).

use crate::ast::{clean, Argument, Destination};
use crate::errors::AssemblyError;
use crate::macros::common::{load_value, write_const_to_dst, write_d_to_dst};
use crate::macros::multiply::multiply_cells;

fn fold_pow_const(x: i32, y: i32) -> i32 {
    if y == 0 {
        return 1;
    }
    if y < 0 {
        return match x {
            1 => 1,
            -1 => if y.rem_euclid(2) == 0 { 1 } else { -1 },
            _ => 0,
        };
    }
    match x {
        0 => 0,
        1 => 1,
        -1 => {
            if y % 2 == 0 { 1 } else { -1 }
        }
        _ => {
            let mut result: i64 = 1;
            for _ in 0..y {
                result = (((result * x as i64) + 32768) & 0xFFFF) - 32768;
            }
            result as i32
        }
    }
}

/// `$POW(DST, X, Y)`.
pub fn expand_pow(dst: &Destination, base: &Argument, exp: &Argument, p: usize) -> Result<String, AssemblyError> {
    if let (Argument::Constant(x), Argument::Constant(y)) = (base, exp) {
        return Ok(clean(&write_const_to_dst(dst, fold_pow_const(*x, *y))));
    }
    if let Argument::Constant(1) = exp {
        return Ok(clean(&{
            let load = load_value(base);
            format!("{load}\n{}", write_d_to_dst(dst))
        }));
    }
    if let Argument::Constant(0) = exp {
        return Ok(clean(&write_const_to_dst(dst, 1)));
    }
    if let Argument::Constant(1) = base {
        return Ok(clean(&write_const_to_dst(dst, 1)));
    }

    let mut body = String::new();
    body.push_str(&load_value(base));
    body.push_str("\n@__powbase\nM=D\n");
    body.push_str(&load_value(exp));
    body.push_str("\n@__powexponent\nM=D\n@__powresult\nM=1\n");

    let neg_checked = format!("__powloop_negok_{p}");
    let base_is_one = format!("__powloop_baseone_{p}");
    let base_is_negone = format!("__powloop_basenegone_{p}");
    let neg_done = format!("__powloop_negdone_{p}");
    let end = format!("__powend_{p}");

    // A runtime-negative exponent: |base|==1 decides the outcome (1, or
    // the sign of the exponent's parity), otherwise the result is 0.
    body.push_str(&format!(
        "@__powexponent\nD=M\n@{neg_checked}\nD;JGE\n\
         @__powbase\nD=M\n@{base_is_one}\nD;JEQ\n\
         @__powbase\nD=M\n@1\nD=D+A\n@{base_is_negone}\nD;JEQ\n\
         @__powresult\nM=0\n@{end}\n0;JMP\n\
         ({base_is_one})\n@__powresult\nM=1\n@{end}\n0;JMP\n\
         ({base_is_negone})\n@__powexponent\nD=M\n@1\nD=D&A\n@{neg_done}\nD;JEQ\n\
         @__powresult\nM=-1\n@{end}\n0;JMP\n\
         ({neg_done})\n@__powresult\nM=1\n@{end}\n0;JMP\n\
         ({neg_checked})\n"
    ));

    // square-and-multiply over bits 0..14 (bit 15 is never set here, since
    // this branch only runs once the exponent has been confirmed >= 0).
    for k in 0..15u32 {
        let skip = format!("__powloop_skip_{p}_{k}");
        let mask = 1i32 << k;
        body.push_str(&format!(
            "@__powexponent\nD=M\n@{mask}\nD=D&A\n@{skip}\nD;JEQ\n"
        ));
        body.push_str(&multiply_cells("__powresult", "__powresult", "__powbase", &format!("{p}_{k}a")));
        body.push_str(&format!("({skip})\n"));
        if k < 14 {
            body.push_str(&multiply_cells("__powbase", "__powbase", "__powbase", &format!("{p}_{k}b")));
        }
    }

    body.push_str(&format!("({end})\n@__powresult\nD=M\n"));
    body.push_str(&write_d_to_dst(dst));
    Ok(clean(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Register;

    #[test]
    fn pow_folds_known_constants() {
        let dst = Destination::Registers("D".to_string());
        assert_eq!(expand_pow(&dst, &Argument::Constant(2), &Argument::Constant(10), 0).unwrap(), "@1024\nD=A");
        assert_eq!(expand_pow(&dst, &Argument::Constant(-1), &Argument::Constant(3), 0).unwrap(), "D=-1");
        assert_eq!(expand_pow(&dst, &Argument::Constant(0), &Argument::Constant(0), 0).unwrap(), "D=1");
        assert_eq!(expand_pow(&dst, &Argument::Constant(5), &Argument::Constant(-2), 0).unwrap(), "D=0");
    }

    #[test]
    fn pow_exponent_one_is_identity() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_pow(&dst, &Argument::Register(Register::A), &Argument::Constant(1), 0).unwrap();
        assert_eq!(out, "D=A");
    }

    #[test]
    fn pow_general_case_uses_scratch_cells() {
        let dst = Destination::Registers("D".to_string());
        let out = expand_pow(&dst, &Argument::Register(Register::A), &Argument::Register(Register::D), 4).unwrap();
        assert!(out.contains("__powbase") && out.contains("__powexponent"));
    }
}
