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

//! `HALT` (a leaf macro) and the three block macros `IF`/`IFN`/`LOOP`.
//! The block macros only produce the *opening* and *closing* fragments;
//! the body lines in between pass through the expansion engine untouched
//! (or, if they're macro calls themselves, get expanded in a later pass).

use crate::ast::{clean, Argument};
use crate::macros::common::load_value;

/// `$HALT()` — an infinite self-jump, labeled for readability.
pub fn expand_halt(p: usize) -> String {
    let label = format!("__halt_{p}");
    format!("({label})\n@{label}\n0;JMP")
}

/// What a block macro's close needs to remember from its open.
pub enum BlockKind {
    If { end_label: String },
    Ifn { end_label: String },
    /// `test = false` means the condition was a known-nonzero constant: the
    /// body runs unconditionally and loops back with no re-test, per the
    /// documented constant-folding for `LOOP`.
    Loop { start_label: String, after_label: String, test: bool },
    /// A known-zero-constant `LOOP` condition: the body never runs at all.
    Skip { end_label: String },
}

/// `$IF(COND)` open: skip the body when COND is zero.
pub fn open_if(cond: &Argument, p: usize) -> (String, BlockKind) {
    let end = format!("__if_{p}");
    let body = format!("{}\n@{end}\nD;JEQ", load_value(cond));
    (clean(&body), BlockKind::If { end_label: end })
}

/// `$IFN(COND)` open: skip the body when COND is non-zero.
pub fn open_ifn(cond: &Argument, p: usize) -> (String, BlockKind) {
    let end = format!("__ifn_{p}");
    let body = format!("{}\n@{end}\nD;JNE", load_value(cond));
    (clean(&body), BlockKind::Ifn { end_label: end })
}

/// `$LOOP(COND)` open. Three shapes, per the documented constant folding:
///   - COND is a known-zero constant: the body never runs (`Skip`).
///   - COND is a known-nonzero constant: the body runs unconditionally,
///     looping back with no re-test (`Loop { test: false }`).
///   - otherwise: re-tests COND at the top of every iteration, including
///     the first (`Loop { test: true }`).
pub fn open_loop(cond: &Argument, p: usize) -> (String, BlockKind) {
    if let Argument::Constant(n) = cond {
        let after = format!("__loop_{p}_after");
        if *n == 0 {
            return (format!("@{after}\n0;JMP"), BlockKind::Skip { end_label: after });
        }
        let start = format!("__loop_{p}_start");
        return (
            format!("({start})"),
            BlockKind::Loop { start_label: start, after_label: after, test: false },
        );
    }
    let start = format!("__loop_{p}_start");
    let after = format!("__loop_{p}_after");
    let body = format!("({start})\n{}\n@{after}\nD;JEQ", load_value(cond));
    (
        clean(&body),
        BlockKind::Loop { start_label: start, after_label: after, test: true },
    )
}

/// The closing fragment for whichever block kind was opened.
pub fn close_block(kind: &BlockKind) -> String {
    match kind {
        BlockKind::If { end_label } | BlockKind::Ifn { end_label } | BlockKind::Skip { end_label } => {
            format!("({end_label})")
        }
        BlockKind::Loop { start_label, after_label, .. } => {
            format!("@{start_label}\n0;JMP\n({after_label})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Register;

    #[test]
    fn halt_jumps_to_its_own_label() {
        let out = expand_halt(3);
        assert_eq!(out, "(__halt_3)\n@__halt_3\n0;JMP");
    }

    #[test]
    fn if_open_close_round_trip_labels() {
        let (open, kind) = open_if(&Argument::Register(Register::D), 1);
        assert!(open.contains("__if_1"));
        assert_eq!(close_block(&kind), "(__if_1)");
    }

    #[test]
    fn loop_open_close_produces_matching_labels() {
        let (open, kind) = open_loop(&Argument::Register(Register::D), 2);
        assert!(open.contains("__loop_2_start") && open.contains("__loop_2_after"));
        let close = close_block(&kind);
        assert!(close.contains("__loop_2_start") && close.contains("__loop_2_after"));
    }

    #[test]
    fn loop_with_zero_constant_skips_the_body_unconditionally() {
        let (open, kind) = open_loop(&Argument::Constant(0), 5);
        assert_eq!(open, "@__loop_5_after\n0;JMP");
        assert_eq!(close_block(&kind), "(__loop_5_after)");
    }

    #[test]
    fn loop_with_nonzero_constant_has_no_retest() {
        let (open, kind) = open_loop(&Argument::Constant(7), 6);
        assert_eq!(open, "(__loop_6_start)");
        assert_eq!(close_block(&kind), "@__loop_6_start\n0;JMP\n(__loop_6_after)");
    }
}
