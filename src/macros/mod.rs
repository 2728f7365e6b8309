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

//! The macro catalog: one module per related family, dispatched by name
//! from [`crate::parser`].

pub mod arithmetic;
pub mod common;
pub mod control_flow;
pub mod divide;
pub mod logic;
pub mod multiply;
pub mod power;
pub mod swap;

use crate::ast::{Argument, Destination};
use crate::errors::AssemblyError;
use control_flow::BlockKind;
use logic::LogicOp;

/// One dispatched call's worth of arguments, already parsed into operand
/// types. Macros that need a destination take `dst` as their first
/// argument by convention (matching the catalog's own argument order);
/// `HALT` needs neither.
fn require_arity(name: &str, args: &[String], n: usize, o: i64) -> Result<(), AssemblyError> {
    if args.len() != n {
        return Err(AssemblyError::macro_err(
            o,
            format!("{name} expects {n} argument(s), got {}", args.len()),
        ));
    }
    Ok(())
}

fn parse_dst(s: &str, o: i64) -> Result<Destination, AssemblyError> {
    Destination::parse(s.trim(), o)
}

fn parse_arg(s: &str, o: i64) -> Result<Argument, AssemblyError> {
    Argument::parse(s.trim(), o)
}

/// The outcome of dispatching a non-block macro invocation.
pub enum Expansion {
    /// Fully expanded text, ready to fall through to the next pass.
    Text(String),
    /// A block macro's opening fragment, plus the bookkeeping its matching
    /// close needs.
    BlockOpen(String, BlockKind),
}

/// Is `name` one of the three block-bodied macros?
pub fn is_block_macro(name: &str) -> bool {
    matches!(name, "IF" | "IFN" | "LOOP")
}

/// Dispatches a single macro invocation by name. `p` is a globally unique
/// index for this invocation (label uniqueness across the whole expansion
/// run, not just the current pass); `o` is the original source line, used
/// for diagnostics.
pub fn expand(name: &str, args: &[String], p: usize, o: i64) -> Result<Expansion, AssemblyError> {
    match name {
        "LD" => {
            require_arity(name, args, 2, o)?;
            let dst = parse_dst(&args[0], o)?;
            let src = parse_arg(&args[1], o)?;
            Ok(Expansion::Text(arithmetic::expand_ld(&dst, &src)))
        }
        "ADD" | "SUB" => {
            require_arity(name, args, 3, o)?;
            let dst = parse_dst(&args[0], o)?;
            let a1 = parse_arg(&args[1], o)?;
            let a2 = parse_arg(&args[2], o)?;
            Ok(Expansion::Text(arithmetic::expand_add_sub(name == "ADD", &dst, &a1, &a2)))
        }
        "SWAP" => {
            require_arity(name, args, 2, o)?;
            let d1 = parse_dst(&args[0], o)?;
            let d2 = parse_dst(&args[1], o)?;
            Ok(Expansion::Text(swap::expand_swap(&d1, &d2, o)?))
        }
        "AND" | "OR" | "XOR" => {
            require_arity(name, args, 3, o)?;
            let dst = parse_dst(&args[0], o)?;
            let a1 = parse_arg(&args[1], o)?;
            let a2 = parse_arg(&args[2], o)?;
            let op = match name {
                "AND" => LogicOp::And,
                "OR" => LogicOp::Or,
                _ => LogicOp::Xor,
            };
            Ok(Expansion::Text(logic::expand_logic(op, &dst, &a1, &a2, p, o)?))
        }
        "NOT" => {
            require_arity(name, args, 2, o)?;
            let dst = parse_dst(&args[0], o)?;
            let a = parse_arg(&args[1], o)?;
            Ok(Expansion::Text(logic::expand_not(&dst, &a, p)))
        }
        "MULT" => {
            require_arity(name, args, 3, o)?;
            let dst = parse_dst(&args[0], o)?;
            let a1 = parse_arg(&args[1], o)?;
            let a2 = parse_arg(&args[2], o)?;
            Ok(Expansion::Text(multiply::expand_mult(&dst, &a1, &a2, p, o)?))
        }
        "DIV" => {
            require_arity(name, args, 3, o)?;
            let dst = parse_dst(&args[0], o)?;
            let a1 = parse_arg(&args[1], o)?;
            let a2 = parse_arg(&args[2], o)?;
            Ok(Expansion::Text(divide::expand_div(&dst, &a1, &a2, p)))
        }
        "POW" => {
            require_arity(name, args, 3, o)?;
            let dst = parse_dst(&args[0], o)?;
            let base = parse_arg(&args[1], o)?;
            let exp = parse_arg(&args[2], o)?;
            Ok(Expansion::Text(power::expand_pow(&dst, &base, &exp, p)?))
        }
        "HALT" => {
            require_arity(name, args, 0, o)?;
            Ok(Expansion::Text(control_flow::expand_halt(p)))
        }
        "IF" => {
            require_arity(name, args, 1, o)?;
            let cond = parse_arg(&args[0], o)?;
            let (text, kind) = control_flow::open_if(&cond, p);
            Ok(Expansion::BlockOpen(text, kind))
        }
        "IFN" => {
            require_arity(name, args, 1, o)?;
            let cond = parse_arg(&args[0], o)?;
            let (text, kind) = control_flow::open_ifn(&cond, p);
            Ok(Expansion::BlockOpen(text, kind))
        }
        "LOOP" => {
            require_arity(name, args, 1, o)?;
            let cond = parse_arg(&args[0], o)?;
            let (text, kind) = control_flow::open_loop(&cond, p);
            Ok(Expansion::BlockOpen(text, kind))
        }
        other => Err(AssemblyError::macro_err(o, format!("Unknown macro `${other}`"))),
    }
}
