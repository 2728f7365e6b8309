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

//! Shared operand-to-instruction helpers used by every macro in the
//! catalog: loading a value into `D`, writing `D` or a small constant into
//! a destination, and the `__aux`-based A-register save/restore pair.

use crate::ast::{dereference_chain, load_constant_into_d, Argument, Destination, Register};

/// `D = arg`'s value. Self-contained: doesn't assume anything about the
/// current contents of `A`, and leaves `A` pointed at whatever address (if
/// any) the load needed.
pub fn load_value(arg: &Argument) -> String {
    match arg {
        Argument::Register(r) => format!("D={}", r.letter()),
        Argument::Constant(n) => load_constant_into_d(*n),
        Argument::Address { loc, depth } => {
            let deref = dereference_chain(*depth);
            if deref.is_empty() {
                format!("@{loc}\nD=M")
            } else {
                format!("@{loc}\n{deref}\nD=M")
            }
        }
    }
}

/// Writes the current value of `D` into `dst`.
pub fn write_d_to_dst(dst: &Destination) -> String {
    match dst {
        Destination::Registers(regs) => format!("{regs}=D"),
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

/// Writes a known constant into `dst`, preferring a one-instruction
/// direct assignment when `dst` is a register set and `n` fits the ALU's
/// one-op comps.
pub fn write_const_to_dst(dst: &Destination, n: i32) -> String {
    if let Destination::Registers(regs) = dst {
        if (-1..=1).contains(&n) {
            return format!("{regs}={n}");
        }
    }
    format!("{}\n{}", load_constant_into_d(n), write_d_to_dst(dst))
}

/// `D = A; @__aux; M = D` — stashes the current `A` register's value.
pub fn save_a() -> &'static str {
    "D=A\n@__aux\nM=D"
}

/// `@__aux; A = M` — restores a previously stashed `A`.
pub fn restore_a() -> &'static str {
    "@__aux\nA=M"
}

/// True iff `arg1`/`arg2` are `M`/`D` in either order — the one operand
/// pairing that can never be read safely without losing one of the two
/// values, since both reads and the eventual branch/write all compete for
/// the same `A`+`D` pair with no spare register to stash into.
pub fn is_m_d_pair(arg1: &Argument, arg2: &Argument) -> bool {
    matches!(
        (arg1, arg2),
        (Argument::Register(Register::M), Argument::Register(Register::D))
            | (Argument::Register(Register::D), Argument::Register(Register::M))
    )
}

/// True iff `arg1`/`arg2` are `A`/`D` in either order.
pub fn is_a_d_pair(arg1: &Argument, arg2: &Argument) -> bool {
    matches!(
        (arg1, arg2),
        (Argument::Register(Register::A), Argument::Register(Register::D))
            | (Argument::Register(Register::D), Argument::Register(Register::A))
    )
}
