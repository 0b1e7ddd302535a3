//! The backend half of a C-subset compiler targeting x86-64 (AT&T syntax,
//! Linux/ELF). The parser hands [`check`] a program tree; once the external
//! lowering and register-allocation stages have produced the assembly-level
//! program, [`emit`] serializes it against the symbol table `check` built.

pub mod semantics;

pub use ast::{Attr, SymbolTable};
pub use semantics::Error;

use ast::parse::Program;

/// Validates the program and builds its symbol table. The tree itself is
/// left meaning-equivalent; block-scope names are rewritten to unique
/// spellings so that later stages can treat the table as flat.
pub fn check(program: &mut Program) -> Result<SymbolTable, Error> {
    semantics::check(program)
}

/// Serializes an assembly-level program to AT&T-syntax text. The symbol
/// table decides which call sites need `@PLT` decoration.
pub fn emit(program: &asm::x86::Program, table: &SymbolTable) -> Box<[u8]> {
    asm::x86::emit(program, table)
}
