pub mod attr;
pub mod c_vals;
pub mod expr;
pub mod parse;

pub use attr::{Attr, SymbolTable};
pub use c_vals::{Constant, InitialVal, StaticInit};
pub use expr::*;

use std::rc::Rc;

/// Cheap-to-clone identifier; compares and hashes by contents.
pub type Ident = Rc<str>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StorageClass {
    Static,
    Extern,
}
