use crate::c_vals::InitialVal;
use crate::Ident;
use std::collections::HashMap;

/// One entry per identifier; built once by the checker, read-only afterwards.
pub type SymbolTable = HashMap<Ident, Attr>;

#[derive(Debug, Clone)]
pub enum Attr {
    Fn {
        arity: usize,
        defined: bool,
        global: bool,
    },
    Static {
        init: InitialVal,
        global: bool,
    },
    Automatic,
}

impl Attr {
    pub const fn global(&self) -> bool {
        match self {
            Self::Static { global, .. } | Self::Fn { global, .. } => *global,
            Self::Automatic => false,
        }
    }

    pub const fn fn_arity(&self) -> Option<usize> {
        match self {
            Self::Fn { arity, .. } => Some(*arity),
            Self::Static { .. } | Self::Automatic => None,
        }
    }

    pub const fn is_fn(&self) -> bool {
        matches!(self, Self::Fn { .. })
    }
}
