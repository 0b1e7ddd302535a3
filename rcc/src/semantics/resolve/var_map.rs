use ast::parse::{FnDec, VarDec};
use ast::{Ident, StorageClass};
use derive_more::{Deref, DerefMut};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

static COUNTER: AtomicU32 = AtomicU32::new(0);

#[derive(Deref, DerefMut, Clone)]
pub struct VarMap(HashMap<Ident, Var>);

#[derive(Clone, Debug, PartialEq)]
pub struct Var {
    pub name: Ident,
    pub from_current_block: bool,
    pub has_linkage: bool,
}

impl VarMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Child scope: everything stays visible, but nothing counts as
    /// declared in the current block anymore. Dropping the child restores
    /// the parent untouched, which is what gives shadowed names their
    /// visibility back on block exit.
    pub fn new_scope(other: &Self) -> Self {
        let mut new = other.clone();
        for Var {
            from_current_block, ..
        } in new.values_mut()
        {
            *from_current_block = false;
        }
        new
    }

    pub fn unique_var(&self, name: &Ident) -> Var {
        let unique = format!(
            "{name}.{number}",
            number = COUNTER.fetch_add(1, Ordering::SeqCst)
        );
        Var {
            name: Ident::from(unique.as_str()),
            from_current_block: true,
            has_linkage: false,
        }
    }

    /// File-scope declarations keep their spelling; redeclaration at file
    /// scope is the type checker's business, not a scoping conflict.
    pub fn add_file_scope_var(&mut self, dec: &VarDec) {
        self.insert(
            dec.name.clone(),
            Var {
                name: dec.name.clone(),
                from_current_block: true,
                has_linkage: true,
            },
        );
    }

    pub fn add_var(&mut self, dec: &mut VarDec) -> Result<(), super::Error> {
        let is_extern = dec.sc == Some(StorageClass::Extern);
        if let Some(prev) = self.get(&dec.name) {
            if prev.from_current_block && !(prev.has_linkage && is_extern) {
                return Err(super::Error::ConflictingDec);
            }
        }

        let var = if is_extern {
            Var {
                name: dec.name.clone(),
                from_current_block: true,
                has_linkage: true,
            }
        } else {
            self.unique_var(&dec.name)
        };

        let key = std::mem::replace(&mut dec.name, var.name.clone());
        self.insert(key, var);
        Ok(())
    }

    pub fn add_fn(&mut self, f: &FnDec) -> Result<(), super::Error> {
        if let Some(var) = self.get(&f.name) {
            if var.from_current_block && !var.has_linkage {
                return Err(super::Error::DuplicateDeclaration);
            }
        }
        self.insert(
            f.name.clone(),
            Var {
                name: f.name.clone(),
                from_current_block: true,
                has_linkage: true,
            },
        );
        Ok(())
    }
}
