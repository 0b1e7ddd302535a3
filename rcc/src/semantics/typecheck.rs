use ast::parse::{Block, BlockItem, Dec, FnDec, ForInit, Program, Stmnt, VarDec};
use ast::{Attr, Binary, Expr, InitialVal, StaticInit, StorageClass, SymbolTable, Unary};

use std::collections::hash_map::Entry;

/// Walks the resolved program once, building the symbol table and checking
/// every use against the declarations seen so far. Validation only: the
/// tree is not rewritten.
pub fn typecheck(Program(decs): &Program) -> Result<SymbolTable, Error> {
    let mut table = SymbolTable::new();
    for dec in decs.iter() {
        top_level_declaration(dec, &mut table)?;
    }
    Ok(table)
}

fn top_level_declaration(dec: &Dec, table: &mut SymbolTable) -> Result<(), Error> {
    match dec {
        Dec::Fn(f) => function_declaration(f, table),
        Dec::Var(v) => file_scope_var(v, table),
    }
}

fn file_scope_var(dec: &VarDec, table: &mut SymbolTable) -> Result<(), Error> {
    let mut initial = if dec.sc == Some(StorageClass::Extern) {
        extern_initializer(&dec.init)?
    } else {
        file_scope_initializer(dec.init.as_ref())?
    };

    // we're global unless static
    let mut global = dec.sc != Some(StorageClass::Static);

    match table.get(&dec.name) {
        Some(Attr::Static {
            init: old_init,
            global: old_global,
        }) => {
            check_linkage(&mut global, *old_global, &dec.sc)?;
            check_initializer_conflict(*old_init, &mut initial)?;
        }
        Some(_) => return Err(Error::FnAsVar),
        None => {}
    };

    table.insert(
        dec.name.clone(),
        Attr::Static {
            init: initial,
            global,
        },
    );

    if let Some(init) = &dec.init {
        typecheck_expression(init, table)?;
    }
    Ok(())
}

fn extern_initializer(init: &Option<Expr>) -> Result<InitialVal, Error> {
    match init {
        Some(exp) => exp
            .static_init()
            .map(InitialVal::Initial)
            .ok_or(Error::NotConstInitialized),
        None => Ok(InitialVal::NoInitializer),
    }
}

fn file_scope_initializer(init: Option<&Expr>) -> Result<InitialVal, Error> {
    match init {
        Some(exp) => exp
            .static_init()
            .map(InitialVal::Initial)
            .ok_or(Error::NotConstInitialized),
        None => Ok(InitialVal::Tentative),
    }
}

fn check_linkage(
    global: &mut bool,
    old_global: bool,
    sc: &Option<StorageClass>,
) -> Result<(), Error> {
    // if it's extern, then we go with what came first, otherwise they
    // should be the same
    if *sc == Some(StorageClass::Extern) {
        *global = old_global;
        Ok(())
    } else if *global != old_global {
        Err(Error::ConflictingLinkage)
    } else {
        Ok(())
    }
}

fn check_initializer_conflict(old: InitialVal, new: &mut InitialVal) -> Result<(), Error> {
    match (*new, old) {
        // two real initializers conflict, even if they happen to agree
        (InitialVal::Initial(_), InitialVal::Initial(_)) => Err(Error::ConflictingDeclaration),
        (InitialVal::Initial(_), _) => Ok(()),
        (_, InitialVal::Initial(c)) => {
            *new = InitialVal::Initial(c);
            Ok(())
        }
        (InitialVal::Tentative, _) | (_, InitialVal::Tentative) => {
            *new = InitialVal::Tentative;
            Ok(())
        }
        (InitialVal::NoInitializer, InitialVal::NoInitializer) => Ok(()),
    }
}

fn declaration(dec: &Dec, table: &mut SymbolTable) -> Result<(), Error> {
    match dec {
        Dec::Fn(f) => function_declaration(f, table),
        Dec::Var(v) => variable_declaration(v, table),
    }
}

fn variable_declaration(dec: &VarDec, table: &mut SymbolTable) -> Result<(), Error> {
    match (dec.sc, &dec.init) {
        (Some(StorageClass::Extern), Some(_)) => Err(Error::DeclaredExtern),
        (Some(StorageClass::Extern), None) => {
            match table.entry(dec.name.clone()) {
                Entry::Occupied(e) => {
                    if e.get().is_fn() {
                        return Err(Error::FnAsVar);
                    }
                }
                Entry::Vacant(e) => {
                    e.insert(Attr::Static {
                        init: InitialVal::NoInitializer,
                        global: true,
                    });
                }
            }
            Ok(())
        }
        (Some(StorageClass::Static), Some(exp)) => {
            let init = exp.static_init().ok_or(Error::NotConstInitialized)?;
            table.insert(
                dec.name.clone(),
                Attr::Static {
                    init: InitialVal::Initial(init),
                    global: false,
                },
            );
            Ok(())
        }
        (Some(StorageClass::Static), None) => {
            table.insert(
                dec.name.clone(),
                Attr::Static {
                    init: InitialVal::Initial(StaticInit::Int(0)),
                    global: false,
                },
            );
            Ok(())
        }
        (None, _) => {
            table.insert(dec.name.clone(), Attr::Automatic);
            if let Some(init) = &dec.init {
                typecheck_expression(init, table)?;
            }
            Ok(())
        }
    }
}

fn function_declaration(dec: &FnDec, table: &mut SymbolTable) -> Result<(), Error> {
    let arity = dec.params.len();
    let has_body = dec.body.is_some();

    // global unless declared static; once a name has been seen, the first
    // declaration's linkage sticks
    let global = dec.sc != Some(StorageClass::Static);

    match table.entry(dec.name.clone()) {
        Entry::Occupied(mut e) => {
            let Attr::Fn {
                arity: old_arity,
                defined,
                global: was_global,
            } = e.get_mut()
            else {
                return Err(Error::VarAsFn);
            };

            if *old_arity != arity {
                return Err(Error::IncompatibleDeclarations);
            }

            if *defined && has_body {
                return Err(Error::DuplicateDefinition);
            }

            /*
             * Can't declare a symbol with external linkage,
             * then redeclare it with internal linkage. The
             * other direction is fine: a plain declaration
             * after a static one adopts the internal linkage.
             */
            if *was_global && dec.sc == Some(StorageClass::Static) {
                return Err(Error::StaticRedec);
            }

            if has_body {
                *defined = true;
            }
        }
        Entry::Vacant(e) => {
            e.insert(Attr::Fn {
                arity,
                defined: has_body,
                global,
            });
        }
    };

    if let Some(body) = &dec.body {
        for param in dec.params.iter() {
            table.insert(param.clone(), Attr::Automatic);
        }
        typecheck_block(body, table)?;
    }
    Ok(())
}

fn typecheck_block(block: &Block, table: &mut SymbolTable) -> Result<(), Error> {
    for item in block.iter() {
        match item {
            BlockItem::D(dec) => declaration(dec, table)?,
            BlockItem::S(s) => typecheck_statement(s, table)?,
        }
    }
    Ok(())
}

fn typecheck_statement(stmt: &Stmnt, table: &mut SymbolTable) -> Result<(), Error> {
    match stmt {
        Stmnt::Ret(e) | Stmnt::Exp(e) => typecheck_expression(e, table),
        Stmnt::If {
            condition,
            then,
            r#else,
        } => {
            typecheck_expression(condition, table)?;
            typecheck_statement(then, table)?;
            if let Some(r#else) = r#else {
                typecheck_statement(r#else, table)?;
            }
            Ok(())
        }
        Stmnt::Compound(block) => typecheck_block(block, table),
        Stmnt::While { condition, body } => {
            typecheck_expression(condition, table)?;
            typecheck_statement(body, table)
        }
        Stmnt::DoWhile { body, condition } => {
            typecheck_statement(body, table)?;
            typecheck_expression(condition, table)
        }
        Stmnt::For {
            init,
            condition,
            post,
            body,
        } => {
            if let Some(init) = init {
                typecheck_for_init(init, table)?;
            }
            if let Some(condition) = condition {
                typecheck_expression(condition, table)?;
            }
            if let Some(post) = post {
                typecheck_expression(post, table)?;
            }
            typecheck_statement(body, table)
        }
        Stmnt::Break | Stmnt::Continue | Stmnt::Null => Ok(()),
    }
}

fn typecheck_for_init(init: &ForInit, table: &mut SymbolTable) -> Result<(), Error> {
    match init {
        ForInit::D(dec) => variable_declaration(dec, table),
        ForInit::E(exp) => typecheck_expression(exp, table),
    }
}

fn typecheck_expression(exp: &Expr, table: &SymbolTable) -> Result<(), Error> {
    match exp {
        Expr::FunctionCall { name, args } => {
            let Some(attr) = table.get(name) else {
                return Err(Error::UndefinedFn);
            };
            let Some(arity) = attr.fn_arity() else {
                return Err(Error::VarAsFn);
            };

            if arity != args.len() {
                return Err(Error::WrongArgs);
            }
            for arg in args.iter() {
                typecheck_expression(arg, table)?;
            }
            Ok(())
        }
        Expr::Var(name) => match table.get(name) {
            Some(attr) if attr.is_fn() => Err(Error::FnAsVar),
            Some(_) => Ok(()),
            None => Err(Error::UndefinedVar),
        },
        Expr::Assignment { dst, src } => {
            typecheck_expression(dst, table)?;
            typecheck_expression(src, table)
        }
        Expr::Bin(Binary { left, right, .. }) => {
            typecheck_expression(left, table)?;
            typecheck_expression(right, table)
        }
        Expr::Conditional {
            condition,
            r#true,
            r#false,
        } => {
            typecheck_expression(condition, table)?;
            typecheck_expression(r#true, table)?;
            typecheck_expression(r#false, table)
        }
        Expr::Unary(Unary { exp, .. }) => typecheck_expression(exp, table),
        Expr::Nested(exp) => typecheck_expression(exp, table),
        Expr::Const(_) => Ok(()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate Definition")]
    DuplicateDefinition,

    #[error("Conflicting Declaration")]
    ConflictingDeclaration,

    #[error("Undefined Variable")]
    UndefinedVar,

    #[error("Undefined Function")]
    UndefinedFn,

    #[error("Function used as Variable")]
    FnAsVar,

    #[error("Variable used as Function")]
    VarAsFn,

    #[error("Wrong Number of Arguments")]
    WrongArgs,

    #[error("Incompatible Declarations")]
    IncompatibleDeclarations,

    #[error("Static Declaration Follows Non-Static")]
    StaticRedec,

    #[error("Conflicting Linkage")]
    ConflictingLinkage,

    #[error("Static Not Const Initialized")]
    NotConstInitialized,

    #[error("Extern Local With Initializer")]
    DeclaredExtern,
}
