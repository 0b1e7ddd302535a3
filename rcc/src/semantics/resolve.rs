use ast::parse::{BlockItem, Dec, FnDec, ForInit, ParamList, Program, Stmnt, VarDec};
use ast::{Binary, Expr, StorageClass, Unary};

mod var_map;
use var_map::VarMap;

pub fn resolve(Program(decs): &mut Program) -> Result<(), Error> {
    let mut map = VarMap::new();
    for dec in decs.iter_mut() {
        resolve_top_level_dec(dec, &mut map)?;
    }
    Ok(())
}

fn resolve_top_level_dec(dec: &mut Dec, map: &mut VarMap) -> Result<(), Error> {
    match dec {
        Dec::Var(v) => {
            map.add_file_scope_var(v);
            Ok(())
        }
        Dec::Fn(f) => {
            map.add_fn(f)?;
            let mut inner = VarMap::new_scope(map);
            resolve_params(&mut f.params, &mut inner)?;
            if let Some(b) = &mut f.body {
                resolve_block(b, &mut inner)?;
            }
            Ok(())
        }
    }
}

fn resolve_params(params: &mut ParamList, map: &mut VarMap) -> Result<(), Error> {
    for name in params.iter_mut() {
        if let Some(v) = map.get(name) {
            if v.from_current_block && !v.has_linkage {
                return Err(Error::DuplicateDeclaration);
            }
        }
        let unique = map.unique_var(name);
        let key = std::mem::replace(name, unique.name.clone());
        map.insert(key, unique);
    }
    Ok(())
}

fn resolve_block(block: &mut [BlockItem], map: &mut VarMap) -> Result<(), Error> {
    for item in block {
        match item {
            BlockItem::S(s) => resolve_statement(s, map)?,
            BlockItem::D(d) => resolve_declaration(d, map)?,
        }
    }
    Ok(())
}

fn resolve_declaration(dec: &mut Dec, map: &mut VarMap) -> Result<(), Error> {
    match dec {
        Dec::Var(d) => resolve_var_dec(d, map),

        Dec::Fn(FnDec { body: Some(_), .. }) => Err(Error::LocalFnDecBody),
        Dec::Fn(FnDec { sc, .. }) if *sc == Some(StorageClass::Static) => {
            Err(Error::StaticBlockScopeFn)
        }

        Dec::Fn(f) => resolve_fn_dec(f, map),
    }
}

fn resolve_var_dec(dec: &mut VarDec, map: &mut VarMap) -> Result<(), Error> {
    map.add_var(dec)?;
    if let Some(init) = &mut dec.init {
        resolve_expression(init, map)?;
    }
    Ok(())
}

fn resolve_fn_dec(dec: &mut FnDec, map: &mut VarMap) -> Result<(), Error> {
    map.add_fn(dec)?;
    let mut inner_map = VarMap::new_scope(map);
    resolve_params(&mut dec.params, &mut inner_map)
}

fn resolve_statement(statement: &mut Stmnt, map: &mut VarMap) -> Result<(), Error> {
    match statement {
        Stmnt::Ret(exp) => resolve_expression(exp, map),
        Stmnt::Null => Ok(()),
        Stmnt::Exp(exp) => resolve_expression(exp, map),
        Stmnt::If {
            condition,
            then,
            r#else,
        } => {
            resolve_expression(condition, map)?;
            resolve_statement(then, map)?;
            if let Some(r#else) = r#else {
                resolve_statement(r#else, map)?;
            }
            Ok(())
        }
        Stmnt::Compound(block) => {
            let mut new_scope = VarMap::new_scope(map);
            resolve_block(block, &mut new_scope)
        }

        Stmnt::While {
            condition, body, ..
        } => {
            resolve_expression(condition, map)?;
            resolve_statement(body, map)
        }
        Stmnt::DoWhile {
            condition, body, ..
        } => {
            resolve_statement(body, map)?;
            resolve_expression(condition, map)
        }
        // the for header opens its own scope around the body's
        Stmnt::For {
            init,
            post,
            body,
            condition,
        } => {
            let mut new_map = VarMap::new_scope(map);
            resolve_init(init, &mut new_map)?;
            if let Some(condition) = condition {
                resolve_expression(condition, &mut new_map)?;
            }
            if let Some(post) = post {
                resolve_expression(post, &mut new_map)?;
            }
            resolve_statement(body, &mut new_map)
        }

        Stmnt::Break | Stmnt::Continue => Ok(()),
    }
}

fn resolve_init(init: &mut Option<ForInit>, map: &mut VarMap) -> Result<(), Error> {
    match init {
        None => Ok(()),
        Some(ForInit::D(dec)) => resolve_var_dec(dec, map),
        Some(ForInit::E(exp)) => resolve_expression(exp, map),
    }
}

fn resolve_expression(exp: &mut Expr, map: &mut VarMap) -> Result<(), Error> {
    match exp {
        Expr::Assignment { dst, src } => {
            if dst.lvalue() {
                resolve_expression(dst, map)?;
                resolve_expression(src, map)
            } else {
                Err(Error::InvalidLval)
            }
        }

        Expr::Conditional {
            condition,
            r#true,
            r#false,
        } => {
            resolve_expression(condition, map)?;
            resolve_expression(r#true, map)?;
            resolve_expression(r#false, map)
        }

        Expr::Bin(Binary { left, right, .. }) => {
            resolve_expression(left, map)?;
            resolve_expression(right, map)
        }

        Expr::Nested(inner) => resolve_expression(inner, map),
        Expr::Var(var) => match map.get(var) {
            Some(new_name) => {
                *var = new_name.name.clone();
                Ok(())
            }
            None => Err(Error::UndeclaredVar),
        },
        Expr::Const(_) => Ok(()),
        Expr::Unary(Unary { exp, .. }) => resolve_expression(exp, map),
        Expr::FunctionCall { name, args } => {
            if let Some(new_name) = map.get(name) {
                *name = new_name.name.clone();
                for arg in args.iter_mut() {
                    resolve_expression(arg, map)?;
                }
                Ok(())
            } else {
                Err(Error::UndeclaredFn)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate Declaration")]
    DuplicateDeclaration,

    #[error("Invalid LVal")]
    InvalidLval,

    #[error("Undeclared Variable")]
    UndeclaredVar,

    #[error("Undeclared Function")]
    UndeclaredFn,

    #[error("Function Defined at Block Scope")]
    LocalFnDecBody,

    #[error("Conflicting Declaration")]
    ConflictingDec,

    #[error("Static Function at Block Scope (not allowed)")]
    StaticBlockScopeFn,
}
