use crate::expr::Expr;
use crate::{Ident, StorageClass};

#[derive(Debug)]
pub struct Program(pub Box<[Dec]>);

#[derive(Debug, Clone)]
pub enum Dec {
    Fn(FnDec),
    Var(VarDec),
}

#[derive(Debug, Clone)]
pub struct FnDec {
    pub name: Ident,
    pub params: ParamList,
    pub body: Option<Block>,
    pub sc: Option<StorageClass>,
}

#[derive(Debug, Clone)]
pub struct VarDec {
    pub name: Ident,
    pub init: Option<Expr>,
    pub sc: Option<StorageClass>,
}

pub type Block = Box<[BlockItem]>;
pub type ParamList = Box<[Ident]>;

#[derive(Debug, Clone)]
pub enum BlockItem {
    S(Stmnt),
    D(Dec),
}

#[derive(Debug, Clone)]
pub enum Stmnt {
    Ret(Expr),
    Exp(Expr),
    If {
        condition: Expr,
        then: Box<Self>,
        r#else: Option<Box<Self>>,
    },
    Break,
    Continue,
    While {
        condition: Expr,
        body: Box<Self>,
    },
    DoWhile {
        body: Box<Self>,
        condition: Expr,
    },
    For {
        init: Option<ForInit>,
        condition: Option<Expr>,
        post: Option<Expr>,
        body: Box<Self>,
    },
    Compound(Block),
    Null,
}

#[derive(Debug, Clone)]
pub enum ForInit {
    D(VarDec),
    E(Expr),
}

impl From<FnDec> for Dec {
    fn from(dec: FnDec) -> Self {
        Dec::Fn(dec)
    }
}

impl From<VarDec> for Dec {
    fn from(dec: VarDec) -> Self {
        Dec::Var(dec)
    }
}
