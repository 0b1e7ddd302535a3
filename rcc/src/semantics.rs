mod resolve;
pub mod typecheck;

use ast::parse::Program;
use ast::SymbolTable;

pub use resolve::resolve;
pub use resolve::Error as ResolveError;
pub use typecheck::typecheck;
pub use typecheck::Error as TypeCheckError;

pub fn check(program: &mut Program) -> Result<SymbolTable, Error> {
    resolve(program).map_err(Error::Resolve)?;

    typecheck(program).map_err(Error::TypeCheck)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Resolve: {0}")]
    Resolve(ResolveError),

    #[error("TypeCheck: {0}")]
    TypeCheck(TypeCheckError),
}
