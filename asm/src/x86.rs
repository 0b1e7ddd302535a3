use ast::{Ident, StaticInit, SymbolTable};
use std::fmt::{self, Display, Formatter};
use std::io::Write;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AsmType {
    Longword,
    Quadword,
    Double,
}

impl AsmType {
    const fn operand_size(self) -> OperandSize {
        match self {
            Self::Longword => OperandSize::Four,
            Self::Quadword | Self::Double => OperandSize::Eight,
        }
    }
}

impl Display for AsmType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Longword => "l",
            Self::Quadword => "q",
            Self::Double => "sd",
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OperandSize {
    One,
    Four,
    Eight,
}

#[derive(Debug)]
pub struct Program(pub Box<[TopLevel]>);

#[derive(Debug)]
pub enum TopLevel {
    Fn(FunctionDefinition),
    StaticVar(StaticVar),
    StaticConst(StaticConst),
}

#[derive(Debug)]
pub struct FunctionDefinition {
    pub name: Ident,
    pub global: bool,
    pub body: Box<[X86]>,
    // frame size is settled by the allocation passes; emission never reads it
    pub stack_size: i64,
}

#[derive(Debug)]
pub struct StaticVar {
    pub name: Ident,
    pub global: bool,
    pub alignment: u32,
    pub init: StaticInit,
}

#[derive(Debug)]
pub struct StaticConst {
    pub name: Ident,
    pub alignment: u32,
    pub init: StaticInit,
}

pub type OpPair = (Op, Op);

#[derive(Clone, Debug)]
pub enum X86 {
    Mov {
        ty: AsmType,
        regs: OpPair,
    },
    Movsx {
        regs: OpPair,
    },
    Cvtsi2sd {
        ty: AsmType,
        regs: OpPair,
    },
    Cvttsd2si {
        ty: AsmType,
        regs: OpPair,
    },
    Unary {
        operator: Unary,
        operand: Op,
        ty: AsmType,
    },
    Binary {
        operator: Binary,
        regs: OpPair,
        ty: AsmType,
    },
    Cmp {
        ty: AsmType,
        regs: OpPair,
    },
    Idiv {
        divisor: Op,
        ty: AsmType,
    },
    Div {
        divisor: Op,
        ty: AsmType,
    },
    Cdq(AsmType),
    Jmp(Ident),
    JmpCC {
        condition: CondCode,
        label: Ident,
    },
    SetCC {
        condition: CondCode,
        op: Op,
    },
    Label(Ident),
    Push(Op),
    Call(Ident),
    Ret,
}

impl X86 {
    pub const fn mov(src: Op, dst: Op, ty: AsmType) -> Self {
        Self::Mov {
            regs: (src, dst),
            ty,
        }
    }

    pub const fn movsx(src: Op, dst: Op) -> Self {
        Self::Movsx { regs: (src, dst) }
    }

    pub const fn unary(operator: Unary, operand: Op, ty: AsmType) -> Self {
        Self::Unary {
            operator,
            operand,
            ty,
        }
    }

    pub const fn binary(operator: Binary, op: Op, dst: Op, ty: AsmType) -> Self {
        Self::Binary {
            operator,
            regs: (op, dst),
            ty,
        }
    }

    pub const fn cmp(s1: Op, s2: Op, ty: AsmType) -> Self {
        Self::Cmp { regs: (s1, s2), ty }
    }

    pub const fn idiv(divisor: Op, ty: AsmType) -> Self {
        Self::Idiv { divisor, ty }
    }

    pub const fn div(divisor: Op, ty: AsmType) -> Self {
        Self::Div { divisor, ty }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CondCode {
    E,
    NE,
    G,
    GE,
    L,
    LE,
    A,
    AE,
    B,
    BE,
}

impl Display for CondCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::E => "e",
            Self::NE => "ne",
            Self::G => "g",
            Self::GE => "ge",
            Self::L => "l",
            Self::LE => "le",
            Self::A => "a",
            Self::AE => "ae",
            Self::B => "b",
            Self::BE => "be",
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Unary {
    Not,
    Neg,
    Shr,
}

impl Display for Unary {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Not => "not",
            Self::Neg => "neg",
            Self::Shr => "shr",
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Binary {
    Add,
    Sub,
    Mult,
    And,
    Or,
    Div,
    Xor,
}

impl Display for Binary {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mult => "imul",
            Self::And => "and",
            Self::Or => "or",
            Self::Div => "div",
            Self::Xor => "xor",
        })
    }
}

#[derive(Clone, Debug)]
pub enum Op {
    Imm(i64),
    Register(Register),
    Stack(isize),
    Data(Ident),
}

impl Op {
    pub const fn is_register(&self) -> bool {
        matches!(self, Self::Register(_))
    }

    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Data(_) | Self::Stack(_))
    }

    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Imm(_))
    }

    fn sized_fmt(&self, size: OperandSize) -> String {
        if let Self::Register(r) = self {
            r.name(size).into()
        } else {
            self.to_string()
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Imm(val) => write!(f, "${val}"),
            Self::Register(r) => write!(f, "{}", r.name(OperandSize::Four)),
            Self::Stack(n) => write!(f, "{n}(%rbp)"),
            Self::Data(name) => write!(f, "{name}(%rip)"),
        }
    }
}

impl From<Register> for Op {
    fn from(reg: Register) -> Self {
        Self::Register(reg)
    }
}

pub mod op_regs {
    use super::Op;
    use super::Register;
    pub const AX: Op = Op::Register(Register::Ax);
    pub const CX: Op = Op::Register(Register::Cx);
    pub const DX: Op = Op::Register(Register::Dx);
    pub const DI: Op = Op::Register(Register::Di);
    pub const SI: Op = Op::Register(Register::Si);
    pub const R8: Op = Op::Register(Register::R8);
    pub const R9: Op = Op::Register(Register::R9);
    pub const R10: Op = Op::Register(Register::R10);
    pub const R11: Op = Op::Register(Register::R11);
    pub const SP: Op = Op::Register(Register::Sp);
    pub const XMM0: Op = Op::Register(Register::Xmm0);
    pub const XMM1: Op = Op::Register(Register::Xmm1);
    pub const XMM14: Op = Op::Register(Register::Xmm14);
    pub const XMM15: Op = Op::Register(Register::Xmm15);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Register {
    Ax,
    Cx,
    Dx,
    Di,
    Si,
    R8,
    R9,
    R10,
    R11,
    Sp,
    Xmm0,
    Xmm1,
    Xmm2,
    Xmm3,
    Xmm4,
    Xmm5,
    Xmm6,
    Xmm7,
    Xmm14,
    Xmm15,
}

impl Register {
    pub const SYSV_ARG_REGS: [Register; 6] = [
        Register::Di,
        Register::Si,
        Register::Dx,
        Register::Cx,
        Register::R8,
        Register::R9,
    ];

    pub const SYSV_SSE_ARG_REGS: [Register; 8] = [
        Register::Xmm0,
        Register::Xmm1,
        Register::Xmm2,
        Register::Xmm3,
        Register::Xmm4,
        Register::Xmm5,
        Register::Xmm6,
        Register::Xmm7,
    ];

    const fn name(self, size: OperandSize) -> &'static str {
        match size {
            OperandSize::Eight => self.eight_byte(),
            OperandSize::Four => self.four_byte(),
            OperandSize::One => self.one_byte(),
        }
    }

    const fn eight_byte(self) -> &'static str {
        match self {
            Register::Ax => "%rax",
            Register::Cx => "%rcx",
            Register::Dx => "%rdx",
            Register::Di => "%rdi",
            Register::Si => "%rsi",
            Register::R8 => "%r8",
            Register::R9 => "%r9",
            Register::R10 => "%r10",
            Register::R11 => "%r11",
            Register::Sp => "%rsp",
            other => other.sse_name(),
        }
    }

    const fn four_byte(self) -> &'static str {
        match self {
            Register::Ax => "%eax",
            Register::Cx => "%ecx",
            Register::Dx => "%edx",
            Register::Di => "%edi",
            Register::Si => "%esi",
            Register::R8 => "%r8d",
            Register::R9 => "%r9d",
            Register::R10 => "%r10d",
            Register::R11 => "%r11d",
            // the stack pointer is only ever addressed whole
            Register::Sp => "%rsp",
            other => other.sse_name(),
        }
    }

    const fn one_byte(self) -> &'static str {
        match self {
            Register::Ax => "%al",
            Register::Cx => "%cl",
            Register::Dx => "%dl",
            Register::Di => "%dil",
            Register::Si => "%sil",
            Register::R8 => "%r8b",
            Register::R9 => "%r9b",
            Register::R10 => "%r10b",
            Register::R11 => "%r11b",
            Register::Sp => "%rsp",
            other => other.sse_name(),
        }
    }

    const fn sse_name(self) -> &'static str {
        match self {
            Register::Xmm0 => "%xmm0",
            Register::Xmm1 => "%xmm1",
            Register::Xmm2 => "%xmm2",
            Register::Xmm3 => "%xmm3",
            Register::Xmm4 => "%xmm4",
            Register::Xmm5 => "%xmm5",
            Register::Xmm6 => "%xmm6",
            Register::Xmm7 => "%xmm7",
            Register::Xmm14 => "%xmm14",
            Register::Xmm15 => "%xmm15",
            _ => unreachable!(),
        }
    }
}

/// An instruction together with the symbol table it needs to decorate call
/// sites: callees declared in this translation unit are called directly,
/// everything else goes through the PLT.
struct Linked<'a> {
    inner: &'a X86,
    table: &'a SymbolTable,
}

impl Display for Linked<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.inner {
            X86::Call(fun) => {
                if self.table.contains_key(fun) {
                    write!(f, "call {fun}")
                } else {
                    write!(f, "call {fun}@PLT")
                }
            }
            X86::Push(op) => write!(f, "pushq {}", op.sized_fmt(OperandSize::Eight)),
            X86::Mov {
                regs: (src, dst),
                ty,
            } => {
                let size = ty.operand_size();
                write!(f, "mov{ty} {}, {}", src.sized_fmt(size), dst.sized_fmt(size))
            }
            // widening is definitionally 4 -> 8, whatever the nominal type
            X86::Movsx {
                regs: (src, dst), ..
            } => {
                write!(
                    f,
                    "movslq {}, {}",
                    src.sized_fmt(OperandSize::Four),
                    dst.sized_fmt(OperandSize::Eight)
                )
            }
            X86::Cvtsi2sd {
                regs: (src, dst),
                ty,
            } => {
                let size = ty.operand_size();
                write!(
                    f,
                    "cvtsi2sd{ty} {}, {}",
                    src.sized_fmt(size),
                    dst.sized_fmt(size)
                )
            }
            X86::Cvttsd2si {
                regs: (src, dst),
                ty,
            } => {
                let size = ty.operand_size();
                write!(
                    f,
                    "cvttsd2si{ty} {}, {}",
                    src.sized_fmt(size),
                    dst.sized_fmt(size)
                )
            }
            X86::Ret => write!(f, "movq %rbp, %rsp\n\tpopq %rbp\n\tret"),
            X86::Unary {
                operator,
                operand,
                ty,
            } => write!(f, "{operator}{ty} {}", operand.sized_fmt(ty.operand_size())),
            X86::Binary {
                operator,
                regs: (op, dst),
                ty,
            } => {
                let size = ty.operand_size();
                let (op, dst) = (op.sized_fmt(size), dst.sized_fmt(size));
                match (ty, operator) {
                    (AsmType::Double, Binary::Mult) => write!(f, "mulsd {op}, {dst}"),
                    (AsmType::Double, Binary::Xor) => write!(f, "xorpd {op}, {dst}"),
                    (AsmType::Double, _) => write!(f, "{operator}{ty} {op}, {dst}"),
                    (_, Binary::Add | Binary::Sub | Binary::And | Binary::Or) => {
                        write!(f, "{operator}{ty} {op}, {dst}")
                    }
                    // the assembler only has the one imul form
                    (_, Binary::Mult) => write!(f, "imul {op}, {dst}"),
                    (_, Binary::Div | Binary::Xor) => {
                        panic!("no {operator:?} instruction for {ty:?} operands")
                    }
                }
            }
            X86::Idiv { divisor, ty } => {
                write!(f, "idiv{ty} {}", divisor.sized_fmt(ty.operand_size()))
            }
            X86::Div { divisor, ty } => {
                write!(f, "div{ty} {}", divisor.sized_fmt(ty.operand_size()))
            }
            X86::Cdq(AsmType::Longword) => write!(f, "cdq"),
            X86::Cdq(AsmType::Quadword) => write!(f, "cqo"),
            X86::Cdq(ty) => panic!("cdq over non-integer type {ty:?}"),
            X86::Cmp {
                regs: (left, right),
                ty: AsmType::Double,
            } => {
                write!(
                    f,
                    "comisd {}, {}",
                    left.sized_fmt(OperandSize::Eight),
                    right.sized_fmt(OperandSize::Eight)
                )
            }
            X86::Cmp {
                regs: (left, right),
                ty,
            } => {
                let size = ty.operand_size();
                write!(f, "cmp{ty} {}, {}", left.sized_fmt(size), right.sized_fmt(size))
            }
            X86::Jmp(label) => write!(f, "jmp .L{label}"),
            X86::JmpCC { label, condition } => write!(f, "j{condition} .L{label}"),
            // condition codes only ever set a single byte
            X86::SetCC { op, condition } => {
                write!(f, "set{condition} {}", op.sized_fmt(OperandSize::One))
            }
            X86::Label(label) => write!(f, ".L{label}:"),
        }
    }
}

pub fn emit(Program(items): &Program, table: &SymbolTable) -> Box<[u8]> {
    let mut bytes = Vec::new();
    for top_level in items.iter() {
        match top_level {
            TopLevel::Fn(FunctionDefinition {
                name,
                global,
                body,
                stack_size: _,
            }) => {
                if *global {
                    let _ = writeln!(bytes, "\t.globl {name}");
                }
                let _ = writeln!(
                    bytes,
                    "\t.text\n{name}:\n\tpushq %rbp\n\tmovq %rsp, %rbp"
                );
                for instruction in body.iter() {
                    if let X86::Label(label) = instruction {
                        let _ = writeln!(bytes, ".L{label}:");
                    } else {
                        let _ = writeln!(
                            bytes,
                            "\t{}",
                            Linked {
                                inner: instruction,
                                table
                            }
                        );
                    }
                }
                let _ = writeln!(bytes);
            }

            TopLevel::StaticVar(StaticVar {
                name,
                global,
                alignment,
                init,
            }) => {
                if *global {
                    let _ = writeln!(bytes, "\t.globl {name}");
                }
                // a floating zero still needs its literal bits, so doubles
                // never land in .bss
                let section = if !init.is_double() && init.is_zero() {
                    ".bss"
                } else {
                    ".data"
                };
                let _ = writeln!(bytes, "\t{section}\n\t.align {alignment}\n{name}:\n\t{init}");
            }

            TopLevel::StaticConst(StaticConst {
                name,
                alignment,
                init,
            }) => {
                let _ = writeln!(
                    bytes,
                    "\t.section .rodata\n\t.align {alignment}\n{name}:\n\t{init}"
                );
            }
        }
    }

    let _ = writeln!(bytes, "\t.section .note.GNU-stack,\"\",@progbits");
    bytes.into()
}
