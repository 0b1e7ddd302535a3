use asm::x86::{
    emit, op_regs, AsmType, Binary, CondCode, FunctionDefinition, Op, Program, StaticConst,
    StaticVar, TopLevel, Unary, X86,
};
use ast::{Attr, Ident, StaticInit, SymbolTable};

fn function(name: &str, global: bool, body: Vec<X86>) -> TopLevel {
    TopLevel::Fn(FunctionDefinition {
        name: Ident::from(name),
        global,
        body: body.into(),
        stack_size: 0,
    })
}

fn static_var(name: &str, global: bool, init: StaticInit) -> TopLevel {
    TopLevel::StaticVar(StaticVar {
        name: Ident::from(name),
        global,
        alignment: if matches!(init, StaticInit::Int(_) | StaticInit::UInt(_)) {
            4
        } else {
            8
        },
        init,
    })
}

fn emitted(items: Vec<TopLevel>, table: &SymbolTable) -> String {
    let bytes = emit(&Program(items.into()), table);
    String::from_utf8(bytes.into_vec()).expect("emitted assembly is utf-8")
}

fn emitted_body(body: Vec<X86>) -> String {
    emitted(vec![function("f", false, body)], &SymbolTable::new())
}

#[test]
fn register_widths_follow_the_requested_size() {
    let out = emitted_body(vec![
        X86::mov(op_regs::AX, Op::Stack(-8), AsmType::Quadword),
        X86::mov(op_regs::AX, Op::Stack(-4), AsmType::Longword),
        X86::SetCC {
            condition: CondCode::E,
            op: op_regs::AX,
        },
    ]);

    assert!(out.contains("\tmovq %rax, -8(%rbp)\n"));
    assert!(out.contains("\tmovl %eax, -4(%rbp)\n"));
    assert!(out.contains("\tsete %al\n"));
}

#[test]
fn stack_pointer_is_always_full_width() {
    let out = emitted_body(vec![
        X86::mov(op_regs::SP, Op::Stack(-8), AsmType::Longword),
        X86::Push(op_regs::SP),
    ]);

    assert!(out.contains("\tmovl %rsp, -8(%rbp)\n"));
    assert!(out.contains("\tpushq %rsp\n"));
}

#[test]
fn sse_registers_ignore_the_requested_size() {
    let out = emitted_body(vec![
        X86::mov(Op::Stack(-8), op_regs::XMM0, AsmType::Double),
        X86::cmp(op_regs::XMM0, op_regs::XMM1, AsmType::Double),
    ]);

    assert!(out.contains("\tmovsd -8(%rbp), %xmm0\n"));
    assert!(out.contains("\tcomisd %xmm0, %xmm1\n"));
}

#[test]
fn data_operands_are_rip_relative() {
    let out = emitted_body(vec![X86::mov(
        Op::Data(Ident::from("pi")),
        op_regs::XMM0,
        AsmType::Double,
    )]);

    assert!(out.contains("\tmovsd pi(%rip), %xmm0\n"));
}

#[test]
fn zero_valued_integer_statics_land_in_bss() {
    let table = SymbolTable::new();
    let four = emitted(vec![static_var("x", false, StaticInit::Int(0))], &table);
    assert!(four.contains("\t.bss\n"));
    assert!(four.contains("\t.align 4\n"));
    assert!(four.contains("\t.zero 4\n"));
    assert!(!four.contains(".globl"));

    let eight = emitted(vec![static_var("y", false, StaticInit::Long(0))], &table);
    assert!(eight.contains("\t.bss\n"));
    assert!(eight.contains("\t.zero 8\n"));
}

#[test]
fn nonzero_integer_statics_land_in_data() {
    let table = SymbolTable::new();
    let out = emitted(
        vec![
            static_var("x", true, StaticInit::Int(5)),
            static_var("y", false, StaticInit::Long(-3)),
        ],
        &table,
    );

    assert!(out.contains("\t.globl x\n"));
    assert!(out.contains("\t.data\n\t.align 4\nx:\n\t.long 5\n"));
    assert!(out.contains("\t.data\n\t.align 8\ny:\n\t.quad -3\n"));
}

#[test]
fn double_statics_never_land_in_bss() {
    let table = SymbolTable::new();
    let out = emitted(vec![static_var("zero", false, StaticInit::Double(0.0))], &table);

    assert!(out.contains("\t.data\n"));
    assert!(!out.contains(".bss"));
    assert!(out.contains("\t.double 0\n"));

    let pi = emitted(vec![static_var("pi", true, StaticInit::Double(3.14))], &table);
    assert!(pi.contains("\t.globl pi\n"));
    assert!(pi.contains("\t.double 3.14\n"));
}

#[test]
fn static_constants_go_to_rodata_without_globl() {
    let out = emitted(
        vec![TopLevel::StaticConst(StaticConst {
            name: Ident::from("dbl.0"),
            alignment: 8,
            init: StaticInit::Double(1.5),
        })],
        &SymbolTable::new(),
    );

    assert!(out.contains("\t.section .rodata\n\t.align 8\ndbl.0:\n\t.double 1.5\n"));
    assert!(!out.contains(".globl"));
}

#[test]
fn calls_to_local_symbols_skip_the_plt() {
    let mut table = SymbolTable::new();
    table.insert(
        Ident::from("foo"),
        Attr::Fn {
            arity: 0,
            defined: true,
            global: true,
        },
    );

    let out = emitted(
        vec![function(
            "main",
            true,
            vec![X86::Call(Ident::from("foo")), X86::Call(Ident::from("bar"))],
        )],
        &table,
    );

    assert!(out.contains("\tcall foo\n"));
    assert!(out.contains("\tcall bar@PLT\n"));
}

#[test]
fn integer_binaries_take_a_suffix_but_imul_does_not() {
    let out = emitted_body(vec![
        X86::binary(Binary::Add, Op::Imm(2), op_regs::AX, AsmType::Longword),
        X86::binary(Binary::Sub, Op::Imm(2), op_regs::AX, AsmType::Quadword),
        X86::binary(Binary::Mult, Op::Imm(3), op_regs::R11, AsmType::Longword),
        X86::binary(Binary::And, Op::Imm(1), op_regs::DX, AsmType::Longword),
        X86::binary(Binary::Or, Op::Imm(1), op_regs::DX, AsmType::Quadword),
    ]);

    assert!(out.contains("\taddl $2, %eax\n"));
    assert!(out.contains("\tsubq $2, %rax\n"));
    assert!(out.contains("\timul $3, %r11d\n"));
    assert!(out.contains("\tandl $1, %edx\n"));
    assert!(out.contains("\torq $1, %rdx\n"));
}

#[test]
fn double_binaries_use_sse_mnemonics() {
    let xmm = |r: Op, s: Op, op| X86::binary(op, r, s, AsmType::Double);
    let out = emitted_body(vec![
        xmm(op_regs::XMM0, op_regs::XMM1, Binary::Add),
        xmm(op_regs::XMM0, op_regs::XMM1, Binary::Div),
        xmm(op_regs::XMM0, op_regs::XMM1, Binary::Mult),
        xmm(op_regs::XMM0, op_regs::XMM0, Binary::Xor),
    ]);

    assert!(out.contains("\taddsd %xmm0, %xmm1\n"));
    assert!(out.contains("\tdivsd %xmm0, %xmm1\n"));
    assert!(out.contains("\tmulsd %xmm0, %xmm1\n"));
    assert!(out.contains("\txorpd %xmm0, %xmm0\n"));
}

#[test]
fn conversions_carry_the_integer_width_suffix() {
    let out = emitted_body(vec![
        X86::Cvtsi2sd {
            ty: AsmType::Longword,
            regs: (op_regs::AX, op_regs::XMM0),
        },
        X86::Cvttsd2si {
            ty: AsmType::Quadword,
            regs: (op_regs::XMM0, op_regs::AX),
        },
    ]);

    assert!(out.contains("\tcvtsi2sdl %eax, %xmm0\n"));
    assert!(out.contains("\tcvttsd2siq %xmm0, %rax\n"));
}

#[test]
fn divides_and_sign_extension_match_the_width() {
    let out = emitted_body(vec![
        X86::Cdq(AsmType::Longword),
        X86::idiv(op_regs::CX, AsmType::Longword),
        X86::Cdq(AsmType::Quadword),
        X86::div(op_regs::CX, AsmType::Quadword),
    ]);

    assert!(out.contains("\tcdq\n"));
    assert!(out.contains("\tidivl %ecx\n"));
    assert!(out.contains("\tcqo\n"));
    assert!(out.contains("\tdivq %rcx\n"));
}

#[test]
fn sign_extending_moves_widen_four_to_eight() {
    let out = emitted_body(vec![X86::movsx(Op::Stack(-4), op_regs::AX)]);

    assert!(out.contains("\tmovslq -4(%rbp), %rax\n"));
}

#[test]
fn jumps_and_labels_use_local_label_names() {
    let out = emitted_body(vec![
        X86::Label(Ident::from("start0")),
        X86::cmp(Op::Imm(0), op_regs::AX, AsmType::Longword),
        X86::JmpCC {
            condition: CondCode::NE,
            label: Ident::from("start0"),
        },
        X86::Jmp(Ident::from("end0")),
        X86::Label(Ident::from("end0")),
    ]);

    assert!(out.contains("\n.Lstart0:\n"));
    assert!(out.contains("\tcmpl $0, %eax\n"));
    assert!(out.contains("\tjne .Lstart0\n"));
    assert!(out.contains("\tjmp .Lend0\n"));
    assert!(out.contains("\n.Lend0:\n"));
}

#[test]
fn unaries_take_the_type_suffix() {
    let out = emitted_body(vec![
        X86::unary(Unary::Neg, op_regs::AX, AsmType::Longword),
        X86::unary(Unary::Not, Op::Stack(-8), AsmType::Quadword),
        X86::unary(Unary::Shr, op_regs::DX, AsmType::Quadword),
    ]);

    assert!(out.contains("\tnegl %eax\n"));
    assert!(out.contains("\tnotq -8(%rbp)\n"));
    assert!(out.contains("\tshrq %rdx\n"));
}

#[test]
fn a_whole_function_carries_prologue_epilogue_and_stack_note() {
    let out = emitted(
        vec![function(
            "main",
            true,
            vec![
                X86::mov(Op::Imm(2), op_regs::AX, AsmType::Longword),
                X86::binary(Binary::Add, Op::Imm(2), op_regs::AX, AsmType::Longword),
                X86::Ret,
            ],
        )],
        &SymbolTable::new(),
    );

    assert!(out.contains("\t.globl main\n"));
    assert!(out.contains("\t.text\nmain:\n\tpushq %rbp\n\tmovq %rsp, %rbp\n"));
    assert!(out.contains("\taddl $2, %eax\n"));
    assert!(out.contains("\tmovq %rbp, %rsp\n\tpopq %rbp\n\tret\n"));
    assert!(out.ends_with("\t.section .note.GNU-stack,\"\",@progbits\n"));
}

#[test]
fn file_local_functions_get_no_globl() {
    let out = emitted(
        vec![function("helper", false, vec![X86::Ret])],
        &SymbolTable::new(),
    );

    assert!(!out.contains(".globl"));
    assert!(out.contains("\t.text\nhelper:\n"));
}

#[test]
fn top_level_items_keep_their_declaration_order() {
    let table = SymbolTable::new();
    let out = emitted(
        vec![
            static_var("first", false, StaticInit::Int(1)),
            function("second", false, vec![X86::Ret]),
            static_var("third", false, StaticInit::Int(0)),
        ],
        &table,
    );

    let first = out.find("first:").expect("first emitted");
    let second = out.find("second:").expect("second emitted");
    let third = out.find("third:").expect("third emitted");
    assert!(first < second && second < third);
}
