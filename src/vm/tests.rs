#[cfg(test)]
mod parser_tests {
    use crate::error::VmErrorKind;
    use crate::vm::parser::{parse, ArithOp, Segment, VmCommand};

    fn parse_ok(source: &str) -> Vec<VmCommand> {
        let result = parse(source);
        assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
        result.commands.into_iter().map(|c| c.command).collect()
    }

    fn parse_errors(source: &str) -> Vec<VmErrorKind> {
        parse(source).errors.into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn arithmetic_commands() {
        let commands =
            parse_ok("add\nsub\nneg\neq\ngt\nlt\nand\nor\nnot\nshiftleft\nshiftright");
        let expected = [
            ArithOp::Add,
            ArithOp::Sub,
            ArithOp::Neg,
            ArithOp::Eq,
            ArithOp::Gt,
            ArithOp::Lt,
            ArithOp::And,
            ArithOp::Or,
            ArithOp::Not,
            ArithOp::ShiftLeft,
            ArithOp::ShiftRight,
        ];
        assert_eq!(commands.len(), expected.len());
        for (command, op) in commands.iter().zip(expected) {
            assert_eq!(command, &VmCommand::Arithmetic(op));
        }
    }

    #[test]
    fn push_pop_commands() {
        assert_eq!(
            parse_ok("push constant 7\npop local 0"),
            vec![
                VmCommand::Push {
                    segment: Segment::Constant,
                    index: 7
                },
                VmCommand::Pop {
                    segment: Segment::Local,
                    index: 0
                },
            ]
        );
    }

    #[test]
    fn branching_and_function_commands() {
        assert_eq!(
            parse_ok("label LOOP\ngoto LOOP\nif-goto END\nfunction Main.main 2\ncall Math.max 2\nreturn"),
            vec![
                VmCommand::Label("LOOP".into()),
                VmCommand::Goto("LOOP".into()),
                VmCommand::IfGoto("END".into()),
                VmCommand::Function {
                    name: "Main.main".into(),
                    n_locals: 2
                },
                VmCommand::Call {
                    name: "Math.max".into(),
                    n_args: 2
                },
                VmCommand::Return,
            ]
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let commands = parse_ok("// header\n\npush constant 1 // inline\n   \nadd");
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn pop_constant_is_rejected() {
        assert!(parse_errors("pop constant 3").contains(&VmErrorKind::PopConstant));
    }

    #[test]
    fn unknown_segment_and_command() {
        assert!(parse_errors("push heap 0")
            .contains(&VmErrorKind::UnknownSegment("heap".into())));
        assert!(parse_errors("frobnicate")
            .contains(&VmErrorKind::UnknownCommand("frobnicate".into())));
    }

    #[test]
    fn arity_errors_carry_line_numbers() {
        let result = parse("push constant 1\npush constant\n");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].span.line, 2);
        assert!(matches!(
            result.errors[0].kind,
            VmErrorKind::WrongArity(_, 2)
        ));
    }

    #[test]
    fn bad_index_is_rejected() {
        assert!(parse_errors("push constant x")
            .contains(&VmErrorKind::BadIndex("x".into())));
        assert!(parse_errors("push constant -1")
            .contains(&VmErrorKind::BadIndex("-1".into())));
    }

    #[test]
    fn command_display_round_trips_source_text() {
        for line in [
            "push argument 3",
            "pop that 2",
            "label WHILE_EXP0",
            "if-goto WHILE_END0",
            "function Sys.init 0",
            "call Main.fibonacci 1",
            "return",
            "shiftleft",
        ] {
            let commands = parse_ok(line);
            assert_eq!(commands[0].to_string(), line);
        }
    }
}

#[cfg(test)]
mod writer_tests {
    use crate::vm::parser::parse;
    use crate::vm::writer::CodeWriter;
    use crate::vm::{translate, SourceUnit};

    /// Translate a single unit with the given file tag, no bootstrap.
    fn emit(file: &str, source: &str) -> String {
        let mut writer = CodeWriter::new();
        writer.set_file(file);
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "errors: {:?}", parsed.errors);
        for line in &parsed.commands {
            writer.write(&line.command);
        }
        writer.finish()
    }

    /// Instruction lines only: comments stripped, labels kept.
    fn code_lines(asm: &str) -> Vec<&str> {
        asm.lines().filter(|l| !l.starts_with("//")).collect()
    }

    #[test]
    fn push_constant_sequence() {
        let asm = emit("Test", "push constant 7");
        assert_eq!(
            code_lines(&asm),
            vec!["@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
        );
    }

    #[test]
    fn add_folds_top_two_slots() {
        let asm = emit("Test", "add");
        assert_eq!(
            code_lines(&asm),
            vec!["@SP", "M=M-1", "A=M", "D=M", "A=A-1", "D=M+D", "M=D"]
        );
    }

    #[test]
    fn sub_is_under_minus_top() {
        let asm = emit("Test", "sub");
        assert!(code_lines(&asm).contains(&"D=M-D"));
    }

    #[test]
    fn neg_and_shifts_act_in_place() {
        assert_eq!(
            code_lines(&emit("Test", "neg")),
            vec!["@SP", "A=M-1", "M=-M"]
        );
        assert_eq!(
            code_lines(&emit("Test", "shiftleft")),
            vec!["@SP", "A=M-1", "M=M<<"]
        );
        assert_eq!(
            code_lines(&emit("Test", "shiftright")),
            vec!["@SP", "A=M-1", "M=M>>"]
        );
    }

    #[test]
    fn push_local_dereferences_base() {
        let asm = emit("Test", "push local 2");
        let lines = code_lines(&asm);
        assert_eq!(
            lines,
            vec![
                "@LCL", "D=M", "@2", "A=D+A", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1"
            ]
        );
    }

    #[test]
    fn push_temp_uses_constant_base_five() {
        let asm = emit("Test", "push temp 3");
        let lines = code_lines(&asm);
        assert!(lines.starts_with(&["@5", "D=A", "@3", "A=D+A", "D=M"]));
    }

    #[test]
    fn pointer_aliases_this_that() {
        let asm = emit("Test", "push pointer 0\npush pointer 1");
        let lines = code_lines(&asm);
        assert!(lines.starts_with(&["@3", "D=A", "@0", "A=D+A", "D=M"]));
    }

    #[test]
    fn pop_routes_address_through_r13() {
        let asm = emit("Test", "pop argument 1");
        assert_eq!(
            code_lines(&asm),
            vec![
                "@ARG", "D=M", "@1", "D=D+A", "@R13", "M=D", "@SP", "M=M-1", "A=M", "D=M",
                "@R13", "A=M", "M=D"
            ]
        );
    }

    #[test]
    fn static_symbols_are_file_scoped() {
        let asm = emit("Foo", "push static 4\npop static 4");
        assert!(asm.contains("@Foo.4"));
        let asm = emit("Bar", "push static 4");
        assert!(asm.contains("@Bar.4"));
        assert!(!asm.contains("@Foo.4"));
    }

    #[test]
    fn labels_are_function_scoped() {
        let asm = emit(
            "Foo",
            "function Foo.main 0\nlabel LOOP\ngoto LOOP\nif-goto LOOP",
        );
        assert!(asm.contains("(Foo.Foo.main$LOOP)"));
        assert!(asm.contains("@Foo.Foo.main$LOOP"));
    }

    #[test]
    fn if_goto_pops_and_jumps_on_nonzero() {
        let asm = emit("Foo", "label X\nif-goto X");
        let lines = code_lines(&asm);
        let at = lines.iter().position(|l| *l == "@Foo.$X").unwrap();
        assert_eq!(
            lines[at - 4..=at + 1].to_vec(),
            vec!["@SP", "M=M-1", "A=M", "D=M", "@Foo.$X", "D;JNE"]
        );
    }

    #[test]
    fn function_pushes_zeroed_locals() {
        let asm = emit("Foo", "function Foo.f 2");
        let lines = code_lines(&asm);
        assert_eq!(lines[0], "(Foo.f)");
        assert_eq!(
            lines[1..].to_vec(),
            vec!["@SP", "A=M", "M=0", "@SP", "M=M+1", "@SP", "A=M", "M=0", "@SP", "M=M+1"]
        );
    }

    #[test]
    fn call_saves_frame_and_repositions_arg() {
        let asm = emit("Foo", "call Bar.baz 2");
        let lines = code_lines(&asm);
        // Return address push first.
        assert_eq!(lines[0], "@Foo.Bar.baz$ret.0");
        assert_eq!(lines[1], "D=A");
        for saved in ["@LCL", "@ARG", "@THIS", "@THAT"] {
            assert!(lines.contains(&saved), "missing {saved}");
        }
        // ARG = SP - 5 - n
        let narg = lines.iter().position(|l| *l == "@2").unwrap();
        assert_eq!(
            lines[narg..narg + 8].to_vec(),
            vec!["@2", "D=A", "@5", "D=D+A", "@SP", "D=M-D", "@ARG", "M=D"]
        );
        assert_eq!(*lines.last().unwrap(), "(Foo.Bar.baz$ret.0)");
    }

    #[test]
    fn return_site_indices_are_monotonic() {
        let asm = emit("Foo", "call Bar.a 0\ncall Bar.a 0\ncall Bar.b 1");
        assert!(asm.contains("(Foo.Bar.a$ret.0)"));
        assert!(asm.contains("(Foo.Bar.a$ret.1)"));
        assert!(asm.contains("(Foo.Bar.b$ret.2)"));
    }

    #[test]
    fn return_restores_frame_through_r14_cursor() {
        let asm = emit("Foo", "return");
        let lines = code_lines(&asm);
        assert!(lines.starts_with(&["@LCL", "D=M", "@R14", "M=D", "@5", "A=D-A", "D=M", "@R15", "M=D"]));
        // THAT, THIS, ARG, LCL restored in that order.
        let order: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| ["@THAT", "@THIS", "@LCL"].contains(l) || *l == "@ARG")
            .collect();
        let tail = order[order.len() - 4..].to_vec();
        assert_eq!(tail, vec!["@THAT", "@THIS", "@ARG", "@LCL"]);
        assert!(lines.ends_with(&["@R15", "A=M", "0;JMP"]));
    }

    #[test]
    fn comparison_labels_are_unique_per_instance_and_file() {
        let units = [
            SourceUnit::new("A", "push constant 1\npush constant 2\nlt\npush constant 3\npush constant 4\nlt"),
            SourceUnit::new("B", "push constant 1\npush constant 2\nlt"),
        ];
        let result = translate(&units, false);
        assert!(result.errors.is_empty());
        let labels: Vec<&str> = result
            .asm
            .lines()
            .filter(|l| l.starts_with('(') && l.ends_with(')'))
            .collect();
        let mut unique = labels.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(labels.len(), unique.len(), "duplicate labels: {labels:?}");
        assert!(result.asm.contains("(A.LT.0$JUDGE)"));
        assert!(result.asm.contains("(A.LT.1$JUDGE)"));
        assert!(result.asm.contains("(B.LT.0$JUDGE)"));
    }

    #[test]
    fn bootstrap_sets_sp_then_calls_sys_init() {
        let units = [SourceUnit::new("Sys", "function Sys.init 0\nlabel HALT\ngoto HALT")];
        let result = translate(&units, true);
        assert!(result.errors.is_empty());
        let lines = code_lines(&result.asm);
        assert_eq!(&lines[..4], &["@256", "D=A", "@SP", "M=D"]);
        assert!(result.asm.contains("@Sys.init\n0;JMP"));
        assert!(result.asm.contains("(Bootstrap.Sys.init$ret.0)"));
    }

    #[test]
    fn single_file_translation_has_no_bootstrap() {
        let units = [SourceUnit::new("Test", "push constant 1")];
        let result = translate(&units, false);
        assert!(!result.asm.contains("@256"));
    }

    #[test]
    fn every_command_gets_a_source_comment() {
        let asm = emit("Test", "push constant 7\npush constant 8\nadd");
        assert!(asm.contains("// push constant 7\n"));
        assert!(asm.contains("// push constant 8\n"));
        assert!(asm.contains("// add\n"));
    }

    #[test]
    fn failed_unit_is_skipped_but_others_translate() {
        let units = [
            SourceUnit::new("Bad", "push heap 1"),
            SourceUnit::new("Good", "push constant 1"),
        ];
        let result = translate(&units, false);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].unit, "Bad");
        assert!(result.asm.contains("// push constant 1"));
        assert!(!result.asm.contains("heap"));
    }
}
