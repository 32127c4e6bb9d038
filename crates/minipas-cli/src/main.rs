mod common;

use std::fs;
use std::process;

use minipas_interpreter::Interpreter;
use minipas_lexer::Lexer;
use minipas_parser::Parser;
use minipas_syntax::error::Error;
use owo_colors::OwoColorize;

/// Print per-run counters to stderr when set.
const STATS_ENV: &str = "MINIPAS_STATS";

fn render_error(source: &str, err: &Error) {
    eprintln!("{}: {}", err.kind.label().red().bold(), err.msg.red());
    if let (Some(line), Some(col)) = (err.line, err.col) {
        eprintln!("  --> line {}, column {}", line, col);
        if let Some(src_line) = source.lines().nth(line.saturating_sub(1)) {
            let line_num_str = format!("{:3} | ", line);
            eprintln!("     |");
            eprintln!("{}{}", line_num_str.bright_black(), src_line);

            let mut marker = " ".repeat(line_num_str.len());
            if col > 1 {
                marker.push_str(&" ".repeat(col - 1));
            }
            marker.push('^');
            eprintln!("{}{}", marker.red(), " error here".red());
            eprintln!("     |");
        }
    }
    common::provide_error_suggestions(&err.msg);
}

fn fail(source: &str, err: &Error) -> ! {
    render_error(source, err);
    process::exit(1);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: minipas <file.pas>");
        process::exit(2);
    }

    let path = &args[1];
    let src = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}: {}",
                "error".red().bold(),
                format!("Failed to read {}: {}", path, e).red()
            );
            process::exit(1);
        }
    };

    let tokens = Lexer::new(&src).tokenize().unwrap_or_else(|e| fail(&src, &e));
    let program = Parser::new(tokens).parse_program().unwrap_or_else(|e| fail(&src, &e));
    let analysis = minipas_semantic::analyze(&program).unwrap_or_else(|e| fail(&src, &e));

    let mut interp = Interpreter::new();
    let outcome = interp.interpret(&program, &analysis);

    if std::env::var_os(STATS_ENV).is_some() {
        let stats = interp.stats();
        eprintln!("{}", "Execution stats:".bright_black());
        eprintln!("  statements executed: {}", stats.statements_executed);
        eprintln!("  calls made:          {}", stats.calls_made);
        eprintln!("  max frame depth:     {}", stats.max_depth);
    }

    if let Err(e) = outcome {
        fail(&src, &e);
    }
}
