use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use proteus_codegen::{CodeGenerator, JitProgram};
use proteus_driver::{compile_to_ir, dump_ir, parse, Diagnostic};
use proteus_lexer::{Lexer, TokenKind};

#[derive(Parser)]
#[command(
    name = "proteus",
    version = "0.1.0",
    about = "Proteus compiler for a small prototype-based language",
    long_about = "Compiles Proteus programs to native code with Cranelift,\neither in process (run) or to an object file (build)."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); PROTEUS_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a file with the JIT and run it
    Run {
        /// Input source file
        input: PathBuf,
    },

    /// Compile a file ahead of time
    Build {
        /// Input source file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to emit
        #[arg(long, default_value = "obj")]
        emit: EmitMode,
    },

    /// Parse and lower a file, reporting diagnostics only
    Check {
        /// Input source file
        input: PathBuf,
    },

    /// Lex a file and show tokens (debug)
    Lex {
        /// Input source file
        input: PathBuf,

        /// Show token positions
        #[arg(short, long)]
        positions: bool,
    },
}

#[derive(Clone, Debug, ValueEnum)]
enum EmitMode {
    /// Emit AST (debug output)
    Ast,
    /// Emit IR (debug output)
    Ir,
    /// Emit object file (default)
    Obj,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { input } => run_command(&input),
        Commands::Build { input, output, emit } => build_command(&input, output, emit),
        Commands::Check { input } => check_command(&input),
        Commands::Lex { input, positions } => lex_command(&input, positions),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("PROTEUS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_command(input: &Path) -> ExitCode {
    let Some((source, filename)) = read_source(input) else {
        return ExitCode::FAILURE;
    };
    let module = match compile_to_ir(&source) {
        Ok(module) => module,
        Err(diagnostics) => return report(&diagnostics, &filename, &source),
    };

    let program = match JitProgram::compile(&module) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(file = %filename, "running");
    match program.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_command(input: &Path, output: Option<PathBuf>, emit: EmitMode) -> ExitCode {
    let Some((source, filename)) = read_source(input) else {
        return ExitCode::FAILURE;
    };

    let bytes = match emit {
        EmitMode::Ast => match parse(&source) {
            Ok(program) => format!("{:#?}\n", program).into_bytes(),
            Err(diagnostics) => return report(&diagnostics, &filename, &source),
        },
        EmitMode::Ir => match compile_to_ir(&source) {
            Ok(module) => dump_ir(&module).into_bytes(),
            Err(diagnostics) => return report(&diagnostics, &filename, &source),
        },
        EmitMode::Obj => {
            let module = match compile_to_ir(&source) {
                Ok(module) => module,
                Err(diagnostics) => return report(&diagnostics, &filename, &source),
            };
            let generated = CodeGenerator::new().and_then(|codegen| codegen.compile_module(&module));
            match generated {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    // Textual output goes to stdout unless a path was given
    let output = match (output, &emit) {
        (Some(path), _) => path,
        (None, EmitMode::Obj) => input.with_extension("o"),
        (None, _) => {
            print!("{}", String::from_utf8_lossy(&bytes));
            return ExitCode::SUCCESS;
        }
    };

    if let Err(e) = fs::write(&output, &bytes) {
        eprintln!("Error writing {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }
    debug!(output = %output.display(), bytes = bytes.len(), "wrote output");
    ExitCode::SUCCESS
}

fn check_command(input: &Path) -> ExitCode {
    let Some((source, filename)) = read_source(input) else {
        return ExitCode::FAILURE;
    };
    match compile_to_ir(&source) {
        Ok(module) => {
            println!(
                "{}: ok ({} functions)",
                filename,
                module.functions.len()
            );
            ExitCode::SUCCESS
        }
        Err(diagnostics) => report(&diagnostics, &filename, &source),
    }
}

fn lex_command(input: &Path, positions: bool) -> ExitCode {
    let Some((source, filename)) = read_source(input) else {
        return ExitCode::FAILURE;
    };
    let tokens = Lexer::new(&source).tokenize();

    println!("Tokens for {}:\n", filename);
    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            println!("{:4} | {:?}", i, token.kind);
            break;
        }
        if positions {
            println!(
                "{:4} | {:16?} | {:?} | {}..{}",
                i, token.kind, token.value, token.span.start, token.span.end
            );
        } else {
            println!("{:4} | {:16?} | {:?}", i, token.kind, token.value);
        }
    }

    if tokens.iter().any(|t| t.kind == TokenKind::Error) {
        return match parse(&source) {
            Err(diagnostics) => report(&diagnostics, &filename, &source),
            Ok(_) => ExitCode::FAILURE,
        };
    }
    ExitCode::SUCCESS
}

// Helper functions

fn read_source(path: &Path) -> Option<(String, String)> {
    match fs::read_to_string(path) {
        Ok(source) => Some((source, path.to_string_lossy().to_string())),
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            None
        }
    }
}

fn report(diagnostics: &[Diagnostic], filename: &str, source: &str) -> ExitCode {
    for diagnostic in diagnostics {
        diagnostic.emit(filename, source);
    }
    ExitCode::FAILURE
}
