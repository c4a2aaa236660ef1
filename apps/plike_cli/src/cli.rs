//! Command-line argument parsing and dispatch for `plikec`.
//!
//! A single compile action rather than `largo`'s subcommand tree: the
//! surface is `plikec [options] input_file [output_file]`, so [`Cli`] is a
//! flat [`clap::Parser`] derive struct, not a [`clap::Subcommand`] enum.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

use plike_base::Diagnostics;
use plike_compile::{Generator, Parser as PlikeParser};
use plike_lang::{ArrayIndexing, AssignmentStyle, CompileConfig, DebugFlags, NodeArena, OperatorStyle, ParameterStyle};

use crate::debug::{DebugSink, DotDebugSink, TextDebugSink};

/// Command-line interface for the plike transpiler.
///
/// Parses a single source file and writes the generated C to stdout or to
/// an explicit output path, per spec §6's flag table.
#[derive(Parser)]
#[command(name = "plikec")]
#[command(about = "Transpile plike source to portable C", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Source file to compile.
    pub input_file: PathBuf,

    /// Where to write the generated C. Defaults to stdout.
    pub output_file: Option<PathBuf>,

    /// Selects the assignment operator the source uses.
    #[arg(short = 'a', long = "assignment", value_enum, default_value = "colon-equals")]
    pub assignment: AssignmentArg,

    /// Selects the array indexing base.
    #[arg(short = 'i', long = "indexing", value_enum, default_value = "zero")]
    pub indexing: IndexingArg,

    /// Where a parameter's type annotation is allowed to appear.
    #[arg(short = 'p', long = "params", value_enum, default_value = "mixed")]
    pub params: ParamsArg,

    /// Which keyword spellings the lexer accepts for logical operators.
    #[arg(short = 'o', long = "operators", value_enum, default_value = "standard")]
    pub operators: OperatorsArg,

    /// Allow `()` as an array subscript in addition to `[]`.
    #[arg(short = 'm', long = "mixed-arrays")]
    pub mixed_arrays: bool,

    /// Comma-separated list of pipeline stages to dump: lexer,parser,ast,symbols,codegen,all.
    #[arg(short = 'd', long = "debug")]
    pub debug: Option<String>,

    /// Emit debug dumps as Graphviz DOT instead of indented text.
    #[arg(long = "debug-dot", requires = "debug")]
    pub debug_dot: bool,

    /// Turns on verbose logging.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum AssignmentArg {
    ColonEquals,
    Equals,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum IndexingArg {
    Zero,
    One,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum ParamsArg {
    Decl,
    Body,
    Mixed,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OperatorsArg {
    Standard,
    Dotted,
    Mixed,
}

impl Cli {
    pub fn to_config(&self) -> CompileConfig {
        CompileConfig {
            assignment_style: match self.assignment {
                AssignmentArg::ColonEquals => AssignmentStyle::ColonEquals,
                AssignmentArg::Equals => AssignmentStyle::Equals,
            },
            array_indexing: match self.indexing {
                IndexingArg::Zero => ArrayIndexing::Zero,
                IndexingArg::One => ArrayIndexing::One,
            },
            param_style: match self.params {
                ParamsArg::Decl => ParameterStyle::Decl,
                ParamsArg::Body => ParameterStyle::Body,
                ParamsArg::Mixed => ParameterStyle::Mixed,
            },
            operator_style: match self.operators {
                OperatorsArg::Standard => OperatorStyle::Standard,
                OperatorsArg::Dotted => OperatorStyle::Dotted,
                OperatorsArg::Mixed => OperatorStyle::Mixed,
            },
            allow_mixed_array_access: self.mixed_arrays,
            debug_flags: self.debug.as_deref().map(DebugFlags::from_csv).unwrap_or_else(DebugFlags::none),
            verbose: self.verbose,
        }
    }
}

/// Parses arguments and runs the compile pipeline. Returns the process exit
/// code per spec §6 (`0` success, `1` on any reported error).
pub fn run_cli() -> Result<i32, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    compile(&cli)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn compile(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = cli.to_config();
    let source = fs::read_to_string(&cli.input_file)?;
    let filename: std::rc::Rc<str> = cli.input_file.display().to_string().into();

    let mut sink: Box<dyn DebugSink> = if cli.debug_dot { Box::new(DotDebugSink::new()) } else { Box::new(TextDebugSink::new()) };

    if config.debug_flags.lexer {
        dump_tokens(&mut *sink, filename.clone(), &source, &config);
    }

    let arena = NodeArena::new();
    let mut parser = PlikeParser::new(filename, &source, config, &arena);
    let program = parser.parse();

    if config.debug_flags.ast {
        sink.dump_ast(program);
    }
    if config.debug_flags.symbols {
        sink.dump_symbols(parser.symtab());
    }

    let diags = parser.diagnostics();
    if diags.had_error() {
        print_diagnostics(diags, &source);
        eprintln!("{}", diags.summary());
        return Ok(1);
    }

    let symtab = parser.symtab();
    let generator = Generator::new(symtab, &config);
    let c_source = generator.generate(program);

    if config.debug_flags.codegen {
        sink.dump_codegen_trace(&format!("generated {} bytes", c_source.len()));
    }

    match &cli.output_file {
        Some(path) => fs::write(path, c_source)?,
        None => println!("{c_source}"),
    }

    Ok(0)
}

/// Runs a standalone lex pass purely for the `--debug lexer` dump: the real
/// parse below drives its own lexer internally and never exposes the raw
/// token stream, so debugging it means lexing the source a second time.
fn dump_tokens(sink: &mut dyn DebugSink, filename: std::rc::Rc<str>, source: &str, config: &CompileConfig) {
    let mut lexer = plike_lang::Lexer::new(filename, source);
    let mut diags = Diagnostics::new();
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token(config, &mut diags);
        let done = matches!(tok.kind, plike_lang::TokenKind::Eof);
        tokens.push(tok);
        if done {
            break;
        }
    }
    sink.dump_tokens(&tokens, lexer.interner());
}

fn print_diagnostics(diags: &Diagnostics, source: &str) {
    for entry in diags.entries() {
        eprintln!("{entry}");
        if let Some(rendered) = plike_base::render_caret(source, &entry.span) {
            eprintln!("{rendered}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plike_lang::{ArrayIndexing, AssignmentStyle, OperatorStyle, ParameterStyle};

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["plikec"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).expect("args should parse")
    }

    #[test]
    fn defaults_match_compile_config_default() {
        let cli = parse(&["in.pl"]);
        let config = cli.to_config();
        assert_eq!(config.assignment_style, AssignmentStyle::ColonEquals);
        assert_eq!(config.array_indexing, ArrayIndexing::Zero);
        assert_eq!(config.param_style, ParameterStyle::Mixed);
        assert_eq!(config.operator_style, OperatorStyle::Standard);
        assert!(!config.allow_mixed_array_access);
        assert!(!config.verbose);
        assert!(!config.debug_flags.any());
    }

    #[test]
    fn flags_map_onto_compile_config() {
        let cli = parse(&["in.pl", "-a", "equals", "-i", "one", "-p", "decl", "-o", "dotted", "-m", "-v"]);
        let config = cli.to_config();
        assert_eq!(config.assignment_style, AssignmentStyle::Equals);
        assert_eq!(config.array_indexing, ArrayIndexing::One);
        assert_eq!(config.param_style, ParameterStyle::Decl);
        assert_eq!(config.operator_style, OperatorStyle::Dotted);
        assert!(config.allow_mixed_array_access);
        assert!(config.verbose);
    }

    #[test]
    fn debug_csv_selects_named_stages() {
        let cli = parse(&["in.pl", "--debug", "ast,symbols"]);
        let config = cli.to_config();
        assert!(config.debug_flags.ast);
        assert!(config.debug_flags.symbols);
        assert!(!config.debug_flags.lexer);
        assert!(!config.debug_flags.codegen);
    }

    #[test]
    fn output_file_is_optional() {
        let cli = parse(&["in.pl"]);
        assert!(cli.output_file.is_none());
        let cli = parse(&["in.pl", "out.c"]);
        assert_eq!(cli.output_file.as_deref(), Some(std::path::Path::new("out.c")));
    }

    #[test]
    fn debug_dot_requires_debug_flag() {
        assert!(Cli::try_parse_from(["plikec", "in.pl", "--debug-dot"]).is_err());
        assert!(Cli::try_parse_from(["plikec", "in.pl", "-d", "ast", "--debug-dot"]).is_ok());
    }
}
