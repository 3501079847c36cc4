// pymc: parse and resolve Pym programs

use clap::Parser as ClapParser;
use crossterm::style::Stylize;
use std::process::ExitCode;

use pymfront::cli::{init_logger, Cli};
use pymfront::driver::{compile, read_source, Compilation};
use pymfront::ui::{run_viewer, App};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = init_logger(cli.log_level(), color) {
        eprintln!("Warning: logger not installed: {}", e);
    }

    let source = match (&cli.file, &cli.eval) {
        (_, Some(code)) => code.clone(),
        (Some(path), None) => match read_source(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
        },
        // clap rejects a command line with neither
        (None, None) => return ExitCode::from(2),
    };

    log::info!("compiling {}", cli.input_name());
    let compilation = compile(&source, &cli.options());

    if cli.tui {
        let mut app = App::new(source, cli.input_name(), &compilation);
        if let Err(e) = run_viewer(&mut app) {
            eprintln!("Error: terminal failure: {}", e);
            return ExitCode::from(2);
        }
    } else {
        print_dumps(&cli, &compilation);
    }

    for diagnostic in compilation.diagnostics() {
        let label = format!("{} error:", diagnostic.stage);
        if color {
            eprintln!("{} {}", label.red().bold(), diagnostic.message);
        } else {
            eprintln!("{} {}", label, diagnostic.message);
        }
    }

    if compilation.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn print_dumps(cli: &Cli, compilation: &Compilation) {
    if cli.dump_tokens {
        for token in &compilation.tokens {
            println!("{:>4}  {}", token.line, token);
        }
    }

    if cli.dump_ast {
        if let Some(ast) = &compilation.ast {
            if compilation.resolution.is_some() {
                print!("{}", ast.render_annotated());
            } else {
                print!("{}", ast.render());
            }
        }
    }

    if cli.dump_scopes {
        if let Some(resolution) = &compilation.resolution {
            print!("{}", resolution.table.render());
        }
    }
}
