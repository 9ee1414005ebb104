//! sqlpilot CLI

use sqlpilot::cli::{parse_args, run_cli_mode, EXIT_FAILURE, EXIT_SUCCESS};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let parsed = match parse_args(args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    if parsed.show_version {
        println!("sqlpilot v{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(EXIT_SUCCESS);
    }

    if parsed.show_help || parsed.command.is_none() {
        print_help();
        std::process::exit(EXIT_SUCCESS);
    }

    std::process::exit(run_cli_mode(parsed));
}

fn print_help() {
    println!("sqlpilot - ask questions of a SQL database in plain language");
    println!();
    println!("USAGE:");
    println!("    sqlpilot [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    ask <question...>        Generate, validate and run SQL for a question");
    println!("    exec <sql...>            Run SQL directly");
    println!("    schema [table column]    Show tables, or a column's distinct values");
    println!("    schema stats <table> <col...>");
    println!("                             Column stats over rows matching --filter");
    println!("    log [YYYY-MM-DD]         Show audit records for a day (default today)");
    println!();
    println!("OPTIONS:");
    println!("    --home <path>            Home directory (default: $SQLPILOT_HOME or .)");
    println!("    --column <name>          Selected column for ask (repeatable)");
    println!("    --filter <col=value>     Selected value for ask or schema stats (repeatable)");
    println!("    --json                   Output JSON");
    println!("    --version                Show version");
    println!("    --help                   Show this help");
    println!();
    println!("CONFIG:");
    println!("    <home>/sqlpilot.toml     [llm], [store], [audit] sections");
    println!("    RUST_LOG                 Diagnostics filter (default sqlpilot=info)");
}
