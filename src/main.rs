use colored::Colorize;

use contractgen::cli::CommandLineInterface;

fn main() {
    let command_line_interface = CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(error.exit_code());
    }
}
