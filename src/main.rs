use std::process::ExitCode;

fn main() -> ExitCode {
    let result = sa_indicators::app::run();
    ExitCode::from(sa_indicators::app::exit_code(result, &mut std::io::stdout()))
}
