use std::process::ExitCode;

fn main() -> ExitCode {
    match diamond_price_xpert::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
