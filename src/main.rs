use pagegrade::RubricRunner;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let report = match RubricRunner::builder().build().and_then(|runner| runner.run()) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("pagegrade: {err}");
            return ExitCode::from(2);
        }
    };

    for result in report.results() {
        println!("{result}");
    }
    println!("{}", report.summary());
    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
