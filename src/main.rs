use kstrigger::cli::run;
use kstrigger::error::TriggerError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        // Bad inputs and misconfigured installs are user errors; failed stages are not
        let is_user_error = e
            .downcast_ref::<TriggerError>()
            .map(|err| err.is_user_error())
            .unwrap_or(true);

        if is_user_error {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }

        eprintln!("Internal error: {}", e);
        let mut source = e.source();
        if source.is_some() {
            eprintln!("\nCaused by:");
            let mut indent = 1;
            while let Some(err) = source {
                eprintln!("{:indent$}  {}", "", err);
                source = err.source();
                indent += 1;
            }
        }
        std::process::exit(2);
    }
}
