#[tokio::main]
async fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = scribe::cli::Args::parse();
    scribe::logging::init_logging(args.verbose);
    if let Err(e) = scribe::cli::run(&args).await {
        eprintln!("{}", e);
        if args.verbose {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
