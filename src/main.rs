use std::env;
use std::io;
use std::process::ExitCode;

use gzserve::args::{Args, Invocation};
use gzserve::logging::setup_logging;
use gzserve::server::{Server, ServerConfig};

fn main() -> ExitCode {
    let args = match Args::from_argv(env::args_os()) {
        Invocation::Run(args) => args,
        Invocation::Usage(usage) => {
            println!("{}", usage);
            return ExitCode::from(1);
        }
    };

    setup_logging();
    if let Err(e) = run(&args) {
        println!("Error: {}", e);
    }
    ExitCode::SUCCESS
}

fn run(args: &Args) -> io::Result<()> {
    let config = ServerConfig::from_port(args.port()?)?;
    let server = Server::bind(&config)?;
    println!("Serving at http://localhost:{}", server.local_addr()?.port());
    server.serve_forever()
}
