use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::io;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TCP port to listen on (loopback only)
    pub port: String,
}

/// Result of reading the command line.
#[derive(Debug)]
pub enum Invocation {
    Run(Args),
    /// Wrong argument count or an unknown flag.
    Usage(String),
}

impl Args {
    /// Parses `argv`, turning every clap failure except help/version into a
    /// usage line. Help and version requests print and exit like clap does.
    pub fn from_argv<I, T>(argv: I) -> Invocation
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        match Args::try_parse_from(&argv) {
            Ok(args) => Invocation::Run(args),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                ) =>
            {
                e.exit()
            }
            Err(e) => {
                log::debug!("Rejected command line: {:?}", e.kind());
                let program = argv
                    .first()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
                Invocation::Usage(usage(&program))
            }
        }
    }

    pub fn port(&self) -> io::Result<u16> {
        self.port
            .parse::<u16>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }
}

pub fn usage(program: &str) -> String {
    format!("usage: {} [PORT]", program)
}
