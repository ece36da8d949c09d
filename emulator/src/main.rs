mod session;

use std::env;
use std::process;

use session::{Session, TranscriptProfile};

fn main() {
    let profile = parse_profile().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: sentry-emulator [--profile <decode|patrol>] | sentry-emulator <decode|patrol>");
        process::exit(2);
    });

    let mut session = Session::new(profile);
    for line in session.run() {
        println!("{line}");
    }
}

fn parse_profile() -> Result<TranscriptProfile, String> {
    let mut args = env::args().skip(1);
    if let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--profile=") {
            TranscriptProfile::from_tag(value)
        } else if arg == "--profile" {
            if let Some(value) = args.next() {
                TranscriptProfile::from_tag(&value)
            } else {
                Err("Expected value after --profile".to_string())
            }
        } else {
            TranscriptProfile::from_tag(&arg)
        }
    } else {
        Ok(TranscriptProfile::Decode)
    }
}
