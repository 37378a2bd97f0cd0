use std::{
    env, fs::OpenOptions, io, os::unix::fs::OpenOptionsExt, process, str::FromStr, time::Instant,
};

use bulkwrite::{BoundedWriter, FdSink, Policy};
use log::{LevelFilter, info};
use syslog::{BasicLogger, Facility, Formatter3164};

const USAGE: &str = "<path> <size> <fill-byte> [--offset N] [--policy tolerant|strict]";

#[derive(Debug, PartialEq)]
struct Request {
    path: String,
    size: usize,
    fill: u8,
    offset: Option<u64>,
    policy: Policy,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("bulkwrite");

    let level = match env::var("BULKWRITE_LOG") {
        Ok(value) => match LevelFilter::from_str(&value) {
            Ok(level) => level,
            Err(_) => {
                eprintln!("Invalid BULKWRITE_LOG value {:?}", value);
                process::exit(2);
            }
        },
        Err(_) => LevelFilter::Info,
    };
    init_logging(level);

    let request = match parse_args(&args[1.min(args.len())..]) {
        Ok(request) => request,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("Usage: {} {}", program, USAGE);
            process::exit(2);
        }
    };

    if let Err(e) = run(&request) {
        eprintln!("Error when writing file {}: {}", request.path, e);
        process::exit(1);
    }
}

fn run(request: &Request) -> io::Result<()> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(&request.path)?;

    let block = vec![request.fill; request.size];
    let writer = BoundedWriter::new(request.policy);

    info!(
        "writing {} bytes of {:#04x} to {} ({} policy)",
        request.size, request.fill, request.path, request.policy
    );

    let start = Instant::now();
    match request.offset {
        Some(offset) => writer.write_all_at(&FdSink::new(&file), &block, offset)?,
        None => writer.write_all(&mut FdSink::new(&file), &block)?,
    }
    let elapsed = start.elapsed();

    // surface delayed writeback errors before reporting success
    file.sync_all()?;

    info!("wrote {} bytes to {} in {:?}", request.size, request.path, elapsed);
    println!("{}", summary(request));
    Ok(())
}

fn summary(request: &Request) -> String {
    format!("wrote {} bytes to {}", request.size, request.path)
}

/// Installs the syslog logger; returns whether one was installed.
fn init_logging(level: LevelFilter) -> bool {
    if level == LevelFilter::Off {
        return false;
    }

    let formatter = Formatter3164 {
        facility: Facility::LOG_USER,
        hostname: None,
        process: "bulkwrite".into(),
        pid: process::id(),
    };

    match syslog::unix(formatter) {
        Ok(logger) => {
            if log::set_boxed_logger(Box::new(BasicLogger::new(logger))).is_err() {
                return false;
            }
            log::set_max_level(level);
            true
        }
        Err(e) => {
            eprintln!("syslog unavailable, not logging: {}", e);
            false
        }
    }
}

fn parse_args(args: &[String]) -> Result<Request, String> {
    let mut positional = Vec::new();
    let mut offset = None;
    let mut policy = Policy::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--offset" => {
                let value = iter.next().ok_or("--offset needs a value")?;
                let value =
                    parse_size(value).ok_or_else(|| format!("invalid offset {:?}", value))?;
                offset = Some(value as u64);
            }
            "--policy" => {
                let value = iter.next().ok_or("--policy needs a value")?;
                policy = value
                    .parse()
                    .map_err(|e: bulkwrite::ParsePolicyError| e.to_string())?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ => positional.push(arg.as_str()),
        }
    }

    let [path, size, fill] = positional[..] else {
        return Err(format!("expected 3 arguments, got {}", positional.len()));
    };

    Ok(Request {
        path: path.to_owned(),
        size: parse_size(size).ok_or_else(|| format!("invalid size {:?}", size))?,
        fill: parse_byte(fill).ok_or_else(|| format!("invalid fill byte {:?}", fill))?,
        offset,
        policy,
    })
}

/// Parses `1024`, `2^31`, `2^31-1` or `2^30+5`.
fn parse_size(s: &str) -> Option<usize> {
    let Some((base, rest)) = s.split_once('^') else {
        return s.parse().ok();
    };

    let (exp, adjust) = match rest.find(['+', '-']) {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };

    let base: usize = base.parse().ok()?;
    let value = base.checked_pow(exp.parse().ok()?)?;

    match adjust.split_at_checked(1) {
        Some(("+", n)) => value.checked_add(n.parse().ok()?),
        Some(("-", n)) => value.checked_sub(n.parse().ok()?),
        _ => Some(value),
    }
}

fn parse_byte(s: &str) -> Option<u8> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
