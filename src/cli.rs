// Command-line front end for runpack.
//
// Explicit subcommands with long-form options; whole-file encode/decode
// through `crate::io`, plus section inspection.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec::decoder::{self, DecodeError, DecodeOptions, Section};
use crate::codec::encoder::MIN_RUN;
use crate::format::section::MAX_SECTION_LEN;
use crate::format::varint::MAX_VARINT_LEN;
use crate::io::{self as file_io, BUF_SIZE, DecodeStats, EncodeStats};

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Run-length encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "runpack",
    version,
    about = "Run-length encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress an input stream.
    Encode(CodecArgs),
    /// Decompress an input stream.
    Decode(DecodeArgs),
    /// List the sections of a compressed file.
    Inspect(InspectArgs),
    /// Print build/format details.
    Config,
}

#[derive(Args, Debug)]
struct CodecArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    io: CodecArgs,

    /// Refuse to produce more than this many bytes (supports K/M/G suffix).
    #[arg(long = "max-output", value_parser = parse_byte_size)]
    max_output: Option<u64>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Compressed input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Inspect,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    no_output: bool,
    max_output: Option<u64>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Copy)]
struct GlobalFlags {
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

impl Options {
    fn new(command: Command, flags: GlobalFlags) -> Self {
        Options {
            command,
            use_stdout: false,
            force: flags.force,
            quiet: flags.quiet,
            verbose: flags.verbose,
            no_output: false,
            max_output: None,
            input_file: None,
            output_file: None,
            json_output: flags.json_output,
        }
    }

    fn with_io(mut self, args: CodecArgs) -> Self {
        self.use_stdout = args.stdout;
        self.no_output = args.no_output;
        self.input_file = args.input.or(args.input_pos);
        self.output_file = args.output.or(args.output_pos);
        self
    }

    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_output: self
                .max_output
                .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }
}

fn resolve_options(cli: Cli) -> Options {
    let flags = GlobalFlags {
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Encode(args) => Options::new(Command::Encode, flags).with_io(args),
        Cmd::Decode(args) => {
            let mut opts = Options::new(Command::Decode, flags).with_io(args.io);
            opts.max_output = args.max_output;
            opts
        }
        Cmd::Inspect(args) => {
            let mut opts = Options::new(Command::Inspect, flags);
            opts.input_file = Some(args.input);
            opts
        }
        Cmd::Config => Options::new(Command::Config, flags),
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("runpack".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("runpack version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("MIN_RUN={MIN_RUN}");
    eprintln!("MAX_VARINT_LEN={MAX_VARINT_LEN}");
    eprintln!("MAX_SECTION_LEN={MAX_SECTION_LEN}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Stream plumbing
// ---------------------------------------------------------------------------

fn open_input(opts: &Options) -> Result<Box<dyn Read>, i32> {
    match &opts.input_file {
        Some(path) => match File::open(path) {
            Ok(f) => Ok(Box::new(BufReader::with_capacity(BUF_SIZE, f))),
            Err(e) => {
                eprintln!("runpack: input file: {}: {e}", path.display());
                Err(1)
            }
        },
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(opts: &Options) -> Result<Box<dyn Write>, i32> {
    if opts.no_output {
        return Ok(Box::new(io::sink()));
    }
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            if path.exists() && !opts.force {
                eprintln!(
                    "runpack: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return Err(1);
            }
            match File::create(path) {
                Ok(f) => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
                Err(e) => {
                    eprintln!("runpack: output file: {}: {e}", path.display());
                    Err(1)
                }
            }
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => log::warn!("cannot render stats: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    let mut reader = match open_input(opts) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let mut writer = match open_output(opts) {
        Ok(w) => w,
        Err(code) => return code,
    };

    let stats = match file_io::encode_stream(&mut reader, &mut writer) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("runpack: encode error: {e}");
            return 1;
        }
    };

    report_encode(opts, &stats);
    0
}

fn report_encode(opts: &Options, stats: &EncodeStats) {
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "runpack: encoder: input size: {}, output size: {}, sections: {} ({} literal, {} run)",
            stats.input_size,
            stats.output_size,
            stats.summary.sections(),
            stats.summary.literal_sections,
            stats.summary.run_sections
        );
    }
    if opts.verbose > 1
        && !opts.quiet
        && let Some(sha) = &stats.input_sha256
    {
        eprintln!("runpack: encoder: input sha256: {}", file_io::hex_digest(sha));
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "encode",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "literal_sections": stats.summary.literal_sections,
            "run_sections": stats.summary.run_sections,
            "ratio": stats.summary.ratio(stats.output_size as usize),
            "input_sha256": stats.input_sha256.as_ref().map(file_io::hex_digest),
        }));
    }
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> i32 {
    let mut reader = match open_input(opts) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let mut input = Vec::new();
    if let Err(e) = reader.read_to_end(&mut input) {
        eprintln!("runpack: read error: {e}");
        return 1;
    }

    // The output is only opened once the input is known to be valid.
    let (output, stats) = match file_io::decode_buffer(&input, opts.decode_options()) {
        Ok(decoded) => decoded,
        Err(e) => {
            eprintln!("runpack: decode error: {e}");
            return 1;
        }
    };

    let mut writer = match open_output(opts) {
        Ok(w) => w,
        Err(code) => return code,
    };
    if let Err(e) = writer.write_all(&output).and_then(|()| writer.flush()) {
        eprintln!("runpack: write error: {e}");
        return 1;
    }

    report_decode(opts, &stats);
    0
}

fn report_decode(opts: &Options, stats: &DecodeStats) {
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "runpack: decoder: input size: {}, output size: {}, sections: {}",
            stats.input_size,
            stats.output_size,
            stats.summary.sections()
        );
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "decode",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "sections": stats.summary.sections(),
            "output_sha256": stats.output_sha256.as_ref().map(file_io::hex_digest),
        }));
    }
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(path) = &opts.input_file else {
        eprintln!("runpack: inspect requires an input file");
        return 1;
    };
    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("runpack: {}: {e}", path.display());
            return 1;
        }
    };

    println!("  Offset   Output  Kind       Length  Value");
    let mut output_pos: u64 = 0;
    let mut count: u64 = 0;
    let mut iter = decoder::sections(&data);
    while let Some(section) = iter.next() {
        let section = match section {
            Ok(section) => section,
            Err(e) => {
                eprintln!("runpack: section {count} at offset {}: {e}", iter.position());
                return 1;
            }
        };
        match section {
            Section::Literal { offset, data: bytes } => {
                println!("  {offset:06}   {output_pos:06}  LITERAL  {:8}", bytes.len());
            }
            Section::Run { offset, byte, len } => {
                println!("  {offset:06}   {output_pos:06}  RUN      {len:8}  {byte:#04X}");
            }
        }
        let Some(next) = output_pos.checked_add(section.output_len() as u64) else {
            eprintln!(
                "runpack: section {count}: {}",
                DecodeError::SizeOverflow {
                    offset: section.offset()
                }
            );
            return 1;
        };
        output_pos = next;
        count += 1;
    }

    if !opts.quiet {
        println!();
        println!("Compressed size:  {}", data.len());
        println!("Decoded size:     {output_pos}");
        println!("Sections:         {count}");
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "inspect",
            "input_size": data.len(),
            "output_size": output_pos,
            "sections": count,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    let default_filter = match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && let Some(path) = opts.output_file.take()
        && !opts.quiet
    {
        eprintln!(
            "runpack: warning: -c option overrides output filename: {}",
            path.display()
        );
    }

    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
