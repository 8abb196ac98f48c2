//! Vault CLI: envelope-encrypt JSON records from the command line
//!
//! Usage:
//!   vault keygen
//!   vault seal    --party <ID> [--in <FILE>] [--out <FILE>] [--key-file <FILE>]
//!   vault open    [--in <FILE>] [--out <FILE>] [--key-file <FILE>]
//!   vault inspect <FILE>

use std::fs;
use std::io::{self, Read, Write};
use std::process;

use envelope_vault::{encrypt_envelope, inspect, open_envelope, MasterKey, SecureRecord};
use serde_json::Value;

const MASTER_KEY_ENV: &str = "VAULT_MASTER_KEY";

fn usage() -> ! {
    eprintln!(
        "vault: envelope encryption for JSON records (AES-256-GCM)\n\
         \n\
         Commands:\n\
         \n\
         Generate a master key:\n\
         \n\
         vault keygen\n\
         Prints 64 hex characters to stdout\n\
         \n\
         Encrypt a JSON payload:\n\
         \n\
         vault seal --party <ID> [--in <FILE>] [--out <FILE>] [--key-file <FILE>]\n\
         Reads the payload from --in or stdin, writes the record to --out or stdout\n\
         \n\
         Decrypt a record:\n\
         \n\
         vault open [--in <FILE>] [--out <FILE>] [--key-file <FILE>]\n\
         \n\
         Show record metadata without decrypting:\n\
         \n\
         vault inspect <FILE>\n\
         \n\
         The master key is read from --key-file, or from ${} when absent.\n",
        MASTER_KEY_ENV
    );
    process::exit(1);
}

fn die(msg: &str) -> ! {
    eprintln!("error: {}", msg);
    process::exit(1);
}

struct Args {
    command: String,
    flags: Vec<(String, String)>,
    positional: Vec<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let command = args[1].clone();
    let mut flags = Vec::new();
    let mut positional = Vec::new();

    let mut i = 2;
    while i < args.len() {
        if args[i].starts_with("--") {
            if i + 1 >= args.len() {
                die(&format!("flag {} needs a value", args[i]));
            }
            flags.push((args[i].clone(), args[i + 1].clone()));
            i += 2;
        } else {
            positional.push(args[i].clone());
            i += 1;
        }
    }

    Args { command, flags, positional }
}

fn get_flag(flags: &[(String, String)], name: &str) -> Option<String> {
    flags.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
}

fn require_flag(flags: &[(String, String)], name: &str) -> String {
    get_flag(flags, name).unwrap_or_else(|| die(&format!("missing required flag: {}", name)))
}

fn load_master_key(flags: &[(String, String)]) -> MasterKey {
    let text = match get_flag(flags, "--key-file") {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|e| die(&format!("read {}: {}", path, e))),
        None => std::env::var(MASTER_KEY_ENV)
            .unwrap_or_else(|_| die(&format!("no master key: pass --key-file or set {}", MASTER_KEY_ENV))),
    };
    MasterKey::from_hex(&text).unwrap_or_else(|e| die(&format!("invalid master key: {}", e)))
}

fn read_input(path: Option<&str>) -> String {
    match path {
        Some(p) => fs::read_to_string(p).unwrap_or_else(|e| die(&format!("read {}: {}", p, e))),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .unwrap_or_else(|e| die(&format!("read stdin: {}", e)));
            buf
        }
    }
}

fn write_output(path: Option<&str>, text: &str) {
    match path {
        Some(p) => fs::write(p, text).unwrap_or_else(|e| die(&format!("write {}: {}", p, e))),
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", text).unwrap_or_else(|e| die(&format!("write stdout: {}", e)));
        }
    }
}

fn to_pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| die(&format!("serialize: {}", e)))
}

fn cmd_keygen() {
    let mk = MasterKey::generate().unwrap_or_else(|e| die(&e.to_string()));
    println!("{}", mk.to_hex().as_str());
    eprintln!("keep this key secret. every record sealed with it depends on it.");
}

fn cmd_seal(flags: &[(String, String)]) {
    let party = require_flag(flags, "--party");
    let in_file = get_flag(flags, "--in");
    let out_file = get_flag(flags, "--out");
    let mk = load_master_key(flags);

    let text = read_input(in_file.as_deref());
    let payload: Value =
        serde_json::from_str(&text).unwrap_or_else(|e| die(&format!("payload is not JSON: {}", e)));

    let record = encrypt_envelope(&party, &payload, mk.as_bytes())
        .unwrap_or_else(|e| die(&format!("encryption failed: {}", e)));

    write_output(out_file.as_deref(), &to_pretty(&record));
    eprintln!("sealed record {} for party {}", record.id(), record.party_id());
}

fn cmd_open(flags: &[(String, String)]) {
    let in_file = get_flag(flags, "--in");
    let out_file = get_flag(flags, "--out");
    let mk = load_master_key(flags);

    let text = read_input(in_file.as_deref());
    let record: SecureRecord =
        serde_json::from_str(&text).unwrap_or_else(|e| die(&format!("not a record: {}", e)));

    let payload: Value = open_envelope(&record, mk.as_bytes())
        .unwrap_or_else(|e| die(&format!("decryption failed: {}", e)));

    write_output(out_file.as_deref(), &to_pretty(&payload));
}

fn cmd_inspect(positional: &[String]) {
    let path = positional.first().unwrap_or_else(|| usage());
    let text = read_input(Some(path));
    let record: SecureRecord =
        serde_json::from_str(&text).unwrap_or_else(|e| die(&format!("not a record: {}", e)));

    match inspect(&record) {
        Ok(info) => println!("{}", info),
        Err(e) => die(&format!("malformed record: {}", e)),
    }
}

fn main() {
    let args = parse_args();

    match args.command.as_str() {
        "keygen" => cmd_keygen(),
        "seal" => cmd_seal(&args.flags),
        "open" => cmd_open(&args.flags),
        "inspect" => cmd_inspect(&args.positional),
        _ => {
            eprintln!("unknown command: {}", args.command);
            usage();
        }
    }
}
