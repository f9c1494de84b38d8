use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dcp_crypto::{bundle_hash, generate_keypair, intent_hash, merkle_root_for_audit_entries, Direction};
use dcp_log::{LogConfig, LogStore, TransparencyLog};
use dcp_sdk::{publish, sign_bundle};
use dcp_types::{CitizenshipBundle, SignedBundle, SignerType};
use dcp_verify::{BundleVerifier, SchemaValidator, TypedSchemaValidator};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::*;
use crate::config::CliConfig;

impl From<SignerKind> for SignerType {
    fn from(kind: SignerKind) -> Self {
        match kind {
            SignerKind::Human => Self::Human,
            SignerKind::Organization => Self::Organization,
        }
    }
}

/// Prints either the JSON form of a result or its text rendering.
struct Output(OutputFormat);

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> Result<()> {
        match self.0 {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => text(),
        }
        Ok(())
    }
}

pub fn run_command(cli: Cli) -> Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let out = Output(cli.format);
    match cli.command {
        Command::Keygen(args) => cmd_keygen(&out, args),
        Command::BundleHash(args) => cmd_bundle_hash(&out, &args.path),
        Command::MerkleRoot(args) => cmd_merkle_root(&out, &args.path),
        Command::IntentHash(args) => cmd_intent_hash(&out, &args.path),
        Command::Sign(args) => cmd_sign(&out, args),
        Command::Verify(args) => cmd_verify(&out, &config, args),
        Command::Validate(args) => cmd_validate(&out, &args.schema, &args.path),
        Command::ValidateBundle(args) => cmd_validate_bundle(&out, &args.path),
        Command::Log(args) => cmd_log(&out, &config.log, args),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn read_key(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).with_context(|| format!("reading key {}", path.display()))?;
    Ok(text.trim().to_string())
}

/// The bundle itself, whether `value` is a bundle or a signed bundle.
fn unwrap_bundle(value: &Value) -> &Value {
    match (value.get("bundle"), value.get("signature")) {
        (Some(bundle), Some(_)) => bundle,
        _ => value,
    }
}

fn cmd_keygen(out: &Output, args: KeygenArgs) -> Result<()> {
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let keypair = generate_keypair();
    let public_path = args.out_dir.join("public_key.txt");
    let secret_path = args.out_dir.join("secret_key.txt");
    fs::write(&public_path, format!("{}\n", keypair.public_key_b64))?;
    fs::write(&secret_path, format!("{}\n", keypair.secret_key_b64))?;

    out.emit(
        &json!({
            "public_key_b64": &keypair.public_key_b64,
            "public_key_path": &public_path,
            "secret_key_path": &secret_path,
        }),
        || {
            println!("{} Keypair written to {}", "✓".green().bold(), args.out_dir.display().to_string().bold());
            println!("  Public key: {}", keypair.public_key_b64.cyan());
        },
    )
}

fn cmd_bundle_hash(out: &Output, path: &Path) -> Result<()> {
    let value = read_json(path)?;
    let hash = bundle_hash(unwrap_bundle(&value))?;
    out.emit(&json!({ "bundle_hash": &hash }), || println!("{hash}"))
}

fn cmd_merkle_root(out: &Output, path: &Path) -> Result<()> {
    let value = read_json(path)?;
    let entries = match unwrap_bundle(&value).get("audit_entries").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries,
        _ => bail!("audit_entries must be a non-empty array"),
    };
    let root = merkle_root_for_audit_entries(entries)?.map(|root| root.to_prefixed());
    out.emit(&json!({ "merkle_root": &root, "leaves": entries.len() }), || {
        println!("{}", root.as_deref().unwrap_or("null"))
    })
}

fn cmd_intent_hash(out: &Output, path: &Path) -> Result<()> {
    let value = read_json(path)?;
    let hash = intent_hash(&value)?.to_hex();
    out.emit(&json!({ "intent_hash": &hash }), || println!("{hash}"))
}

fn cmd_sign(out: &Output, args: SignArgs) -> Result<()> {
    let bundle: CitizenshipBundle = serde_json::from_value(read_json(&args.bundle)?)
        .with_context(|| format!("{} is not a citizenship bundle", args.bundle.display()))?;
    let secret_key = read_key(&args.secret_key)?;
    let signed = sign_bundle(
        bundle,
        &secret_key,
        args.signer_type.into(),
        args.signer_id.as_deref(),
    )?;
    let text = serde_json::to_string_pretty(&signed)?;

    match &args.out {
        Some(path) => {
            fs::write(path, format!("{text}\n")).with_context(|| format!("writing {}", path.display()))?;
            out.emit(
                &json!({ "path": path, "bundle_hash": &signed.signature.bundle_hash }),
                || {
                    println!("{} Signed bundle written to {}", "✓".green().bold(), path.display().to_string().bold());
                    println!("  Bundle hash: {}", signed.signature.bundle_hash.yellow());
                },
            )
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn cmd_verify(out: &Output, config: &CliConfig, args: VerifyArgs) -> Result<()> {
    let signed = read_json(&args.signed)?;
    let public_key = args.public_key.as_deref().map(read_key).transpose()?;

    let mut verifier = BundleVerifier::with_default_stages(config.verifier.clone())
        .with_schema_validator(Box::new(TypedSchemaValidator));
    if args.check_log {
        let log = open_log(&config.log, None)?;
        verifier = verifier.with_transparency(Box::new(log));
    }

    let result = verifier.verify_json(&signed, public_key.as_deref())?;
    out.emit(&result, || {
        if result.verified {
            println!("{} SIGNATURE VALID", "✓".green().bold());
            println!("{} BUNDLE INTEGRITY VALID", "✓".green().bold());
            for stage in result.stage_results.iter().filter(|s| s.skipped) {
                let reason = stage.reason.as_deref().unwrap_or("");
                println!("  {} {} ({})", "-".dimmed(), stage.stage_name, reason.dimmed());
            }
            println!("{}", "VERIFIED".green().bold());
        } else {
            for error in &result.errors {
                eprintln!("{} {}: {}", "✗".red().bold(), error.kind.to_string().red(), error.message);
            }
        }
    })?;

    if !result.verified {
        bail!("verification failed");
    }
    Ok(())
}

fn report_schema(out: &Output, schema: &str, path: &Path) -> Result<()> {
    let value = read_json(path)?;
    let report = TypedSchemaValidator.validate(schema, &value);
    out.emit(&report, || {
        if report.valid {
            println!("{} VALID ({schema})", "✓".green().bold());
        } else {
            for error in &report.errors {
                eprintln!("  - {}", error.red());
            }
        }
    })?;

    if !report.valid {
        bail!("{} failed {schema} validation", path.display());
    }
    Ok(())
}

fn cmd_validate(out: &Output, schema: &str, path: &Path) -> Result<()> {
    report_schema(out, schema, path)
}

fn cmd_validate_bundle(out: &Output, path: &Path) -> Result<()> {
    let value = read_json(path)?;
    let schema = if value.get("signature").is_some() {
        "signed_bundle"
    } else {
        "citizenship_bundle"
    };
    report_schema(out, schema, path)
}

fn open_log(config: &LogConfig, log_file: Option<PathBuf>) -> Result<TransparencyLog<Box<dyn LogStore>>> {
    let mut config = config.clone();
    if let Some(path) = log_file {
        config.path = Some(path);
    }
    let Some(path) = config.path.clone() else {
        bail!("no transparency log file: pass --log-file or set [log] path");
    };
    TransparencyLog::from_config(&config).with_context(|| format!("opening log {}", path.display()))
}

fn cmd_log(out: &Output, config: &LogConfig, args: LogArgs) -> Result<()> {
    let log = open_log(config, args.log_file)?;

    match args.action {
        LogAction::Add { bundle_hash, signed } => {
            let added = match (bundle_hash, signed) {
                (Some(hash), _) => log.add(&hash)?,
                (None, Some(path)) => {
                    let signed: SignedBundle = serde_json::from_value(read_json(&path)?)
                        .with_context(|| format!("{} is not a signed bundle", path.display()))?;
                    publish(&log, &signed)?
                }
                (None, None) => bail!("give a bundle hash or --signed <file>"),
            };
            out.emit(&added, || {
                println!("{} Logged at index {}", "✓".green().bold(), added.index.to_string().bold());
                println!("  Leaf: {}", added.leaf_hash.to_hex().dimmed());
                println!("  Root: {} (size {})", added.root.to_hex().yellow(), added.size);
            })
        }
        LogAction::Root => {
            let root = log.root()?;
            out.emit(&root, || match &root.root {
                Some(hash) => println!("{} (size {})", hash.to_hex().yellow(), root.size),
                None => println!("{}", "empty log".dimmed()),
            })
        }
        LogAction::Proof { index } => {
            let proof = log.proof(index)?;
            out.emit(&proof, || {
                println!("Entry {} {}", proof.index.to_string().bold(), proof.entry.bundle_hash);
                println!("  Leaf: {}", proof.leaf_hash.to_hex().dimmed());
                for step in &proof.proof {
                    let side = match step.direction {
                        Direction::Left => "left",
                        Direction::Right => "right",
                    };
                    println!("  {:>5} {}", side.cyan(), step.hash.to_hex());
                }
                println!("  Root: {}", proof.root.to_hex().yellow());
                let status = if proof.verify() { "valid".green() } else { "INVALID".red() };
                println!("  Proof: {status}");
            })
        }
        LogAction::Entries => {
            let entries = log.entries()?;
            out.emit(&entries, || {
                if entries.entries.is_empty() {
                    println!("{}", "empty log".dimmed());
                }
                for entry in &entries.entries {
                    println!(
                        "{:>6}  {}  {}",
                        entry.index.to_string().yellow(),
                        entry.timestamp.dimmed(),
                        entry.bundle_hash
                    );
                }
            })
        }
    }
}
