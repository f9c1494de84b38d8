use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dcp",
    about = "Digital Citizenship Protocol: sign, verify and log agent citizenship bundles",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with `[verifier]` and `[log]` tables
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SignerKind {
    Human,
    Organization,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate an Ed25519 keypair
    Keygen(KeygenArgs),
    /// Print the sha256 hash of a bundle
    BundleHash(FileArgs),
    /// Print the Merkle root of a bundle's audit entries
    MerkleRoot(FileArgs),
    /// Print the intent_hash of an intent
    IntentHash(FileArgs),
    /// Sign a citizenship bundle
    Sign(SignArgs),
    /// Verify a signed bundle
    Verify(VerifyArgs),
    /// Check a JSON file against a DCP artifact schema
    Validate(ValidateArgs),
    /// Check the structure of a citizenship bundle
    ValidateBundle(FileArgs),
    /// Operate on a file-backed transparency log
    Log(LogArgs),
}

#[derive(Args)]
pub struct KeygenArgs {
    #[arg(long, default_value = "keys")]
    pub out_dir: PathBuf,
}

#[derive(Args)]
pub struct FileArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct SignArgs {
    /// Unsigned citizenship bundle (JSON)
    pub bundle: PathBuf,
    /// File holding the base64 secret key
    #[arg(long)]
    pub secret_key: PathBuf,
    #[arg(long, value_enum, default_value = "human")]
    pub signer_type: SignerKind,
    /// Defaults to the bundle's human_id
    #[arg(long)]
    pub signer_id: Option<String>,
    /// Write the signed bundle here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Signed bundle (JSON)
    pub signed: PathBuf,
    /// File holding the base64 public key; overrides the embedded signer key
    #[arg(long)]
    pub public_key: Option<PathBuf>,
    /// Also require inclusion in the configured transparency log
    #[arg(long)]
    pub check_log: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// signed_bundle, citizenship_bundle, human_binding_record,
    /// agent_passport, intent, policy_decision or audit_entry
    pub schema: String,
    pub path: PathBuf,
}

#[derive(Args)]
pub struct LogArgs {
    #[command(subcommand)]
    pub action: LogAction,
    /// Log file; overrides `[log] path` from the config file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum LogAction {
    /// Append a bundle hash (or the hash of a signed bundle file)
    Add {
        /// `sha256:<hex>` bundle hash
        #[arg(required_unless_present = "signed", conflicts_with = "signed")]
        bundle_hash: Option<String>,
        /// Signed bundle whose committed bundle_hash is logged
        #[arg(long)]
        signed: Option<PathBuf>,
    },
    /// Show the current root and size
    Root,
    /// Show the inclusion proof for an index
    Proof { index: u64 },
    /// List every entry
    Entries,
}
