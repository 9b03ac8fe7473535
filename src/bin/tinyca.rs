//! tinyca - local certificate authority CLI

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tinyca::config::{DEFAULT_CERT_FILE, DEFAULT_KEY_FILE};
use tinyca::{CaError, CertificateRequest, Engine, EngineConfig, KeyAlgorithm, Store, StoreConfig};

#[derive(Parser)]
#[command(name = "tinyca")]
#[command(about = "Tiny local certificate authority", long_about = None)]
struct Cli {
    /// Root store directory (defaults to the per-user data directory)
    #[arg(long, env = "CAROOT", global = true)]
    store_dir: Option<PathBuf>,

    /// Root private key file name inside the store
    #[arg(long, env = "KEYNAME", default_value = DEFAULT_KEY_FILE, global = true)]
    key_file: String,

    /// Root certificate file name inside the store
    #[arg(long, env = "CRTNAME", default_value = DEFAULT_CERT_FILE, global = true)]
    cert_file: String,

    /// Key type for a newly created root and for generated leaf keys
    #[arg(long, default_value_t = KeyAlgorithm::default(), global = true)]
    key_algorithm: KeyAlgorithm,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the root key and certificate if missing, then print their paths
    Init,

    /// Issue a certificate and key for hostnames and IP addresses
    Sign {
        /// DNS name to include (repeatable)
        #[arg(long = "dns")]
        hostnames: Vec<String>,

        /// IP address to include (repeatable)
        #[arg(long = "ip")]
        addresses: Vec<IpAddr>,
    },

    /// Issue a certificate for a PEM certificate signing request
    SignCsr {
        /// CSR file
        path: PathBuf,

        /// The file holds base64 of the PEM block
        #[arg(long)]
        base64: bool,
    },

    /// Print the root certificate details
    Show,

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("tinyca v{}", tinyca::VERSION);
        return ExitCode::SUCCESS;
    }

    let store = Store::new(StoreConfig {
        store_dir: cli.store_dir,
        key_file: cli.key_file,
        cert_file: cli.cert_file,
        key_algorithm: cli.key_algorithm,
    });

    // Without root material nothing else can work
    let root = match store.open() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{} {}", "failed to load the CA root:".red().bold(), e);
            return ExitCode::from(2);
        }
    };

    let engine = Engine::new(EngineConfig::default().with_key_algorithm(cli.key_algorithm));

    let result = match cli.command {
        Commands::Init => {
            eprintln!("{}", "CA root ready".green().bold());
            println!("CA key: {}", root.key_path().display());
            println!("CA crt: {}", root.cert_path().display());
            Ok(())
        }
        Commands::Show => {
            println!("Subject:    {}", root.subject());
            println!("Serial:     {}", root.serial());
            println!("Not before: {}", root.validity().not_before);
            println!("Not after:  {}", root.validity().not_after);
            println!();
            print!("{}", root.cert_pem());
            Ok(())
        }
        Commands::Sign {
            hostnames,
            addresses,
        } => engine
            .issue_from_attributes(&root, &hostnames, &addresses)
            .map(|leaf| print!("{leaf}")),
        Commands::SignCsr { path, base64 } => sign_csr(&engine, &root, &path, base64),
        Commands::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn sign_csr(
    engine: &Engine,
    root: &tinyca::RootAuthority,
    path: &Path,
    base64: bool,
) -> Result<(), CaError> {
    let text = fs::read_to_string(path).map_err(|e| CaError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let csr = if base64 {
        CertificateRequest::from_base64_pem(&text)?
    } else {
        CertificateRequest::from_pem(&text)?
    };
    let leaf = engine.issue_from_csr(root, &csr)?;
    print!("{leaf}");
    Ok(())
}
