use std::error::Error;
use std::io::Read;

use clap::{ArgGroup, Parser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cardqr::{reader, ECLevel, MaskPattern, QRBuilder, Version};

#[derive(Parser)]
#[command(name = "cardqr", version, about = "Encodes text as a QR symbol token for wallet cards")]
#[command(group(ArgGroup::new("input").required(true).args(["text", "stdin"])))]
struct Cli {
    /// Text to encode
    #[arg(long)]
    text: Option<String>,

    /// Read the payload from stdin, a single trailing newline is dropped
    #[arg(long)]
    stdin: bool,

    /// Error correction level
    #[arg(long, default_value = "L", value_parser = parse_ec_level)]
    ec_level: ECLevel,

    /// Symbol version 1-10, smallest fitting version if omitted
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    qr_version: Option<u8>,

    /// Mask pattern 0-7, lowest penalty mask if omitted
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=7))]
    mask: Option<u8>,

    /// Print a terminal rendering after the token
    #[arg(long)]
    preview: bool,

    /// Decode the token back & fail on mismatch
    #[arg(long)]
    verify: bool,
}

fn parse_ec_level(s: &str) -> Result<ECLevel, String> {
    match s.to_ascii_uppercase().as_str() {
        "L" => Ok(ECLevel::L),
        "M" => Ok(ECLevel::M),
        "Q" => Ok(ECLevel::Q),
        "H" => Ok(ECLevel::H),
        _ => Err(format!("Invalid error correction level {s:?}, expected one of L, M, Q, H")),
    }
}

fn read_payload(cli: &Cli) -> Result<Vec<u8>, Box<dyn Error>> {
    if let Some(text) = &cli.text {
        return Ok(text.as_bytes().to_vec());
    }
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    Ok(buf)
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let data = read_payload(&cli)?;
    debug!("Read {} bytes of payload", data.len());

    let mut builder = QRBuilder::new(&data);
    builder.ec_level(cli.ec_level);
    if let Some(v) = cli.qr_version {
        builder.version(Version::new(v.into())?);
    }
    if let Some(m) = cli.mask {
        builder.mask(MaskPattern::try_from(m)?);
    }

    let qr = builder.build()?;
    let token = qr.to_token();
    println!("{token}");

    if cli.preview {
        println!("{}", qr.to_str(1));
    }

    if cli.verify {
        let (meta, decoded) = reader::read(&token)?;
        if decoded != data {
            let msg = format!("Verification failed: decoded {} bytes differ", decoded.len());
            return Err(msg.into());
        }
        info!("Verified {meta}");
    }

    Ok(())
}
