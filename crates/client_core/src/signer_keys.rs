//! Parsing of co-signer secret keys typed as comma-separated byte lists.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use shared::{
    domain::{AdditionalSigner, SECRET_KEY_LEN},
    error::KeyParseError,
};
use zeroize::Zeroizing;

/// A co-signer whose secret material decoded into a usable keypair.
pub struct ParsedSigner {
    address: String,
    signing_key: SigningKey,
}

impl ParsedSigner {
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self {
            address: encode_address(&signing_key),
            signing_key,
        }
    }

    /// Base58 public key, the form the ledger uses for account addresses.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl fmt::Debug for ParsedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Splits `input` on commas and reads every token as a byte.
///
/// Empty, non-numeric and out-of-range tokens fail instead of turning into a
/// zero or a placeholder.
pub fn parse_byte_list(input: &str) -> Result<Vec<u8>, KeyParseError> {
    input
        .split(',')
        .enumerate()
        .map(|(index, token)| {
            let token = token.trim();
            token.parse::<u8>().map_err(|_| KeyParseError::InvalidByte {
                index,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Decodes a signer's secret material into a keypair.
///
/// The material must hold exactly [`SECRET_KEY_LEN`] bytes whose trailing half
/// is the public key of the leading seed. Errors name the signer's address.
pub fn parse_signer(signer: &AdditionalSigner) -> Result<ParsedSigner, KeyParseError> {
    let label = signer.public_address.as_str();
    let bytes = Zeroizing::new(
        parse_byte_list(&signer.secret_material)
            .map_err(|err| KeyParseError::invalid_key(label, err.to_string()))?,
    );

    if bytes.len() != SECRET_KEY_LEN {
        return Err(KeyParseError::invalid_key(
            label,
            format!("expected {SECRET_KEY_LEN} bytes, got {}", bytes.len()),
        ));
    }

    let mut keypair = Zeroizing::new([0u8; SECRET_KEY_LEN]);
    keypair.copy_from_slice(&bytes);
    let signing_key = SigningKey::from_keypair_bytes(&keypair)
        .map_err(|_| KeyParseError::invalid_key(label, "public key does not match secret seed"))?;

    Ok(ParsedSigner::from_signing_key(signing_key))
}

/// Parses every signer in order, stopping at the first bad one.
pub fn parse_signers(signers: &[AdditionalSigner]) -> Result<Vec<ParsedSigner>, KeyParseError> {
    signers.iter().map(parse_signer).collect()
}

/// Creates a fresh co-signer with its keypair rendered as a byte list.
pub fn generate_signer() -> AdditionalSigner {
    let signing_key = SigningKey::generate(&mut OsRng);
    let keypair = Zeroizing::new(signing_key.to_keypair_bytes());
    AdditionalSigner::new(encode_address(&signing_key), format_byte_list(keypair.as_slice()))
}

pub fn format_byte_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_address(signing_key: &SigningKey) -> String {
    bs58::encode(signing_key.verifying_key().to_bytes()).into_string()
}
