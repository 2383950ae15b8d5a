//! `usher seal` / `usher unseal`: encrypt JSON with the server's keys.
//!
//! With `--uid` the per-subject key (cache secret) is used, matching
//! `/secure-encrypt`; without it the user-data key, matching
//! `/encrypt-user-data`.

use serde_json::Value;
use tracing::debug;

use usher_core::TokenCipher;
use usher_server::ops;

use crate::cli::{GlobalOpts, SealArgs, SecretArg, UnsealArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

/// Pick the cipher for `uid`, plus the failure message its endpoint uses.
fn cipher_for(cfg: &Config, uid: Option<&str>) -> Result<(TokenCipher, &'static str), CliError> {
    match uid {
        Some(uid) => {
            let uid = util::require_uid(uid)?;
            let secret = config::secret(cfg, SecretArg::Cache)?;
            debug!("deriving per-subject key");
            Ok((
                TokenCipher::for_subject(uid, &secret),
                "Failed to decrypt data securely",
            ))
        }
        None => {
            let secret = config::secret(cfg, SecretArg::UserData)?;
            Ok((
                TokenCipher::from_secret(&secret),
                "Failed to decrypt user data",
            ))
        }
    }
}

/// The plaintext each endpoint seals: per-subject data is serialized as
/// given, user data must be an object, array, or a string holding JSON.
fn seal_text(data: &Value, uid: Option<&str>) -> Result<String, CliError> {
    match uid {
        Some(_) => Ok(data.to_string()),
        None => Ok(ops::user_data_text(data)?),
    }
}

pub fn seal(cfg: &Config, args: &SealArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let data = util::read_json_input(&args.input)?;
    let text = seal_text(&data, args.uid.as_deref())?;
    let (cipher, _) = cipher_for(cfg, args.uid.as_deref())?;
    let now = config::evaluation_instant(global)?;

    let sealed = ops::sealed(&cipher, &text, now)?;

    let out = output::render_single(
        global.output,
        &sealed,
        |s| s.encrypted_data.clone(),
        |s| s.encrypted_data.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn unseal(cfg: &Config, args: &UnsealArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (cipher, failure) = cipher_for(cfg, args.uid.as_deref())?;
    let opened = ops::opened(&cipher, args.encrypted.trim(), failure)?;

    let out = output::render_single(
        global.output,
        &opened,
        |o| serde_json::to_string_pretty(&o.decrypted_data).unwrap_or_default(),
        |o| o.decrypted_data.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
