//! `usher generate` and `usher validate`: local token operations.
//!
//! Output bodies are the same types the HTTP boundary returns, so
//! `-o json` here matches what `/generate-qr` and `/validate-qr` send.

use usher_core::{CoreError, QrTokenService, format_instant};
use usher_server::ops::{QrResponse, ValidateResponse};

use crate::cli::{GenerateArgs, GlobalOpts, SecretArg, ValidateArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Detail views ────────────────────────────────────────────────────

fn qr_detail(qr: &QrResponse) -> String {
    let info = &qr.service_info;
    [
        format!("Service:  {}", info.service_number),
        format!("Opens:    {}", format_instant(&info.start)),
        format!("Closes:   {}", format_instant(&info.end)),
        format!("Token:    {}", qr.qr_data),
    ]
    .join("\n")
}

fn validation_detail(v: &ValidateResponse, color: bool) -> String {
    let mut lines = vec![
        format!(
            "Verdict:  {}",
            output::verdict(v.reason.as_ref(), v.is_valid, color)
        ),
        format!("Message:  {}", v.message),
    ];
    if let Some(ref payload) = v.payload {
        if let Some(service) = payload.service_number {
            lines.push(format!("Service:  {service}"));
        }
        lines.push(format!("Resource: {}", payload.resource_path));
    }
    if let (Some(from), Some(until)) = (&v.valid_from, &v.valid_until) {
        lines.push(format!("Window:   {from} .. {until}"));
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn generate(cfg: &Config, args: &GenerateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let tokens = cfg.token_service()?;
    let secret = config::secret(cfg, SecretArg::Qr)?;
    let now = config::evaluation_instant(global)?;

    let issued = match args.service {
        Some(service) => tokens
            .generate_for_service(service, now, &secret)
            .map_err(|e| service_error(e, &tokens))?,
        None => tokens.generate_for_now(now, &secret).map_err(|e| match e {
            CoreError::NoActiveService => CliError::NoActiveService {
                at: format_instant(&now),
            },
            other => other.into(),
        })?,
    };

    let qr = QrResponse::from(issued);
    let out = output::render_single(global.output, &qr, qr_detail, |q| q.qr_data.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Prints the verdict, then fails with a distinct exit code if rejected.
pub fn validate(cfg: &Config, args: &ValidateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let tokens = cfg.token_service()?;
    let secret = config::secret(cfg, SecretArg::Qr)?;
    let now = config::evaluation_instant(global)?;

    let response = ValidateResponse::from(tokens.validate(&args.token, &secret, now));
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &response,
        |v| validation_detail(v, color),
        |v| v.reason.to_string(),
    )?;
    output::print_output(&out, global.quiet);

    if response.is_valid {
        Ok(())
    } else {
        Err(CliError::TokenRejected {
            reason: response.reason.to_string(),
            message: response.message,
        })
    }
}

/// Name the configured services when a service number is unknown.
fn service_error(err: CoreError, tokens: &QrTokenService) -> CliError {
    match err {
        CoreError::InvalidServiceNumber { service } => {
            let available = tokens
                .scheduler()
                .service_numbers()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            CliError::InvalidService {
                service,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            }
        }
        other => other.into(),
    }
}
