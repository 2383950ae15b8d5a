//! `usher remote`: drive a deployed server over HTTP.

use std::time::Duration;

use tabled::Tabled;
use tracing::debug;

use usher_api::{GeneratedQr, QrValidation, ServerInfo, TransportConfig, WorkerClient};

use crate::cli::{GlobalOpts, RemoteArgs, RemoteCommand};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Detail views ────────────────────────────────────────────────────

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Endpoint")]
    route: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn info_detail(info: &ServerInfo) -> String {
    let header = format!("{} {} ({})", info.name, info.version, info.status);
    let rows: Vec<EndpointRow> = info
        .endpoints
        .iter()
        .map(|(route, description)| EndpointRow {
            route: route.clone(),
            description: description.clone(),
        })
        .collect();
    if rows.is_empty() {
        return header;
    }
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    format!("{header}\n{table}")
}

fn qr_detail(qr: &GeneratedQr) -> String {
    let info = &qr.service_info;
    [
        format!("Service:  {}", info.service_number),
        format!("Opens:    {}", info.start_time.to_rfc3339()),
        format!("Closes:   {}", info.end_time.to_rfc3339()),
        format!("Token:    {}", qr.qr_data),
    ]
    .join("\n")
}

fn validation_detail(v: &QrValidation, color: bool) -> String {
    let mut lines = vec![
        format!("Verdict:  {}", output::verdict(&v.reason, v.is_valid, color)),
        format!("Message:  {}", v.message),
    ];
    if let (Some(from), Some(until)) = (v.valid_from, v.valid_until) {
        lines.push(format!(
            "Window:   {} .. {}",
            from.to_rfc3339(),
            until.to_rfc3339()
        ));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(cfg: &Config, args: RemoteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let url = config::remote_url(args.url.as_deref(), cfg)?;
    let transport = TransportConfig::default().with_timeout(Duration::from_secs(global.timeout));
    let client = WorkerClient::new(url.as_str(), &transport)?;
    debug!(url = %client.base_url(), "calling remote server");

    let out = match args.command {
        RemoteCommand::Info => {
            let info = client.info().await?;
            output::render_single(global.output, &info, info_detail, |i| i.version.clone())?
        }

        RemoteCommand::Generate { service } => {
            let qr = match service {
                Some(n) => client.generate_qr_for_service(n).await?,
                None => client.generate_qr().await?,
            };
            output::render_single(global.output, &qr, qr_detail, |q| q.qr_data.clone())?
        }

        RemoteCommand::Validate { token } => {
            let verdict = client.validate_qr(&token).await?;
            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &verdict,
                |v| validation_detail(v, color),
                |v| v.reason.clone(),
            )?;
            output::print_output(&out, global.quiet);
            if verdict.is_valid {
                return Ok(());
            }
            return Err(CliError::TokenRejected {
                reason: verdict.reason,
                message: verdict.message,
            });
        }

        RemoteCommand::Seal { uid, input } => {
            let data = util::read_json_input(&input)?;
            let sealed = match uid.as_deref() {
                Some(uid) => client.secure_encrypt(util::require_uid(uid)?, &data).await?,
                None => client.encrypt_user_data(&data).await?,
            };
            output::render_single(
                global.output,
                &sealed,
                |s| s.encrypted_data.clone(),
                |s| s.encrypted_data.clone(),
            )?
        }

        RemoteCommand::Unseal { uid, encrypted } => {
            let opened = match uid.as_deref() {
                Some(uid) => {
                    client
                        .secure_decrypt(util::require_uid(uid)?, &encrypted)
                        .await?
                }
                None => client.decrypt_user_data(&encrypted).await?,
            };
            output::render_single(
                global.output,
                &opened,
                |o| serde_json::to_string_pretty(&o.decrypted_data).unwrap_or_default(),
                |o| o.decrypted_data.to_string(),
            )?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
