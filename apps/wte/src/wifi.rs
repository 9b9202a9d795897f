//! Nearby access point discovery through the platform's WiFi tooling.
//!
//! Every scanner yields rows of `"<bssid> <channel>"`, the form the locator
//! parses.

use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info};

const AIRPORT: (&str, &[&str]) = ("airport", &["-s"]);
const NMCLI: (&str, &[&str]) = ("nmcli", &["-t", "-f", "BSSID,CHAN", "dev", "wifi", "list"]);
const NETSH: (&str, &[&str]) = ("netsh", &["wlan", "show", "networks", "mode=bssid"]);

static MAC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{2}(?::[0-9a-f]{2}){5}$").expect("mac pattern is valid")
});
static AIRPORT_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9a-f]{2}(?::[0-9a-f]{2}){5})\s+-?\d+\s+(\d+)")
        .expect("airport pattern is valid")
});
static NETSH_BSSID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*BSSID\s+\d+\s*:\s*([0-9a-f]{2}(?::[0-9a-f]{2}){5})")
        .expect("netsh bssid pattern is valid")
});
static NETSH_CHANNEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*Channel\s*:\s*(\d+)").expect("netsh channel pattern is valid")
});

#[derive(Debug, thiserror::Error)]
pub(crate) enum ScanError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: &'static str,
        source: std::io::Error,
    },
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: &'static str,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

pub(crate) async fn scan() -> Result<Vec<String>, ScanError> {
    let rows = match std::env::consts::OS {
        "macos" => parse_airport(&run(AIRPORT).await?),
        "windows" => parse_netsh(&run(NETSH).await?),
        _ => parse_nmcli(&run(NMCLI).await?),
    };
    info!(event = "wifi_scanned", os = std::env::consts::OS, access_points = rows.len());
    Ok(rows)
}

async fn run((command, args): (&'static str, &[&str])) -> Result<String, ScanError> {
    debug!(event = "wifi_scan_command", command = %command);
    let output = Command::new(command)
        .args(args)
        .output()
        .await
        .map_err(|source| ScanError::Spawn { command, source })?;
    if !output.status.success() {
        return Err(ScanError::Failed {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `airport -s`: one network per line with BSSID, RSSI and channel columns.
fn parse_airport(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| AIRPORT_ROW.captures(line))
        .map(|caps| row(&caps[1], &caps[2]))
        .collect()
}

/// `nmcli -t -f BSSID,CHAN`: colons inside the BSSID are escaped as `\:`.
fn parse_nmcli(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let (bssid, channel) = line.trim().rsplit_once(':')?;
            let bssid = bssid.replace("\\:", ":");
            let channel = channel.trim();
            let numeric = !channel.is_empty() && channel.bytes().all(|b| b.is_ascii_digit());
            if !MAC.is_match(&bssid) || !numeric {
                return None;
            }
            Some(row(&bssid, channel))
        })
        .collect()
}

/// `netsh wlan show networks mode=bssid`: a `BSSID n` line followed, a few
/// lines later, by its `Channel` line.
fn parse_netsh(output: &str) -> Vec<String> {
    let mut rows = Vec::new();
    let mut pending: Option<String> = None;
    for line in output.lines() {
        if let Some(caps) = NETSH_BSSID.captures(line) {
            pending = Some(caps[1].to_string());
        } else if let Some(caps) = NETSH_CHANNEL.captures(line)
            && let Some(bssid) = pending.take()
        {
            rows.push(row(&bssid, &caps[1]));
        }
    }
    rows
}

fn row(bssid: &str, channel: &str) -> String {
    format!("{} {channel}", bssid.to_ascii_lowercase())
}
