//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Settings, API_KEY_ENV};
use console::style;
use std::process::Command;
use std::time::Duration;
use url::Url;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Frontline Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let mut section = |title: &str, results: Vec<CheckResult>| {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    };

    section(
        "External Tools",
        vec![
            // Images are the only format that needs OCR, so a missing tool is not fatal.
            downgrade(check_tool(&settings.ocr.command, install_hint_tesseract())),
            downgrade(check_tool(&settings.narration.fallback.command, install_hint_espeak())),
        ],
    );

    section("API Configuration", vec![check_api_key(settings)]);

    section(
        "Voice",
        vec![
            check_speaker_sample(settings),
            check_speech_service(&settings.narration.primary.endpoint).await,
        ],
    );

    section("Configuration", vec![check_config_file()]);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Frontline.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Frontline is ready to use.");
    }

    Ok(())
}

fn downgrade(mut check: CheckResult) -> CheckResult {
    if check.status == CheckStatus::Error {
        check.status = CheckStatus::Warning;
    }
    check
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            // tesseract prints its version on stderr
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let version = stdout
                .lines()
                .chain(stderr.lines())
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("installed");

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version.to_string()
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check if the summarization API key is configured.
fn check_api_key(settings: &Settings) -> CheckResult {
    match settings.summarization_api_key() {
        Some(key) if key.chars().count() > 12 => {
            let head: String = key.chars().take(4).collect();
            let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            CheckResult::ok(API_KEY_ENV, &format!("configured ({}...{})", head, tail))
        }
        Some(_) => CheckResult::warning(
            API_KEY_ENV,
            "set but looks too short",
            "Expected format: gsk_... (Groq API key)",
        ),
        None => CheckResult::error(
            API_KEY_ENV,
            "not set",
            &format!("Set with: export {}='gsk_...'", API_KEY_ENV),
        ),
    }
}

/// Check the reference speaker sample used for voice cloning.
fn check_speaker_sample(settings: &Settings) -> CheckResult {
    let Some(path) = settings.reference_speaker_path() else {
        return CheckResult::warning(
            "Speaker sample",
            "not configured",
            "Set narration.reference_speaker_path; only the fallback voice will be used",
        );
    };

    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > 0 => CheckResult::ok(
            "Speaker sample",
            &format!("{} ({})", path.display(), format_size(meta.len())),
        ),
        Ok(_) => CheckResult::warning(
            "Speaker sample",
            &format!("{} is empty", path.display()),
            "Record a few seconds of clean speech as WAV",
        ),
        Err(_) => CheckResult::warning(
            "Speaker sample",
            &format!("{} not found", path.display()),
            "Only the fallback voice will be used",
        ),
    }
}

/// Check that the voice-cloning server accepts TCP connections.
async fn check_speech_service(endpoint: &str) -> CheckResult {
    let name = "Speech server";
    let hint = "Start the XTTS server or set narration.primary.endpoint";

    let url = match Url::parse(endpoint) {
        Ok(url) => url,
        Err(e) => return CheckResult::error(name, &format!("invalid endpoint: {}", e), hint),
    };
    let (Some(host), Some(port)) = (url.host_str(), url.port_or_known_default()) else {
        return CheckResult::error(name, "endpoint has no host", hint);
    };

    let connect = tokio::net::TcpStream::connect((host, port));
    match tokio::time::timeout(Duration::from_secs(3), connect).await {
        Ok(Ok(_)) => CheckResult::ok(name, &format!("reachable at {}", endpoint)),
        Ok(Err(e)) => CheckResult::warning(
            name,
            &format!("{} unreachable: {}", endpoint, e),
            "Narration will use the fallback voice",
        ),
        Err(_) => CheckResult::warning(
            name,
            &format!("{} timed out", endpoint),
            "Narration will use the fallback voice",
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: frontline config edit",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Platform-specific install hint for tesseract.
fn install_hint_tesseract() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install tesseract (needed for images only)"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install tesseract-ocr (needed for images only)"
    } else {
        "Install from: https://github.com/tesseract-ocr/tesseract"
    }
}

/// Platform-specific install hint for espeak-ng.
fn install_hint_espeak() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install espeak-ng (fallback voice)"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install espeak-ng (fallback voice)"
    } else {
        "Install from: https://github.com/espeak-ng/espeak-ng"
    }
}
