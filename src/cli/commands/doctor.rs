//! Doctor command - verify system requirements and configuration.

use crate::analysis::OllamaBackend;
use crate::cli::Output;
use crate::config::{Settings, TranscriptionProvider};
use crate::transcription::is_api_key_configured;
use console::style;
use std::path::Path;
use std::process::Command;

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

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks. Returns `false` when any check is an error.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<bool> {
    Output::header("shortsmith doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let mut tools = vec![
        check_tool("yt-dlp", "yt-dlp --version", install_hint_ytdlp()),
        check_tool("ffmpeg", "ffmpeg -version", install_hint_ffmpeg()),
        check_tool("ffprobe", "ffprobe -version", install_hint_ffmpeg()),
    ];
    if settings.transcription.provider == TranscriptionProvider::Local {
        tools.push(check_tool("whisper", "whisper --help", "Install with: pip install openai-whisper"));
    }
    print_section("External Tools", &tools);
    checks.extend(tools);

    let services = vec![
        check_analysis_backend(settings).await,
        check_transcription(settings),
    ];
    print_section("Services", &services);
    checks.extend(services);

    let dirs = check_directories(settings);
    print_section("Directories", &dirs);
    checks.extend(dirs);

    let config = vec![check_config_file(config_path)];
    print_section("Configuration", &config);
    checks.extend(config);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using shortsmith.",
            errors
        ));
        return Ok(false);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! shortsmith is ready to use.");
    }

    Ok(true)
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let parts: Vec<&str> = version_cmd.split_whitespace().collect();
    let Some((cmd, args)) = parts.split_first() else {
        return CheckResult::error(name, "no command given", hint);
    };

    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            let first_line = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display: String = if first_line.chars().count() > 50 {
                format!("{}...", first_line.chars().take(50).collect::<String>())
            } else if first_line.is_empty() {
                "installed".to_string()
            } else {
                first_line
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

/// Reachability of the analysis backend. An outage only degrades planning.
async fn check_analysis_backend(settings: &Settings) -> CheckResult {
    let name = "Analysis backend";
    let backend = match OllamaBackend::from_settings(&settings.analysis) {
        Ok(backend) => backend,
        Err(e) => return CheckResult::error(name, &e.to_string(), "Check [analysis] in the config"),
    };

    let spinner = Output::spinner(&format!("Contacting {}...", settings.analysis.base_url));
    let result = backend.ping().await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => CheckResult::ok(
            name,
            &format!("{} (model {})", settings.analysis.base_url, settings.analysis.model),
        ),
        Err(e) => CheckResult::warning(
            name,
            &e.to_string(),
            "Start it with: ollama serve (segments fall back to uniform cuts meanwhile)",
        ),
    }
}

fn check_transcription(settings: &Settings) -> CheckResult {
    let name = "Transcription";
    match settings.transcription.provider {
        TranscriptionProvider::Local => CheckResult::ok(
            name,
            &format!("local whisper, model {}", settings.transcription.model),
        ),
        TranscriptionProvider::OpenAi if is_api_key_configured() => CheckResult::ok(
            name,
            &format!("OpenAI, model {}", settings.transcription.model),
        ),
        TranscriptionProvider::OpenAi => CheckResult::error(
            name,
            "OPENAI_API_KEY not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check working directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    [
        ("Temp directory", settings.temp_dir()),
        ("Output directory", settings.output_dir()),
        ("Logs directory", settings.logs_dir()),
    ]
    .into_iter()
    .map(|(name, dir)| {
        if dir.is_dir() {
            CheckResult::ok(name, &dir.display().to_string())
        } else {
            CheckResult::warning(
                name,
                &format!("{} (will be created)", dir.display()),
                "Directory will be created on first use",
            )
        }
    })
    .collect()
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: shortsmith config edit",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_tool_is_error() {
        let result = check_tool("nope", "definitely-not-a-real-tool-shortsmith --version", "hint");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.message, "not found");
    }

    #[test]
    fn test_directories_report_missing_as_warning() {
        let root = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.paths.temp_dir = root.path().to_string_lossy().into_owned();
        settings.paths.output_dir = root.path().join("missing").to_string_lossy().into_owned();

        let results = check_directories(&settings);
        assert_eq!(results[0].status, CheckStatus::Ok);
        assert_eq!(results[1].status, CheckStatus::Warning);
    }

    #[test]
    fn test_missing_config_file_is_warning() {
        let result = check_config_file(Path::new("/no/such/shortsmith.toml"));
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_warning() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut settings = Settings::default();
        settings.analysis.base_url = format!("http://{}", addr);
        settings.analysis.timeout_seconds = 2;

        let result = check_analysis_backend(&settings).await;
        assert_eq!(result.status, CheckStatus::Warning);
    }
}
