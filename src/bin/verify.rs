//! Avatar bot setup verifier.
//!
//! Runs once and prints a checklist: configuration shape, the HTTP stack the
//! bot relies on, and whether the web app answers at `WEB_APP_URL`.  Exits 0
//! when every check passes, 1 otherwise.  Missing page markers are warnings
//! only.

use anyhow::{Context, Result};
use avatarbot::config::{check_bot_token, check_web_app_url, RawConfig};
use std::time::Duration;

/// Upper bound on the whole connectivity request, body included.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const SEPARATOR_WIDTH: usize = 50;

const TELEGRAM_SDK_MARKER: &str = "telegram-web-app.js";
const READY_PLAYER_ME_MARKER: &str = "readyplayer.me";

// ── Report ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Heading,
    Pass,
    Fail,
    Warn,
    Hint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    level: Level,
    text: String,
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            Level::Heading => write!(f, "{}", self.text),
            Level::Pass => write!(f, "   ✅ {}", self.text),
            Level::Fail => write!(f, "   ❌ {}", self.text),
            Level::Warn => write!(f, "   ⚠️  Warning: {}", self.text),
            Level::Hint => write!(f, "   💡 {}", self.text),
        }
    }
}

/// Checklist output plus the pass/fail verdict.
///
/// With `echo` set every line is printed as soon as it is recorded, failures
/// on stderr.
struct Report {
    lines: Vec<Line>,
    has_errors: bool,
    echo: bool,
}

impl Report {
    fn new(echo: bool) -> Self {
        Self {
            lines: Vec::new(),
            has_errors: false,
            echo,
        }
    }

    fn push(&mut self, level: Level, text: impl Into<String>) {
        let line = Line {
            level,
            text: text.into(),
        };
        if self.echo {
            if level == Level::Fail {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
        self.lines.push(line);
    }

    fn heading(&mut self, text: impl Into<String>) {
        self.push(Level::Heading, text);
    }

    fn pass(&mut self, text: impl Into<String>) {
        self.push(Level::Pass, text);
    }

    fn fail(&mut self, text: impl Into<String>, hint: &str) {
        self.has_errors = true;
        self.push(Level::Fail, text);
        self.push(Level::Hint, hint);
    }

    fn warn(&mut self, text: impl Into<String>) {
        self.push(Level::Warn, text);
    }

    fn exit_code(&self) -> i32 {
        if self.has_errors {
            1
        } else {
            0
        }
    }

    #[cfg(test)]
    fn texts(&self, level: Level) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.level == level)
            .map(|l| l.text.as_str())
            .collect()
    }
}

// ── Runtime dependencies ───────────────────────────────────────────────────────

/// A runtime component the bot needs, checked by constructing it.
struct Dependency {
    name: &'static str,
    probe: fn() -> Result<()>,
    hint: &'static str,
}

fn probe_teloxide() -> Result<()> {
    teloxide::net::default_reqwest_settings()
        .build()
        .context("Bot API client could not be built")?;
    Ok(())
}

fn probe_reqwest() -> Result<()> {
    reqwest::Client::builder()
        .https_only(true)
        .build()
        .context("HTTPS client could not be built")?;
    Ok(())
}

fn default_dependencies() -> Vec<Dependency> {
    vec![
        Dependency {
            name: "teloxide",
            probe: probe_teloxide,
            hint: "Run: cargo build (and check the system TLS certificates)",
        },
        Dependency {
            name: "reqwest",
            probe: probe_reqwest,
            hint: "Run: cargo build (and check the system TLS certificates)",
        },
    ]
}

// ── Checks ─────────────────────────────────────────────────────────────────────

struct Verifier {
    dependencies: Vec<Dependency>,
    timeout: Duration,
}

impl Verifier {
    fn new() -> Self {
        Self {
            dependencies: default_dependencies(),
            timeout: CONNECT_TIMEOUT,
        }
    }

    async fn run(&self, raw: &RawConfig, report: &mut Report) {
        report.heading("1️⃣ Checking environment variables...");
        let url = check_environment(raw, report);
        report.heading("");

        report.heading("2️⃣ Checking dependencies...");
        self.check_dependencies(report);
        report.heading("");

        match url {
            Some(url) => {
                report.heading("3️⃣ Checking web app accessibility...");
                self.check_web_app(&url, report).await;
            }
            None => report.heading("3️⃣ Skipping web app check (invalid URL)"),
        }

        summarize(report);
    }

    fn check_dependencies(&self, report: &mut Report) {
        for dep in &self.dependencies {
            match (dep.probe)() {
                Ok(()) => report.pass(format!("{} is available", dep.name)),
                Err(e) => report.fail(format!("{} is not usable: {:#}", dep.name, e), dep.hint),
            }
        }
    }

    /// Single GET, redirects not followed; only a 200 passes. Page markers
    /// are advisory.
    async fn check_web_app(&self, url: &str, report: &mut Report) {
        let client = match reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                report.fail(
                    format!("Cannot build HTTP client: {}", e),
                    "Check the system TLS certificates",
                );
                return;
            }
        };

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                report.fail(
                    format!("Cannot access web app: {}", e),
                    "Check that the URL is correct and accessible",
                );
                return;
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            report.fail(
                format!("Web app returned HTTP {}", status.as_u16()),
                "Make sure your GitHub Pages is deployed or ngrok is running",
            );
            return;
        }
        report.pass("Web app is accessible (HTTP 200)");

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                report.fail(
                    format!("Cannot read web app response: {}", e),
                    "Check that the URL is correct and accessible",
                );
                return;
            }
        };

        if body.contains(TELEGRAM_SDK_MARKER) {
            report.pass("Telegram WebApp SDK detected");
        } else {
            report.warn("Telegram WebApp SDK script not found");
        }

        if body.contains(READY_PLAYER_ME_MARKER) {
            report.pass("Ready Player Me integration detected");
        } else {
            report.warn("Ready Player Me iframe not found");
        }
    }
}

/// Returns the URL to probe when it passed its shape check.
fn check_environment(raw: &RawConfig, report: &mut Report) -> Option<String> {
    match check_bot_token(raw.bot_token.as_deref()) {
        Ok(_) => report.pass("BOT_TOKEN is set and looks valid"),
        Err(issue) => report.fail(issue.to_string(), issue.hint()),
    }

    match check_web_app_url(raw.web_app_url.as_deref()) {
        Ok(url) => {
            report.pass("WEB_APP_URL is set and uses HTTPS");
            Some(url.to_string())
        }
        Err(issue) => {
            report.fail(issue.to_string(), issue.hint());
            None
        }
    }
}

fn summarize(report: &mut Report) {
    report.heading("");
    report.heading("=".repeat(SEPARATOR_WIDTH));
    report.heading("");

    if report.has_errors {
        report.heading("❌ Setup has issues - please fix the errors above");
        report.heading("📖 Check QUICKSTART.md for setup instructions");
    } else {
        report.heading("✅ All checks passed! Your bot is ready to run!");
        report.heading("🚀 Start your bot with: cargo run --bin avatarbot");
        report.heading("📱 Then open Telegram and send /start to your bot");
    }
}

// ── Entry point ────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    println!("\n🔍 Verifying 3D Avatar Bot Setup...\n");

    let raw = RawConfig::from_env();
    let mut report = Report::new(true);
    Verifier::new().run(&raw, &mut report).await;

    std::process::exit(report.exit_code());
}

// ── Tests ──────────────────────────────────────────────────────────────────────
