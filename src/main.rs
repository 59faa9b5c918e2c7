use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use weekly_report::{
    Outcome, ReportClient,
    config::Config,
    error::Result,
    i18n::Messages,
    markdown,
    prompt::prompt_for,
    session::Session,
    surface::{Frame, Osc52Clipboard, RenderSurface, copy_output},
    types::{FormType, Notice},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Form {
    Paragraph,
    Outline,
}

impl From<Form> for FormType {
    fn from(form: Form) -> Self {
        match form {
            Form::Paragraph => FormType::Paragraph,
            Form::Outline => FormType::Outline,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "weekly-report", about = "Stream a generated weekly report to the terminal")]
struct Cli {
    /// Work notes; read from stdin when omitted
    text: Option<String>,

    /// Read configuration from this dotenv file instead of the environment
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Generation endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Forward a user-supplied API key with the request
    #[arg(long)]
    use_user_key: bool,

    /// API key to forward when user keys are enabled
    #[arg(long, env = "WEEKLY_REPORT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Message locale
    #[arg(long)]
    locale: Option<String>,

    /// Directory holding <locale>.json message files
    #[arg(long)]
    messages_dir: Option<PathBuf>,

    /// Prompt template to use
    #[arg(long, value_enum, default_value = "paragraph")]
    form: Form,

    /// Write the rendered HTML to this file when the stream ends
    #[arg(long)]
    html: Option<PathBuf>,

    /// Copy the report to the terminal clipboard (OSC 52)
    #[arg(long)]
    copy: bool,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.env_file {
            Some(path) => Config::from_env_file(path)?,
            None => Config::from_env()?,
        };
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if self.use_user_key {
            config = config.with_use_user_key(true);
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(locale) = &self.locale {
            config = config.with_locale(locale.clone());
        }
        if let Some(dir) = &self.messages_dir {
            config = config.with_messages_dir(dir.clone());
        }
        Ok(config)
    }
}

/// 把每次新增的内容直接写到终端
///
/// 第一次写入失败后停止输出，错误留给调用方在提交结束后检查
struct TerminalSurface<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TerminalSurface<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn write_frame(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        self.out.write_all(frame.delta.as_bytes())?;
        if !frame.loading && !frame.text.is_empty() {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn render(&mut self, frame: &Frame<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.write_frame(frame) {
            warn!("Failed to write to terminal: {}", e);
            self.error = Some(e);
        }
    }

    fn notify(&mut self, notice: &Notice) {
        eprintln!("{}", notice);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let text = match &cli.text {
        Some(text) => text.clone(),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let config = cli.config()?;
    let messages = Messages::from_config(&config)?;
    let prompt = prompt_for(&messages, cli.form.into(), &text);
    let client = ReportClient::new(config);
    let credential = client.config().api_key().map(str::to_string);

    let session = Session::new();
    let mut surface = TerminalSurface::new(io::stdout());
    let outcome = client
        .submit(&session, &mut surface, &prompt, credential.as_deref())
        .await?;
    if let Some(e) = surface.take_error() {
        return Err(e.into());
    }
    if let Outcome::Completed(report) = &outcome {
        info!("Report finished with {} bytes", report.len());
    }

    if let Some(path) = &cli.html {
        fs::write(path, markdown::to_html(&session.text()))?;
    }
    if cli.copy {
        let mut clipboard = Osc52Clipboard::new(io::stdout());
        copy_output(&session, &mut clipboard, &mut surface)?;
    }
    Ok(())
}
