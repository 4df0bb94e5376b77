//! Command-line interface for the umlgist utility
//!
//! Summarizes class diagram source, or diagrams laid out by another engine,
//! into the compact semantic model.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use umlgist::core::logging::init_logging;
use umlgist::plugins::Orchestrator;
use umlgist::{DiagramError, RenderConfig};

/// umlgist - Summarize UML class diagrams into a compact JSON model
#[derive(Parser)]
#[command(name = "umlgist")]
#[command(about = "Extract the semantic gist of UML class diagrams as JSON")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error|off)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// JSON layout of written results
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty when writing to a terminal, compact otherwise
    #[default]
    Auto,
    /// Indented JSON
    Pretty,
    /// Single-line JSON
    Compact,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize class diagram source into the compact semantic model
    Summarize {
        /// Input file containing the diagram source (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the model JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON output layout
        #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
        format: OutputFormat,
    },

    /// Lay out class diagram source and print the layouted diagram JSON
    Layout {
        /// Input file containing the diagram source (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the layout JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize a layouted diagram JSON document
    Analyze {
        /// Input file containing the layouted diagram JSON (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the model JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON output layout
        #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
        format: OutputFormat,
    },

    /// Check class diagram source for render errors
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Render configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Main CLI application
#[derive(Default)]
pub struct UmlgistApp {
    verbose: bool,
}

impl UmlgistApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flag defaults
        let log_level = std::env::var("UMLGIST_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("UMLGIST_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        self.verbose = cli.verbose;
        if self.verbose {
            eprintln!("umlgist v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Summarize {
                input,
                output,
                config,
                format,
            } => self.summarize_command(input, output, config, format),
            Commands::Layout {
                input,
                output,
                config,
            } => self.layout_command(input, output, config),
            Commands::Analyze {
                input,
                output,
                format,
            } => self.analyze_command(input, output, format),
            Commands::Validate { input, config } => self.validate_command(input, config),
        }
    }

    /// Handle the summarize command
    fn summarize_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        config: Option<PathBuf>,
        format: OutputFormat,
    ) -> Result<()> {
        let source = self.read_input(input)?;
        let orchestrator = Orchestrator::with_sketch_engine(self.load_config(config)?);
        debug!(bytes = source.len(), engine = orchestrator.engine_name(), "Summarizing source");

        let model = orchestrator.summarize(&source)?;
        if self.verbose {
            eprintln!(
                "Summarized {} node entries and {} associations",
                model.node_entry_count(),
                model.associations.len()
            );
        }

        let json = to_json(&model, self.resolve_format(format, &output))?;
        self.write_output(output, &json)
    }

    /// Handle the layout command
    fn layout_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        config: Option<PathBuf>,
    ) -> Result<()> {
        let source = self.read_input(input)?;
        let orchestrator = Orchestrator::with_sketch_engine(self.load_config(config)?);

        let diagram = orchestrator.layout(&source)?;
        let json = to_json(&diagram, OutputFormat::Pretty)?;
        self.write_output(output, &json)
    }

    /// Handle the analyze command
    fn analyze_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        format: OutputFormat,
    ) -> Result<()> {
        let json = self.read_input(input)?;
        debug!(bytes = json.len(), "Analyzing layouted diagram");
        let model = Orchestrator::default().summarize_layout_json(&json)?;

        let json = to_json(&model, self.resolve_format(format, &output))?;
        self.write_output(output, &json)
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
        let source = self.read_input(input)?;
        let orchestrator = Orchestrator::with_sketch_engine(self.load_config(config)?);

        let result = orchestrator.analyze(&source)?;
        info!(error_count = result.errors.len(), "Validation finished");
        if result.errors.is_empty() {
            match result.graph {
                Some(graph) => println!(
                    "✓ Valid class diagram ({} nodes, {} edges)",
                    graph.node_count(),
                    graph.edge_count()
                ),
                None => println!("✓ Valid class diagram"),
            }
            return Ok(());
        }

        println!("✗ Invalid class diagram:");
        for diagnostic in result.errors.iter() {
            println!("  {}", diagnostic);
        }
        Err(anyhow!("{} render error(s)", result.errors.len()))
    }

    /// Load a render configuration, or the defaults without a path
    pub fn load_config(&self, path: Option<PathBuf>) -> Result<RenderConfig> {
        let Some(path) = path else {
            return Ok(RenderConfig::default());
        };
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        RenderConfig::from_json(&json)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Pick pretty or compact output for `auto`
    fn resolve_format(&self, format: OutputFormat, output: &Option<PathBuf>) -> OutputFormat {
        match format {
            OutputFormat::Auto if writes_to_stdout(output) => {
                if crossterm::tty::IsTty::is_tty(&io::stdout()) {
                    OutputFormat::Pretty
                } else {
                    OutputFormat::Compact
                }
            }
            OutputFormat::Auto => OutputFormat::Compact,
            explicit => explicit,
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if !is_stdio(&path) => fs::read_to_string(&path)
                .map_err(DiagramError::from)
                .with_context(|| format!("Failed to read input file '{}'", path.display())),
            _ => {
                let mut content = String::new();
                io::stdin()
                    .read_to_string(&mut content)
                    .map_err(DiagramError::from)
                    .context("Failed to read standard input")?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if !is_stdio(&path) => {
                fs::write(&path, content)
                    .map_err(DiagramError::from)
                    .with_context(|| format!("Failed to write output file '{}'", path.display()))?;
                if self.verbose {
                    eprintln!("Wrote {} bytes to {}", content.len(), path.display());
                }
            }
            _ => {
                let mut stdout = io::stdout();
                if content.is_empty() || content.ends_with('\n') {
                    write!(stdout, "{}", content)?;
                } else {
                    writeln!(stdout, "{}", content)?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn writes_to_stdout(output: &Option<PathBuf>) -> bool {
    output.as_deref().map_or(true, is_stdio)
}

/// Serialize with an already resolved output format
fn to_json<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let json = match format {
        OutputFormat::Compact => serde_json::to_string(value)?,
        OutputFormat::Pretty | OutputFormat::Auto => serde_json::to_string_pretty(value)?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HELLO_WORLD: &str =
        r#"classDiagram { class("HelloWorld") { public { hello : string } } }"#;

    #[test]
    fn test_cli_parsing_summarize_command() {
        let args = vec![
            "umlgist",
            "summarize",
            "--input",
            "diagram.hyl",
            "--output",
            "model.json",
            "--format",
            "compact",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Summarize {
                input,
                output,
                config,
                format,
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "diagram.hyl");
                assert_eq!(output.unwrap().to_string_lossy(), "model.json");
                assert!(config.is_none());
                assert_eq!(format, OutputFormat::Compact);
            }
            _ => panic!("Expected Summarize command"),
        }
    }

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::try_parse_from(vec!["umlgist", "analyze"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.log_format, LogFormat::Compact);
        match cli.command {
            Commands::Analyze { input, format, .. } => {
                assert!(input.is_none());
                assert_eq!(format, OutputFormat::Auto);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_flags() {
        let args = vec![
            "umlgist",
            "--verbose",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "validate",
            "--config",
            "theme.json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Validate { config: Some(_), .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let args = vec!["umlgist", "summarize", "--format", "yaml"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let app = UmlgistApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("diagram.hyl");
        fs::write(&file_path, HELLO_WORLD).unwrap();

        assert_eq!(app.read_input(Some(file_path)).unwrap(), HELLO_WORLD);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = UmlgistApp::new();
        let err = app
            .read_input(Some(PathBuf::from("/nonexistent/diagram.hyl")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::Io { .. })
        ));
    }

    #[test]
    fn test_write_output_to_missing_directory() {
        let app = UmlgistApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing").join("model.json");

        let err = app.write_output(Some(file_path), "{}").unwrap_err();
        assert!(err.to_string().contains("Failed to write output file"));
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::Io { .. })
        ));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = UmlgistApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("model.json");

        app.write_output(Some(file_path.clone()), "{}").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_load_config_from_file() {
        let app = UmlgistApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        fs::write(&file_path, r#"{ "theme": "dark", "columns": 1 }"#).unwrap();

        let config = app.load_config(Some(file_path)).unwrap();
        assert_eq!(config.columns, 1);
        assert_eq!(config.theme, umlgist::Theme::Dark);
        assert_eq!(app.load_config(None).unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_load_config_rejects_invalid_json() {
        let app = UmlgistApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        fs::write(&file_path, "columns = 1").unwrap();

        assert!(app.load_config(Some(file_path)).is_err());
    }

    #[test]
    fn test_summarize_command_writes_model() {
        let app = UmlgistApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("diagram.hyl");
        let output = dir.path().join("model.json");
        fs::write(&input, HELLO_WORLD).unwrap();

        app.summarize_command(Some(input), Some(output.clone()), None, OutputFormat::Compact)
            .unwrap();

        let model: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(model["classes"][0]["name"], "HelloWorld");
        assert_eq!(model["classes"][0]["members"][0], "hello : string");
        assert_eq!(model["classes"][0]["isAbstract"], false);
    }

    #[test]
    fn test_layout_then_analyze_commands() {
        let app = UmlgistApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("diagram.hyl");
        let layout = dir.path().join("layout.json");
        let model = dir.path().join("model.json");
        fs::write(&input, HELLO_WORLD).unwrap();

        app.layout_command(Some(input), Some(layout.clone()), None)
            .unwrap();
        app.analyze_command(Some(layout), Some(model.clone()), OutputFormat::Pretty)
            .unwrap();

        let written = fs::read_to_string(&model).unwrap();
        assert!(written.contains('\n'));
        let model: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(model["classes"][0]["name"], "HelloWorld");
    }

    #[test]
    fn test_validate_command_reports_errors() {
        let app = UmlgistApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("broken.hyl");
        fs::write(&input, "classDiagram { class(").unwrap();

        assert!(app.validate_command(Some(input), None).is_err());
    }

    #[test]
    fn test_auto_format_to_file_is_compact() {
        let app = UmlgistApp::new();
        let output = Some(PathBuf::from("model.json"));
        assert_eq!(
            app.resolve_format(OutputFormat::Auto, &output),
            OutputFormat::Compact
        );
        assert_eq!(
            app.resolve_format(OutputFormat::Pretty, &output),
            OutputFormat::Pretty
        );
    }
}
