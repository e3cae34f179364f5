use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use token_filter_cli::Commands;
use token_filter_cli::OutputFormat;
use token_filter_cli::TokenFilterCli;
use token_filter_core::RouteParameter;
use token_filter_core::TokenContext;
use token_filter_core::TokenFilter;
use token_filter_core::TokenFilterConfig;
use token_filter_core::TokenFilterError;
use token_filter_core::TokenRegistry;
use token_filter_core::ValueResolver;
use token_filter_core::parse_data_file;
use token_filter_core::scan_by_namespace;
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TokenFilterCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminals without color.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Render {
			file,
			entity_type,
			entity,
			langcode,
			diff,
			format,
		}) => {
			run_render(
				&args,
				&RenderArgs {
					file: file.as_deref(),
					entity_type: entity_type.as_deref(),
					entity: entity.as_deref(),
					langcode: langcode.as_deref(),
					diff: *diff,
					format: *format,
				},
			)
		}
		Some(Commands::Scan { file, format }) => run_scan(file.as_deref(), *format),
		Some(Commands::Tips {
			token_types,
			route_entities,
			long,
		}) => run_tips(&args, token_types, route_entities, *long),
		Some(Commands::Namespaces) => run_namespaces(&args),
		None => {
			eprintln!("No subcommand specified. Run `token-filter --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<TokenFilterError>() {
			Ok(filter_err) => {
				let report: miette::Report = (*filter_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so rendered text on stdout stays clean. `RUST_LOG` wins
/// over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn resolve_root(args: &TokenFilterCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(root: &Path) -> Result<TokenFilterConfig, TokenFilterError> {
	let config = TokenFilterConfig::load(root)?;
	if config.is_none() {
		tracing::debug!(root = %root.display(), "no config file found, using defaults");
	}
	Ok(config.unwrap_or_default())
}

/// Read the input text from `file`, or from stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String, std::io::Error> {
	match file {
		Some(path) => std::fs::read_to_string(path),
		None => {
			let stdin = std::io::stdin();
			if stdin.is_terminal() {
				tracing::info!("reading from stdin, press Ctrl-D to finish");
			}
			std::io::read_to_string(stdin)
		}
	}
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn run_init(args: &TokenFilterCli) -> CliResult {
	let root = resolve_root(args);
	let data_path = root.join("site.json");
	let config_path = root.join("token_filter.toml");

	let data_exists = data_path.exists();

	if data_exists {
		println!("Data file already exists: {}", data_path.display());
	} else {
		let sample_data = "{\n  \"name\": \"My Site\",\n  \"slogan\": \"Built with tokens\",\n  \
		                   \"mail\": \"admin@example.com\"\n}\n";

		std::fs::write(&data_path, sample_data)?;
		println!("Created data file: {}", data_path.display());
	}

	if config_path.exists() {
		println!("Config file already exists: {}", config_path.display());
	} else {
		let sample_config = "# token-filter configuration\n\n# Language code passed through with \
		                     every processed text.\nlangcode = \"en\"\n\n# Map namespaces to data \
		                     files.\n# Values from these files are available as [namespace:path] \
		                     tokens.\n[data]\nsite = \"site.json\"\n\n# How unresolved tokens are \
		                     handled: \"preserve\" (default) or \"clear\".\n# [filter]\n# \
		                     unresolved = \"preserve\"\n# escape_html = false\n# passes = 1\n\n# \
		                     Extra entity type to token type mappings.\n# [entity_types]\n# \
		                     media_item = \"media\"\n";

		std::fs::write(&config_path, sample_config)?;
		println!("Created token_filter.toml");
	}

	if !data_exists {
		println!();
		println!("Next steps:");
		println!("  1. Edit {} to hold your site data", data_path.display());
		println!("  2. Write tokens in your text:");
		println!("     Welcome to [site:name]!");
		println!("  3. Run `token-filter render <FILE>` to replace them");
	}

	Ok(())
}

struct RenderArgs<'a> {
	file: Option<&'a Path>,
	entity_type: Option<&'a str>,
	entity: Option<&'a Path>,
	langcode: Option<&'a str>,
	diff: bool,
	format: OutputFormat,
}

fn run_render(args: &TokenFilterCli, render: &RenderArgs<'_>) -> CliResult {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let mut registry = config.registry(&root)?;
	let mut context = registry.global_context();

	if let (Some(entity_type), Some(entity_path)) = (render.entity_type, render.entity) {
		let mapper = config.entity_mapper();
		let token_type = mapper.token_type_for(entity_type).to_string();
		if !registry.contains(&token_type) {
			registry.register_namespace(token_type.clone(), ValueResolver);
		}

		let entity = read_entity(entity_path)?;
		context.insert_entity(&mapper, entity_type, entity);
		tracing::debug!(entity_type, token_type = %token_type, "added entity to the context");
	}

	let input = read_input(render.file)?;
	let langcode = render.langcode.unwrap_or_else(|| config.langcode());
	let filter = TokenFilter::new(Arc::new(registry), config.filter.clone());
	let result = filter.process(&input, &context, langcode);

	for raw in &result.unresolved {
		tracing::warn!(token = %raw, "token could not be resolved");
	}

	match render.format {
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&result)?);
		}
		OutputFormat::Text if render.diff => {
			if input == result.text {
				eprintln!("{}", colored!("No tokens were replaced.", yellow));
			} else {
				print_diff(&input, &result.text);
				eprintln!(
					"\n{} {} replaced, {} unresolved",
					colored!("Summary:", bold),
					result.replacements,
					result.unresolved.len()
				);
			}
		}
		OutputFormat::Text => {
			print!("{}", result.text);
		}
	}

	Ok(())
}

/// Parse an entity data file. The format follows the file extension and
/// defaults to json.
fn read_entity(path: &Path) -> Result<serde_json::Value, TokenFilterError> {
	let path_display = path.display().to_string();
	let content =
		std::fs::read_to_string(path).map_err(|e| {
			TokenFilterError::DataFile {
				path: path_display.clone(),
				reason: e.to_string(),
			}
		})?;
	let format = path
		.extension()
		.and_then(|ext| ext.to_str())
		.map_or_else(|| "json".to_string(), str::to_lowercase);

	parse_data_file(&content, &format, &path_display)
}

fn run_scan(file: Option<&Path>, format: OutputFormat) -> CliResult {
	let input = read_input(file)?;
	let grouped = scan_by_namespace(&input);

	if matches!(format, OutputFormat::Json) {
		println!("{}", serde_json::to_string_pretty(&grouped)?);
		return Ok(());
	}

	if grouped.is_empty() {
		println!("No tokens found.");
		return Ok(());
	}

	let total: usize = grouped.values().map(Vec::len).sum();

	for (namespace, tokens) in &grouped {
		print_section(&format!("{namespace} ({})", tokens.len()));
		for token in tokens {
			match &token.fallback {
				Some(fallback) => {
					println!(
						"  {:<32} {}..{} (fallback: {fallback})",
						token.raw, token.span.start, token.span.end
					);
				}
				None => {
					println!(
						"  {:<32} {}..{}",
						token.raw, token.span.start, token.span.end
					);
				}
			}
		}
	}

	println!();
	println!(
		"{} token(s) in {} namespace(s)",
		colored!(total.to_string(), green),
		grouped.len()
	);

	Ok(())
}

fn run_tips(
	args: &TokenFilterCli,
	token_types: &[String],
	route_entities: &[String],
	long: bool,
) -> CliResult {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let registry = config.registry(&root)?;

	let parameters: Vec<RouteParameter> = route_entities
		.iter()
		.map(|entity_type| RouteParameter::entity(entity_type.clone(), entity_type.clone()))
		.collect();
	let mut types = token_types.to_vec();
	for token_type in config.entity_mapper().token_types_for_route(&parameters) {
		if !types.contains(&token_type) {
			types.push(token_type);
		}
	}

	println!("{}", token_filter_core::render_tips(&types, long, &registry));

	Ok(())
}

fn run_namespaces(args: &TokenFilterCli) -> CliResult {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let registry = config.registry(&root)?;
	print_namespaces(&registry, &registry.global_context());

	Ok(())
}

fn print_namespaces(registry: &TokenRegistry, globals: &TokenContext) {
	let namespaces = registry.namespaces();
	if namespaces.is_empty() {
		println!("No namespaces registered.");
		return;
	}

	for info in namespaces {
		let kind = if info.global { "global" } else { "entity" };
		let keys = globals
			.get(&info.name)
			.and_then(serde_json::Value::as_object)
			.map(|object| object.keys().cloned().collect::<Vec<_>>().join(", "))
			.unwrap_or_default();

		if keys.is_empty() {
			println!("{} ({kind})", colored!(info.name, bold));
		} else {
			println!("{} ({kind}): {keys}", colored!(info.name, bold));
		}
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
