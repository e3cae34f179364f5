use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Replace `[namespace:path]` tokens in text with values from your data files.",
	long_about = "token-filter replaces global and entity tokens such as `[site:name]` or \
	              `[node:author:name]` with their values.\n\nGlobal data comes from the `[data]` \
	              table of token_filter.toml; the entity being rendered is passed explicitly \
	              with `--entity-type` and `--entity`.\n\nQuick start:\n  token-filter init    \
	              Create a sample config\n  token-filter render  Replace tokens in a file or \
	              stdin\n  token-filter scan    List the tokens in a file\n  token-filter tips    \
	              Print the filter's help text"
)]
pub struct TokenFilterCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory holding token_filter.toml.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `token_filter.toml` and `site.json`.
	///
	/// Existing files are left untouched.
	Init,
	/// Replace tokens in a file (or stdin) and print the result.
	///
	/// Global namespaces come from the `[data]` table of the config. Pass the
	/// content entity being rendered with `--entity-type` and `--entity`; the
	/// entity type is mapped to its token type (e.g. `taxonomy_term` becomes
	/// `term`).
	Render {
		/// File to read. Reads stdin when omitted.
		file: Option<PathBuf>,

		/// Entity type id of the entity being rendered, e.g. `node`.
		#[arg(long, requires = "entity")]
		entity_type: Option<String>,

		/// Data file (json, toml, yaml) holding the entity being rendered.
		#[arg(long, requires = "entity_type")]
		entity: Option<PathBuf>,

		/// Language code to process the text for. Defaults to the config's
		/// `langcode`, then `en`.
		#[arg(long)]
		langcode: Option<String>,

		/// Show a diff between the input and the processed text instead of the
		/// processed text.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format. `json` prints the full filter result including the
		/// unresolved tokens.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the tokens found in a file (or stdin), grouped by namespace.
	Scan {
		/// File to read. Reads stdin when omitted.
		file: Option<PathBuf>,

		/// Output format for the token list.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Print the filter's help text.
	Tips {
		/// Token types in scope, e.g. `node`. May be repeated.
		#[arg(long = "token-type")]
		token_types: Vec<String>,

		/// Entity types of the current route's entity parameters. Mapped to
		/// token types and added to `--token-type`.
		#[arg(long = "route-entity")]
		route_entities: Vec<String>,

		/// Include the list of global namespaces.
		#[arg(long, default_value_t = false)]
		long: bool,
	},
	/// List the registered namespaces.
	Namespaces,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
