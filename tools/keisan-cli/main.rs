use ahash::AHashMap;
use clap::{Parser, Subcommand, ValueEnum};
use keisan::ast::DisplayExpression;
use keisan::prelude::*;
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeCli {
    Single,
    All,
}

impl From<ModeCli> for ChildRecordMode {
    fn from(mode: ModeCli) -> Self {
        match mode {
            ModeCli::Single => ChildRecordMode::Single,
            ModeCli::All => ChildRecordMode::All,
        }
    }
}

/// Formula step calculator and attachment filter previewer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to an engine config JSON file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate a formula with the given variable values
    Calc {
        formula: String,
        /// A variable value as name=value; may be repeated
        #[arg(short, long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// JSON list of field options ({label, value, type}) used to label inputs
        #[arg(short, long)]
        fields: Option<String>,
        /// Prompt for any variable without a value
        #[arg(short = 'i', long)]
        human: bool,
        /// Print the evaluated expression tree
        #[arg(long)]
        tree: bool,
    },
    /// Print the WHERE clause for a JSON list of filter conditions
    Where { conditions_path: String },
    /// Print the query preview for a relationship
    Query {
        /// API name of the related object
        #[arg(long)]
        object: String,
        /// Lookup field on the related object pointing at the record
        #[arg(long)]
        relationship: String,
        #[arg(long, value_enum, default_value = "all")]
        mode: ModeCli,
        #[arg(long)]
        max: Option<u32>,
        /// JSON list of filter conditions
        #[arg(long)]
        conditions: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Calc {
            formula,
            vars,
            fields,
            human,
            tree,
        } => run_calc(config, &formula, vars, fields, human, tree),
        Command::Where { conditions_path } => {
            let conditions = load_conditions(&conditions_path);
            println!("{}", build_where_clause(conditions.conditions()));
        }
        Command::Query {
            object,
            relationship,
            mode,
            max,
            conditions,
        } => {
            let descriptor = RelationshipDescriptor {
                related_object_api: object,
                relationship_name: relationship,
                relationship_type: RelationshipType::Child,
            };
            let clause = conditions
                .map(|path| build_where_clause(load_conditions(&path).conditions()))
                .unwrap_or_default();
            let max = max.unwrap_or(config.default_max_child_records);
            println!(
                "{}",
                compose_query_preview(Some(&descriptor), mode.into(), &clause, max)
            );
        }
    }
}

fn run_calc(
    config: EngineConfig,
    formula: &str,
    vars: Vec<(String, String)>,
    fields_path: Option<String>,
    human: bool,
    tree: bool,
) {
    let fields: Vec<FieldOption> = match fields_path {
        Some(path) => {
            let json = fs::read_to_string(&path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read fields file '{}': {}", path, e))
            });
            serde_json::from_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse fields JSON: {}", e)))
        }
        None => Vec::new(),
    };
    let catalog = VariableCatalog::new(fields, Vec::new());
    let mut values: AHashMap<String, String> = vars.into_iter().collect();

    let identifiers = extract_identifiers(formula);
    if human {
        for binding in catalog.resolve(&identifiers, &values) {
            if binding.current_value.is_none() {
                let value = prompt_for_input(&binding.label);
                values.insert(binding.name, value);
            }
        }
    }
    let bindings = catalog.resolve(&identifiers, &values);

    let calculator = Calculator::new(config);
    let calculation = calculator
        .calculate(formula, &bindings, &values)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    println!("Expression: {}", calculation.closed_expression);
    println!("Trace:      {}", calculation.explanation);
    println!("Result:     {}", calculation.formatted);

    if tree {
        let ast = Evaluator::new(calculator.config())
            .parse(&calculation.closed_expression)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        println!("\n{}", DisplayExpression { expr: &ast });
    }
}

fn load_conditions(path: &str) -> ConditionList {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read conditions file '{}': {}", path, e))
    });
    ConditionList::from_json_lossy(&json)
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

fn prompt_for_input(prompt_text: &str) -> String {
    let mut line = String::new();
    print!("> {}: ", prompt_text);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to write prompt: {}", e));
    }
    if let Err(e) = io::stdin().read_line(&mut line) {
        exit_with_error(&format!("Failed to read line: {}", e));
    }
    line.trim().to_string()
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
