//! Command-line parsing driven by declarative argument specs.
//!
//! A spec names the argument (`"path"` for a positional, `"-v"`, `"--verbose"`
//! or `["-v", "--verbose"]` for an option) and carries optional parameters.
//! Specs deserialize from YAML/JSON, so a tool can keep its whole command
//! line in a config file:
//!
//! ```yaml
//! - definition: url
//!   params: { help: Endpoint to query }
//! - definition: ["-l", "--page-limit"]
//!   params: { type: int, default: 10 }
//! - definition: --verbose
//!   params: { action: store_true }
//! ```
//!
//! Parsing yields a flat map from destination name to value.

use crate::utils::error::{HelperError, Result};
use clap::builder::{PossibleValuesParser, TypedValueParser, ValueParser};
use clap::{value_parser, Arg, ArgAction as ClapAction, ArgMatches, Command};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgDefinition {
    Name(String),
    Names(Vec<String>),
}

impl fmt::Display for ArgDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgDefinition::Name(name) => write!(f, "'{}'", name),
            ArgDefinition::Names(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgAction {
    #[default]
    Store,
    StoreTrue,
    StoreFalse,
    Count,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    #[default]
    Str,
    Int,
    Float,
}

/// Number of values an argument consumes: `"?"`, `"*"`, `"+"` or an exact count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NArgs {
    Exactly(usize),
    Pattern(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgParams {
    pub help: Option<String>,
    pub default: Option<Value>,
    pub required: Option<bool>,
    pub action: ArgAction,
    #[serde(rename = "type")]
    pub value_type: ArgType,
    pub choices: Option<Vec<Value>>,
    pub nargs: Option<NArgs>,
    pub dest: Option<String>,
    pub metavar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub definition: ArgDefinition,
    #[serde(default)]
    pub params: ArgParams,
}

impl ArgSpec {
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            definition: ArgDefinition::Name(name.into()),
            params: ArgParams::default(),
        }
    }

    pub fn option<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            definition: ArgDefinition::Names(names.into_iter().map(Into::into).collect()),
            params: ArgParams::default(),
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.params.help = Some(help.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.params.default = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.params.required = Some(required);
        self
    }

    pub fn action(mut self, action: ArgAction) -> Self {
        self.params.action = action;
        self
    }

    pub fn value_type(mut self, value_type: ArgType) -> Self {
        self.params.value_type = value_type;
        self
    }

    pub fn nargs(mut self, nargs: NArgs) -> Self {
        self.params.nargs = Some(nargs);
        self
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.params.dest = Some(dest.into());
        self
    }
}

#[derive(Debug)]
enum ArgNames {
    Positional(String),
    Flagged { shorts: Vec<char>, longs: Vec<String> },
}

impl ArgNames {
    fn spellings(&self) -> Vec<String> {
        match self {
            ArgNames::Positional(name) => vec![name.clone()],
            ArgNames::Flagged { shorts, longs } => shorts
                .iter()
                .map(|c| format!("-{}", c))
                .chain(longs.iter().map(|l| format!("--{}", l)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Single,
    Optional,
    ZeroOrMore,
    OneOrMore,
    Exactly(usize),
}

/// How to read one argument back out of the clap matches.
#[derive(Debug, Clone)]
struct ArgPlan {
    dest: String,
    action: ArgAction,
    value_type: ArgType,
    multiple: bool,
}

fn invalid(definition: &ArgDefinition, reason: impl Into<String>) -> HelperError {
    HelperError::InvalidArgSpecError {
        definition: definition.to_string(),
        reason: reason.into(),
    }
}

fn parse_names(definition: &ArgDefinition) -> Result<ArgNames> {
    let names: Vec<&str> = match definition {
        ArgDefinition::Name(name) => vec![name.as_str()],
        ArgDefinition::Names(names) => names.iter().map(String::as_str).collect(),
    };

    if let [name] = names.as_slice() {
        if !name.starts_with('-') {
            if name.trim().is_empty() {
                return Err(invalid(definition, "argument name cannot be empty"));
            }
            return Ok(ArgNames::Positional(name.to_string()));
        }
    }
    if names.is_empty() {
        return Err(invalid(definition, "definition has no names"));
    }

    let mut shorts = Vec::new();
    let mut longs = Vec::new();
    for name in names {
        if let Some(long) = name.strip_prefix("--") {
            if long.is_empty() {
                return Err(invalid(definition, "'--' is not a valid option name"));
            }
            longs.push(long.to_string());
        } else if let Some(short) = name.strip_prefix('-') {
            let mut chars = short.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => shorts.push(c),
                (None, _) => return Err(invalid(definition, "'-' is not a valid option name")),
                _ => {
                    return Err(invalid(
                        definition,
                        format!("'{}': single-dash names must be one character", name),
                    ))
                }
            }
        } else {
            return Err(invalid(
                definition,
                format!("'{}': positional names cannot be mixed with options", name),
            ));
        }
    }

    if shorts.contains(&'h') || longs.iter().any(|l| l == "help") {
        return Err(invalid(definition, "'-h' and '--help' are reserved for help"));
    }

    Ok(ArgNames::Flagged { shorts, longs })
}

fn dest_for(names: &ArgNames, params: &ArgParams) -> String {
    if let Some(dest) = &params.dest {
        return dest.clone();
    }
    match names {
        ArgNames::Positional(name) => name.clone(),
        ArgNames::Flagged { shorts, longs } => match longs.first() {
            Some(long) => long.replace('-', "_"),
            None => shorts.first().map(char::to_string).unwrap_or_default(),
        },
    }
}

fn arity_for(definition: &ArgDefinition, nargs: Option<&NArgs>) -> Result<Arity> {
    match nargs {
        None => Ok(Arity::Single),
        Some(NArgs::Exactly(0)) => Err(invalid(definition, "nargs must be at least 1")),
        Some(NArgs::Exactly(n)) => Ok(Arity::Exactly(*n)),
        Some(NArgs::Pattern(p)) => match p.as_str() {
            "?" => Ok(Arity::Optional),
            "*" => Ok(Arity::ZeroOrMore),
            "+" => Ok(Arity::OneOrMore),
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Arity::Exactly(n)),
                _ => Err(invalid(definition, format!("unsupported nargs '{}'", other))),
            },
        },
    }
}

fn scalar_to_string(definition: &ArgDefinition, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(invalid(
            definition,
            format!("expected a scalar value, found {}", other),
        )),
    }
}

fn value_parser_for(definition: &ArgDefinition, params: &ArgParams) -> Result<ValueParser> {
    let Some(choices) = &params.choices else {
        return Ok(match params.value_type {
            ArgType::Str => ValueParser::string(),
            ArgType::Int => value_parser!(i64).into(),
            ArgType::Float => value_parser!(f64).into(),
        });
    };

    let choices = choices
        .iter()
        .map(|c| scalar_to_string(definition, c))
        .collect::<Result<Vec<_>>>()?;
    let choices = PossibleValuesParser::new(choices);

    // 先比對選項，再轉換型別
    Ok(match params.value_type {
        ArgType::Str => ValueParser::new(choices),
        ArgType::Int => ValueParser::new(choices.try_map(|s| s.parse::<i64>())),
        ArgType::Float => ValueParser::new(choices.try_map(|s| s.parse::<f64>())),
    })
}

fn build_arg(spec: &ArgSpec) -> Result<(Arg, ArgPlan, Vec<String>)> {
    let definition = &spec.definition;
    let params = &spec.params;
    let names = parse_names(definition)?;
    let dest = dest_for(&names, params);
    let arity = arity_for(definition, params.nargs.as_ref())?;
    let is_positional = matches!(names, ArgNames::Positional(_));

    let mut arg = Arg::new(dest.clone());
    if let ArgNames::Flagged { shorts, longs } = &names {
        if let Some((first, rest)) = shorts.split_first() {
            arg = arg.short(*first);
            for c in rest {
                arg = arg.short_alias(*c);
            }
        }
        if let Some((first, rest)) = longs.split_first() {
            arg = arg.long(first.clone());
            for alias in rest {
                arg = arg.alias(alias.clone());
            }
        }
    }
    if let Some(help) = &params.help {
        arg = arg.help(help.clone());
    }
    if let Some(metavar) = &params.metavar {
        arg = arg.value_name(metavar.clone());
    }

    let default = params.default.as_ref().filter(|d| !d.is_null());

    let multiple = match params.action {
        ArgAction::StoreTrue | ArgAction::StoreFalse | ArgAction::Count => {
            if is_positional {
                return Err(invalid(definition, "flag actions need an option name"));
            }
            if params.nargs.is_some() || params.choices.is_some() {
                return Err(invalid(definition, "flag actions do not take values"));
            }
            arg = arg.action(match params.action {
                ArgAction::StoreTrue => ClapAction::SetTrue,
                ArgAction::StoreFalse => ClapAction::SetFalse,
                _ => ClapAction::Count,
            });
            if let Some(default) = default {
                let default = match (params.action, default) {
                    (ArgAction::Count, Value::Number(n)) if n.as_u64().is_some_and(|n| n <= u8::MAX as u64) => {
                        n.to_string()
                    }
                    (ArgAction::StoreTrue | ArgAction::StoreFalse, Value::Bool(b)) => b.to_string(),
                    (_, other) => {
                        return Err(invalid(
                            definition,
                            format!("default {} does not fit the action", other),
                        ))
                    }
                };
                arg = arg.default_value(default);
            }
            false
        }
        ArgAction::Store | ArgAction::Append => {
            let append = params.action == ArgAction::Append;
            arg = arg
                .action(if append { ClapAction::Append } else { ClapAction::Set })
                .value_parser(value_parser_for(definition, params)?);

            // 位置參數一律至少取一個值，是否可省略交給 required 決定
            arg = match arity {
                Arity::Single => arg,
                Arity::Optional if is_positional => arg,
                Arity::Optional => arg.num_args(0..=1),
                Arity::ZeroOrMore if is_positional => arg.num_args(1..),
                Arity::ZeroOrMore => arg.num_args(0..),
                Arity::OneOrMore => arg.num_args(1..),
                Arity::Exactly(n) => arg.num_args(n),
            };

            match default {
                None => {}
                Some(Value::Array(items)) => {
                    let values = items
                        .iter()
                        .map(|v| scalar_to_string(definition, v))
                        .collect::<Result<Vec<_>>>()?;
                    arg = arg.default_values(values);
                }
                Some(value) => arg = arg.default_value(scalar_to_string(definition, value)?),
            }

            append
                || matches!(
                    arity,
                    Arity::ZeroOrMore | Arity::OneOrMore | Arity::Exactly(_)
                )
        }
    };

    let required = params.required.unwrap_or(
        is_positional
            && default.is_none()
            && !matches!(arity, Arity::Optional | Arity::ZeroOrMore),
    );
    arg = arg.required(required);

    let plan = ArgPlan {
        dest,
        action: params.action,
        value_type: params.value_type,
        multiple,
    };
    Ok((arg, plan, names.spellings()))
}

fn typed_values(matches: &ArgMatches, id: &str, value_type: ArgType) -> Vec<Value> {
    match value_type {
        ArgType::Str => matches
            .get_many::<String>(id)
            .map(|values| values.map(|s| Value::String(s.clone())).collect())
            .unwrap_or_default(),
        ArgType::Int => matches
            .get_many::<i64>(id)
            .map(|values| values.map(|i| Value::from(*i)).collect())
            .unwrap_or_default(),
        ArgType::Float => matches
            .get_many::<f64>(id)
            .map(|values| {
                values
                    .map(|f| Number::from_f64(*f).map_or(Value::Null, Value::Number))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

impl ArgPlan {
    fn extract(&self, matches: &ArgMatches) -> Value {
        match self.action {
            ArgAction::StoreTrue | ArgAction::StoreFalse => Value::Bool(matches.get_flag(&self.dest)),
            ArgAction::Count => Value::from(matches.get_count(&self.dest)),
            ArgAction::Store | ArgAction::Append => {
                let values = typed_values(matches, &self.dest, self.value_type);
                if self.multiple {
                    if values.is_empty() {
                        Value::Null
                    } else {
                        Value::Array(values)
                    }
                } else {
                    values.into_iter().next().unwrap_or(Value::Null)
                }
            }
        }
    }
}

/// A clap command assembled from argument specs.
#[derive(Debug, Clone)]
pub struct ArgParser {
    command: Command,
    plans: Vec<ArgPlan>,
}

impl ArgParser {
    pub fn new(name: impl Into<String>, specs: &[ArgSpec]) -> Result<Self> {
        let mut command = Command::new(name.into());
        let mut plans: Vec<ArgPlan> = Vec::with_capacity(specs.len());
        let mut seen = HashSet::new();

        for spec in specs {
            let (arg, plan, spellings) = build_arg(spec)?;
            if plans.iter().any(|p| p.dest == plan.dest) {
                return Err(invalid(
                    &spec.definition,
                    format!("destination '{}' is already used", plan.dest),
                ));
            }
            for spelling in spellings {
                if !seen.insert(spelling.clone()) {
                    return Err(invalid(
                        &spec.definition,
                        format!("'{}' is already defined", spelling),
                    ));
                }
            }
            command = command.arg(arg);
            plans.push(plan);
        }

        Ok(Self { command, plans })
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.command = self.command.about(about.into());
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Parses `argv` (first element is the program name). Usage errors and
    /// `--help` come back as [`HelperError::ArgumentError`]; call `exit()` on
    /// the inner clap error to print and quit.
    pub fn parse_from<I, T>(&self, argv: I) -> Result<Map<String, Value>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.clone().try_get_matches_from(argv)?;
        Ok(self
            .plans
            .iter()
            .map(|plan| (plan.dest.clone(), plan.extract(&matches)))
            .collect())
    }
}

pub fn build_command(name: impl Into<String>, specs: &[ArgSpec]) -> Result<Command> {
    Ok(ArgParser::new(name, specs)?.command)
}

/// Parses the process arguments against `specs`.
pub fn parse_args(specs: &[ArgSpec]) -> Result<Map<String, Value>> {
    ArgParser::new(env!("CARGO_PKG_NAME"), specs)?.parse_from(std::env::args_os())
}

pub fn parse_args_from<I, T>(specs: &[ArgSpec], argv: I) -> Result<Map<String, Value>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    ArgParser::new(env!("CARGO_PKG_NAME"), specs)?.parse_from(argv)
}
