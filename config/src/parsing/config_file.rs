//! Parsing logic for a separate swap config file
//!
//! A config file is a flat TOML table whose keys are CLI option names. Each
//! entry is flattened into CLI-style args so that file and command line
//! options are parsed by the same CLI definition

use std::fs;

use toml::{Value, map::Map};

/// The CLI argument name for the config file
const CONFIG_FILE_ARG: &str = "--config-file";

/// Parse args from the config file named in the command line args, if any
pub(crate) fn config_file_args(cli_args: &[String]) -> Result<Vec<String>, String> {
    let Some(index) = cli_args.iter().position(|arg| arg == CONFIG_FILE_ARG) else {
        return Ok(vec![]);
    };

    let path = cli_args
        .get(index + 1)
        .ok_or_else(|| format!("{CONFIG_FILE_ARG} requires a path"))?;
    read_config_file(path)
}

/// Read a config file into CLI-style args
pub fn read_config_file(path: &str) -> Result<Vec<String>, String> {
    let file_contents =
        fs::read_to_string(path).map_err(|err| format!("error reading {path}: {err}"))?;
    let config_kv_pairs: Map<String, Value> =
        toml::from_str(&file_contents).map_err(|err| format!("error parsing {path}: {err}"))?;

    let mut config_file_args: Vec<String> = Vec::with_capacity(config_kv_pairs.len());
    for (toml_key, value) in config_kv_pairs.iter() {
        // Format the TOML key into --key
        let cli_arg = format!("--{toml_key}");
        config_file_args.extend(parse_toml_value(cli_arg, value)?);
    }

    Ok(config_file_args)
}

// ----------------
// | TOML Parsing |
// ----------------

/// Parse a toml value into a list of strings to append to the CLI args
fn parse_toml_value(cli_arg: String, val: &Value) -> Result<Vec<String>, String> {
    match val {
        // A flag is present if true, otherwise omitted
        Value::Boolean(b) => Ok(if *b { vec![cli_arg] } else { vec![] }),
        Value::String(s) => Ok(vec![cli_arg, s.clone()]),
        Value::Integer(i) => Ok(vec![cli_arg, i.to_string()]),
        Value::Float(f) => Ok(vec![cli_arg, f.to_string()]),
        _ => Err(format!("unsupported value for {cli_arg}: {val}")),
    }
}
