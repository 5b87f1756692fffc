use anyhow::Result;
use api_helpers::config::args::ArgParser;
use api_helpers::{load_yaml, ArgSpec};
use serde_json::json;
use tempfile::TempDir;

/// 從 YAML 檔案讀取參數定義後解析命令列
#[test]
fn test_arg_specs_loaded_from_yaml_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("args.yaml");
    std::fs::write(
        &path,
        r#"
- definition: key_map
  params:
    help: Path to the key-map
- definition: ["-u", "--url"]
  params:
    required: true
    metavar: URL
- definition: ["-f", "--format"]
  params:
    choices: [json, yaml]
    default: json
- definition: ["-q", "--quiet"]
  params:
    action: store_true
- definition: --header
  params:
    action: append
    dest: headers
"#,
    )?;

    let specs: Vec<ArgSpec> = load_yaml(&path)?;
    let parser = ArgParser::new("fetch", &specs)?.about("Fetch and reshape");

    let parsed = parser.parse_from([
        "fetch",
        "map.yaml",
        "--url",
        "https://example.com/api",
        "--header",
        "Accept: application/json",
        "--header",
        "X-Trace: 1",
    ])?;

    assert_eq!(
        serde_json::Value::Object(parsed),
        json!({
            "key_map": "map.yaml",
            "url": "https://example.com/api",
            "format": "json",
            "quiet": false,
            "headers": ["Accept: application/json", "X-Trace: 1"]
        })
    );

    assert!(parser.parse_from(["fetch", "map.yaml"]).is_err());
    assert!(parser
        .parse_from(["fetch", "map.yaml", "-u", "https://x.io", "-f", "csv"])
        .is_err());
    Ok(())
}
