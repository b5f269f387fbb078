//! Generates the python "tool library": one wrapper function per exposed
//! tool, with the signature derived from that tool's invocation schema. The
//! subprocess reads the bridge port from the environment.

use crate::traits::ToolSpec;
use serde_json::Value;
use std::fmt::Write;

/// Environment variable carrying the bridge's listening port to the child.
pub const BRIDGE_PORT_ENV: &str = "AXON_BRIDGE_PORT";

const PRELUDE: &str = r#"import json
import os
import urllib.request

_PORT = int(os.environ["AXON_BRIDGE_PORT"])


def _call_tool(name, args):
    payload = json.dumps({"toolName": name, "arguments": json.dumps(args)}).encode("utf-8")
    request = urllib.request.Request(
        "http://127.0.0.1:%d/" % _PORT,
        data=payload,
        headers={"Content-Type": "application/json"},
        method="POST",
    )
    with urllib.request.urlopen(request) as response:
        reply = json.loads(response.read().decode("utf-8"))
    if not reply.get("success"):
        raise RuntimeError(reply.get("error") or "tool call failed")
    result = reply.get("result") or ""
    return json.loads(result) if result else {}
"#;

pub fn generate_library(specs: &[ToolSpec]) -> String {
    let mut out = String::from(PRELUDE);
    for spec in specs {
        out.push_str("\n\n");
        out.push_str(&generate_wrapper(spec));
    }
    out
}

fn generate_wrapper(spec: &ToolSpec) -> String {
    let empty = serde_json::Map::new();
    let properties = spec
        .parameters
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let required: Vec<&str> = spec
        .parameters
        .get("required")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut params: Vec<String> = required.iter().map(|name| sanitize(name)).collect();
    let optional: Vec<&String> = properties
        .keys()
        .filter(|name| !required.contains(&name.as_str()))
        .collect();
    params.extend(optional.iter().map(|name| format!("{}=None", sanitize(name))));

    let mut out = String::new();
    let _ = writeln!(out, "def {}({}):", sanitize(&spec.name), params.join(", "));
    if !spec.description.is_empty() {
        let _ = writeln!(out, "    \"\"\"{}\"\"\"", spec.description.replace('"', "'"));
    }
    let _ = writeln!(out, "    args = {{}}");
    for name in &required {
        let _ = writeln!(out, "    args[\"{name}\"] = {}", sanitize(name));
    }
    for name in &optional {
        let param = sanitize(name);
        let _ = writeln!(out, "    if {param} is not None:");
        let _ = writeln!(out, "        args[\"{name}\"] = {param}");
    }
    let _ = write!(out, "    return _call_tool(\"{}\", args)", spec.name);
    out.push('\n');
    out
}

/// Tool and parameter names become python identifiers.
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if i == 0 && ch.is_ascii_digit() {
                out.push('_');
            }
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, ObjectSchema};

    fn search_spec() -> ToolSpec {
        ToolSpec {
            name: "search".into(),
            description: "Searches the web".into(),
            parameters: ObjectSchema::new()
                .field("query", FieldType::String, "Search terms")
                .optional("max_results", FieldType::Integer, "Max results")
                .to_value(),
        }
    }

    #[test]
    fn wrapper_signature_orders_required_then_optional() {
        let library = generate_library(&[search_spec()]);
        assert!(library.contains("def search(query, max_results=None):"));
        assert!(library.contains("\"\"\"Searches the web\"\"\""));
        assert!(library.contains("args[\"query\"] = query"));
        assert!(library.contains("if max_results is not None:"));
        assert!(library.contains("return _call_tool(\"search\", args)"));
    }

    #[test]
    fn no_arg_tool_gets_empty_signature() {
        let spec = ToolSpec {
            name: "clock".into(),
            description: "Tells the time".into(),
            parameters: ObjectSchema::new().to_value(),
        };
        let library = generate_library(&[spec]);
        assert!(library.contains("def clock():"));
    }

    #[test]
    fn prelude_reads_port_from_env() {
        let library = generate_library(&[]);
        assert!(library.contains(BRIDGE_PORT_ENV));
        assert!(library.contains("urllib.request"));
    }

    #[test]
    fn awkward_names_become_identifiers() {
        assert_eq!(sanitize("tool-name"), "tool_name");
        assert_eq!(sanitize("2fast"), "_2fast");
    }
}
