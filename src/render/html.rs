use crate::config::Config;
use crate::error::Result;
use crate::spec::SpecNode;

use std::io::Write;
use tracing::debug;

/// Render a self-contained HTML document (spec embedded as JSON).
///
/// The page is filled by placeholder substitution; the reviver script is full
/// of braces and `${...}` literals that `format!` would try to interpret.
pub fn render_document(spec: &SpecNode, config: &Config) -> Result<String> {
    config.validate()?;
    let spec_json = script_json(&serde_json::to_string(spec)?);
    let defaults_json = script_json(&serde_json::to_string(config.defaults())?);

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Plot</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; padding: 16px; }
  body.theme-light { background: white; color: black; }
  body.theme-dark { background: #1e1e1e; color: #e6e6e6; }
  .error { color: #b00020; white-space: pre-wrap; }
  code { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; }
</style>
</head>
<body class="theme-__THEME__">
<div id="plot"></div>

<script type="module">
import * as Plot from __PLOT_URL__;
import * as d3 from __D3_URL__;
import { tableFromIPC } from __ARROW_URL__;

// Embedded spec and defaults (JSON object literals)
const SPEC = __SPEC__;
const DEFAULTS = __DEFAULTS__;

const TAG = "ipyobsplot-type";
const MODULES = { Plot, d3, Math };

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function base64Bytes(text) {
  const bin = atob(text);
  const out = new Uint8Array(bin.length);
  for (let i = 0; i < bin.length; i++) out[i] = bin.charCodeAt(i);
  return out;
}

function lookup(node) {
  const mod = MODULES[node.module];
  const fn = mod && mod[node.method];
  if (typeof fn !== "function") {
    throw new Error(`unknown function ${node.module}.${node.method}`);
  }
  return fn.bind(mod);
}

function revive(node) {
  if (node === null || typeof node !== "object") return node;
  if (Array.isArray(node)) return node.map(revive);
  if (!(TAG in node)) {
    return Object.fromEntries(Object.entries(node).map(([k, v]) => [k, revive(v)]));
  }
  switch (node[TAG]) {
    case "DataFrame":
      return tableFromIPC(base64Bytes(node.value));
    case "GeoJson":
      return node.value;
    case "datetime":
      return new Date(node.value);
    case "js":
      return (0, eval)(`(${node.value})`);
    case "function":
      return lookup(node)(...node.args.map(revive));
    case "function-object": {
      const fn = lookup(node);
      return node.args.length ? fn.bind(null, ...node.args.map(revive)) : fn;
    }
    default:
      throw new Error(`unknown ${TAG}: ${node[TAG]}`);
  }
}

function mergeStyle(spec) {
  const a = DEFAULTS.style;
  const b = spec.style;
  if (a && b && typeof a === "object" && typeof b === "object") return { ...a, ...b };
  return b ?? a;
}

function render() {
  const value = revive(SPEC);
  if (SPEC !== null && SPEC[TAG] === "function") {
    return value.plot({ ...DEFAULTS });
  }
  const options = { ...DEFAULTS, ...value };
  const style = mergeStyle(value);
  if (style !== undefined) options.style = style;
  return Plot.plot(options);
}

const root = document.getElementById("plot");
try {
  root.appendChild(render());
} catch (err) {
  root.innerHTML = `<div class="error"><code>${escapeHtml(err)}</code></div>`;
  throw err;
}
</script>
</body>
</html>
"#;

    let assets = config.assets();
    let plot_url = serde_json::to_string(&assets.plot)?;
    let d3_url = serde_json::to_string(&assets.d3)?;
    let arrow_url = serde_json::to_string(&assets.arrow)?;
    let page = fill(
        TEMPLATE,
        &[
            ("__THEME__", config.theme().as_str()),
            ("__PLOT_URL__", &plot_url),
            ("__D3_URL__", &d3_url),
            ("__ARROW_URL__", &arrow_url),
            ("__SPEC__", &spec_json),
            ("__DEFAULTS__", &defaults_json),
        ],
    );
    debug!(bytes = page.len(), theme = %config.theme(), "rendered document");
    Ok(page)
}

/// Render and write the document to `sink`.
pub fn write_document<W: Write>(spec: &SpecNode, config: &Config, sink: &mut W) -> Result<()> {
    let page = render_document(spec, config)?;
    sink.write_all(page.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Substitute placeholders in one pass, so substituted text is never rescanned.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("__") {
        match vars.iter().find(|(k, _)| rest[start..].starts_with(k)) {
            Some((k, v)) => {
                out.push_str(&rest[..start]);
                out.push_str(v);
                rest = &rest[start + k.len()..];
            }
            None => {
                out.push_str(&rest[..start + 2]);
                rest = &rest[start + 2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// JSON is a valid JS literal, but `</script>` inside a string would end the
/// script element early. `<` only occurs inside strings, so escape it there.
fn script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Renderer, Theme};
    use crate::js::raw;
    use crate::spec::normalize;
    use crate::value::Value;

    fn spec() -> SpecNode {
        normalize(&Value::mapping([
            ("grid", Value::from(true)),
            ("tip", raw("d => `</script>${d}`")),
        ]))
        .unwrap()
    }

    #[test]
    fn embeds_spec_defaults_and_assets() {
        let config = Config::new(Renderer::Document)
            .with_theme(Theme::Dark)
            .with_default("height", 200)
            .unwrap();
        let page = render_document(&spec(), &config).unwrap();

        assert!(page.contains(r#"<body class="theme-dark">"#));
        assert!(page.contains(r#"const DEFAULTS = {"height":200};"#));
        assert!(page.contains(r#""grid":true"#));
        assert!(page.contains(&format!("from \"{}\"", config.assets().plot)));
        assert!(!page.contains("__SPEC__"));
    }

    #[test]
    fn script_end_tags_are_escaped() {
        let page = render_document(&spec(), &Config::default()).unwrap();
        assert_eq!(page.matches("</script>").count(), 1);
        assert!(page.contains(r"\u003c/script>"));
    }

    #[test]
    fn embedded_json_parses_back() {
        let page = render_document(&spec(), &Config::default()).unwrap();
        let start = page.find("const SPEC = ").unwrap() + "const SPEC = ".len();
        let end = start + page[start..].find(";\nconst DEFAULTS").unwrap();
        let parsed: SpecNode = serde_json::from_str(&page[start..end]).unwrap();
        assert_eq!(parsed, spec());
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let spec = normalize(&Value::mapping([("title", Value::from("__DEFAULTS__"))])).unwrap();
        let page = render_document(&spec, &Config::default()).unwrap();
        assert!(page.contains(r#""title":"__DEFAULTS__""#));
        assert!(page.contains("const DEFAULTS = {};"));
    }

    #[test]
    fn unvalidated_config_is_refused() {
        let config: Config =
            serde_json::from_str(r#"{"renderer": "document", "defaults": {"x": 100}}"#).unwrap();
        let err = render_document(&spec(), &config).unwrap_err();
        assert!(matches!(err, crate::error::Error::Configuration(_)));
    }

    #[test]
    fn writes_to_sink() {
        let mut out = Vec::new();
        write_document(&spec(), &Config::default(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            render_document(&spec(), &Config::default()).unwrap()
        );
    }
}
