use anyhow::Error;

pub(crate) fn format(err: &Error) -> String {
    let mut out = format!("Error: {err:#}");
    let hints = suggestions(err);
    if !hints.is_empty() {
        out.push_str("\n\nHints:\n");
        for hint in hints {
            out.push_str("- ");
            out.push_str(&hint);
            out.push('\n');
        }
    }
    out
}

fn suggestions(err: &Error) -> Vec<String> {
    let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    let haystack = chain.join(" | ").to_ascii_lowercase();
    let mut out: Vec<String> = Vec::new();

    if haystack.contains("no such file or directory") || haystack.contains("cannot find the") {
        push_hint(&mut out, "Verify the input path exists and is readable.");
        push_hint(
            &mut out,
            "Use an absolute path to avoid working-directory confusion.",
        );
    }

    if haystack.contains("as json") {
        push_hint(
            &mut out,
            "The report must be a single JSON document; check for truncation or trailing text.",
        );
    }

    if haystack.contains("must be a json object") || haystack.contains("none of the sections") {
        push_hint(
            &mut out,
            "Pass the full report document (a JSON object with a `factors` section, or `measures`/`productFactors`/`edges`).",
        );
    }

    if haystack.contains("settings") && haystack.contains("toml") {
        push_hint(
            &mut out,
            "Check `piq.toml` syntax and key names (`[extract] pillar_prefixes`, `[output] pretty`).",
        );
    }

    out
}

fn push_hint(out: &mut Vec<String>, hint: &str) {
    if !out.iter().any(|h| h == hint) {
        out.push(hint.to_string());
    }
}
