//! Source-level invariants for the exponentiator workspace.
//!
//! Each test scans production sources so that a future change cannot quietly
//! leak key material, follow redirects, or panic in a long-running loop.

use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

/// All .rs files from production crates (excluding tests and this crate).
fn production_source_files() -> Vec<(String, String)> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap();

    let mut files = Vec::new();
    for entry in WalkDir::new(root.join("crates"))
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }

        let path_str = path.to_str().unwrap_or("");
        if path_str.contains("exponentiator-audit") {
            continue;
        }
        if path_str.contains("tests/") || path_str.contains("\\tests\\") {
            continue;
        }

        if let Ok(content) = std::fs::read_to_string(path) {
            files.push((path_str.to_string(), content));
        }
    }

    assert!(!files.is_empty(), "no production sources found");
    files
}

/// Lines before the first `#[cfg(test)]` / `mod tests`.
fn production_lines(content: &str) -> String {
    let mut result = Vec::new();
    for line in content.lines() {
        if line.contains("#[cfg(test)]") || line.trim().starts_with("mod tests") {
            break;
        }
        result.push(line);
    }
    result.join("\n")
}

#[test]
fn no_hardcoded_private_keys_in_production_code() {
    let key_re = Regex::new(r"\b(0x)?[a-fA-F0-9]{64}\b").unwrap();

    for (path, content) in &production_source_files() {
        let prod = production_lines(content);
        for (i, line) in prod.lines().enumerate() {
            assert!(
                !key_re.is_match(line),
                "Potential hardcoded private key at {}:{}: {}",
                path,
                i + 1,
                line.trim()
            );
        }
    }
}

#[test]
fn http_clients_disable_redirects() {
    let builder_re = Regex::new(r"reqwest::Client::builder\(\)").unwrap();
    let redirect_re = Regex::new(r"redirect\s*\(\s*.*Policy::none\(\)").unwrap();

    for (path, content) in &production_source_files() {
        let prod = production_lines(content);
        for mat in builder_re.find_iter(&prod) {
            let search_end = (mat.end() + 300).min(prod.len());
            assert!(
                redirect_re.is_match(&prod[mat.start()..search_end]),
                "reqwest::Client::builder() at {} does not set redirect(Policy::none())",
                path
            );
        }
    }
}

#[test]
fn webhooks_require_https() {
    for (path, content) in &production_source_files() {
        if !path.ends_with("webhook.rs") {
            continue;
        }
        let prod = production_lines(content);
        if let Some(start) = prod.find("fn validate_webhook_url") {
            let body = &prod[start..];
            let end = body[1..].find("\npub fn ").map(|i| i + 1).unwrap_or(body.len());
            assert!(
                body[..end].contains("https://") && body[..end].contains("return Err("),
                "webhook validation at {} must return Err for non-HTTPS URLs",
                path
            );
        }
    }
}

#[test]
fn no_unwrap_in_production_code() {
    let unwrap_re = Regex::new(r"\.unwrap\(\)").unwrap();
    let expect_re = Regex::new(r"\.expect\(").unwrap();
    // Infallible by construction: HMAC-SHA256 takes keys of any length.
    let allowed = ["HMAC-SHA256 takes keys of any length"];

    for (path, content) in &production_source_files() {
        let prod = production_lines(content);
        for (i, line) in prod.lines().enumerate() {
            if line.trim_start().starts_with("//") || allowed.iter().any(|a| line.contains(a)) {
                continue;
            }
            assert!(
                !unwrap_re.is_match(line) && !expect_re.is_match(line),
                "unwrap/expect in production code at {}:{}: {}",
                path,
                i + 1,
                line.trim()
            );
        }
    }
}

#[test]
fn secret_holding_types_do_not_derive_debug() {
    let secret_types = [
        ("wallet.rs", "WalletAccount"),
        ("config.rs", "ExponentiatorConfig"),
        ("email.rs", "EmailSettings"),
    ];
    let files = production_source_files();

    for (file, ty) in secret_types {
        let (path, content) = files
            .iter()
            .find(|(path, _)| path.ends_with(file) && path.contains("exponentiator"))
            .unwrap_or_else(|| panic!("{file} not found"));

        let lines: Vec<&str> = content.lines().collect();
        let decl = lines
            .iter()
            .position(|l| l.contains(&format!("pub struct {ty}")))
            .unwrap_or_else(|| panic!("{ty} not declared in {path}"));

        // Attributes directly above the declaration.
        let derives = lines[..decl]
            .iter()
            .rev()
            .take_while(|l| {
                let l = l.trim();
                l.starts_with("#[") || l.starts_with("///")
            })
            .any(|l| l.contains("derive(") && l.contains("Debug"));

        assert!(!derives, "{ty} in {path} derives Debug and would print secrets");
        assert!(
            content.contains(&format!("impl std::fmt::Debug for {ty}")),
            "{ty} in {path} needs a hand-written Debug that masks secrets"
        );
    }
}

#[test]
fn key_material_is_never_logged() {
    let log_re = Regex::new(r"tracing::(trace|debug|info|warn|error)!").unwrap();
    let secret_re = Regex::new(r"private_key_map|encryption_secret|password|signer\b").unwrap();

    for (path, content) in &production_source_files() {
        let prod = production_lines(content);
        for (i, line) in prod.lines().enumerate() {
            if log_re.is_match(line) && secret_re.is_match(line) {
                panic!(
                    "Possible secret in log statement at {}:{}: {}",
                    path,
                    i + 1,
                    line.trim()
                );
            }
        }
    }
}
