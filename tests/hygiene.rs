//! Hygiene: enforces coding standards at test time
//!
//! Scans the engine's production sources for antipatterns. Each pattern has a
//! budget (ideally zero). If you must add one, fix an existing one first; the
//! budget never grows.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

const BUDGETS: &[Budget] = &[
    // Panics crash the host.
    Budget { pattern: ".unwrap()", max: 0, why: "propagate or handle the error" },
    Budget { pattern: ".expect(", max: 0, why: "propagate or handle the error" },
    Budget { pattern: "panic!(", max: 0, why: "return an EngineError instead" },
    Budget { pattern: "unreachable!(", max: 0, why: "model the state so it cannot occur" },
    Budget { pattern: "todo!(", max: 0, why: "finish the stub" },
    Budget { pattern: "unimplemented!(", max: 0, why: "finish the stub" },
    // Silent loss: errors discarded without inspection.
    Budget { pattern: "let _ =", max: 0, why: "log or propagate the discarded value" },
    Budget { pattern: ".ok()", max: 0, why: "match on the error and decide" },
    // Scene access is passed explicitly; no ambient current scene.
    Budget { pattern: "static mut", max: 0, why: "pass the scene as a parameter" },
    Budget { pattern: "OnceLock", max: 0, why: "pass the scene as a parameter" },
    Budget { pattern: "thread_local!", max: 0, why: "pass the scene as a parameter" },
    // Style / structure.
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "delete unused code" },
    Budget { pattern: "#[allow(deprecated)]", max: 0, why: "production code must not call deprecated placement" },
];

/// Collect production `.rs` files from `src/`, excluding sibling `*_test.rs` files.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

/// Lines before the first `#[cfg(test)] mod tests` block; inline test modules
/// are allowed to unwrap.
fn production_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut lines = content.lines().peekable();
    std::iter::from_fn(move || {
        let line = lines.next()?;
        if line.trim() == "#[cfg(test)]" && lines.peek().is_some_and(|next| next.trim() == "mod tests {") {
            return None;
        }
        Some(line)
    })
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = production_lines(&file.content)
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn format_hits(hits: &[(String, usize)]) -> String {
    hits.iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("transaction.rs")), "run from the crate root");
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for budget in BUDGETS {
        let found = hits(&files, budget.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            failures.push(format!(
                "`{}` budget exceeded: found {count}, max {} ({}).\n{}",
                budget.pattern,
                budget.max,
                budget.why,
                format_hits(&found)
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n\n"));
}

#[test]
fn legacy_spiral_stays_in_placement() {
    let files = source_files();
    let callers: Vec<&str> = files
        .iter()
        .filter(|f| !f.path.ends_with("placement.rs"))
        .filter(|f| production_lines(&f.content).any(|line| line.contains("spiral_position")))
        .map(|f| f.path.as_str())
        .collect();
    assert!(callers.is_empty(), "spiral_position used outside placement: {callers:?}");
}
