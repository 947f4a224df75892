use crate::error::Result;
use crate::module::GoModResolver;
use crate::{apply_filters, Collector};
use inject_graph::{Entry, Func, Logger, Param, RawAnnotation};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

static PACKAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^package\s+([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"));

const SKIPPED_DIRS: &[&str] = &["vendor", "testdata", "node_modules", "gen"];

/// Scans Go sources for comment annotations.
///
/// An annotation is a comment line of the form `// @A <name> key=value ...`
/// directly above a `func` declaration. Comment blocks not followed by a
/// function become non-function entries.
#[derive(Debug, Clone)]
pub struct SourceCollector {
    marker: String,
    modules: GoModResolver,
    logger: Logger,
}

impl Default for SourceCollector {
    fn default() -> Self {
        Self::new("@A")
    }
}

impl SourceCollector {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            modules: GoModResolver::default(),
            logger: Logger::facade("inject::collector"),
        }
    }

    /// Route scan diagnostics, module lookup included, to `logger`.
    #[must_use]
    pub fn with_logger(self, logger: Logger) -> Self {
        Self {
            modules: self.modules.with_logger(logger),
            logger,
            ..self
        }
    }

    /// Scan one file's text. `module` and `import_path` identify the package.
    pub fn scan_source(
        &self,
        text: &str,
        module: &str,
        import_path: &str,
        file: Option<&str>,
    ) -> Vec<Entry> {
        let Some(package) = text
            .lines()
            .find_map(|l| PACKAGE_RE.captures(l.trim()).map(|c| c[1].to_string()))
        else {
            return Vec::new();
        };

        let new_entry = |func: Option<Func>, annotations: Vec<RawAnnotation>| Entry {
            module: module.to_string(),
            path: import_path.to_string(),
            file: file.map(str::to_string),
            package: package.clone(),
            func,
            annotations,
        };

        let mut entries = Vec::new();
        let mut pending: Vec<RawAnnotation> = Vec::new();
        let lines: Vec<&str> = text.lines().collect();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();

            if let Some(comment) = line.strip_prefix("//") {
                if let Some(ann) = self.parse_annotation(comment) {
                    pending.push(ann);
                }
                i += 1;
                continue;
            }

            if line.starts_with("func ") || line.starts_with("func(") {
                let (signature, consumed) = join_signature(&lines[i..]);
                i += consumed;
                if pending.is_empty() {
                    continue;
                }
                match parse_signature(&signature) {
                    Some(func) => entries.push(new_entry(Some(func), std::mem::take(&mut pending))),
                    None => {
                        self.logger
                            .warn(format_args!("unparsable function signature: {signature}"));
                        pending.clear();
                    }
                }
                continue;
            }

            if !pending.is_empty() {
                entries.push(new_entry(None, std::mem::take(&mut pending)));
            }
            i += 1;
        }

        if !pending.is_empty() {
            entries.push(new_entry(None, pending));
        }

        entries
    }

    fn parse_annotation(&self, comment: &str) -> Option<RawAnnotation> {
        let rest = comment.trim().strip_prefix(self.marker.as_str())?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let mut tokens = rest.split_whitespace();
        let mut ann = RawAnnotation::new(tokens.next()?);
        for token in tokens {
            match token.split_once('=') {
                Some((key, value)) => {
                    ann.attributes
                        .insert(key.to_string(), value.trim_matches('"').to_string());
                }
                None => {
                    ann.attributes.insert(token.to_string(), String::new());
                }
            }
        }
        Some(ann)
    }
}

impl Collector for SourceCollector {
    fn collect(&self, path: &Path, filters: &[String]) -> Result<Vec<Entry>> {
        let root = self.modules.locate(path)?;
        let mut entries = Vec::new();

        let walker = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e));

        for item in walker {
            let item = item?;
            let file_path = item.path();
            if !item.file_type().is_file() || !is_go_source(file_path) {
                continue;
            }

            let text = fs::read_to_string(file_path)?;
            let rel_dir = file_path
                .parent()
                .and_then(|p| p.strip_prefix(&root.dir).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            let import_path = if rel_dir.is_empty() {
                root.module.clone()
            } else {
                format!("{}/{rel_dir}", root.module)
            };
            let rel_file = file_path
                .strip_prefix(&root.dir)
                .unwrap_or(file_path)
                .to_string_lossy()
                .replace('\\', "/");

            self.logger
                .debug(format_args!("Processing file: {}", file_path.display()));
            entries.extend(self.scan_source(&text, &root.module, &import_path, Some(&rel_file)));
        }

        self.logger.info(format_args!(
            "Collected {} annotated entries under {}",
            entries.len(),
            path.display()
        ));
        Ok(apply_filters(entries, filters))
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|name| {
            name.starts_with('.') || SKIPPED_DIRS.contains(&name)
        })
}

fn is_go_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
        && !path.to_string_lossy().ends_with("_test.go")
}

/// Join the lines of a declaration up to its opening brace.
fn join_signature(lines: &[&str]) -> (String, usize) {
    let mut signature = String::new();
    for (n, line) in lines.iter().enumerate() {
        if !signature.is_empty() {
            signature.push(' ');
        }
        let line = line.trim();
        signature.push_str(line);
        if line.ends_with('{') || line.ends_with('}') || n >= 32 {
            return (signature, n + 1);
        }
    }
    (signature, lines.len())
}

/// Parse `func [recv] Name[generics](params) results {`.
fn parse_signature(signature: &str) -> Option<Func> {
    let mut rest = signature.strip_prefix("func")?.trim_start();

    if rest.starts_with('(') {
        let (_, after) = split_group(rest)?;
        rest = after.trim_start();
    }

    let name_end = rest.find(|c: char| c == '(' || c == '[')?;
    let name = rest[..name_end].trim();
    if name.is_empty() {
        return None;
    }
    rest = &rest[name_end..];

    if rest.starts_with('[') {
        let close = matching_close(rest, '[', ']')?;
        rest = &rest[close + 1..];
    }

    let (params, after) = split_group(rest)?;
    let results = after[..body_start(after)].trim();

    let results = if results.starts_with('(') {
        parse_list(split_group(results)?.0)
    } else if results.is_empty() {
        Vec::new()
    } else {
        vec![Param::new("", results)]
    };

    Some(Func {
        name: name.to_string(),
        parameters: parse_list(params),
        results,
    })
}

/// Offset of the opening brace of a function body, or the text length.
///
/// Braces belonging to `struct{...}` and `interface{...}` types are skipped.
fn body_start(text: &str) -> usize {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '{' if depth == 0 => {
                let before = text[..i].trim_end();
                if !(before.ends_with("struct") || before.ends_with("interface")) {
                    return i;
                }
                depth += 1;
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    text.len()
}

/// Split `( ... ) rest` into the inner text and the rest.
fn split_group(text: &str) -> Option<(&str, &str)> {
    let close = matching_close(text, '(', ')')?;
    Some((&text[1..close], &text[close + 1..]))
}

fn matching_close(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split on a separator that is not nested inside brackets.
fn split_top_level(text: &str, is_sep: impl Fn(char) -> bool, limit: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if depth == 0 && is_sep(c) && parts.len() + 1 < limit => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse a Go parameter list. In `a, b int` the type is shared backwards.
fn parse_list(text: &str) -> Vec<Param> {
    let parts: Vec<&str> = split_top_level(text, |c| c == ',', usize::MAX)
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let split: Vec<(Option<&str>, &str)> = parts
        .iter()
        .map(|part| {
            let pieces = split_top_level(part, char::is_whitespace, 2);
            match pieces.as_slice() {
                [name, ty] if !ty.trim().is_empty() => (Some(name.trim()), ty.trim()),
                _ => (None, *part),
            }
        })
        .collect();

    let named = split.iter().any(|(name, _)| name.is_some());
    if !named {
        return split.into_iter().map(|(_, ty)| Param::new("", ty)).collect();
    }

    let mut params = Vec::with_capacity(split.len());
    let mut shared_type = String::new();
    for (name, ty) in split.into_iter().rev() {
        match name {
            Some(name) => {
                shared_type = ty.to_string();
                params.push(Param::new(name, ty));
            }
            None => params.push(Param::new(ty, shared_type.clone())),
        }
    }
    params.reverse();
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Metadata, Record};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn types(params: &[Param]) -> Vec<(&str, &str)> {
        params.iter().map(|p| (p.name.as_str(), p.ty.as_str())).collect()
    }

    #[test]
    fn parses_plain_function() {
        let func = parse_signature("func New(cfg *Config, log Logger) (*Server, error) {").unwrap();
        assert_eq!(func.name, "New");
        assert_eq!(
            types(&func.parameters),
            [("cfg", "*Config"), ("log", "Logger")]
        );
        assert_eq!(types(&func.results), [("", "*Server"), ("", "error")]);
    }

    #[test]
    fn parses_grouped_names_and_single_result() {
        let func = parse_signature("func Sum(a, b int, f func(x int) error) int {").unwrap();
        assert_eq!(
            types(&func.parameters),
            [("a", "int"), ("b", "int"), ("f", "func(x int) error")]
        );
        assert_eq!(types(&func.results), [("", "int")]);
    }

    #[test]
    fn skips_receiver_and_generics() {
        let func = parse_signature("func (s *Store) Get[K comparable](key K) {").unwrap();
        assert_eq!(func.name, "Get");
        assert_eq!(types(&func.parameters), [("key", "K")]);
        assert!(func.results.is_empty());
    }

    #[test]
    fn one_line_body_is_not_a_result() {
        let func = parse_signature("func helper() map[string]interface{} { return nil }").unwrap();
        assert_eq!(types(&func.results), [("", "map[string]interface{}")]);
        let func = parse_signature("func noop() {}").unwrap();
        assert!(func.results.is_empty());
    }

    #[test]
    fn unnamed_parameters_keep_types() {
        let func = parse_signature("func Use(*store.DB, map[string]int) {").unwrap();
        assert_eq!(
            types(&func.parameters),
            [("", "*store.DB"), ("", "map[string]int")]
        );
    }

    #[test]
    fn scan_attaches_annotations_to_following_func() {
        let src = r#"package simple

import "fmt"

// New builds the example.
// @A provide index=0 name=xpto
func New() *ExampleStruct {
	return &ExampleStruct{}
}

// @A inject index=0
// @A invoke
func Run(
	ex *ExampleStruct,
) {
	fmt.Println(ex)
}

func helper() {}

// @A provide index=0
func Other() *Other { return nil }
"#;
        let entries = SourceCollector::default().scan_source(
            src,
            "example.com/app",
            "example.com/app/simple",
            Some("simple/simple.go"),
        );

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].func_name(), "Other");
        assert_eq!(entries[0].package, "simple");
        assert_eq!(entries[0].func_name(), "New");
        assert_eq!(entries[0].annotations[0].name, "provide");
        assert_eq!(entries[0].annotations[0].attributes["index"], "0");
        assert_eq!(entries[0].annotations[0].attributes["name"], "xpto");
        assert_eq!(entries[1].func_name(), "Run");
        assert_eq!(entries[1].annotations.len(), 2);
        assert_eq!(types(&entries[1].func.as_ref().unwrap().parameters), [("ex", "*ExampleStruct")]);
    }

    #[derive(Default)]
    struct Capture(Mutex<Vec<(Level, String)>>);

    impl Log for Capture {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            self.0
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    #[test]
    fn unparsable_signature_is_reported_to_injected_logger() {
        let sink: &'static Capture = Box::leak(Box::new(Capture::default()));
        let collector =
            SourceCollector::default().with_logger(Logger::new(sink, "inject::collector"));

        let src = "package broken\n\n// @A provide index=0\nfunc () {\n}\n";
        let entries = collector.scan_source(src, "m", "m/broken", None);

        assert!(entries.is_empty());
        let records = sink.0.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Warn);
        assert!(records[0].1.starts_with("unparsable function signature"));
    }

    #[test]
    fn annotation_without_func_is_non_function_entry() {
        let src = "package store\n\n// @A module name=store\nvar _ = 1\n";
        let entries = SourceCollector::default().scan_source(src, "m", "m/store", None);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_func());
    }
}
