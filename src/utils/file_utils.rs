use crate::error::{Result, ThorError};
use itertools::Itertools;
use log::debug;
use memmap2::Mmap;
use regex::Regex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Memory-map a file read-only.
pub fn read_binary_file_mmap(path: impl AsRef<Path>) -> Result<Mmap> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ThorError::io(path, e))?;
    // Safety: source files are treated as immutable while a view is open
    unsafe { Mmap::map(&file) }.map_err(|e| ThorError::io(path, e))
}

pub fn file_size(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| ThorError::io(path, e))
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Index of the `]` closing a class whose body starts at `start`. A `]` right
/// after the opening `[` or `[!` belongs to the body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut end = start;
    if chars.get(end) == Some(&'!') {
        end += 1;
    }
    if chars.get(end) == Some(&']') {
        end += 1;
    }
    let offset = chars.get(end..)?.iter().position(|&c| c == ']')?;
    Some(end + offset)
}

/// Regex class for a glob class body. Only a leading `!` negates.
fn class_regex(body: &[char]) -> String {
    let (mut class, body) = match body.split_first() {
        Some((&'!', rest)) => (String::from("[^"), rest),
        _ => (String::from("["), body),
    };
    for &c in body {
        if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
            class.push('\\');
        }
        class.push(c);
    }
    class.push(']');
    class
}

/// Translates a file-name glob (`*`, `?`, `[...]`) into an anchored regex.
/// An unclosed `[` matches itself.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut expr = String::from("^");
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => expr.push_str("[^/]*"),
            '?' => expr.push_str("[^/]"),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    expr.push_str(&class_regex(&chars[i..end]));
                    i = end + 1;
                }
                None => expr.push_str(r"\["),
            },
            _ => expr.push_str(&regex::escape(&c.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| ThorError::UnsupportedValue {
        field: "file pattern",
        value: format!("{pattern}: {e}"),
    })
}

/// All entries of `dir` whose file name matches `pattern`, sorted.
pub fn find_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !has_wildcard(pattern) {
        let path = dir.join(pattern);
        return Ok(if path.exists() { vec![path] } else { vec![] });
    }

    let re = glob_to_regex(pattern)?;
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(ThorError::io(dir, e)),
    };

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ThorError::io(dir, e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        // Leading wildcards do not match hidden files.
        if name.starts_with('.') && !pattern.starts_with('.') {
            continue;
        }
        if re.is_match(&name) {
            matches.push(dir.join(&*name));
        }
    }
    matches.sort();
    Ok(matches)
}

/// Resolves `input` to exactly one file.
///
/// A directory is searched for `pattern`; anything else is treated as a path
/// whose final component may itself be a pattern. Zero or several matches are
/// an error.
pub fn find_file(input: &Path, pattern: Option<&str>) -> Result<PathBuf> {
    let (dir, name) = if input.is_dir() {
        let pattern = pattern.ok_or_else(|| ThorError::MissingPattern {
            path: input.to_path_buf(),
        })?;
        (input.to_path_buf(), pattern.to_string())
    } else {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = input.parent().map(Path::to_path_buf).unwrap_or_default();
        (dir, name)
    };

    let dir = if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    };
    let matches = find_files(&dir, &name)?;
    let count = matches.len();
    let path = matches
        .into_iter()
        .exactly_one()
        .map_err(|_| ThorError::PathResolution {
            pattern: dir.join(&name).display().to_string(),
            count,
        })?;
    debug!("resolved {} to {}", input.display(), path.display());
    Ok(path)
}
