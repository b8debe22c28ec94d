use anyhow::{anyhow, bail, Context, Result};
use serde_ini::parse::{Item, Parser};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// One `[name]` block of an AWS style INI file, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub values: BTreeMap<String, String>,
}

impl IniSection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }
}

/// Raw contents of `path`, empty when the file does not exist yet.
pub fn read_contents(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist, treating it as empty", path.display());
            Ok(String::new())
        }
        Err(e) => Err(e).with_context(|| format!("Unable to read {}", path.display())),
    }
}

/// Reads every section of the file at `path`. A missing file reads as empty.
pub fn read_sections(path: &Path) -> Result<Vec<IniSection>> {
    let contents = read_contents(path)?;

    parse_sections(&contents).with_context(|| format!("Malformed INI file {}", path.display()))
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with(';')
}

/// Parses one trimmed, non-blank, non-comment line. Both `=` and `:` separate a
/// key from its value, whichever comes first.
fn parse_line(line: &str) -> Result<Item> {
    let line = match (line.find('='), line.find(':')) {
        (Some(equals), Some(colon)) if colon < equals => line.replacen(':', "=", 1),
        (None, Some(_)) => line.replacen(':', "=", 1),
        _ => line.to_owned(),
    };

    Parser::from_bufread(line.as_bytes())
        .next()
        .unwrap_or(Ok(Item::Empty))
        .map_err(|e| anyhow!("{:?}", e))
}

pub fn parse_sections(contents: &str) -> Result<Vec<IniSection>> {
    let mut sections: Vec<IniSection> = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }

        let item = parse_line(line)
            .with_context(|| format!("Malformed line {}: `{}`", index + 1, line))?;

        match item {
            Item::Section { name } => sections.push(IniSection::new(name.trim())),
            Item::Value { key, value } => match sections.last_mut() {
                Some(section) => {
                    let _ = section
                        .values
                        .insert(key.trim().to_lowercase(), value.trim().to_owned());
                }
                None => bail!(
                    "Key '{}' on line {} appears before any section header",
                    key.trim(),
                    index + 1
                ),
            },
            Item::Empty | Item::Comment { .. } => {}
        }
    }

    Ok(sections)
}

/// Sets `key` in the first `[section]` of `contents`, touching no other line.
///
/// An existing key line is replaced, a missing key goes after the section's last
/// value, and a missing section is appended. The file's line ending is kept.
pub fn set_value_in_place(contents: &str, section: &str, key: &str, value: &str) -> Result<String> {
    let eol = if contents.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<String> = contents.lines().map(str::to_owned).collect();
    let entry = format!("{} = {}", key, value);

    let mut in_target = false;
    let mut found_section = false;
    let mut last_value: Option<usize> = None;
    let mut replace: Option<usize> = None;

    for (index, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }

        match parse_line(line)
            .with_context(|| format!("Malformed line {}: `{}`", index + 1, line))?
        {
            Item::Section { name } => {
                if in_target {
                    break;
                }
                in_target = !found_section && name.trim() == section;
                if in_target {
                    found_section = true;
                    last_value = Some(index);
                }
            }
            Item::Value { key: existing, .. } if in_target => {
                last_value = Some(index);
                if existing.trim().eq_ignore_ascii_case(key) {
                    replace = Some(index);
                    break;
                }
            }
            _ => {}
        }
    }

    match (replace, last_value) {
        (Some(index), _) => lines[index] = entry,
        (None, Some(index)) => lines.insert(index + 1, entry),
        (None, None) => {
            if lines.last().map_or(false, |line| !line.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.push(format!("[{}]", section));
            lines.push(entry);
        }
    }

    let mut updated = lines.join(eol);
    updated.push_str(eol);
    Ok(updated)
}

/// Replaces `path` through a temporary file in the same directory, so readers
/// see either the old or the new contents.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o600))?;
    }

    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    info!("{} modified", path.display());

    Ok(())
}
