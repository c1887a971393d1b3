//! NID database: in-memory shape and XML text-format loader.
//!
//! The database maps human-readable module and function names to the 32-bit
//! numeric identifiers the module loader resolves at load time. On disk it is
//! an XML document: a library root holding module elements, each with `name`
//! and `nid` attributes and a list of `func` children of the same shape.
//! NID values carry a two-character `0x` prefix that is stripped before the
//! hexadecimal parse.
//!
//! The reader below handles only the subset of XML the database uses:
//! elements, attributes, comments, and the leading declaration. Text content
//! between elements is ignored.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// A function exported by a module.
#[derive(Debug, Clone)]
pub struct NidFunction {
    pub name: String,
    pub nid: u32,
}

/// A loadable module and its exported functions, in declaration order.
#[derive(Debug, Clone)]
pub struct NidModule {
    pub name: String,
    pub nid: u32,
    pub functions: Vec<NidFunction>,
}

/// The whole database, modules in declaration order.
#[derive(Debug, Clone, Default)]
pub struct NidDatabase {
    pub modules: Vec<NidModule>,
}

impl NidDatabase {
    /// Read and parse a database file. Any failure here is fatal to the run.
    pub fn load(path: &Path) -> Result<NidDatabase> {
        let text = fs::read_to_string(path)?;
        NidDatabase::parse(&text)
    }

    /// Parse the database from XML text.
    pub fn parse(text: &str) -> Result<NidDatabase> {
        let root = XmlReader::new(text).parse_document()?;
        let mut db = NidDatabase::default();
        for module in &root.children {
            let name = module.attr("name").ok_or_else(|| {
                Error::format(format!("module element <{}> has no name attribute", module.name))
            })?;
            let nid = parse_nid(module.attr("nid").ok_or_else(|| {
                Error::format(format!("module {} has no nid attribute", name))
            })?)?;

            let mut functions = Vec::new();
            for atom in &module.children {
                if atom.name != "func" {
                    continue;
                }
                let fname = atom.attr("name").ok_or_else(|| {
                    Error::format(format!("function in module {} has no name attribute", name))
                })?;
                let fnid = parse_nid(atom.attr("nid").ok_or_else(|| {
                    Error::format(format!("function {} has no nid attribute", fname))
                })?)?;
                functions.push(NidFunction { name: fname.to_string(), nid: fnid });
            }

            db.modules.push(NidModule { name: name.to_string(), nid, functions });
        }
        Ok(db)
    }
}

/// Parse a `0x`-prefixed hexadecimal NID attribute value.
fn parse_nid(value: &str) -> Result<u32> {
    if value.len() <= 2 {
        return Err(Error::format(format!("bad nid value \"{}\"", value)));
    }
    u32::from_str_radix(&value[2..], 16)
        .map_err(|_| Error::format(format!("bad nid value \"{}\"", value)))
}

// ── Minimal XML reader ───────────────────────────────────────────────────────

struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

struct XmlReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> XmlReader<'a> {
    fn new(text: &'a str) -> XmlReader<'a> {
        XmlReader { bytes: text.as_bytes(), pos: 0 }
    }

    /// Parse the document and return its single root element.
    fn parse_document(mut self) -> Result<XmlElement> {
        self.skip_misc();
        let root = self.parse_element()?;
        Ok(root)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(prefix)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n')) {
            self.pos += 1;
        }
    }

    /// Skip whitespace, the XML declaration, comments, and doctype noise.
    fn skip_misc(&mut self) {
        loop {
            self.skip_whitespace();
            if self.starts_with(b"<?") || self.starts_with(b"<!DOCTYPE") {
                while let Some(b) = self.peek() {
                    self.pos += 1;
                    if b == b'>' {
                        break;
                    }
                }
            } else if self.starts_with(b"<!--") {
                self.pos += 4;
                while self.pos < self.bytes.len() && !self.starts_with(b"-->") {
                    self.pos += 1;
                }
                self.pos = (self.pos + 3).min(self.bytes.len());
            } else {
                return;
            }
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.' || b == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(Error::format(format!("expected a name at byte {}", start)));
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn expect(&mut self, b: u8) -> Result<()> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(Error::format(format!("expected '{}' at byte {}", b as char, self.pos)))
        }
    }

    fn parse_attr_value(&mut self) -> Result<String> {
        let quote = self.peek().filter(|&b| b == b'"' || b == b'\'').ok_or_else(|| {
            Error::format(format!("expected a quoted attribute value at byte {}", self.pos))
        })?;
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                let value = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(Error::format("unterminated attribute value"))
    }

    fn parse_element(&mut self) -> Result<XmlElement> {
        self.expect(b'<')?;
        let name = self.parse_name()?;
        let mut element = XmlElement { name, attrs: Vec::new(), children: Vec::new() };

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'/') => {
                    // Self-closing tag
                    self.pos += 1;
                    self.expect(b'>')?;
                    return Ok(element);
                }
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    let key = self.parse_name()?;
                    self.skip_whitespace();
                    self.expect(b'=')?;
                    self.skip_whitespace();
                    let value = self.parse_attr_value()?;
                    element.attrs.push((key, value));
                }
                None => return Err(Error::format(format!("unterminated <{}> tag", element.name))),
            }
        }

        // Content: child elements until the matching close tag. Text runs
        // and comments in between are discarded.
        loop {
            while let Some(b) = self.peek() {
                if b == b'<' {
                    break;
                }
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Err(Error::format(format!("missing closing tag for <{}>", element.name)));
            }
            if self.starts_with(b"<!--") {
                self.skip_misc();
                continue;
            }
            if self.starts_with(b"</") {
                self.pos += 2;
                let close = self.parse_name()?;
                if close != element.name {
                    return Err(Error::format(format!(
                        "mismatched closing tag </{}> for <{}>",
                        close, element.name
                    )));
                }
                self.skip_whitespace();
                self.expect(b'>')?;
                return Ok(element);
            }
            element.children.push(self.parse_element()?);
        }
    }
}
