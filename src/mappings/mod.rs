//! Symbol-name resolution against a target runtime's mapping table.
//!
//! The mapping table is a line-oriented text file translating internal
//! symbol paths to the target runtime's public (intermediary) names. Tables
//! are version-scoped: loaded once per version into a process-wide cache
//! and read-only afterwards.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, trace};

use crate::descriptor::{raw_signature, BindingPolicy, FieldSymbol, MethodSymbol};
use crate::error::{BuildError, SymbolKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowKind {
    Class,
    Method,
    Field,
}

/// One mapping-table row. The target public name is always the
/// second-to-last token of the source line, the member's own trailing name
/// the last.
#[derive(Clone, Debug)]
pub struct MappingRow {
    pub kind: RowKind,
    /// Internal-form owner: the class's own internal path for `CLASS`
    /// rows, the already-resolved owner name for member rows.
    pub owner: String,
    /// Method descriptor string; `METHOD` rows only.
    pub descriptor: Option<String>,
    pub target: String,
    pub trailing: String,
}

#[derive(Debug)]
pub struct MappingTable {
    rows: Vec<MappingRow>,
}

impl MappingTable {
    /// Parse a whole table from text. Blank lines and `#` comments are
    /// skipped; anything else must be a well-formed row.
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        let mut rows = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let parse_err = |message: &str| BuildError::MappingParse {
                line: number + 1,
                message: message.to_string(),
            };
            let kind = match tokens[0] {
                "CLASS" => RowKind::Class,
                "METHOD" => RowKind::Method,
                "FIELD" => RowKind::Field,
                other => return Err(parse_err(&format!("unknown row kind {other:?}"))),
            };
            let expected = match kind {
                RowKind::Method => 5,
                _ => 4,
            };
            if tokens.len() != expected {
                return Err(parse_err(&format!(
                    "expected {expected} tokens, found {}",
                    tokens.len()
                )));
            }
            rows.push(MappingRow {
                kind,
                owner: tokens[1].to_string(),
                descriptor: (kind == RowKind::Method).then(|| tokens[2].to_string()),
                target: tokens[tokens.len() - 2].to_string(),
                trailing: tokens[tokens.len() - 1].to_string(),
            });
        }
        Ok(MappingTable { rows })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(BuildError::MappingLoad)?;
        let table = Self::parse(&text)?;
        debug!(rows = table.rows.len(), path = %path.as_ref().display(), "loaded mapping table");
        Ok(table)
    }

    /// Load the table for one target version, once per process. Repeated
    /// calls for the same version return the cached table.
    pub fn for_version(version: &str, path: impl AsRef<Path>) -> Result<Arc<Self>, BuildError> {
        static CACHE: OnceLock<Mutex<HashMap<String, Arc<MappingTable>>>> = OnceLock::new();
        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        let mut cache = cache.lock().expect("mapping table cache poisoned");
        if let Some(table) = cache.get(version) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(Self::load(path)?);
        cache.insert(version.to_string(), Arc::clone(&table));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn find(&self, kind: RowKind, owner: &str, trailing: &str) -> Option<&MappingRow> {
        self.rows
            .iter()
            .find(|row| row.kind == kind && row.owner == owner && row.trailing == trailing)
    }
}

/// A member name resolved to its target-runtime form.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMember {
    /// Slash-delimited owning class name.
    pub owner: String,
    pub name: String,
}

fn slash(path: &str) -> String {
    path.replace('.', "/")
}

fn split_member_path(path: &str) -> Option<(&str, &str)> {
    let dot = path.rfind('.')?;
    Some((&path[..dot], &path[dot + 1..]))
}

/// Resolves internal symbol names to the strings the target runtime uses.
///
/// Resolution order, first match wins: a direct binding attached to the
/// symbol, then a mapping-table lookup (fatal if the table has no matching
/// row), then the symbol's own internal name slash-delimited.
pub struct SymbolResolver {
    table: Option<Arc<MappingTable>>,
    class_bindings: HashMap<String, BindingPolicy>,
    memo: RefCell<HashMap<(String, String), String>>,
}

impl SymbolResolver {
    pub fn new(table: Option<Arc<MappingTable>>) -> Self {
        SymbolResolver {
            table,
            class_bindings: HashMap::new(),
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Attach a binding policy to a class path. Classes without one resolve
    /// under [`BindingPolicy::Default`].
    pub fn bind_class(&mut self, path: impl Into<String>, policy: BindingPolicy) {
        self.class_bindings.insert(path.into(), policy);
    }

    /// Resolve a class path to its slash-delimited target name.
    pub fn resolve_class(&self, path: &str) -> Result<String, BuildError> {
        match self.class_bindings.get(path) {
            Some(BindingPolicy::Direct(name)) => Ok(slash(name)),
            Some(BindingPolicy::MappingTable(key)) => {
                let lookup = key.as_deref().unwrap_or(path);
                self.table_lookup_class(lookup)
            }
            Some(BindingPolicy::Default) | None => Ok(slash(path)),
        }
    }

    fn table_lookup_class(&self, path: &str) -> Result<String, BuildError> {
        let memo_key = (path.to_string(), String::new());
        if let Some(hit) = self.memo.borrow().get(&memo_key) {
            return Ok(hit.clone());
        }
        let trailing = path.rsplit('.').next().unwrap_or(path);
        let target = self
            .table
            .as_ref()
            .and_then(|t| t.find(RowKind::Class, &slash(path), trailing))
            .map(|row| row.target.clone())
            .ok_or_else(|| BuildError::UnresolvedSymbol {
                kind: SymbolKind::Class,
                path: path.to_string(),
            })?;
        trace!(path, %target, "resolved class through mapping table");
        self.memo.borrow_mut().insert(memo_key, target.clone());
        Ok(target)
    }

    /// Resolve a method symbol to its target owner and name.
    pub fn resolve_method(&self, sym: &MethodSymbol) -> Result<ResolvedMember, BuildError> {
        match &sym.binding {
            BindingPolicy::Direct(name) => {
                let (owner, trailing) =
                    split_member_path(name).ok_or_else(|| BuildError::UnresolvedSymbol {
                        kind: SymbolKind::Method,
                        path: name.clone(),
                    })?;
                Ok(ResolvedMember {
                    owner: slash(owner),
                    name: trailing.to_string(),
                })
            }
            BindingPolicy::MappingTable(key) => {
                let own_path = format!("{}.{}", sym.owner, sym.name);
                let path = key.as_deref().unwrap_or(&own_path);
                let signature = raw_signature(&sym.params, &sym.ret);
                self.table_lookup_member(RowKind::Method, path, &signature, SymbolKind::Method)
            }
            BindingPolicy::Default => Ok(ResolvedMember {
                owner: self.resolve_class(&sym.owner)?,
                name: sym.name.clone(),
            }),
        }
    }

    /// Resolve a field symbol to its target owner and name.
    pub fn resolve_field(&self, sym: &FieldSymbol) -> Result<ResolvedMember, BuildError> {
        match &sym.binding {
            BindingPolicy::Direct(name) => {
                let (owner, trailing) =
                    split_member_path(name).ok_or_else(|| BuildError::UnresolvedSymbol {
                        kind: SymbolKind::Field,
                        path: name.clone(),
                    })?;
                Ok(ResolvedMember {
                    owner: slash(owner),
                    name: trailing.to_string(),
                })
            }
            BindingPolicy::MappingTable(key) => {
                let own_path = format!("{}.{}", sym.owner, sym.name);
                let path = key.as_deref().unwrap_or(&own_path);
                let signature = sym.ty.raw_letter();
                self.table_lookup_member(RowKind::Field, path, &signature, SymbolKind::Field)
            }
            BindingPolicy::Default => Ok(ResolvedMember {
                owner: self.resolve_class(&sym.owner)?,
                name: sym.name.clone(),
            }),
        }
    }

    fn table_lookup_member(
        &self,
        kind: RowKind,
        path: &str,
        signature: &str,
        symbol_kind: SymbolKind,
    ) -> Result<ResolvedMember, BuildError> {
        let (owner_path, trailing) =
            split_member_path(path).ok_or_else(|| BuildError::UnresolvedSymbol {
                kind: symbol_kind,
                path: path.to_string(),
            })?;
        let owner = self.resolve_class(owner_path)?;

        let memo_key = (path.to_string(), signature.to_string());
        if let Some(hit) = self.memo.borrow().get(&memo_key) {
            return Ok(ResolvedMember {
                owner,
                name: hit.clone(),
            });
        }

        let target = self
            .table
            .as_ref()
            .and_then(|t| t.find(kind, &owner, trailing))
            .map(|row| row.target.clone())
            .ok_or_else(|| BuildError::UnresolvedSymbol {
                kind: symbol_kind,
                path: path.to_string(),
            })?;
        trace!(path, %owner, %target, "resolved member through mapping table");
        self.memo.borrow_mut().insert(memo_key, target.clone());
        Ok(ResolvedMember {
            owner,
            name: target,
        })
    }
}
