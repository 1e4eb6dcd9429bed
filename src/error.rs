use std::fmt;

use crate::jar::JarError;

/// Kind of symbol a failed resolution was looking for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Method,
    Field,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Class => write!(f, "class"),
            SymbolKind::Method => write!(f, "method"),
            SymbolKind::Field => write!(f, "field"),
        }
    }
}

/// Errors produced anywhere in the translate/emit/package pipeline.
///
/// Every variant is fatal for the build it occurs in; there is nothing to
/// retry in a deterministic single-pass tool.
#[derive(Debug)]
pub enum BuildError {
    /// A mapping-table or binding lookup found no matching row. Usually a
    /// mapping-table/version mismatch.
    UnresolvedSymbol {
        kind: SymbolKind,
        path: String,
    },
    /// A concrete method carries no instruction stream, so no Code
    /// attribute can be synthesized for it.
    MissingInstructionBody {
        class: String,
        method: String,
    },
    /// The translator met a source opcode outside the supported subset
    /// while running in strict mode.
    UnsupportedInstruction {
        class: String,
        method: String,
        opcode: u8,
        offset: usize,
    },
    /// The instruction stream itself is broken: an operand runs past the
    /// end of the stream, a token index is out of range, or the simulated
    /// operand stack underflows.
    MalformedInstruction {
        class: String,
        method: String,
        offset: usize,
        message: String,
    },
    /// The mapping table file could not be read.
    MappingLoad(std::io::Error),
    /// The mapping table file has a syntactically invalid row.
    MappingParse {
        line: usize,
        message: String,
    },
    /// Binary serialization of a class file failed.
    Emit(binrw::Error),
    /// Writing the final archive failed; no partial archive is left behind.
    Archive(JarError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnresolvedSymbol { kind, path } => {
                write!(f, "unresolved {kind} symbol: {path}")
            }
            BuildError::MissingInstructionBody { class, method } => {
                write!(f, "method {class}.{method} has no instruction body")
            }
            BuildError::UnsupportedInstruction {
                class,
                method,
                opcode,
                offset,
            } => write!(
                f,
                "unsupported instruction 0x{opcode:02X} at offset {offset} in {class}.{method}"
            ),
            BuildError::MalformedInstruction {
                class,
                method,
                offset,
                message,
            } => write!(
                f,
                "malformed instruction stream at offset {offset} in {class}.{method}: {message}"
            ),
            BuildError::MappingLoad(e) => write!(f, "failed to load mapping table: {e}"),
            BuildError::MappingParse { line, message } => {
                write!(f, "mapping table parse error on line {line}: {message}")
            }
            BuildError::Emit(e) => write!(f, "class file serialization error: {e}"),
            BuildError::Archive(e) => write!(f, "archive write error: {e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::MappingLoad(e) => Some(e),
            BuildError::Emit(e) => Some(e),
            BuildError::Archive(e) => Some(e),
            _ => None,
        }
    }
}

impl From<binrw::Error> for BuildError {
    fn from(e: binrw::Error) -> Self {
        BuildError::Emit(e)
    }
}

impl From<JarError> for BuildError {
    fn from(e: JarError) -> Self {
        BuildError::Archive(e)
    }
}
