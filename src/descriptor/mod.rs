//! The input data model: one [`ClassDescriptor`] per source type, populated
//! by a metadata-extraction front end. Descriptors are immutable once built
//! and consumed by the emitter.

use crate::error::BuildError;
use crate::mappings::SymbolResolver;

/// Inferred or declared type of a value on the operand stack, in a local
/// slot, or in a signature.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueType {
    Int,
    Long,
    Float,
    Double,
    Byte,
    Short,
    Char,
    Boolean,
    Void,
    /// Reference type, dot-delimited internal path (`java.lang.String`).
    Object(String),
    Array(Box<ValueType>),
}

impl ValueType {
    /// Number of JVM operand-stack slots a value of this type occupies.
    pub fn slot_width(&self) -> u16 {
        match self {
            ValueType::Long | ValueType::Double => 2,
            _ => 1,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, ValueType::Object(_) | ValueType::Array(_))
    }

    /// The wrapper class and primitive descriptor letter used when boxing,
    /// or `None` for non-primitive types.
    pub fn wrapper(&self) -> Option<(&'static str, char)> {
        match self {
            ValueType::Int => Some(("java/lang/Integer", 'I')),
            ValueType::Long => Some(("java/lang/Long", 'J')),
            ValueType::Float => Some(("java/lang/Float", 'F')),
            ValueType::Double => Some(("java/lang/Double", 'D')),
            ValueType::Byte => Some(("java/lang/Byte", 'B')),
            ValueType::Short => Some(("java/lang/Short", 'S')),
            ValueType::Char => Some(("java/lang/Character", 'C')),
            ValueType::Boolean => Some(("java/lang/Boolean", 'Z')),
            _ => None,
        }
    }

    /// Descriptor string with reference types resolved to their target
    /// names through the resolver.
    pub fn descriptor(&self, resolver: &SymbolResolver) -> Result<String, BuildError> {
        Ok(match self {
            ValueType::Int => "I".into(),
            ValueType::Long => "J".into(),
            ValueType::Float => "F".into(),
            ValueType::Double => "D".into(),
            ValueType::Byte => "B".into(),
            ValueType::Short => "S".into(),
            ValueType::Char => "C".into(),
            ValueType::Boolean => "Z".into(),
            ValueType::Void => "V".into(),
            ValueType::Object(path) => format!("L{};", resolver.resolve_class(path)?),
            ValueType::Array(inner) => format!("[{}", inner.descriptor(resolver)?),
        })
    }

    /// Unresolved descriptor letter, usable as a cache key before any
    /// symbol resolution has happened.
    pub fn raw_letter(&self) -> String {
        match self {
            ValueType::Int => "I".into(),
            ValueType::Long => "J".into(),
            ValueType::Float => "F".into(),
            ValueType::Double => "D".into(),
            ValueType::Byte => "B".into(),
            ValueType::Short => "S".into(),
            ValueType::Char => "C".into(),
            ValueType::Boolean => "Z".into(),
            ValueType::Void => "V".into(),
            ValueType::Object(path) => format!("L{};", path),
            ValueType::Array(inner) => format!("[{}", inner.raw_letter()),
        }
    }
}

/// Build a `(params)return` method descriptor, resolving reference types.
pub fn method_descriptor(
    params: &[ValueType],
    ret: &ValueType,
    resolver: &SymbolResolver,
) -> Result<String, BuildError> {
    let mut out = String::from("(");
    for p in params {
        out.push_str(&p.descriptor(resolver)?);
    }
    out.push(')');
    out.push_str(&ret.descriptor(resolver)?);
    Ok(out)
}

/// Unresolved signature string for memoization keys.
pub fn raw_signature(params: &[ValueType], ret: &ValueType) -> String {
    let mut out = String::from("(");
    for p in params {
        out.push_str(&p.raw_letter());
    }
    out.push(')');
    out.push_str(&ret.raw_letter());
    out
}

/// How a symbol's target-runtime name is decided. See
/// [`SymbolResolver`](crate::mappings::SymbolResolver) for the resolution
/// order.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum BindingPolicy {
    /// Author-supplied exact target-qualified name, dot-delimited.
    Direct(String),
    /// Look the symbol up in the mapping table, optionally under an
    /// explicit key instead of the symbol's own declared path.
    MappingTable(Option<String>),
    /// Use the symbol's own internal qualified name.
    #[default]
    Default,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// An external method referenced by a `call`/`callvirt`/`newobj` token.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodSymbol {
    /// Declaring class, dot-delimited internal path.
    pub owner: String,
    pub name: String,
    pub params: Vec<ValueType>,
    pub ret: ValueType,
    pub is_static: bool,
    pub owner_is_interface: bool,
    pub binding: BindingPolicy,
}

/// An external field referenced by a field-access token.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSymbol {
    pub owner: String,
    pub name: String,
    pub ty: ValueType,
    pub is_static: bool,
    pub binding: BindingPolicy,
}

/// One entry in a method's operand token table. Instruction operands that
/// reference something outside the instruction stream are 32-bit indices
/// into this table, replacing the original format's metadata tokens.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Method(MethodSymbol),
    Field(FieldSymbol),
    Type(ValueType),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: ValueType,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
}

#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<ValueType>,
    pub ret: ValueType,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    /// Raw source instruction stream. `None` on abstract methods only;
    /// a concrete method without a body is a fatal input error.
    pub code: Option<Vec<u8>>,
    /// Operand token table for this method's instruction stream.
    pub tokens: Vec<Token>,
    /// Declared local-variable count, not counting parameters or the
    /// receiver slot.
    pub local_count: u16,
}

impl MethodDescriptor {
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }
}

/// Shape of one source type. Exactly one base class; immutable once built.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    /// Fully qualified internal name, dot-delimited.
    pub name: String,
    /// Base class, dot-delimited internal path.
    pub super_class: String,
    pub interfaces: Vec<String>,
    pub is_interface: bool,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
}
