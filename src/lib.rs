//! Translates a stack-machine intermediate representation into
//! [Java class files](https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-4.html)
//! and packages them as a loader-ready mod jar.
//!
//! The pipeline runs in three stages, one module each:
//!
//! * [`mappings`] resolves internal symbol names to the names the target
//!   runtime actually uses, through direct bindings or a version-scoped
//!   mapping table;
//! * [`translate`] rewrites each method's instruction stream into target
//!   bytecode, interning constants into a per-class [`constant_pool`];
//! * [`emit`] assembles and serializes whole class files, which [`jar`]
//!   bundles together with the mod manifest and descriptor.

#[macro_use]
extern crate bitflags;

pub mod attribute_info;
pub mod constant_info;
pub mod field_info;
pub mod method_info;

pub mod constant_pool;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod jar;
pub mod mappings;
pub mod translate;
pub mod types;

pub use descriptor::{
    BindingPolicy, ClassDescriptor, FieldDescriptor, FieldSymbol, MethodDescriptor, MethodSymbol,
    Token, ValueType, Visibility,
};
pub use emit::{ClassEmitter, EmittedClass};
pub use error::BuildError;
pub use jar::ModArchive;
pub use mappings::{MappingTable, SymbolResolver};
pub use translate::TranslateOptions;
pub use types::*;

/// Emit every class into the given archive, ready for
/// [`ModArchive::save`].
///
/// ```no_run
/// use modforge::{build_mod, ModArchive, SymbolResolver, TranslateOptions};
///
/// let resolver = SymbolResolver::new(None);
/// let archive = ModArchive::new("examplemod", "1.0.0", "1.21.1");
/// let archive = build_mod(&[], &resolver, &TranslateOptions::default(), archive)?;
/// archive.save("target")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build_mod(
    classes: &[ClassDescriptor],
    resolver: &SymbolResolver,
    options: &TranslateOptions,
    mut archive: ModArchive,
) -> Result<ModArchive, BuildError> {
    let emitter = ClassEmitter::with_options(resolver, options.clone());
    for class in classes {
        archive.add_class(emitter.emit(class)?);
    }
    Ok(archive)
}
